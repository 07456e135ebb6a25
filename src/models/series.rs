//! Daily closing price series

use std::collections::HashMap;

use super::day::Day;

/// A single closing price on a day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub day: Day,
    pub price: f64,
}

/// Mapping from day to closing price.
///
/// Keys are unique and unordered; `points` materializes the ascending view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    prices: HashMap<Day, f64>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Price recorded for `day`, if any
    pub fn lookup(&self, day: Day) -> Option<f64> {
        self.prices.get(&day).copied()
    }

    /// Insert or overwrite the price for `day`, returning the previous value
    pub fn merge(&mut self, day: Day, price: f64) -> Option<f64> {
        self.prices.insert(day, price)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// All points sorted ascending by day
    pub fn points(&self) -> Vec<PricePoint> {
        let mut points: Vec<PricePoint> = self
            .prices
            .iter()
            .map(|(day, price)| PricePoint {
                day: *day,
                price: *price,
            })
            .collect();
        points.sort_by_key(|p| p.day);
        points
    }
}

#[cfg(test)]
impl FromIterator<PricePoint> for Series {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        let mut series = Series::new();
        for point in iter {
            series.merge(point.day, point.price);
        }
        series
    }
}
