use thiserror::Error;

use crate::models::{Day, PricePoint, Series};

/// Header row of the persisted series
pub const HEADER: [&str; 2] = ["date", "close"];

/// The persisted series could not be read or written
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("unexpected header {found:?}, expected \"date,close\"")]
    Header { found: Vec<String> },

    #[error("line {line}: invalid day timestamp {value:?}")]
    Timestamp { line: u64, value: String },

    #[error("line {line}: invalid price {value:?}")]
    Price { line: u64, value: String },

    #[error("line {line}: day {day} appears more than once")]
    DuplicateDay { line: u64, day: Day },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV output: {0}")]
    Flush(String),
}

/// Parse a persisted series.
///
/// Empty input is an empty series. Anything else must be the header row
/// followed by `timestamp,price` rows; the first bad row fails the whole load.
pub fn load_series(bytes: &[u8]) -> Result<Series, SeriesError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Series::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader.headers()?;
    if headers.iter().map(str::trim).ne(HEADER.iter().copied()) {
        return Err(SeriesError::Header {
            found: headers.iter().map(|h| h.to_string()).collect(),
        });
    }

    let mut series = Series::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let date_field = record.get(0).unwrap_or_default().trim();
        let day = Day::parse_rfc3339(date_field).ok_or_else(|| SeriesError::Timestamp {
            line,
            value: date_field.to_string(),
        })?;

        let price_field = record.get(1).unwrap_or_default().trim();
        let price: f64 = price_field.parse().map_err(|_| SeriesError::Price {
            line,
            value: price_field.to_string(),
        })?;

        if series.merge(day, price).is_some() {
            return Err(SeriesError::DuplicateDay { line, day });
        }
    }

    Ok(series)
}

/// Render the series ascending by day with six-decimal prices
pub fn render_series(series: &Series) -> Result<Vec<u8>, SeriesError> {
    render_points(&series.points())
}

/// Render already-ordered points
pub fn render_points(points: &[PricePoint]) -> Result<Vec<u8>, SeriesError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for point in points {
        writer.write_record([point.day.to_rfc3339(), format!("{:.6}", point.price)])?;
    }

    writer
        .into_inner()
        .map_err(|e| SeriesError::Flush(e.error().to_string()))
}
