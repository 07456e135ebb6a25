/// Per-run cap on remote fetch attempts.
///
/// Owned by the backfill controller for the lifetime of one run; exhaustion
/// only stops further fetches, it is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchBudget {
    limit: usize,
    used: usize,
}

impl FetchBudget {
    pub fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    /// Consume one unit, `false` when the budget is already spent
    pub fn try_take(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.used += 1;
        true
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_allows_exactly_limit() {
        let mut budget = FetchBudget::new(2);
        assert!(budget.try_take());
        assert!(budget.try_take());
        assert!(!budget.try_take());
        assert_eq!(budget.used(), 2);
        assert_eq!(budget.remaining(), 0);
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_zero_budget_is_exhausted_from_start() {
        let mut budget = FetchBudget::new(0);
        assert!(budget.is_exhausted());
        assert!(!budget.try_take());
        assert_eq!(budget.used(), 0);
    }
}
