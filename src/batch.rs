use crate::error::Error;

/// Outcome of one failed write inside a batch.
///
/// `index` is the position of the item in the batch as submitted.
#[derive(Debug)]
pub struct BatchFailure {
    pub index: usize,
    pub error: Error,
}

/// Result of a multi-write operation (task expansion, bulk delete, reorder).
///
/// Batches are not atomic: writes that succeeded stand even when later ones
/// fail. The report makes the partial-failure set visible to the caller
/// instead of swallowing individual errors.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub attempted: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn new(attempted: usize) -> Self {
        Self {
            attempted,
            failures: Vec::new(),
        }
    }

    pub fn record_failure(&mut self, index: usize, error: Error) {
        self.failures.push(BatchFailure { index, error });
    }

    pub fn succeeded(&self) -> usize {
        self.attempted - self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_complete() {
        let report = BatchReport::new(0);
        assert!(report.is_complete());
        assert_eq!(report.succeeded(), 0);
    }

    #[test]
    fn test_failures_counted() {
        let mut report = BatchReport::new(5);
        report.record_failure(2, Error::validation("bad item"));
        assert!(!report.is_complete());
        assert_eq!(report.succeeded(), 4);
        assert_eq!(report.failures[0].index, 2);
    }
}
