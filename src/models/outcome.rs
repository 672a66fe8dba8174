//! Results handed back to callers of the measuring executors.

/// Result of a single measured unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct Measured<T> {
    /// Value produced by the unit
    pub result: T,

    /// Elapsed time in seconds, identical to the recorded metric value
    pub duration: f64,
}

/// Outcome of a best-effort batch.
///
/// All three vectors are index-aligned with the submitted units. A failed unit
/// contributes `None` to `results` and `durations` and its error to `errors`;
/// a succeeded unit contributes its value and duration and `None` to `errors`.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T, E> {
    pub results: Vec<Option<T>>,
    pub durations: Vec<Option<f64>>,
    pub errors: Vec<Option<E>>,
}

impl<T, E> BatchOutcome<T, E> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
            durations: Vec::with_capacity(capacity),
            errors: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, settled: Result<Measured<T>, E>) {
        match settled {
            Ok(measured) => {
                self.results.push(Some(measured.result));
                self.durations.push(Some(measured.duration));
                self.errors.push(None);
            }
            Err(err) => {
                self.results.push(None);
                self.durations.push(None);
                self.errors.push(Some(err));
            }
        }
    }

    /// Number of units in the batch.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of units that failed.
    pub fn error_count(&self) -> usize {
        self.errors.iter().filter(|e| e.is_some()).count()
    }

    /// True when no unit failed.
    pub fn is_complete_success(&self) -> bool {
        self.error_count() == 0
    }
}

/// Outcome of a fail-fast batch; only produced when every unit succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct FailFastOutcome<T> {
    pub results: Vec<T>,
    pub durations: Vec<f64>,
}

impl<T> FromIterator<Measured<T>> for FailFastOutcome<T> {
    fn from_iter<I: IntoIterator<Item = Measured<T>>>(iter: I) -> Self {
        let (results, durations) = iter
            .into_iter()
            .map(|measured| (measured.result, measured.duration))
            .unzip();
        Self { results, durations }
    }
}
