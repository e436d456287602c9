use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Global busy indicator shown while requests are in flight.
///
/// Counts outstanding requests; the indicator is lit while the count is non-zero.
#[derive(Debug, Clone, Default)]
pub struct BusyIndicator {
    in_flight: Arc<AtomicUsize>,
}

impl BusyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the indicator. It is released when the guard drops, on every exit path.
    pub fn acquire(&self) -> BusyGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        BusyGuard {
            in_flight: self.in_flight.clone(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct BusyGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards_nest() {
        let busy = BusyIndicator::new();
        assert!(!busy.is_busy());

        let first = busy.acquire();
        let second = busy.acquire();
        assert_eq!(busy.in_flight(), 2);

        drop(first);
        assert!(busy.is_busy());
        drop(second);
        assert!(!busy.is_busy());
    }

    #[test]
    fn test_released_on_early_return() {
        fn failing(busy: &BusyIndicator) -> Result<(), String> {
            let _guard = busy.acquire();
            Err("boom".to_string())
        }

        let busy = BusyIndicator::new();
        assert!(failing(&busy).is_err());
        assert!(!busy.is_busy());
    }
}
