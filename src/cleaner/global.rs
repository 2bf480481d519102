//! Process-wide dispatcher shared by a whole test run.
//!
//! Every access holds one lock for the full operation, so detection and
//! assignment are never interleaved between threads.

use std::sync::{LazyLock, Mutex, PoisonError};

use crate::cleaner::core::errors::CleanerResult;
use crate::cleaner::dispatcher::Dispatcher;

static GLOBAL: LazyLock<Mutex<Dispatcher>> = LazyLock::new(|| Mutex::new(Dispatcher::default()));

/// Run `f` with exclusive access to the global dispatcher.
///
/// A lock poisoned by a panicking test is recovered; the dispatcher holds no
/// partially-updated state across a panic.
pub fn with_global<R>(f: impl FnOnce(&mut Dispatcher) -> R) -> R {
    let mut guard = GLOBAL.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut *guard)
}

/// Replace the global dispatcher, returning the previous one.
pub fn install_global(dispatcher: Dispatcher) -> Dispatcher {
    with_global(|current| std::mem::replace(current, dispatcher))
}

/// `start` on the global dispatcher.
///
/// # Errors
/// See [`Dispatcher::start`].
pub fn start() -> CleanerResult<()> {
    with_global(Dispatcher::start)
}

/// `clean` on the global dispatcher.
///
/// # Errors
/// See [`Dispatcher::clean`].
pub fn clean() -> CleanerResult<()> {
    with_global(Dispatcher::clean)
}

/// `reset` on the global dispatcher.
pub fn reset() {
    with_global(Dispatcher::reset);
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::cleaner::core::errors::{CleanerError, StrategyFailure};
    use crate::cleaner::core::strategy::{Strategy, StrategySpec};

    struct Counting(Arc<Mutex<u32>>);

    impl Strategy for Counting {
        fn start(&mut self) -> Result<(), StrategyFailure> {
            Ok(())
        }

        fn clean(&mut self) -> Result<(), StrategyFailure> {
            *self.0.lock().unwrap() += 1;
            Ok(())
        }
    }

    // Only test touching the global instance, so it cannot race other tests.
    #[test]
    fn test_global_lifecycle() {
        install_global(Dispatcher::default());
        assert!(matches!(clean(), Err(CleanerError::NoStrategySet)));

        let cleans = Arc::new(Mutex::new(0));
        let counting = Counting(Arc::clone(&cleans));
        with_global(|d| d.assign_strategy(StrategySpec::instance(counting), None)).unwrap();
        start().unwrap();
        clean().unwrap();
        clean().unwrap();
        assert_eq!(*cleans.lock().unwrap(), 2);

        reset();
        assert!(matches!(start(), Err(CleanerError::NoStrategySet)));

        let previous = install_global(Dispatcher::default());
        assert!(!previous.has_strategy());
    }
}
