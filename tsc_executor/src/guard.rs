//! Forces a `Multithreaded` classifier down to a single internal thread for
//! the duration of a parallel section, restoring the previous value on
//! drop — prevents thread-pool oversubscription when a classifier's own
//! parallelism runs inside the evaluator's pool.

use tsc_traits::classifier::Multithreaded;

pub struct ThreadCountGuard<'a> {
    classifier: &'a mut dyn Multithreaded,
    previous: usize,
}

impl<'a> ThreadCountGuard<'a> {
    pub fn suppress(classifier: &'a mut dyn Multithreaded) -> Self {
        let previous = classifier.thread_count();
        classifier.set_thread_count(1);
        Self {
            classifier,
            previous,
        }
    }

    pub fn thread_count(&self) -> usize {
        self.classifier.thread_count()
    }
}

impl Drop for ThreadCountGuard<'_> {
    fn drop(&mut self) {
        self.classifier.set_thread_count(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake(usize);
    impl Multithreaded for Fake {
        fn thread_count(&self) -> usize {
            self.0
        }
        fn set_thread_count(&mut self, threads: usize) {
            self.0 = threads;
        }
    }

    #[test]
    fn suppresses_and_restores() {
        let mut fake = Fake(8);
        {
            let guard = ThreadCountGuard::suppress(&mut fake);
            assert_eq!(guard.thread_count(), 1);
        }
        assert_eq!(fake.0, 8);
    }
}
