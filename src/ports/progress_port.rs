//! Optimizer progress port trait.

/// Receives human-readable status lines from a long-running search and
/// gives the host a chance to run between chunks of work.
pub trait ProgressPort {
    fn report(&self, message: &str);

    fn yield_now(&self) {
        std::thread::yield_now();
    }
}
