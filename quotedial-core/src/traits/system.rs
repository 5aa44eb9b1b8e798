//! System clock and resource queries

/// Trait for monotonic time and memory statistics
pub trait SystemMonitor {
    /// Milliseconds since boot, monotonic
    fn uptime_ms(&self) -> u64;

    /// Free memory in bytes, if the platform can report it
    fn free_memory(&self) -> Option<u32> {
        None
    }
}
