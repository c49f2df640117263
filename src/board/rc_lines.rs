use std::time::Duration;

/// What ended a bounded wait on the measure line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeWait {
    Edge,
    Timeout,
}

/// The two digital lines wired to the RC network, plus the clock used to time them.
///
/// The control line discharges the capacitor while active. The measure line is
/// the comparator output: it falls once the capacitor voltage crosses the
/// trigger level.
pub trait RcLines {
    /// Drive the control line active (`true`) or inactive (`false`).
    fn set_control(&mut self, active: bool) -> anyhow::Result<()>;

    /// Block for a fixed real-time delay.
    fn delay(&mut self, duration: Duration);

    /// Block until a falling edge on the measure line, or until `timeout` elapses.
    fn wait_falling_edge(&mut self, timeout: Duration) -> anyhow::Result<EdgeWait>;

    /// Monotonic time since an arbitrary origin, sub-millisecond resolution.
    fn now(&self) -> Duration;

    /// Put both lines back into their safe state.
    fn release(&mut self) -> anyhow::Result<()> {
        self.set_control(false)
    }
}
