use std::{cell::RefCell, collections::VecDeque, rc::Rc, time::Duration};

use esp_rc_voltmeter::board::rc_lines::{EdgeWait, RcLines};

/// What the sensor did to the lines, readable after the sensor is gone.
#[derive(Debug, Default)]
pub struct LineLog {
    pub control_active: bool,
    pub set_control_calls: usize,
    pub pulses: usize,
    pub delays: Vec<Duration>,
    pub wait_timeouts: Vec<Duration>,
    pub released: bool,
}

/// Replays one scripted edge delay per sample. `None`, a delay past the timeout,
/// or an exhausted script all behave as a missing edge.
pub struct MockLines {
    edges: VecDeque<Option<Duration>>,
    clock: Duration,
    log: Rc<RefCell<LineLog>>,
}

impl MockLines {
    pub fn new(edges: impl IntoIterator<Item = Option<Duration>>) -> (Self, Rc<RefCell<LineLog>>) {
        let log = Rc::new(RefCell::new(LineLog::default()));
        let lines = Self {
            edges: edges.into_iter().collect(),
            clock: Duration::from_secs(1_000),
            log: log.clone(),
        };
        (lines, log)
    }

    pub fn constant(delay: Duration, count: usize) -> (Self, Rc<RefCell<LineLog>>) {
        Self::new(std::iter::repeat(Some(delay)).take(count))
    }
}

impl RcLines for MockLines {
    fn set_control(&mut self, active: bool) -> anyhow::Result<()> {
        let mut log = self.log.borrow_mut();
        if active && !log.control_active {
            log.pulses += 1;
        }
        log.control_active = active;
        log.set_control_calls += 1;
        Ok(())
    }

    fn delay(&mut self, duration: Duration) {
        self.clock += duration;
        self.log.borrow_mut().delays.push(duration);
    }

    fn wait_falling_edge(&mut self, timeout: Duration) -> anyhow::Result<EdgeWait> {
        self.log.borrow_mut().wait_timeouts.push(timeout);

        match self.edges.pop_front() {
            Some(Some(delay)) if delay < timeout => {
                self.clock += delay;
                Ok(EdgeWait::Edge)
            }
            _ => {
                self.clock += timeout;
                Ok(EdgeWait::Timeout)
            }
        }
    }

    fn now(&self) -> Duration {
        self.clock
    }

    fn release(&mut self) -> anyhow::Result<()> {
        let mut log = self.log.borrow_mut();
        log.control_active = false;
        log.released = true;
        Ok(())
    }
}

pub fn expected_voltage(trig_level: f64, time_constant: f64, elapsed: f64) -> f64 {
    trig_level / (1.0 - (-elapsed / time_constant).exp())
}

pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "{actual} is not within {tolerance} of {expected}"
    );
}
