use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Receiver for human-readable diagnostic lines emitted by the core.
pub trait DiagnosticsSink {
    fn report(&mut self, line: &str);
}

/// Forwards every line to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn report(&mut self, line: &str) {
        log::info!(target: "tickline::report", "{}", line);
    }
}

/// Keeps every line in memory. Clones share the same storage.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.lines.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }
}

impl DiagnosticsSink for RecordingSink {
    fn report(&mut self, line: &str) {
        self.lines.borrow_mut().push(line.to_owned());
    }
}

/// Leading-edge rate limiter: lets one event through per `interval`.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Duration>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn ready(&mut self, now: Duration) -> bool {
        match self.last {
            Some(last) if now < last + self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
