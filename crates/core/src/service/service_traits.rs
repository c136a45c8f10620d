use std::time::Duration;

use async_trait::async_trait;

use crate::errors::Result;
use crate::events::ServiceEvent;

/// Why the run loop woke the service up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Wakeup {
    /// First run right after start, for services that ask for it.
    Startup,
    /// The interval elapsed without any event.
    Timeout,
    /// Events received since the last wakeup, in arrival order.
    Events(Vec<ServiceEvent>),
}

impl Wakeup {
    pub fn events(&self) -> &[ServiceEvent] {
        match self {
            Wakeup::Events(events) => events,
            Wakeup::Startup | Wakeup::Timeout => &[],
        }
    }
}

/// A long-running task driven by a [`Supervisor`](super::Supervisor).
#[async_trait]
pub trait Service: Send + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Longest wait for an event before the unit of work runs anyway.
    fn interval(&self) -> Duration;

    /// Whether the unit of work runs once immediately after start.
    fn run_on_start(&self) -> bool {
        false
    }

    /// Runs one unit of work.
    ///
    /// A returned event is published on the supervisor's bus. Errors are
    /// logged by the supervisor and do not stop the loop.
    async fn run_once(&mut self, wakeup: Wakeup) -> Result<Option<ServiceEvent>>;
}
