use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use super::{HostDriver, HostEvent};

/// Host driver that replays a fixed script.
///
/// `None` steps are idle polls: the poll reports no event, which lets the
/// event loop run a timer turn. Once the script is exhausted the driver
/// reports `Shutdown` forever.
#[derive(Debug, Default)]
pub struct ScriptedDriver {
    steps: VecDeque<Option<HostEvent>>,
}

impl ScriptedDriver {
    pub fn new(events: impl IntoIterator<Item = HostEvent>) -> Self {
        Self::from_steps(events.into_iter().map(Some))
    }

    pub fn from_steps(steps: impl IntoIterator<Item = Option<HostEvent>>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    pub fn push(&mut self, event: HostEvent) {
        self.steps.push_back(Some(event));
    }

    pub fn push_idle(&mut self) {
        self.steps.push_back(None);
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl HostDriver for ScriptedDriver {
    fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
        match self.steps.front() {
            Some(None) => {
                self.steps.pop_front();
                Ok(false)
            }
            Some(Some(_)) | None => Ok(true),
        }
    }

    fn read(&mut self) -> io::Result<HostEvent> {
        match self.steps.pop_front() {
            Some(Some(event)) => Ok(event),
            Some(None) => Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                "read called on an idle step",
            )),
            None => Ok(HostEvent::Shutdown),
        }
    }
}
