//! Actuator sink: where velocity commands end up.

use crate::control::VelocityCommand;
use crate::error::Result;

/// Applies velocity commands to a physical or simulated base.
pub trait BaseSink {
    fn send(&mut self, command: VelocityCommand) -> Result<()>;

    /// Send the zero command.
    fn stop(&mut self) -> Result<()> {
        self.send(VelocityCommand::stop())
    }
}

impl<S: BaseSink + ?Sized> BaseSink for Box<S> {
    fn send(&mut self, command: VelocityCommand) -> Result<()> {
        (**self).send(command)
    }
}

/// Fan a command out to two sinks, first to second.
impl<A: BaseSink, B: BaseSink> BaseSink for (A, B) {
    fn send(&mut self, command: VelocityCommand) -> Result<()> {
        self.0.send(command)?;
        self.1.send(command)
    }
}

/// Sink that only logs commands.
///
/// Stands in for the base SDK when no hardware is attached.
#[derive(Debug, Default)]
pub struct LogSink {
    sent: u64,
    last: Option<VelocityCommand>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commands sent so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn last(&self) -> Option<VelocityCommand> {
        self.last
    }
}

impl BaseSink for LogSink {
    fn send(&mut self, command: VelocityCommand) -> Result<()> {
        tracing::info!("[BASE CMD] {}", command);
        self.sent += 1;
        self.last = Some(command);
        Ok(())
    }
}
