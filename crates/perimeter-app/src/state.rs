//! State shared between the input thread and the loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use perimeter_core::commands::OperatorCommand;
use perimeter_core::state::RenderSnapshot;

/// Messages delivered to the loop thread.
#[derive(Debug)]
pub enum LoopCommand {
    /// An operator command to forward to the simulation engine.
    Operator(OperatorCommand),
    /// Stop the loop after the current tick.
    Shutdown,
}

/// Handles to a running loop.
///
/// `latest_snapshot` is updated after every tick so callers can poll the
/// current state without waiting on the render sink.
pub struct AppState {
    pub command_tx: mpsc::Sender<LoopCommand>,
    pub latest_snapshot: Arc<Mutex<Option<RenderSnapshot>>>,
}

impl AppState {
    /// Forward an operator command. Returns false once the loop has exited.
    pub fn send(&self, command: OperatorCommand) -> bool {
        self.command_tx.send(LoopCommand::Operator(command)).is_ok()
    }

    /// Ask the loop to stop. Harmless if it already has.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(LoopCommand::Shutdown);
    }

    /// Clone of the most recent snapshot, if a tick has run.
    pub fn snapshot(&self) -> Option<RenderSnapshot> {
        self.latest_snapshot
            .lock()
            .ok()
            .and_then(|lock| lock.clone())
    }
}
