//! Primary surface thread hand-off
//!
//! Checks run off the interactive thread; anything user-facing is queued back
//! onto the single thread that owns the surface.

use std::sync::mpsc;

use tracing::{debug, warn};

pub type SurfaceTask = Box<dyn FnOnce() + Send + 'static>;

/// Capability to run work on the primary surface thread
pub trait Surface: Send + Sync {
    /// Schedule `task` on the surface thread
    fn run(&self, task: SurfaceTask);
}

/// Sending half of a surface queue
///
/// `run` never waits for the task to execute.
#[derive(Clone)]
pub struct SurfaceHandle {
    sender: mpsc::Sender<SurfaceTask>,
}

/// Receiving half of a surface queue, driven by the surface thread
pub struct SurfaceLoop {
    receiver: mpsc::Receiver<SurfaceTask>,
}

/// Create a connected handle and loop
pub fn surface_channel() -> (SurfaceHandle, SurfaceLoop) {
    let (sender, receiver) = mpsc::channel();
    (SurfaceHandle { sender }, SurfaceLoop { receiver })
}

impl Surface for SurfaceHandle {
    fn run(&self, task: SurfaceTask) {
        if self.sender.send(task).is_err() {
            warn!("Surface loop has stopped, dropping task");
        }
    }
}

impl SurfaceLoop {
    /// Run queued tasks in order on the current thread until every handle is dropped
    ///
    /// Returns the number of tasks executed.
    pub fn run(self) -> usize {
        let mut executed = 0;
        for task in self.receiver {
            task();
            executed += 1;
        }
        debug!("Surface loop finished after {} tasks", executed);
        executed
    }
}

/// Surface that runs tasks immediately on the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineSurface;

impl Surface for InlineSurface {
    fn run(&self, task: SurfaceTask) {
        task();
    }
}
