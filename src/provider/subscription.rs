//! Ownership of a provider event subscription.

use tokio::task::JoinHandle;

/// Handle to the task that forwards provider events for one session.
///
/// Dropping the handle unsubscribes.
#[derive(Debug)]
pub struct EventSubscription {
    task: Option<JoinHandle<()>>,
}

impl EventSubscription {
    /// Take ownership of a spawned event pump.
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    /// Whether the event pump is still running.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop delivering events.
    pub fn unsubscribe(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Give up ownership without stopping the pump. Used by the pump itself
    /// when it ends the session, so it can finish its own teardown.
    pub(crate) fn release(mut self) {
        self.task.take();
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
