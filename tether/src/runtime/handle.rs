use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::runtime::task::TaskId;

/// Handle to a started task.
///
/// Dropping the handle does **not** cancel the task; the continuation is
/// still delivered.
pub struct TaskHandle {
    id: TaskId,
    canceled: Arc<AtomicBool>,
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, canceled: Arc<AtomicBool>) -> Self {
        Self { id, canceled }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }

    /// Requests cooperative cancellation.
    ///
    /// A task that has not begun is skipped. A task already running is not
    /// interrupted, but its continuation is dropped instead of invoked.
    pub fn cancel(self) {
        self.canceled.store(true, Ordering::Release);
        debug!(task = %self.id, "cancellation requested");
    }
}
