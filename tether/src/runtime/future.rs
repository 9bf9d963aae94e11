use std::cell::RefCell;
use std::fmt;
use std::future::IntoFuture;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::runtime::completion::Completion;
use crate::runtime::error::Error;
use crate::runtime::event_loop::{self, Scope};
use crate::runtime::handle::TaskHandle;
use crate::runtime::task::TaskId;
use crate::runtime::worker::{Delivery, Worker};

/// Callback invoked with the outcome of a task, on the thread that installed it.
pub(crate) type Continuation<T> = Box<dyn FnOnce(Result<T, Error>) + 'static>;

/// A result that a background worker will produce.
///
/// A `TaskFuture` is consumed by exactly one of:
///
/// - [`get`](Self::get): run the task inline and block until it returns,
/// - [`then`](Self::then): run it on a worker thread and call back on this
///   thread once the event loop sees the completion,
/// - [`wait`](Self::wait): run it on a worker thread and suspend in a nested
///   event loop scope until the result arrives,
///
/// or awaited from async code through [`IntoFuture`]. Every one of these
/// takes `self`, so a future cannot be consumed twice.
pub struct TaskFuture<T> {
    worker: Worker<T>,
    continuation: Continuation<T>,
}

// Manual Debug implementation - works regardless of whether T implements Debug
impl<T> fmt::Debug for TaskFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFuture")
            .field("id", &self.worker.id())
            .field("result_type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> TaskFuture<T>
where
    T: Send + 'static,
{
    pub(crate) fn new(worker: Worker<T>) -> Self {
        Self {
            worker,
            continuation: Box::new(|_| {}),
        }
    }

    pub fn id(&self) -> TaskId {
        self.worker.id()
    }

    /// Runs the task on the calling thread and returns its value.
    ///
    /// No worker thread is involved and the caller is blocked for the whole
    /// run, so this must not be used on a thread that has to stay responsive.
    pub fn get(self) -> T {
        self.worker.call()
    }

    /// Starts the task and calls `continuation` with its value on this thread
    /// once the event loop processes the completion.
    ///
    /// Returns immediately. If the task panicked, the panic is resumed on this
    /// thread in place of the call. If the task was canceled through its
    /// handle, the continuation is dropped without being called.
    pub fn then<F>(self, continuation: F) -> TaskHandle
    where
        F: FnOnce(T) + 'static,
    {
        self.try_then(move |outcome| match outcome {
            Ok(value) => continuation(value),
            Err(Error::Canceled) => {}
            Err(err) => err.resume(),
        })
    }

    /// Like [`then`](Self::then), but the continuation also sees failures,
    /// including `Error::Canceled` after [`TaskHandle::cancel`].
    pub fn try_then<F>(mut self, continuation: F) -> TaskHandle
    where
        F: FnOnce(Result<T, Error>) + 'static,
    {
        self.continuation = Box::new(continuation);
        self.start()
    }

    /// Starts the task and suspends the caller until it completes.
    ///
    /// The thread keeps processing other events while suspended, including
    /// continuations that themselves call `wait`. A panic in the task is
    /// resumed on the caller.
    pub fn wait(self) -> T {
        self.try_wait().unwrap_or_else(|err| err.resume())
    }

    /// Like [`wait`](Self::wait), but returns failures instead of resuming them.
    pub fn try_wait(mut self) -> Result<T, Error> {
        let scope = Scope::new();
        let slot = Rc::new(RefCell::new(None));

        let (exit, store) = (scope.clone(), slot.clone());
        self.continuation = Box::new(move |outcome| {
            *store.borrow_mut() = Some(outcome);
            exit.exit();
        });

        let id = self.id();
        self.start();
        trace!(task = %id, "suspending until completion");
        scope.exec();

        let outcome = slot.take();
        outcome.unwrap_or(Err(Error::LoopClosed))
    }

    /// Spawns the worker thread with the installed continuation, which is
    /// the no-op default unless `then` or `wait` replaced it.
    pub fn start(self) -> TaskHandle {
        let TaskFuture {
            worker,
            continuation,
        } = self;
        let id = worker.id();
        let handle = TaskHandle::new(id, worker.cancel_flag());

        event_loop::register(id, continuation);
        worker.spawn(Delivery::Loop(event_loop::handle()));
        handle
    }

    /// Spawns the worker thread with nobody waiting for the outcome.
    ///
    /// Unlike [`start`](Self::start), nothing is registered with this thread's
    /// event loop, so the task is fully released on its worker thread.
    pub fn detach(self) -> TaskHandle {
        let handle = TaskHandle::new(self.id(), self.worker.cancel_flag());
        self.worker.spawn(Delivery::Detached);
        handle
    }

    /// Releases the task without running it.
    pub fn cancel(self) {
        self.worker.release();
    }
}

impl<T> IntoFuture for TaskFuture<T>
where
    T: Send + 'static,
{
    type Output = Result<T, Error>;
    type IntoFuture = Completion<T>;

    fn into_future(self) -> Completion<T> {
        let id = self.id();
        let (sender, receiver) = oneshot::channel();
        self.worker.spawn(Delivery::Channel(sender));
        Completion::new(id, receiver)
    }
}

/// Runs on the thread that started task `id`: hands `outcome` to the
/// registered continuation. A canceled task delivers `Error::Canceled` and its
/// value, if it produced one, is dropped.
pub(crate) fn deliver<T>(id: TaskId, outcome: Result<T, Error>, canceled: &AtomicBool)
where
    T: 'static,
{
    let Some(continuation) = event_loop::take::<Continuation<T>>(id) else {
        warn!(task = %id, "no continuation registered for completed task");
        return;
    };

    let outcome = if canceled.load(Ordering::Acquire) {
        debug!(task = %id, "task canceled, dropping result");
        Err(Error::Canceled)
    } else {
        outcome
    };

    trace!(task = %id, "delivering result");
    continuation(outcome);
    debug!(task = %id, "task released");
}
