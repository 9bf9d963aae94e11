use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::runtime::config::Config;
use crate::runtime::error::{Error, PanicPayload};
use crate::runtime::event_loop::LoopHandle;
use crate::runtime::future;
use crate::runtime::task::{Task, TaskId};

/// Where a worker sends the outcome of its task.
pub(crate) enum Delivery<T> {
    /// Post a completion event onto the event loop of the thread that started
    /// the task; its registered continuation runs there.
    Loop(LoopHandle),
    /// Hand the outcome to an async waiter.
    Channel(oneshot::Sender<Result<T, Error>>),
    /// Nobody is interested; the outcome is dropped on the worker thread.
    Detached,
}

/// Owns one task and runs it on its own thread.
pub(crate) struct Worker<T> {
    id: TaskId,
    task: Box<dyn FnOnce() -> T + Send + 'static>,
    config: Config,
    canceled: Arc<AtomicBool>,
}

impl<T> Worker<T> {
    pub(crate) fn id(&self) -> TaskId {
        self.id
    }

    pub(crate) fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.canceled.clone()
    }
}

impl<T> Worker<T>
where
    T: Send + 'static,
{
    pub(crate) fn new<F>(config: Config, task: F) -> Self
    where
        F: Task<Output = T>,
    {
        let id = TaskId::new();
        trace!(task = %id, "worker created");
        Self {
            id,
            task: Box::new(move || task.call()),
            config,
            canceled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Runs the task inline on the calling thread and releases the worker.
    pub(crate) fn call(self) -> T {
        trace!(task = %self.id, "running task inline");
        let value = (self.task)();
        debug!(task = %self.id, "worker released after inline run");
        value
    }

    /// Releases the worker without ever running its task.
    pub(crate) fn release(self) {
        debug!(task = %self.id, "worker released before start");
    }

    /// Spawns the worker thread. A spawn failure is reported through
    /// `delivery` like any other outcome.
    pub(crate) fn spawn(self, delivery: Delivery<T>) {
        let Worker {
            id,
            task,
            config,
            canceled,
        } = self;

        let completer = Arc::new(Completer {
            id,
            canceled: canceled.clone(),
            delivery: Mutex::new(Some(delivery)),
        });

        let on_thread = completer.clone();
        let spawned = config.thread_builder(id).spawn(move || {
            let outcome = if canceled.load(Ordering::Acquire) {
                debug!(task = %id, "canceled before start, skipping task");
                Err(Error::Canceled)
            } else {
                trace!(task = %id, "running task");
                panic::catch_unwind(AssertUnwindSafe(task))
                    .map_err(|payload| Error::Panicked(PanicPayload::new(payload)))
            };
            on_thread.complete(outcome);
        });

        match spawned {
            Ok(_detached) => debug!(task = %id, "worker thread spawned"),
            Err(err) => {
                warn!(task = %id, error = %err, "failed to spawn worker thread");
                completer.complete(Err(Error::Spawn(err)));
            }
        }
    }
}

struct Completer<T> {
    id: TaskId,
    canceled: Arc<AtomicBool>,
    delivery: Mutex<Option<Delivery<T>>>,
}

impl<T> Completer<T>
where
    T: Send + 'static,
{
    fn complete(&self, outcome: Result<T, Error>) {
        let delivery = self
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let id = self.id;

        match delivery {
            Some(Delivery::Loop(handle)) => {
                let canceled = self.canceled.clone();
                trace!(task = %id, ok = outcome.is_ok(), "posting completion");
                if handle
                    .post(move || future::deliver(id, outcome, &canceled))
                    .is_err()
                {
                    warn!(task = %id, "event loop of the starting thread is gone, dropping result");
                }
            }
            Some(Delivery::Channel(sender)) => {
                if sender.send(outcome).is_err() {
                    debug!(task = %id, "completion receiver dropped, discarding result");
                }
            }
            Some(Delivery::Detached) => match outcome {
                Err(Error::Panicked(payload)) => {
                    warn!(task = %id, panic = %payload, "detached task panicked");
                }
                _ => trace!(task = %id, "detached task released"),
            },
            None => {}
        }
    }
}
