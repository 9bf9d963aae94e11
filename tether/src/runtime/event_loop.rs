//! Per-thread cooperative event loop.
//!
//! Every thread lazily owns one loop: a queue of posted events plus the
//! continuations of tasks started from that thread. Worker threads post their
//! completion onto the loop of the thread that started them, so continuations
//! always run where they were installed.
//!
//! A [`Scope`] processes events until it is exited. Scopes nest: an event
//! dispatched by one scope may open and run another, and an outer scope that
//! was exited in the meantime returns once control comes back to it.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::runtime::error::Error;
use crate::runtime::task::TaskId;

type Event = Box<dyn FnOnce() + Send + 'static>;

thread_local! {
    static CURRENT: EventLoop = EventLoop::new();
}

struct EventLoop {
    sender: mpsc::UnboundedSender<Event>,
    receiver: RefCell<mpsc::UnboundedReceiver<Event>>,
    continuations: RefCell<HashMap<TaskId, Box<dyn Any>>>,
    depth: Cell<usize>,
}

impl EventLoop {
    fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: RefCell::new(receiver),
            continuations: RefCell::new(HashMap::new()),
            depth: Cell::new(0),
        }
    }

    // The receiver borrow ends with the statement, before the event runs.
    fn next_blocking(&self) -> Option<Event> {
        self.receiver.borrow_mut().blocking_recv()
    }

    fn next_ready(&self) -> Option<Event> {
        self.receiver.borrow_mut().try_recv().ok()
    }
}

/// A `Send` handle for posting work onto another thread's event loop.
#[derive(Clone)]
pub struct LoopHandle {
    sender: mpsc::UnboundedSender<Event>,
}

impl fmt::Debug for LoopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopHandle")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl LoopHandle {
    /// Queues `event` to run on the loop's thread the next time it processes
    /// events.
    pub fn post<F>(&self, event: F) -> Result<(), Error>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender
            .send(Box::new(event))
            .map_err(|_| Error::LoopClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Handle to the current thread's event loop.
pub fn handle() -> LoopHandle {
    CURRENT.with(|lp| LoopHandle {
        sender: lp.sender.clone(),
    })
}

/// A nested processing scope on the current thread.
///
/// Clones share the same exit flag, so a continuation can hold a clone and
/// exit the scope that is waiting for it.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    exited: Rc<Cell<bool>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exit(&self) {
        self.exited.set(true);
    }

    pub fn is_exited(&self) -> bool {
        self.exited.get()
    }

    /// Processes events until this scope is exited.
    ///
    /// Blocks the OS thread while the queue is empty; must not be called from
    /// inside an async runtime's worker thread.
    pub fn exec(&self) {
        CURRENT.with(|lp| {
            let _depth = DepthGuard::enter(&lp.depth);
            trace!(depth = lp.depth.get(), "entering event loop scope");

            while !self.exited.get() {
                match lp.next_blocking() {
                    Some(event) => event(),
                    // The loop owns a sender, so the queue cannot run dry.
                    None => break,
                }
            }

            trace!(depth = lp.depth.get(), "leaving event loop scope");
        });
    }
}

struct DepthGuard<'a>(&'a Cell<usize>);

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

/// Runs every event that is already queued, without blocking.
pub fn process_events() -> usize {
    CURRENT.with(|lp| {
        let mut ran = 0;
        while let Some(event) = lp.next_ready() {
            event();
            ran += 1;
        }
        ran
    })
}

/// Number of scopes currently executing on this thread.
pub fn depth() -> usize {
    CURRENT.with(|lp| lp.depth.get())
}

/// Number of continuations registered on this thread and not yet delivered.
pub fn pending_continuations() -> usize {
    CURRENT.with(|lp| lp.continuations.borrow().len())
}

pub(crate) fn register<C: Any>(id: TaskId, continuation: C) {
    CURRENT.with(|lp| {
        lp.continuations
            .borrow_mut()
            .insert(id, Box::new(continuation));
    });
}

pub(crate) fn take<C: Any>(id: TaskId) -> Option<C> {
    let entry = CURRENT.with(|lp| lp.continuations.borrow_mut().remove(&id))?;
    match entry.downcast::<C>() {
        Ok(continuation) => Some(*continuation),
        Err(_) => {
            warn!(task = %id, "continuation registered with a different result type");
            None
        }
    }
}
