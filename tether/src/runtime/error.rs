use std::any::Any;
use std::fmt;
use std::panic;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("task panicked: {0}")]
    Panicked(PanicPayload),

    #[error("task canceled")]
    Canceled,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("event loop of the consuming thread is gone")]
    LoopClosed,

    #[error("runtime already initialized")]
    AlreadyInitialized,

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Re-raises the failure on the current thread.
    ///
    /// A caught panic is resumed with its original payload, so the consuming
    /// thread observes the same panic the task raised. Any other error panics
    /// with its display message.
    pub fn resume(self) -> ! {
        match self {
            Error::Panicked(payload) => payload.resume(),
            other => panic!("{other}"),
        }
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for Error {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Error::Canceled
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// The payload of a panic caught on a worker thread.
pub struct PanicPayload(Box<dyn Any + Send + 'static>);

impl PanicPayload {
    pub(crate) fn new(payload: Box<dyn Any + Send + 'static>) -> Self {
        Self(payload)
    }

    /// The panic message, when the payload is a string.
    pub fn message(&self) -> &str {
        if let Some(message) = self.0.downcast_ref::<&'static str>() {
            message
        } else if let Some(message) = self.0.downcast_ref::<String>() {
            message.as_str()
        } else {
            "Box<dyn Any>"
        }
    }

    pub fn into_inner(self) -> Box<dyn Any + Send + 'static> {
        self.0
    }

    pub fn resume(self) -> ! {
        panic::resume_unwind(self.0)
    }
}

// Manual Debug implementation - the payload itself is only `Any`
impl fmt::Debug for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PanicPayload").field(&self.message()).finish()
    }
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
