use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use pin_project_lite::pin_project;
use tokio::sync::oneshot;

use crate::runtime::error::Error;
use crate::runtime::task::TaskId;

pin_project! {
    /// Resolves to the outcome of a task running on its worker thread.
    ///
    /// Returned by awaiting a [`TaskFuture`](crate::TaskFuture) from async
    /// code. Does not need an event loop on the awaiting thread.
    #[derive(Debug)]
    pub struct Completion<T> {
        id: TaskId,
        #[pin]
        receiver: oneshot::Receiver<Result<T, Error>>,
    }
}

impl<T> Completion<T> {
    pub(crate) fn new(id: TaskId, receiver: oneshot::Receiver<Result<T, Error>>) -> Self {
        Self { id, receiver }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }
}

impl<T> Future for Completion<T> {
    type Output = Result<T, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.project().receiver.poll(cx).map(|received| match received {
            Ok(outcome) => outcome,
            Err(closed) => Err(closed.into()),
        })
    }
}
