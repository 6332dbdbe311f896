use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Cancels every [`ShutdownSignal`] created from it.
#[derive(Clone, Debug)]
pub struct Trigger {
    token: CancellationToken,
}

impl Trigger {
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

/// A future that resolves once the associated [`Trigger`] is cancelled.
/// Polling it again after it resolved returns `Ready` immediately, so it can
/// be used repeatedly in `select!` by reference.
pub struct ShutdownSignal {
    token: CancellationToken,
    fut: Pin<Box<WaitForCancellationFutureOwned>>,
}

impl ShutdownSignal {
    pub fn new() -> (Trigger, ShutdownSignal) {
        let token = CancellationToken::new();
        let signal = ShutdownSignal::from_token(token.clone());

        (Trigger { token }, signal)
    }

    fn from_token(token: CancellationToken) -> Self {
        let fut = Box::pin(token.clone().cancelled_owned());

        Self { token, fut }
    }
}

impl Clone for ShutdownSignal {
    fn clone(&self) -> Self {
        Self::from_token(self.token.clone())
    }
}

impl Future for ShutdownSignal {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.token.is_cancelled() {
            return Poll::Ready(());
        }

        self.fut.as_mut().poll(cx)
    }
}
