//! Dual-channel resolution: one outcome, a future and an optional callback.
//!
//! [`crate::Client::convert`] starts the conversion as a tokio task and
//! returns a [`Deferred`] right away. When the task settles, the outcome is
//! first shown to the callback (if any) by reference and then moved into the
//! deferred. There is exactly one `Result` per call, so the two consumers
//! cannot disagree.
//!
//! # Example
//!
//! ```rust,no_run
//! use pdflayer::{Client, ConvertError, ConvertQuery, ConvertResult, ServiceOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ServiceOptions::from_env())?;
//! let query = ConvertQuery::new("https://example.com", None);
//!
//! let deferred = client.convert(
//!     Some(query.into()),
//!     Some(Box::new(|outcome: Result<&ConvertResult, &ConvertError>| match outcome {
//!         Ok(_) => eprintln!("Convert callback (success)"),
//!         Err(e) => eprintln!("Convert callback (error): {e}"),
//!     })),
//!     None,
//! );
//! let _result = deferred.await?;
//! # Ok(())
//! # }
//! ```

use crate::error::ConvertError;
use crate::output::ConvertResult;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;

/// Outcome of a conversion.
pub type ConvertOutcome = Result<ConvertResult, ConvertError>;

/// Continuation invoked once with the settled outcome.
pub type ConvertCallback =
    Box<dyn FnOnce(Result<&ConvertResult, &ConvertError>) + Send + 'static>;

/// A conversion that settles exactly once.
///
/// Await it to get the outcome. Dropping it does not cancel the conversion;
/// the task runs to completion and still notifies the callback.
#[must_use = "await the Deferred to observe the conversion outcome"]
pub struct Deferred {
    state: State,
}

enum State {
    Running(JoinHandle<ConvertOutcome>),
    Settled(Option<ConvertOutcome>),
}

impl Deferred {
    pub(crate) fn running(handle: JoinHandle<ConvertOutcome>) -> Self {
        Self {
            state: State::Running(handle),
        }
    }

    pub(crate) fn settled(outcome: ConvertOutcome) -> Self {
        Self {
            state: State::Settled(Some(outcome)),
        }
    }
}

impl Future for Deferred {
    type Output = ConvertOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            State::Running(handle) => match Pin::new(handle).poll(cx) {
                Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
                Poll::Ready(Err(e)) => Poll::Ready(Err(ConvertError::Internal(format!(
                    "conversion task failed: {e}"
                )))),
                Poll::Pending => Poll::Pending,
            },
            State::Settled(outcome) => Poll::Ready(outcome.take().unwrap_or_else(|| {
                Err(ConvertError::Internal("Deferred polled after completion".into()))
            })),
        }
    }
}

/// Show `outcome` to `callback` (if any), then hand it back.
pub(crate) fn mirror(outcome: ConvertOutcome, callback: Option<ConvertCallback>) -> ConvertOutcome {
    if let Some(cb) = callback {
        cb(outcome.as_ref());
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn mirror_without_callback_is_identity() {
        let out = mirror(Ok(ConvertResult::Pdf(vec![1, 2, 3])), None);
        assert_eq!(out.unwrap(), ConvertResult::Pdf(vec![1, 2, 3]));
    }

    #[test]
    fn mirror_shows_the_same_value() {
        let seen = Arc::new(Mutex::new(None));
        let seen_cb = Arc::clone(&seen);
        let cb: ConvertCallback = Box::new(move |r: Result<&ConvertResult, &ConvertError>| {
            *seen_cb.lock().unwrap() = Some(r.map(Clone::clone).map_err(|e| e.to_string()));
        });

        let out = mirror(Ok(ConvertResult::Pdf(b"pdf".to_vec())), Some(cb));

        let seen = seen.lock().unwrap().take().unwrap();
        assert_eq!(seen.unwrap(), out.unwrap());
    }

    #[test]
    fn mirror_passes_errors_by_reference() {
        let seen = Arc::new(Mutex::new(String::new()));
        let seen_cb = Arc::clone(&seen);
        let cb: ConvertCallback = Box::new(move |r: Result<&ConvertResult, &ConvertError>| {
            *seen_cb.lock().unwrap() = r.unwrap_err().to_string();
        });

        let out = mirror(Err(ConvertError::Internal("boom".into())), Some(cb));

        assert_eq!(*seen.lock().unwrap(), out.unwrap_err().to_string());
    }

    #[tokio::test]
    async fn settled_deferred_resolves_immediately() {
        let d = Deferred::settled(Ok(ConvertResult::Pdf(vec![9])));
        assert_eq!(d.await.unwrap(), ConvertResult::Pdf(vec![9]));
    }

    #[tokio::test]
    async fn panicking_task_becomes_internal_error() {
        let handle: JoinHandle<ConvertOutcome> = tokio::spawn(async {
            if true {
                panic!("boom");
            }
            Ok(ConvertResult::Pdf(Vec::new()))
        });
        let err = Deferred::running(handle).await.unwrap_err();
        assert!(matches!(err, ConvertError::Internal(_)));
    }
}
