use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{ResolveError, ResolveResult};

/// A suspension point of a resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    CacheRead,
    Directory,
    Fetch,
    CacheWrite,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CacheRead => "cache read",
            Self::Directory => "directory lookup",
            Self::Fetch => "host fetch",
            Self::CacheWrite => "cache write",
        })
    }
}

/// Cancels every [`Cancellation`] created from it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Cooperative cancellation and deadline for one resolution.
///
/// Dropping the [`CancelHandle`] without calling `cancel` leaves the
/// token uncancelled.
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    signal: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// A token that never fires.
    pub fn none() -> Self {
        Self::default()
    }

    /// A token paired with the handle that cancels it.
    pub fn new() -> (CancelHandle, Self) {
        let (tx, rx) = watch::channel(false);
        (
            CancelHandle { tx },
            Self {
                signal: Some(rx),
                deadline: None,
            },
        )
    }

    /// Add a deadline `timeout` from now, keeping any earlier one.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Fail immediately if already cancelled or past the deadline.
    pub fn check(&self, step: Step) -> ResolveResult<()> {
        if self.is_cancelled() {
            return Err(ResolveError::Cancelled { step });
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(ResolveError::DeadlineExceeded { step });
        }
        Ok(())
    }

    /// Drive `fut` to completion unless cancellation or the deadline wins.
    ///
    /// When either fires first, `fut` is dropped at its current await point.
    pub async fn run<F: Future>(&self, step: Step, fut: F) -> ResolveResult<F::Output> {
        self.check(step)?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ResolveError::Cancelled { step }),
            _ = deadline => Err(ResolveError::DeadlineExceeded { step }),
            out = fut => Ok(out),
        }
    }

    /// Resolves once cancelled. Pends forever if the token cannot fire.
    async fn cancelled(&self) {
        let Some(rx) = &self.signal else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}
