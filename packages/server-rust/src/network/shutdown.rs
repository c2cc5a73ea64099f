//! Graceful shutdown: health state, cancellation, and in-flight call tracking.
//!
//! Health state lives in an `ArcSwap` so probes read it without locking.
//! Every orchestrated call observes the controller's `CancellationToken`.
//! In-flight calls hold an RAII guard; the last guard to drop during a drain
//! wakes the waiter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Lifecycle reported by the health endpoints.
///
/// Starting -> Ready -> Draining -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Listener bound, not yet serving.
    Starting,
    Ready,
    /// Shutdown requested; in-flight calls are being cancelled.
    Draining,
    /// Every in-flight call has finished.
    Stopped,
}

impl HealthState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }

    /// Whether readiness probes should pass.
    #[must_use]
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}

#[derive(Debug, Default)]
struct InFlight {
    count: AtomicU64,
    idle: Notify,
}

/// Coordinates shutdown between the server loop, handlers, and probes.
///
/// Handlers take an [`InFlightGuard`] and pass [`cancellation_token`] into
/// their orchestrated call. [`trigger_shutdown`] flips the state to Draining
/// and cancels the token, so pending calls end with 503. [`wait_for_drain`]
/// then waits for the guards to drop.
///
/// [`cancellation_token`]: Self::cancellation_token
/// [`trigger_shutdown`]: Self::trigger_shutdown
/// [`wait_for_drain`]: Self::wait_for_drain
#[derive(Debug)]
pub struct ShutdownController {
    token: CancellationToken,
    in_flight: Arc<InFlight>,
    health_state: ArcSwap<HealthState>,
}

impl ShutdownController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            in_flight: Arc::new(InFlight::default()),
            health_state: ArcSwap::from_pointee(HealthState::Starting),
        }
    }

    pub fn set_ready(&self) {
        self.health_state.store(Arc::new(HealthState::Ready));
    }

    /// Token cancelled by [`trigger_shutdown`](Self::trigger_shutdown).
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Moves to Draining and cancels the shared token. Idempotent.
    pub fn trigger_shutdown(&self) {
        if self.health_state() != HealthState::Stopped {
            self.health_state.store(Arc::new(HealthState::Draining));
        }
        self.token.cancel();
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.health_state.load()
    }

    /// Registers an in-flight call until the returned guard drops.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.in_flight.count.fetch_add(1, Ordering::AcqRel);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.count.load(Ordering::Acquire)
    }

    /// Waits up to `timeout` for every in-flight guard to drop.
    ///
    /// On success the state becomes Stopped and `true` is returned. On
    /// timeout the state stays Draining and `false` is returned.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let idle = async {
            loop {
                // Register before checking so a drop in between is not missed.
                let notified = self.in_flight.idle.notified();
                if self.in_flight_count() == 0 {
                    return;
                }
                notified.await;
            }
        };

        if tokio::time::timeout(timeout, idle).await.is_err() {
            return false;
        }
        self.health_state.store(Arc::new(HealthState::Stopped));
        true
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks one in-flight call. Dropping it, including during a panic unwind,
/// releases the slot.
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<InFlight>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.in_flight.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.in_flight.idle.notify_waiters();
        }
    }
}
