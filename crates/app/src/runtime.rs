//! The bridge runtime — one loop that serializes timer ticks and device
//! events.
//!
//! Two producers feed the loop: the poll timer driving the
//! [`SyncScheduler`] and the per-kind channels of the [`DeviceServer`].
//! Cancellation is checked first on every iteration. Work already started
//! (a tick or an event) always completes before the loop looks again.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_util::sync::CancellationToken;

use sensorbridge_domain::error::BridgeError;
use sensorbridge_domain::event::{
    IdentifyRequest, PairingTransition, SubscriptionChange, ValueChange,
};

use crate::device_events::DeviceEvents;
use crate::ports::DeviceServer;
use crate::services::lifecycle::LifecycleController;
use crate::services::sync_scheduler::SyncScheduler;

/// Why the runtime loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cancellation token fired (signal, caller request).
    Cancelled,
    /// The bounded run duration elapsed.
    DeadlineReached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("cancelled"),
            Self::DeadlineReached => f.write_str("deadline reached"),
        }
    }
}

/// What a finished run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub events: u64,
    pub reason: StopReason,
}

enum DeviceEvent {
    Identify(IdentifyRequest),
    Changed(ValueChange),
    Subscribed(SubscriptionChange),
    Unsubscribed(SubscriptionChange),
    Pairing(PairingTransition),
}

type EventItem = Result<DeviceEvent, BroadcastStreamRecvError>;

fn event_stream(events: &DeviceEvents) -> impl tokio_stream::Stream<Item = EventItem> + Unpin {
    let identify = BroadcastStream::new(events.subscribe_identify())
        .map(|item| item.map(DeviceEvent::Identify));
    let changes = BroadcastStream::new(events.subscribe_changes())
        .map(|item| item.map(DeviceEvent::Changed));
    let subscribed = BroadcastStream::new(events.subscribe_subscribed())
        .map(|item| item.map(DeviceEvent::Subscribed));
    let unsubscribed = BroadcastStream::new(events.subscribe_unsubscribed())
        .map(|item| item.map(DeviceEvent::Unsubscribed));
    let pairing = BroadcastStream::new(events.subscribe_pairing())
        .map(|item| item.map(DeviceEvent::Pairing));

    identify
        .merge(changes)
        .merge(subscribed)
        .merge(unsubscribed)
        .merge(pairing)
}

/// Single serialized consumer of the poll timer and the device events.
pub struct BridgeRuntime<S> {
    scheduler: SyncScheduler,
    controller: Arc<LifecycleController<S>>,
    server: Arc<S>,
    cancel: CancellationToken,
    run_for: Option<Duration>,
}

impl<S: DeviceServer> BridgeRuntime<S> {
    pub fn new(
        scheduler: SyncScheduler,
        controller: Arc<LifecycleController<S>>,
        server: Arc<S>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            scheduler,
            controller,
            server,
            cancel,
            run_for: None,
        }
    }

    /// End the run on its own after `duration`.
    #[must_use]
    pub fn with_run_duration(mut self, duration: Duration) -> Self {
        self.run_for = Some(duration);
        self
    }

    /// Run until cancelled or until the run duration elapses, then stop the
    /// device server.
    ///
    /// Pairing instructions are rendered once before the loop starts.
    ///
    /// # Errors
    ///
    /// Returns the device server's stop error, if any.
    pub async fn run(self) -> Result<RunSummary, BridgeError> {
        let mut events = event_stream(self.server.events());
        self.controller.show_pairing_instructions();

        let config = self.scheduler.config();
        let start = Instant::now();
        let mut ticker = tokio::time::interval_at(start + config.initial_delay, config.poll_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let deadline = async {
            match self.run_for {
                Some(duration) => tokio::time::sleep_until(start + duration).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        tracing::info!(
            sensors = self.scheduler.binding_count(),
            period = ?config.poll_period,
            run_for = ?self.run_for,
            "bridge runtime started"
        );

        let mut ticks: u64 = 0;
        let mut handled: u64 = 0;
        let reason = loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break StopReason::Cancelled,
                () = &mut deadline => break StopReason::DeadlineReached,
                Some(item) = events.next() => {
                    match item {
                        Ok(event) => {
                            self.dispatch(&event);
                            handled += 1;
                        }
                        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "runtime fell behind, device events dropped");
                        }
                    }
                }
                _ = ticker.tick() => {
                    self.scheduler.tick();
                    ticks += 1;
                }
            }
        };

        tracing::info!(%reason, ticks, events = handled, "bridge runtime stopping");
        self.controller.shutdown().await?;

        Ok(RunSummary {
            ticks,
            events: handled,
            reason,
        })
    }

    fn dispatch(&self, event: &DeviceEvent) {
        match event {
            DeviceEvent::Identify(request) => self.controller.on_identify(request),
            DeviceEvent::Changed(change) => self.controller.on_characteristic_changed(change),
            DeviceEvent::Subscribed(change) => self.controller.on_subscribed(change),
            DeviceEvent::Unsubscribed(change) => self.controller.on_unsubscribed(change),
            DeviceEvent::Pairing(transition) => self.controller.on_pairing_state_changed(transition),
        }
    }
}
