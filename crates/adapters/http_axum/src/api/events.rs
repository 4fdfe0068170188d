//! `GET /events` — Server-Sent Events stream of push notifications.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use sensorbridge_app::ports::PairingStore;
use sensorbridge_domain::event::ValueChange;

use crate::api::characteristics::{CharacteristicsBody, ReadItem};
use crate::api::controller_id;
use crate::state::AppState;

/// Ends the inner stream once the server starts shutting down, so graceful
/// shutdown does not wait on idle event streams.
struct UntilShutdown<S> {
    inner: S,
    shutdown: Pin<Box<WaitForCancellationFutureOwned>>,
}

impl<S> UntilShutdown<S> {
    fn new(inner: S, token: &CancellationToken) -> Self {
        Self {
            inner,
            shutdown: Box::pin(token.clone().cancelled_owned()),
        }
    }
}

impl<S: Stream + Unpin> Stream for UntilShutdown<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.shutdown.as_mut().poll(cx).is_ready() {
            return Poll::Ready(None);
        }
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Protocol event frame for one pushed value.
fn frame(change: &ValueChange) -> CharacteristicsBody<ReadItem> {
    CharacteristicsBody {
        characteristics: vec![ReadItem {
            aid: change.key.aid,
            iid: change.key.iid,
            value: Some(change.new.clone()),
            status: None,
        }],
    }
}

/// `GET /events` — pushes for the characteristics the caller subscribed to.
///
/// Subscriptions are managed through `PUT /characteristics` with `ev`, using
/// the same controller identity. The stream continues until the client
/// disconnects or the server stops.
pub async fn stream<P>(
    State(state): State<AppState<P>>,
    headers: HeaderMap,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    P: PairingStore + 'static,
{
    let controller = controller_id(&headers);
    tracing::debug!(%controller, "event stream opened");
    let tree = state.tree;
    let pushes = BroadcastStream::new(state.pushes.subscribe()).filter_map(move |result| {
        match result {
            Ok(change) => {
                let subscribed = tree
                    .characteristic(change.key)
                    .is_some_and(|c| c.is_subscribed(&controller));
                if !subscribed {
                    return None;
                }
                match serde_json::to_string(&frame(&change)) {
                    Ok(json) => Some(Ok(Event::default().data(json))),
                    Err(err) => {
                        tracing::warn!(%err, "failed to serialize push for event stream");
                        None
                    }
                }
            }
            Err(BroadcastStreamRecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, %controller, "event stream lagged, some pushes were dropped");
                None
            }
        }
    });

    Sse::new(UntilShutdown::new(pushes, &state.shutdown)).keep_alive(KeepAlive::default())
}
