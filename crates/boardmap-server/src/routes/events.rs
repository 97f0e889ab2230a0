use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use local_state::LocalEvent;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::server::SharedState;

/// Server-sent stream of local state changes and toasts
///
/// The stream ends when the server shuts down.
pub async fn events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.local.events.subscribe();
    debug!("Event stream subscriber connected");

    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => return Some((Ok::<_, Infallible>(sse_event(&event)), rx)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event stream subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
    .take_until(state.shutdown.clone().cancelled_owned());

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn sse_event(event: &LocalEvent) -> Event {
    Event::default()
        .event(event.name())
        .data(event.payload().to_string())
}
