use crate::routes::health::epoch_secs;
use crate::state::ServerState;
use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Debug, Deserialize)]
pub struct SseParams {
    #[serde(rename = "agentId", default = "default_agent_id")]
    pub agent_id: String,
    #[serde(rename = "agentDescription", default)]
    pub agent_description: String,
}

/// Heartbeat event stream
///
/// Sends one `connected` frame, then a `heartbeat` frame per interval until
/// the client goes away and axum drops the stream.
pub async fn sse(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SseParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!(agent_id = %params.agent_id, "event stream opened");

    let connected = json!({
        "event": "connected",
        "agentId": params.agent_id,
        "desc": params.agent_description,
    });
    let first = stream::once(async move {
        Ok::<_, Infallible>(Event::default().data(connected.to_string()))
    });

    let mut ticker = interval(state.config.heartbeat());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let heartbeats = stream::unfold(ticker, |mut ticker| async move {
        ticker.tick().await;
        let beat = json!({ "event": "heartbeat", "ts": epoch_secs() });
        Some((Ok::<_, Infallible>(Event::default().data(beat.to_string())), ticker))
    });

    Sse::new(first.chain(heartbeats)).keep_alive(KeepAlive::default())
}

fn default_agent_id() -> String {
    "web".to_string()
}
