use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use axum::{
    extract::{Path, State},
    response::sse::{Event, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use maquette_engine::{AgentHandle, EngineInput};
use maquette_store::GenerationRegistry;
use maquette_types::{Message, StreamEvent};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    handlers::ChatRequest,
    state::AppState,
};

/// Send a message and stream the agent's run as Server-Sent Events.
///
/// Validation and agent resolution happen before the stream opens, so those
/// failures are plain HTTP errors rather than SSE `error` events.
#[utoipa::path(
    post,
    path = "/{agent_id}/stream",
    params(
        ("agent_id" = String, Path, description = "Agent ID")
    ),
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Streaming response", content_type = "text/event-stream"),
        (status = 400, description = "Missing message"),
        (status = 404, description = "Unknown agent")
    ),
    tag = "agents"
)]
pub async fn stream_agent(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let text = req.text().ok_or(ApiError::MissingMessage)?.to_string();
    let agent = state
        .agents
        .get(&agent_id)
        .cloned()
        .ok_or(ApiError::AgentNotFound(agent_id))?;

    let thread_id = req
        .thread_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let run_id = Uuid::new_v4().to_string();

    tracing::info!(thread_id = %thread_id, run_id = %run_id, "stream turn started");

    let events = agent_events(state, agent, thread_id, run_id, text);
    let sse_stream = events.map(|event| Ok::<Event, Infallible>(to_sse_event(event)));

    Ok(Sse::new(sse_stream))
}

/// The streaming dispatcher: one live agent run as a protocol-event stream.
///
/// The generation flag is re-checked before forwarding every event; that is
/// the cooperative cancellation point for both explicit stop requests and
/// client disconnects. A disconnect drops this stream mid-poll; the guard
/// then flips the flag and schedules cleanup from its Drop impl.
pub fn agent_events(
    state: Arc<AppState>,
    agent: AgentHandle,
    thread_id: String,
    run_id: String,
    text: String,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    stream! {
        // Armed before anything is yielded: a disconnect at any point from
        // here on must flip the flag and schedule cleanup.
        let mut guard = DisconnectGuard::new(
            Arc::clone(&state.generations),
            thread_id.clone(),
            state.cleanup_grace(),
        );

        state.generations.mark_active(&thread_id).await;
        state.store.append(&thread_id, Message::human(text)).await;
        yield StreamEvent::StreamStart;

        let history = state.store.get_or_create(&thread_id).await.messages;
        let input = EngineInput {
            run_id: run_id.clone(),
            thread_id: thread_id.clone(),
            system_prompt: agent.definition.system_prompt.clone(),
            messages: history,
        };

        let inner = state.invoker.stream(Arc::clone(&agent.engine), input);
        futures::pin_mut!(inner);

        let mut answer = String::new();
        let mut stopped = false;
        let mut completed = false;

        while let Some(event) = inner.next().await {
            // Re-check after every await: a stop or disconnect between
            // events must take effect before anything else is forwarded.
            if !state.generations.is_active(&thread_id).await {
                stopped = true;
                break;
            }

            if let StreamEvent::StreamToken { token } = &event {
                answer.push_str(token);
            }

            let is_end = matches!(event, StreamEvent::StreamEnd { .. });
            if is_end {
                // Settle state before the client sees stream_end, so a
                // follow-up conversation lookup observes the appended answer.
                completed = true;
                if !answer.is_empty() {
                    state
                        .store
                        .append(&thread_id, Message::ai(std::mem::take(&mut answer)))
                        .await;
                }
                release(&state, &thread_id, &mut guard).await;
            }

            yield event;
            if is_end {
                break;
            }
        }

        if !completed {
            if !answer.is_empty() {
                // Keep what the client already saw
                state.store.append(&thread_id, Message::ai(answer)).await;
            }
            if !stopped {
                release(&state, &thread_id, &mut guard).await;
                yield StreamEvent::Error {
                    error: "agent stream ended unexpectedly".to_string(),
                };
            } else {
                tracing::info!(thread_id = %thread_id, run_id = %run_id, "stream stopped");
                release(&state, &thread_id, &mut guard).await;
            }
        }
    }
}

/// Terminal-state teardown: flag false now, entry removed after the grace
/// period so late polls cannot read a stale value.
async fn release(state: &AppState, thread_id: &str, guard: &mut DisconnectGuard) {
    guard.disarm();
    state.generations.request_stop(thread_id).await;
    state
        .generations
        .schedule_cleanup(thread_id, state.cleanup_grace());
}

/// Runs the teardown from Drop when the stream never reached a terminal
/// state, which is exactly the client-disconnect case.
struct DisconnectGuard {
    generations: Arc<GenerationRegistry>,
    thread_id: String,
    grace: Duration,
    armed: bool,
}

impl DisconnectGuard {
    fn new(generations: Arc<GenerationRegistry>, thread_id: String, grace: Duration) -> Self {
        Self {
            generations,
            thread_id,
            grace,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let generations = Arc::clone(&self.generations);
        let thread_id = std::mem::take(&mut self.thread_id);
        let grace = self.grace;
        tracing::info!(thread_id = %thread_id, "client disconnected mid-stream, stopping generation");
        tokio::spawn(async move {
            generations.request_stop(&thread_id).await;
            generations.schedule_cleanup(&thread_id, grace);
        });
    }
}

/// Serialize a protocol event into an SSE frame. The `data:` line is omitted
/// for events with no payload.
fn to_sse_event(event: StreamEvent) -> Event {
    let name = event.name();
    let sse = Event::default().event(name);

    let payload = match event {
        StreamEvent::StreamStart => return sse,
        StreamEvent::ToolExecutionStart {
            tool,
            arguments,
            call_id,
        } => json!({"tool": tool, "arguments": arguments, "call_id": call_id}),
        StreamEvent::ToolExecutionComplete {
            tool,
            output,
            call_id,
        } => json!({"tool": tool, "output": output, "call_id": call_id}),
        StreamEvent::ToolExecutionError { tool, error } => {
            json!({"tool": tool, "error": error})
        }
        StreamEvent::StreamToken { token } => json!({"token": token}),
        StreamEvent::StreamEnd { thread_id } => json!({"thread_id": thread_id}),
        StreamEvent::Error { error } => json!({"error": error}),
    };

    // json! payloads cannot fail to serialize
    sse.json_data(payload).unwrap()
}
