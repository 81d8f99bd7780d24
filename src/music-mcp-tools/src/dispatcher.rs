//! Tool call dispatcher.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::FutureExt;
use music_mcp_script::ScriptRunner;
use music_mcp_server::ToolService;
use music_mcp_types::{CallToolResult, Tool};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::envelope::ResponseEnvelope;
use crate::error::ToolError;
use crate::handlers::{self, HandlerContext};
use crate::input::ToolInput;
use crate::registry::ToolRegistry;

/// Routes tool calls to handlers and guarantees one envelope per call.
#[derive(Debug)]
pub struct Dispatcher {
    registry: ToolRegistry,
    context: HandlerContext,
}

impl Dispatcher {
    /// Build the registry from `config` and share `runner` with every handler.
    pub fn new(config: Config, runner: Arc<dyn ScriptRunner>) -> Self {
        let registry = ToolRegistry::from_config(&config);
        info!(tools = ?registry.names(), "tool registry built");
        Self {
            registry,
            context: HandlerContext::new(runner, Arc::new(config)),
        }
    }

    /// Validate, execute and wrap one tool call.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> ResponseEnvelope {
        let start = Instant::now();
        debug!(tool = name, stage = "received", "tool call received");

        let input = match self.prepare(name, &arguments) {
            Ok(input) => input,
            Err(err) => {
                info!(
                    tool = name,
                    stage = "rejected",
                    error = %err,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "tool call rejected"
                );
                return ResponseEnvelope::failure(name, &err);
            }
        };

        debug!(tool = name, stage = "executing", "tool call executing");
        let envelope = match AssertUnwindSafe(self.execute(input)).catch_unwind().await {
            Ok(envelope) => envelope,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(tool = name, panic = %message, "tool handler panicked");
                ResponseEnvelope::failure(name, &ToolError::HandlerPanic(message))
            }
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        if envelope.success {
            info!(tool = name, stage = "completed", elapsed_ms, "tool call completed");
        } else {
            warn!(
                tool = name,
                stage = "failed",
                error = envelope.error.as_deref().unwrap_or_default(),
                elapsed_ms,
                "tool call failed"
            );
        }
        envelope
    }

    fn prepare(&self, name: &str, arguments: &Value) -> Result<ToolInput, ToolError> {
        let descriptor = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let arguments = descriptor.schema().validate(arguments)?;
        ToolInput::decode(descriptor.kind(), arguments)
    }

    async fn execute(&self, input: ToolInput) -> ResponseEnvelope {
        let ctx = &self.context;
        match input {
            ToolInput::Info(input) => handlers::info::handle(ctx, input).await,
            ToolInput::Playback(input) => handlers::playback::handle(ctx, input).await,
            ToolInput::MusicInfo(input) => handlers::music_info::handle(ctx, input).await,
            ToolInput::Search(input) => handlers::search::handle(ctx, input).await,
            ToolInput::Playlist(input) => handlers::playlist::handle(ctx, input).await,
            ToolInput::Queue(input) => handlers::queue::handle(ctx, input).await,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[async_trait]
impl ToolService for Dispatcher {
    fn tools(&self) -> Vec<Tool> {
        self.registry.tools()
    }

    async fn call(&self, name: &str, arguments: Value) -> CallToolResult {
        self.dispatch(name, arguments).await.into_call_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripts::Script;
    use crate::test_support::StubRunner;
    use music_mcp_script::ExecutionResult;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn dispatcher(runner: &Arc<StubRunner>) -> Dispatcher {
        let runner: Arc<dyn ScriptRunner> = runner.clone();
        Dispatcher::new(Config::default(), runner)
    }

    #[tokio::test]
    async fn unknown_tool_is_rejected() {
        let runner = Arc::new(StubRunner::new());
        let envelope = dispatcher(&runner)
            .dispatch("shuffle_everything", json!({}))
            .await;

        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Unknown tool"));
        assert_eq!(envelope.message, "Unknown tool: shuffle_everything");
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_required_field_never_reaches_runner() {
        let runner = Arc::new(StubRunner::new());
        let dispatcher = dispatcher(&runner);

        for (tool, args) in [
            ("execute_music_command", json!({})),
            ("get_music_info", json!({"format": "simple"})),
            ("search_music", Value::Null),
            ("manage_playlist", json!({"playlistName": "Jazz"})),
            ("queue_music", json!({"action": null})),
        ] {
            let envelope = dispatcher.dispatch(tool, args).await;
            assert!(!envelope.success, "{tool} should be rejected");
            assert_eq!(envelope.error.as_deref(), Some("Invalid arguments"));
        }
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn shape_violations_are_rejected() {
        let runner = Arc::new(StubRunner::new());
        let dispatcher = dispatcher(&runner);

        for (tool, args) in [
            ("execute_music_command", json!({"command": "rewind"})),
            ("execute_music_command", json!({"command": "play", "shuffleMode": "yes"})),
            ("search_music", json!({"query": "a", "limit": 500})),
            ("search_music", json!("Abbey")),
            ("get_music_info", json!({"infoType": "lyrics"})),
        ] {
            let envelope = dispatcher.dispatch(tool, args.clone()).await;
            assert_eq!(
                envelope.error.as_deref(),
                Some("Invalid arguments"),
                "{tool} {args}"
            );
        }
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn volume_out_of_range_is_tagged_before_any_spawn() {
        let runner = Arc::new(StubRunner::new());
        let envelope = dispatcher(&runner)
            .dispatch("execute_music_command", json!({"command": "play", "volume": 150}))
            .await;

        assert_eq!(envelope.error.as_deref(), Some("Invalid volume range"));
        assert_eq!(envelope.message, "Volume must be between 0 and 100");
        assert_eq!(runner.call_count(), 0);

        let envelope = dispatcher(&runner)
            .dispatch("execute_music_command", json!({"command": "play", "rating": 9}))
            .await;
        assert_eq!(envelope.error.as_deref(), Some("Invalid rating range"));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_fields_are_ignored() {
        let runner = Arc::new(StubRunner::new());
        let envelope = dispatcher(&runner)
            .dispatch("execute_music_command", json!({"command": "next", "mood": "happy"}))
            .await;
        assert!(envelope.success);
        assert_eq!(runner.call_count(), 1);
    }

    #[tokio::test]
    async fn album_search_end_to_end() {
        let runner = Arc::new(StubRunner::new().respond(
            Script::Albums,
            ExecutionResult::success(
                r#"[{"album":"Abbey Road","artist":"The Beatles"},{"album":"Revolver","artist":"The Beatles"}]"#,
            ),
        ));
        let envelope = dispatcher(&runner)
            .dispatch("search_music", json!({"query": "Abbey", "searchType": "album"}))
            .await;

        assert!(envelope.success);
        assert_eq!(
            envelope.data,
            Some(json!([{"album": "Abbey Road", "artist": "The Beatles"}]))
        );
    }

    #[tokio::test]
    async fn whole_number_floats_are_valid_limits() {
        let tracks: Vec<_> = (0..8).map(|i| json!({ "name": format!("Track {i}") })).collect();
        let runner = Arc::new(StubRunner::new().respond(
            Script::SearchTracks,
            ExecutionResult::success(serde_json::to_string(&tracks).unwrap()),
        ));
        let envelope = dispatcher(&runner)
            .dispatch("search_music", json!({"query": "Track", "limit": 5.0}))
            .await;

        assert!(envelope.success, "{envelope:?}");
        assert_eq!(envelope.message, "Found 5 result(s)");
        assert_eq!(runner.call_count(), 1);
    }

    #[tokio::test]
    async fn handler_panic_becomes_failed_envelope() {
        let runner = Arc::new(StubRunner::panicking());
        let dispatcher = dispatcher(&runner);

        let envelope = dispatcher
            .dispatch("manage_playlist", json!({"action": "list"}))
            .await;
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Tool execution failed"));
        assert_eq!(envelope.message, "Tool execution failed: stub runner exploded");

        // The dispatcher keeps serving after a panic.
        let envelope = dispatcher.dispatch("nope", Value::Null).await;
        assert_eq!(envelope.error.as_deref(), Some("Unknown tool"));
    }

    #[tokio::test]
    async fn disabled_queue_tool_is_unknown() {
        let runner = Arc::new(StubRunner::new());
        let config = Config {
            queue_tool: false,
            ..Config::default()
        };
        let runner_dyn: Arc<dyn ScriptRunner> = runner.clone();
        let dispatcher = Dispatcher::new(config, runner_dyn);

        let envelope = dispatcher
            .dispatch("queue_music", json!({"action": "view_queue"}))
            .await;
        assert_eq!(envelope.error.as_deref(), Some("Unknown tool"));
        assert!(!dispatcher.tools().iter().any(|t| t.name == "queue_music"));
    }

    #[tokio::test]
    async fn tool_service_encodes_envelopes() {
        let runner = Arc::new(
            StubRunner::new().respond(Script::CurrentTrack, ExecutionResult::success(r#"{"name":"Blue"}"#)),
        );
        let dispatcher = dispatcher(&runner);

        let result = dispatcher
            .call("get_music_info", json!({"infoType": "current_track"}))
            .await;
        assert!(!result.is_error());
        let decoded: ResponseEnvelope =
            serde_json::from_str(result.content[0].as_text().unwrap()).unwrap();
        assert_eq!(decoded.data, Some(json!({"name": "Blue"})));

        let result = dispatcher.call("search_music", json!({"query": " "})).await;
        assert!(result.is_error());
    }

    #[tokio::test]
    async fn every_request_gets_exactly_one_envelope_under_concurrency() {
        let runner = Arc::new(StubRunner::new().respond(
            Script::SearchTracks,
            ExecutionResult::timeout(std::time::Duration::from_millis(30)),
        ));
        let dispatcher = Arc::new(dispatcher(&runner));

        let mut tasks = Vec::new();
        for i in 0..8 {
            let dispatcher = Arc::clone(&dispatcher);
            tasks.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    dispatcher.dispatch("search_music", json!({"query": "x"})).await
                } else {
                    dispatcher.dispatch("execute_music_command", json!({"command": "play"})).await
                }
            }));
        }

        let mut failed = 0;
        for task in tasks {
            if !task.await.unwrap().success {
                failed += 1;
            }
        }
        assert_eq!(failed, 4);
        assert_eq!(runner.call_count(), 8);
    }
}
