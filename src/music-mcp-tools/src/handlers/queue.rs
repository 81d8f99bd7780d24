//! `queue_music`: play queue and playlist playback.

use serde_json::Value;
use tracing::{info, warn};

use super::{HandlerContext, output, present};
use crate::envelope::ResponseEnvelope;
use crate::error::ToolError;
use crate::input::{QueueAction, QueueInput};
use crate::schema::{FieldSpec, SchemaNode};
use crate::scripts::Script;

pub const DESCRIPTION: &str = "Manage music queue and enhanced playlist control";

pub const MISSING_SEARCH_TERM: &str = "Missing track search term";
pub const MISSING_PLAYLIST_NAME: &str = "Missing playlist name";

pub fn schema() -> SchemaNode {
    SchemaNode::new()
        .field(
            FieldSpec::enumeration(
                "action",
                "Queue management action to perform",
                QueueAction::VALUES,
            )
            .required(),
        )
        .field(FieldSpec::string(
            "trackSearchTerm",
            "Track name or search term (required for add_to_queue)",
        ))
        .field(FieldSpec::string(
            "playlistName",
            "Name of the playlist (required for play_playlist)",
        ))
        .field(FieldSpec::boolean(
            "shuffle",
            "Whether to shuffle the playlist (optional for play_playlist)",
        ))
}

fn plan(input: &QueueInput) -> Result<(Script, Vec<String>), ToolError> {
    Ok(match input.action {
        QueueAction::ViewQueue => (Script::QueueInfo, Vec::new()),
        QueueAction::PlayQueue => (Script::PlayQueue, Vec::new()),
        QueueAction::ClearQueue => (Script::ClearQueue, Vec::new()),
        QueueAction::AddToQueue => {
            let term = present(&input.track_search_term).ok_or_else(|| {
                ToolError::missing(
                    MISSING_SEARCH_TERM,
                    "Track search term is required for add_to_queue action",
                )
            })?;
            (Script::AddToQueue, vec![term.to_string()])
        }
        QueueAction::PlayPlaylist => {
            let name = present(&input.playlist_name).ok_or_else(|| {
                ToolError::missing(
                    MISSING_PLAYLIST_NAME,
                    "Playlist name is required for play_playlist action",
                )
            })?;
            let shuffle = input.shuffle.unwrap_or(false);
            (Script::PlayPlaylist, vec![name.to_string(), shuffle.to_string()])
        }
    })
}

pub async fn handle(ctx: &HandlerContext, input: QueueInput) -> ResponseEnvelope {
    info!(action = %input.action, "managing music queue");
    match execute(ctx, &input).await {
        Ok(envelope) => envelope,
        Err(err) => {
            if !err.is_rejection() {
                warn!(action = %input.action, error = %err, "queue management failed");
            }
            ResponseEnvelope::failure(&format!("Queue {} failed", input.action), &err)
        }
    }
}

async fn execute(ctx: &HandlerContext, input: &QueueInput) -> Result<ResponseEnvelope, ToolError> {
    let (script, args) = plan(input)?;
    let out = ctx.run(script, args).await?;

    if input.action == QueueAction::ViewQueue {
        let data = output::parse(&out);
        let message = match &data {
            Value::String(text) => text.clone(),
            _ => "Queue retrieved".to_string(),
        };
        return Ok(ResponseEnvelope::ok(message).with_data(data));
    }

    let message = if out.is_empty() {
        format!("Queue {} completed", input.action)
    } else {
        out.clone()
    };
    Ok(ResponseEnvelope::ok(message).with_data(Value::String(out)))
}
