//! `manage_playlist`: create, edit, list and inspect playlists.

use serde_json::Value;
use tracing::{info, warn};

use super::{HandlerContext, output, present};
use crate::envelope::ResponseEnvelope;
use crate::error::ToolError;
use crate::input::{PlaylistAction, PlaylistInput};
use crate::schema::{FieldSpec, SchemaNode};
use crate::scripts::Script;

pub const DESCRIPTION: &str = "Create and manage playlists";

pub const MISSING_PLAYLIST_NAME: &str = "Missing playlist name";
pub const MISSING_PARAMETERS: &str = "Missing required parameters";

pub fn schema() -> SchemaNode {
    SchemaNode::new()
        .field(
            FieldSpec::enumeration(
                "action",
                "Action to perform on playlists",
                PlaylistAction::VALUES,
            )
            .required(),
        )
        .field(FieldSpec::string(
            "playlistName",
            "Name of the playlist (required for most actions)",
        ))
        .field(FieldSpec::string(
            "trackId",
            "Track identifier or search term (required for add/remove track)",
        ))
        .field(FieldSpec::string(
            "newName",
            "New name for the playlist (required for rename)",
        ))
}

fn require_name(input: &PlaylistInput) -> Result<String, ToolError> {
    present(&input.playlist_name).map(str::to_string).ok_or_else(|| {
        ToolError::missing(
            MISSING_PLAYLIST_NAME,
            format!("Playlist name is required for {} action", input.action),
        )
    })
}

fn require_pair(
    input: &PlaylistInput,
    second: &Option<String>,
    message: String,
) -> Result<Vec<String>, ToolError> {
    match (present(&input.playlist_name), present(second)) {
        (Some(name), Some(other)) => Ok(vec![name.to_string(), other.to_string()]),
        _ => Err(ToolError::missing(MISSING_PARAMETERS, message)),
    }
}

/// Check preconditions and pick the script and its arguments.
fn plan(input: &PlaylistInput) -> Result<(Script, Vec<String>), ToolError> {
    let action = input.action;
    Ok(match action {
        PlaylistAction::List => (Script::Playlists, Vec::new()),
        PlaylistAction::Create => (Script::CreatePlaylist, vec![require_name(input)?]),
        PlaylistAction::Delete => (Script::DeletePlaylist, vec![require_name(input)?]),
        PlaylistAction::GetTracks => (Script::PlaylistTracks, vec![require_name(input)?]),
        PlaylistAction::AddTrack | PlaylistAction::RemoveTrack => {
            let script = if action == PlaylistAction::AddTrack {
                Script::AddToPlaylist
            } else {
                Script::RemoveFromPlaylist
            };
            let args = require_pair(
                input,
                &input.track_id,
                format!("Playlist name and track ID/search term are required for {action} action"),
            )?;
            (script, args)
        }
        PlaylistAction::Rename => {
            let args = require_pair(
                input,
                &input.new_name,
                "Current playlist name and new name are required for rename action".to_string(),
            )?;
            (Script::RenamePlaylist, args)
        }
    })
}

pub async fn handle(ctx: &HandlerContext, input: PlaylistInput) -> ResponseEnvelope {
    info!(action = %input.action, playlist = ?input.playlist_name, "managing playlist");
    match execute(ctx, &input).await {
        Ok(envelope) => envelope,
        Err(err) => {
            if !err.is_rejection() {
                warn!(action = %input.action, error = %err, "playlist management failed");
            }
            ResponseEnvelope::failure(&format!("Playlist {} failed", input.action), &err)
        }
    }
}

async fn execute(ctx: &HandlerContext, input: &PlaylistInput) -> Result<ResponseEnvelope, ToolError> {
    let (script, args) = plan(input)?;
    let out = ctx.run(script, args).await?;

    Ok(match input.action {
        PlaylistAction::List | PlaylistAction::GetTracks => {
            let data = output::parse(&out);
            let message = match (&data, input.action) {
                (Value::Array(items), PlaylistAction::List) => {
                    format!("Found {} playlist(s)", items.len())
                }
                (Value::Array(items), _) => format!(
                    "Playlist '{}' has {} track(s)",
                    input.playlist_name.as_deref().unwrap_or_default(),
                    items.len()
                ),
                _ => out,
            };
            ResponseEnvelope::ok(message).with_data(data)
        }
        action => {
            let message = if out.is_empty() {
                format!("Playlist {action} completed")
            } else {
                out.clone()
            };
            ResponseEnvelope::ok(message).with_data(Value::String(out))
        }
    })
}
