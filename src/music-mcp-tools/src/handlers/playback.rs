//! `execute_music_command`: transport control plus optional settings.

use std::time::Duration;

use serde_json::json;
use tracing::{info, warn};

use super::HandlerContext;
use crate::envelope::ResponseEnvelope;
use crate::error::ToolError;
use crate::input::{PlaybackCommand, PlaybackInput, RepeatMode};
use crate::schema::{FieldSpec, SchemaNode};
use crate::scripts::Script;

pub const DESCRIPTION: &str = "Execute music playback control commands";

pub const INVALID_VOLUME: &str = "Invalid volume range";
pub const INVALID_VOLUME_MESSAGE: &str = "Volume must be between 0 and 100";
pub const INVALID_RATING: &str = "Invalid rating range";
pub const INVALID_RATING_MESSAGE: &str = "Rating must be between 0 and 5";

const VOLUME_RANGE: (f64, f64) = (0.0, 100.0);
const RATING_RANGE: (f64, f64) = (0.0, 5.0);

pub fn schema() -> SchemaNode {
    SchemaNode::new()
        .field(
            FieldSpec::enumeration(
                "command",
                "The playback command to execute",
                PlaybackCommand::VALUES,
            )
            .required(),
        )
        .field(
            FieldSpec::number("volume", "Volume level (0-100)")
                .range(VOLUME_RANGE.0, VOLUME_RANGE.1)
                .range_error(INVALID_VOLUME, INVALID_VOLUME_MESSAGE),
        )
        .field(FieldSpec::number("position", "Position in track (seconds)").min(0.0))
        .field(FieldSpec::boolean("shuffleMode", "Enable or disable shuffle mode"))
        .field(FieldSpec::enumeration(
            "repeatMode",
            "Repeat mode setting",
            RepeatMode::VALUES,
        ))
        .field(
            FieldSpec::number("rating", "Track rating (0-5 stars)")
                .range(RATING_RANGE.0, RATING_RANGE.1)
                .range_error(INVALID_RATING, INVALID_RATING_MESSAGE),
        )
        .field(FieldSpec::number("timeoutSeconds", "Timeout for the operation in seconds").min(1.0))
}

fn command_script(command: PlaybackCommand) -> Script {
    match command {
        PlaybackCommand::Play => Script::Play,
        PlaybackCommand::Pause => Script::Pause,
        PlaybackCommand::TogglePlayback => Script::PlayPause,
        PlaybackCommand::Next => Script::NextTrack,
        PlaybackCommand::Previous => Script::PreviousTrack,
    }
}

fn check_range(
    value: Option<f64>,
    (min, max): (f64, f64),
    tag: &'static str,
    message: &str,
) -> Result<(), ToolError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(ToolError::Validation {
            tag: tag.to_string(),
            message: message.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Settings to apply after the primary command, in application order.
fn settings(input: &PlaybackInput) -> Vec<(&'static str, Script, String)> {
    let mut steps = Vec::new();
    if let Some(volume) = input.volume {
        steps.push(("volume", Script::SetVolume, volume.to_string()));
    }
    if let Some(position) = input.position {
        steps.push(("position", Script::SetPosition, position.to_string()));
    }
    if let Some(shuffle) = input.shuffle_mode {
        steps.push(("shuffleMode", Script::SetShuffle, shuffle.to_string()));
    }
    if let Some(repeat) = input.repeat_mode {
        steps.push(("repeatMode", Script::SetRepeat, repeat.to_string()));
    }
    if let Some(rating) = input.rating {
        steps.push(("rating", Script::SetRating, rating.to_string()));
    }
    steps
}

pub async fn handle(ctx: &HandlerContext, input: PlaybackInput) -> ResponseEnvelope {
    info!(command = %input.command, "executing music command");
    match execute(ctx, &input).await {
        Ok(envelope) => envelope,
        Err(err) => {
            if !err.is_rejection() {
                warn!(command = %input.command, error = %err, "music command failed");
            }
            ResponseEnvelope::failure("Failed to execute command", &err)
        }
    }
}

async fn execute(ctx: &HandlerContext, input: &PlaybackInput) -> Result<ResponseEnvelope, ToolError> {
    check_range(input.volume, VOLUME_RANGE, INVALID_VOLUME, INVALID_VOLUME_MESSAGE)?;
    check_range(input.rating, RATING_RANGE, INVALID_RATING, INVALID_RATING_MESSAGE)?;

    let timeout = input
        .timeout_seconds
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .unwrap_or_else(|| ctx.config().timeout());

    let output = ctx
        .run_with_timeout(command_script(input.command), Vec::new(), timeout)
        .await?;

    let mut applied = Vec::new();
    for (setting, script, arg) in settings(input) {
        ctx.run_with_timeout(script, vec![arg], timeout).await?;
        applied.push(setting);
    }

    let message = if output.is_empty() {
        format!("Command '{}' executed", input.command)
    } else {
        output
    };
    let envelope = ResponseEnvelope::ok(message);
    Ok(if applied.is_empty() {
        envelope
    } else {
        envelope.with_data(json!({ "applied": applied }))
    })
}
