//! `get_music_info`: current track, playback state, queue, library stats.

use serde_json::{Value, json};
use tracing::{info, warn};

use super::{HandlerContext, output};
use crate::envelope::ResponseEnvelope;
use crate::error::ToolError;
use crate::input::{InfoFormat, InfoType, MusicInfoInput};
use crate::schema::{FieldSpec, SchemaNode};
use crate::scripts::Script;

pub const DESCRIPTION: &str = "Retrieve information about current playback or library";

pub fn schema() -> SchemaNode {
    SchemaNode::new()
        .field(
            FieldSpec::enumeration(
                "infoType",
                "Type of information to retrieve",
                InfoType::VALUES,
            )
            .required(),
        )
        .field(
            FieldSpec::enumeration("format", "Output format detail level", InfoFormat::VALUES)
                .default_value(json!(InfoFormat::Simple.as_str())),
        )
}

pub async fn handle(ctx: &HandlerContext, input: MusicInfoInput) -> ResponseEnvelope {
    info!(info_type = %input.info_type, format = %input.format, "getting music info");
    match execute(ctx, &input).await {
        Ok(data) => ResponseEnvelope::ok("Music info retrieved successfully").with_data(data),
        Err(err) => {
            warn!(info_type = %input.info_type, error = %err, "failed to get music info");
            ResponseEnvelope::failure("Failed to retrieve music info", &err)
        }
    }
}

async fn execute(ctx: &HandlerContext, input: &MusicInfoInput) -> Result<Value, ToolError> {
    let format = vec![input.format.to_string()];
    match input.info_type {
        InfoType::CurrentTrack | InfoType::PlaybackStatus => {
            let out = ctx.run(Script::CurrentTrack, format).await?;
            Ok(output::parse(&out))
        }
        InfoType::Queue => {
            let out = ctx.run(Script::QueueInfo, format).await?;
            Ok(output::parse(&out))
        }
        InfoType::LibraryStats => {
            let playlists = ctx.run(Script::Playlists, Vec::new()).await?;
            let albums = ctx.run(Script::Albums, Vec::new()).await?;
            Ok(json!({
                "playlists": output::parse(&playlists),
                "albums": output::parse(&albums),
            }))
        }
    }
}
