//! `search_music`: library search with local filtering for list scripts.

use serde_json::{Value, json};
use tracing::{info, warn};

use super::{HandlerContext, output};
use crate::config::SEARCH_RESULTS_CEILING;
use crate::envelope::ResponseEnvelope;
use crate::error::ToolError;
use crate::input::{SearchInput, SearchType};
use crate::schema::{FieldSpec, SchemaNode};
use crate::scripts::Script;

pub const DESCRIPTION: &str = "Search the music library";

pub const EMPTY_QUERY: &str = "Empty query";
pub const EMPTY_QUERY_MESSAGE: &str = "Search query cannot be empty";

pub fn schema() -> SchemaNode {
    SchemaNode::new()
        .field(FieldSpec::string("query", "Search query string").required())
        .field(
            FieldSpec::enumeration(
                "searchType",
                "Type of content to search for",
                SearchType::VALUES,
            )
            .default_value(json!(SearchType::All.as_str())),
        )
        .field(
            FieldSpec::number("limit", "Maximum number of results to return")
                .range(1.0, SEARCH_RESULTS_CEILING as f64),
        )
}

/// `min(requested or cap, cap)`, where the cap is already clamped to 1..=100.
/// Fractional limits are truncated.
pub fn effective_limit(requested: Option<f64>, cap: u64) -> usize {
    requested
        .map_or(cap, |limit| limit as u64)
        .min(cap)
        .max(1) as usize
}

fn field_contains(item: &Value, key: &str, needle: &str) -> bool {
    item.get(key)
        .and_then(Value::as_str)
        .is_some_and(|value| value.to_lowercase().contains(needle))
}

/// Keep the entries matching `query` for search types filtered locally.
/// `all` and `track` are already filtered by the script.
fn matches(search_type: SearchType, item: &Value, needle: &str) -> bool {
    match search_type {
        SearchType::All | SearchType::Track => true,
        SearchType::Playlist => field_contains(item, "name", needle),
        SearchType::Album => {
            field_contains(item, "album", needle) || field_contains(item, "artist", needle)
        }
        SearchType::Artist => field_contains(item, "artist", needle),
    }
}

pub async fn handle(ctx: &HandlerContext, input: SearchInput) -> ResponseEnvelope {
    info!(query = %input.query, search_type = %input.search_type, "searching music");
    match execute(ctx, &input).await {
        Ok(data) => {
            let count = output::result_count(&data);
            ResponseEnvelope::ok(format!("Found {count} result(s)")).with_data(data)
        }
        Err(err) => {
            if !err.is_rejection() {
                warn!(query = %input.query, error = %err, "music search failed");
            }
            ResponseEnvelope::failure("Search failed", &err)
        }
    }
}

async fn execute(ctx: &HandlerContext, input: &SearchInput) -> Result<Value, ToolError> {
    let query = input.query.trim();
    if query.is_empty() {
        return Err(ToolError::Validation {
            tag: EMPTY_QUERY.to_string(),
            message: EMPTY_QUERY_MESSAGE.to_string(),
        });
    }
    let limit = effective_limit(input.limit, ctx.config().search_cap());

    let out = match input.search_type {
        SearchType::All | SearchType::Track => {
            ctx.run(Script::SearchTracks, vec![query.to_string()]).await?
        }
        SearchType::Playlist => ctx.run(Script::Playlists, Vec::new()).await?,
        SearchType::Album | SearchType::Artist => ctx.run(Script::Albums, Vec::new()).await?,
    };

    let needle = query.to_lowercase();
    Ok(match output::parse(&out) {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|item| matches(input.search_type, item, &needle))
                .take(limit)
                .collect(),
        ),
        other => other,
    })
}
