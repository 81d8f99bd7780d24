//! Typed tool inputs.
//!
//! Arguments that passed schema validation are decoded into one variant of
//! the closed [`ToolInput`] union, so handlers work with real types and the
//! dispatcher matches exhaustively.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ToolError;
use crate::registry::ToolKind;

/// A string enum with a fixed wire spelling per variant.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            /// Every accepted wire value, in declaration order.
            pub const VALUES: &'static [&'static str] = &[$($wire),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(
    /// Primary transport command of `execute_music_command`.
    PlaybackCommand {
        Play => "play",
        Pause => "pause",
        Next => "next",
        Previous => "previous",
        TogglePlayback => "toggle_playback",
    }
);

wire_enum!(RepeatMode { Off => "off", One => "one", All => "all" });

wire_enum!(InfoType {
    CurrentTrack => "current_track",
    PlaybackStatus => "playback_status",
    Queue => "queue",
    LibraryStats => "library_stats",
});

wire_enum!(InfoFormat { Simple => "simple", Detailed => "detailed" });

wire_enum!(SearchType {
    All => "all",
    Track => "track",
    Album => "album",
    Artist => "artist",
    Playlist => "playlist",
});

wire_enum!(PlaylistAction {
    Create => "create",
    AddTrack => "add_track",
    RemoveTrack => "remove_track",
    Rename => "rename",
    Delete => "delete",
    List => "list",
    GetTracks => "get_tracks",
});

wire_enum!(QueueAction {
    ViewQueue => "view_queue",
    AddToQueue => "add_to_queue",
    PlayQueue => "play_queue",
    ClearQueue => "clear_queue",
    PlayPlaylist => "play_playlist",
});

wire_enum!(InfoCommand { Info => "info" });

impl Default for InfoFormat {
    fn default() -> Self {
        Self::Simple
    }
}

impl Default for SearchType {
    fn default() -> Self {
        Self::All
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InfoInput {
    pub command: Option<InfoCommand>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackInput {
    pub command: PlaybackCommand,
    pub volume: Option<f64>,
    /// Seconds into the current track.
    pub position: Option<f64>,
    pub shuffle_mode: Option<bool>,
    pub repeat_mode: Option<RepeatMode>,
    pub rating: Option<f64>,
    /// Per-call timeout override.
    pub timeout_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicInfoInput {
    pub info_type: InfoType,
    #[serde(default)]
    pub format: InfoFormat,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInput {
    pub query: String,
    #[serde(default)]
    pub search_type: SearchType,
    pub limit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInput {
    pub action: PlaylistAction,
    pub playlist_name: Option<String>,
    /// Track identifier or search term.
    pub track_id: Option<String>,
    pub new_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueInput {
    pub action: QueueAction,
    pub track_search_term: Option<String>,
    pub playlist_name: Option<String>,
    pub shuffle: Option<bool>,
}

/// Decoded arguments of one tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInput {
    Info(InfoInput),
    Playback(PlaybackInput),
    MusicInfo(MusicInfoInput),
    Search(SearchInput),
    Playlist(PlaylistInput),
    Queue(QueueInput),
}

impl ToolInput {
    /// Decode validated arguments for `kind`. Fields set to `null` are
    /// dropped first so they read as absent.
    pub fn decode(kind: ToolKind, mut arguments: Map<String, Value>) -> Result<Self, ToolError> {
        arguments.retain(|_, value| !value.is_null());
        let arguments = Value::Object(arguments);
        Ok(match kind {
            ToolKind::Info => Self::Info(decode_as(arguments)?),
            ToolKind::ExecuteMusicCommand => Self::Playback(decode_as(arguments)?),
            ToolKind::GetMusicInfo => Self::MusicInfo(decode_as(arguments)?),
            ToolKind::SearchMusic => Self::Search(decode_as(arguments)?),
            ToolKind::ManagePlaylist => Self::Playlist(decode_as(arguments)?),
            ToolKind::QueueMusic => Self::Queue(decode_as(arguments)?),
        })
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Self::Info(_) => ToolKind::Info,
            Self::Playback(_) => ToolKind::ExecuteMusicCommand,
            Self::MusicInfo(_) => ToolKind::GetMusicInfo,
            Self::Search(_) => ToolKind::SearchMusic,
            Self::Playlist(_) => ToolKind::ManagePlaylist,
            Self::Queue(_) => ToolKind::QueueMusic,
        }
    }
}

fn decode_as<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::invalid(format!("Invalid arguments: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn decodes_camel_case_playback_input() {
        let input = ToolInput::decode(
            ToolKind::ExecuteMusicCommand,
            object(json!({
                "command": "toggle_playback",
                "volume": 35,
                "shuffleMode": true,
                "repeatMode": "one",
                "timeoutSeconds": 4
            })),
        )
        .unwrap();

        assert_eq!(
            input,
            ToolInput::Playback(PlaybackInput {
                command: PlaybackCommand::TogglePlayback,
                volume: Some(35.0),
                position: None,
                shuffle_mode: Some(true),
                repeat_mode: Some(RepeatMode::One),
                rating: None,
                timeout_seconds: Some(4.0),
            })
        );
        assert_eq!(input.kind(), ToolKind::ExecuteMusicCommand);
    }

    #[test]
    fn nulls_and_missing_fields_take_defaults() {
        let input = ToolInput::decode(
            ToolKind::GetMusicInfo,
            object(json!({"infoType": "library_stats", "format": null})),
        )
        .unwrap();
        assert_eq!(
            input,
            ToolInput::MusicInfo(MusicInfoInput {
                info_type: InfoType::LibraryStats,
                format: InfoFormat::Simple,
            })
        );

        let ToolInput::Search(search) =
            ToolInput::decode(ToolKind::SearchMusic, object(json!({"query": "Abbey"}))).unwrap()
        else {
            panic!("expected search input");
        };
        assert_eq!(search.search_type, SearchType::All);
        assert_eq!(search.limit, None);
    }

    #[test]
    fn info_takes_no_required_arguments() {
        assert_eq!(
            ToolInput::decode(ToolKind::Info, Map::new()).unwrap(),
            ToolInput::Info(InfoInput::default())
        );
    }

    #[test]
    fn decode_failures_are_validation_errors() {
        let err = ToolInput::decode(ToolKind::SearchMusic, object(json!({"query": "a", "limit": "five"})))
            .unwrap_err();
        assert_eq!(err.tag(), "Invalid arguments");
        assert!(err.to_string().starts_with("Invalid arguments: "));
    }

    #[test]
    fn wire_values_match_serde() {
        for value in QueueAction::VALUES {
            let action: QueueAction = serde_json::from_value(json!(value)).unwrap();
            assert_eq!(action.as_str(), *value);
        }
        assert_eq!(PlaylistAction::GetTracks.to_string(), "get_tracks");
    }
}
