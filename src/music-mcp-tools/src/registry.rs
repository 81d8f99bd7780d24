//! Immutable tool registry.

use indexmap::IndexMap;
use music_mcp_types::Tool;

use crate::config::Config;
use crate::handlers;
use crate::schema::SchemaNode;

/// The closed set of tools this server knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Info,
    ExecuteMusicCommand,
    GetMusicInfo,
    SearchMusic,
    ManagePlaylist,
    QueueMusic,
}

impl ToolKind {
    /// Registration order, which is also the `tools/list` order.
    pub const ALL: [ToolKind; 6] = [
        Self::Info,
        Self::ExecuteMusicCommand,
        Self::GetMusicInfo,
        Self::SearchMusic,
        Self::ManagePlaylist,
        Self::QueueMusic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::ExecuteMusicCommand => "execute_music_command",
            Self::GetMusicInfo => "get_music_info",
            Self::SearchMusic => "search_music",
            Self::ManagePlaylist => "manage_playlist",
            Self::QueueMusic => "queue_music",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Info => handlers::info::DESCRIPTION,
            Self::ExecuteMusicCommand => handlers::playback::DESCRIPTION,
            Self::GetMusicInfo => handlers::music_info::DESCRIPTION,
            Self::SearchMusic => handlers::search::DESCRIPTION,
            Self::ManagePlaylist => handlers::playlist::DESCRIPTION,
            Self::QueueMusic => handlers::queue::DESCRIPTION,
        }
    }

    fn schema(self) -> SchemaNode {
        match self {
            Self::Info => handlers::info::schema(),
            Self::ExecuteMusicCommand => handlers::playback::schema(),
            Self::GetMusicInfo => handlers::music_info::schema(),
            Self::SearchMusic => handlers::search::schema(),
            Self::ManagePlaylist => handlers::playlist::schema(),
            Self::QueueMusic => handlers::queue::schema(),
        }
    }
}

/// A registered tool: name, description and input contract.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    kind: ToolKind,
    schema: SchemaNode,
}

impl ToolDescriptor {
    pub fn new(kind: ToolKind) -> Self {
        Self {
            kind,
            schema: kind.schema(),
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn description(&self) -> &'static str {
        self.kind.description()
    }

    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    /// The `tools/list` entry.
    pub fn to_tool(&self) -> Tool {
        Tool::new(self.name(), self.description()).with_schema(self.schema.to_input_schema())
    }
}

/// Tools available for this process, built once at startup.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: IndexMap<&'static str, ToolDescriptor>,
}

impl ToolRegistry {
    /// Every tool, minus `queue_music` when the queue toggle is off.
    pub fn from_config(config: &Config) -> Self {
        Self::with_kinds(
            ToolKind::ALL
                .into_iter()
                .filter(|kind| config.queue_tool || *kind != ToolKind::QueueMusic),
        )
    }

    pub fn with_kinds(kinds: impl IntoIterator<Item = ToolKind>) -> Self {
        let tools = kinds
            .into_iter()
            .map(|kind| (kind.name(), ToolDescriptor::new(kind)))
            .collect();
        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    /// `tools/list` payload in registration order.
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.values().map(ToolDescriptor::to_tool).collect()
    }
}
