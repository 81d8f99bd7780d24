//! The fixed table of automation scripts, one per distinct action.

use music_mcp_script::ScriptRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Play,
    Pause,
    PlayPause,
    NextTrack,
    PreviousTrack,
    SetVolume,
    SetPosition,
    SetShuffle,
    SetRepeat,
    SetRating,
    CurrentTrack,
    Playlists,
    Albums,
    SearchTracks,
    CreatePlaylist,
    AddToPlaylist,
    RemoveFromPlaylist,
    RenamePlaylist,
    DeletePlaylist,
    PlaylistTracks,
    PlayPlaylist,
    QueueInfo,
    AddToQueue,
    PlayQueue,
    ClearQueue,
}

impl Script {
    pub const ALL: &'static [Script] = &[
        Self::Play,
        Self::Pause,
        Self::PlayPause,
        Self::NextTrack,
        Self::PreviousTrack,
        Self::SetVolume,
        Self::SetPosition,
        Self::SetShuffle,
        Self::SetRepeat,
        Self::SetRating,
        Self::CurrentTrack,
        Self::Playlists,
        Self::Albums,
        Self::SearchTracks,
        Self::CreatePlaylist,
        Self::AddToPlaylist,
        Self::RemoveFromPlaylist,
        Self::RenamePlaylist,
        Self::DeletePlaylist,
        Self::PlaylistTracks,
        Self::PlayPlaylist,
        Self::QueueInfo,
        Self::AddToQueue,
        Self::PlayQueue,
        Self::ClearQueue,
    ];

    /// Path relative to the script directory.
    pub fn path(self) -> &'static str {
        match self {
            Self::Play => "playback/play.applescript",
            Self::Pause => "playback/pause.applescript",
            Self::PlayPause => "playback/play-pause.applescript",
            Self::NextTrack => "playback/next-track.applescript",
            Self::PreviousTrack => "playback/previous-track.applescript",
            Self::SetVolume => "playback/set-volume.applescript",
            Self::SetPosition => "playback/set-position.applescript",
            Self::SetShuffle => "playback/set-shuffle.applescript",
            Self::SetRepeat => "playback/set-repeat.applescript",
            Self::SetRating => "playback/set-rating.applescript",
            Self::CurrentTrack => "library/get-current-track.applescript",
            Self::Playlists => "library/get-playlists.applescript",
            Self::Albums => "library/get-albums.applescript",
            Self::SearchTracks => "library/search-tracks.applescript",
            Self::CreatePlaylist => "playlist/create-playlist.applescript",
            Self::AddToPlaylist => "playlist/add-to-playlist.applescript",
            Self::RemoveFromPlaylist => "playlist/remove-from-playlist.applescript",
            Self::RenamePlaylist => "playlist/rename-playlist.applescript",
            Self::DeletePlaylist => "playlist/delete-playlist.applescript",
            Self::PlaylistTracks => "playlist/get-playlist-tracks.applescript",
            Self::PlayPlaylist => "playlist/play-playlist.applescript",
            Self::QueueInfo => "queue/get-queue-info.applescript",
            Self::AddToQueue => "queue/add-to-queue.applescript",
            Self::PlayQueue => "queue/play-queue.applescript",
            Self::ClearQueue => "queue/clear-queue.applescript",
        }
    }

    pub fn script_ref(self) -> ScriptRef {
        ScriptRef::file(self.path())
    }
}
