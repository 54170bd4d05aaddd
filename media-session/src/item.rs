//! Library items and query parameters

use serde::{Deserialize, Serialize};

use crate::extras::Extras;

/// Descriptive metadata attached to a [`MediaItem`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub artist: Option<String>,
    pub artwork_uri: Option<String>,
    pub is_browsable: Option<bool>,
    pub is_playable: Option<bool>,
    pub extras: Option<Extras>,
}

/// A node in the session's browsable library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub media_id: String,
    pub media_uri: Option<String>,
    pub metadata: MediaMetadata,
}

impl MediaItem {
    pub fn new(media_id: impl Into<String>) -> Self {
        Self {
            media_id: media_id.into(),
            media_uri: None,
            metadata: MediaMetadata::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.metadata.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.media_uri = Some(uri.into());
        self
    }

    pub fn browsable(mut self, browsable: bool) -> Self {
        self.metadata.is_browsable = Some(browsable);
        self
    }

    pub fn playable(mut self, playable: bool) -> Self {
        self.metadata.is_playable = Some(playable);
        self
    }
}

/// Optional parameters attached to library queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryParams {
    pub extras: Extras,
    pub recent: bool,
    pub offline: bool,
    pub suggested: bool,
}

impl LibraryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extras(mut self, extras: Extras) -> Self {
        self.extras = extras;
        self
    }

    pub fn recent(mut self, recent: bool) -> Self {
        self.recent = recent;
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn suggested(mut self, suggested: bool) -> Self {
        self.suggested = suggested;
        self
    }
}
