//! Items and roots in the shape legacy browsing clients expect
//!
//! Conversion from session [`MediaItem`]s, plus the size-based truncation
//! applied to every list sent over the legacy transport.

use media_session::{Extras, MediaItem};
use serde::{Deserialize, Serialize};

/// The item has children that can be browsed
pub const FLAG_BROWSABLE: u32 = 1;

/// The item can be played
pub const FLAG_PLAYABLE: u32 = 2;

/// Display description of a legacy item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaDescription {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub icon_uri: Option<String>,
    pub media_uri: Option<String>,
    pub extras: Option<Extras>,
}

/// A browsable or playable item as sent to legacy clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserItem {
    pub media_id: String,
    pub description: MediaDescription,
    pub flags: u32,
}

impl BrowserItem {
    pub fn is_browsable(&self) -> bool {
        self.flags & FLAG_BROWSABLE != 0
    }

    pub fn is_playable(&self) -> bool {
        self.flags & FLAG_PLAYABLE != 0
    }

    /// Size of the item when written to the legacy transport
    pub fn serialized_size(&self) -> usize {
        // Serializing plain strings and maps cannot fail; treat the impossible
        // case as oversized so the item is never sent.
        serde_json::to_vec(self).map_or(usize::MAX, |bytes| bytes.len())
    }
}

impl From<&MediaItem> for BrowserItem {
    fn from(item: &MediaItem) -> Self {
        let metadata = &item.metadata;

        let mut flags = 0;
        if metadata.is_browsable.unwrap_or(false) {
            flags |= FLAG_BROWSABLE;
        }
        if metadata.is_playable.unwrap_or(false) {
            flags |= FLAG_PLAYABLE;
        }

        Self {
            media_id: item.media_id.clone(),
            description: MediaDescription {
                title: metadata.title.clone(),
                subtitle: metadata.subtitle.clone().or_else(|| metadata.artist.clone()),
                description: metadata.description.clone(),
                icon_uri: metadata.artwork_uri.clone(),
                media_uri: item.media_uri.clone(),
                extras: metadata.extras.clone(),
            },
            flags,
        }
    }
}

/// Convert a list of session items, preserving order
pub fn convert_items(items: &[MediaItem]) -> Vec<BrowserItem> {
    items.iter().map(BrowserItem::from).collect()
}

/// Keep the longest prefix of `items` whose total serialized size fits `limit`
///
/// Items are never split; the first item that would overflow the budget and
/// everything after it is dropped.
pub fn truncate_list_by_size(items: Vec<BrowserItem>, limit: usize) -> Vec<BrowserItem> {
    let mut used = 0usize;
    let mut kept = Vec::with_capacity(items.len());

    for item in items {
        let size = item.serialized_size();
        match used.checked_add(size) {
            Some(total) if total <= limit => {
                used = total;
                kept.push(item);
            }
            _ => break,
        }
    }

    kept
}

/// Root of the library as handed to a legacy client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserRoot {
    pub root_id: String,
    pub extras: Option<Extras>,
}

impl BrowserRoot {
    pub fn new(root_id: impl Into<String>, extras: Option<Extras>) -> Self {
        Self {
            root_id: root_id.into(),
            extras,
        }
    }

    /// Root that keeps a client connected when the session has no library root
    pub fn default_root(root_id: impl Into<String>) -> Self {
        Self::new(root_id, None)
    }
}
