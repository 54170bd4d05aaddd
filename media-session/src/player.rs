//! Player state snapshots and player events

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Playback state of a session's player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    Idle,
    Buffering,
    Ready,
    Ended,
}

/// Point-in-time view of a player, as read by the notification coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub playback_state: PlaybackState,
    pub play_when_ready: bool,
    /// Whether the player's timeline (queue) is empty
    pub timeline_empty: bool,
}

impl PlayerState {
    pub fn new(playback_state: PlaybackState, play_when_ready: bool, timeline_empty: bool) -> Self {
        Self {
            playback_state,
            play_when_ready,
            timeline_empty,
        }
    }

    /// Idle with nothing queued
    pub fn idle() -> Self {
        Self::new(PlaybackState::Idle, false, true)
    }

    /// Ready, queued and playing
    pub fn playing() -> Self {
        Self::new(PlaybackState::Ready, true, false)
    }

    /// Ready and queued but paused
    pub fn paused() -> Self {
        Self::new(PlaybackState::Ready, false, false)
    }

    /// READY or BUFFERING
    pub fn is_active(&self) -> bool {
        matches!(
            self.playback_state,
            PlaybackState::Ready | PlaybackState::Buffering
        )
    }
}

/// Kinds of player change reported to session listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerEvent {
    TimelineChanged,
    MediaItemTransition,
    PlaybackStateChanged,
    PlayWhenReadyChanged,
    IsPlayingChanged,
    PositionDiscontinuity,
    RepeatModeChanged,
    ShuffleModeChanged,
    MediaMetadataChanged,
    PlayerError,
}

/// A batch of player events delivered together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerEvents(HashSet<PlayerEvent>);

impl PlayerEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: PlayerEvent) -> bool {
        self.0.contains(&event)
    }

    pub fn contains_any(&self, events: &[PlayerEvent]) -> bool {
        events.iter().any(|event| self.0.contains(event))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<PlayerEvent> for PlayerEvents {
    fn from_iter<I: IntoIterator<Item = PlayerEvent>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[PlayerEvent; N]> for PlayerEvents {
    fn from(events: [PlayerEvent; N]) -> Self {
        events.into_iter().collect()
    }
}
