//! Version-dependent foreground policy
//!
//! Chosen once from the [`PlatformDescriptor`] and injected into the
//! coordinator, so no other code branches on the platform version.

use media_session::{PlaybackState, PlayerState};

use crate::platform::{ForegroundServiceType, PlatformDescriptor, StopForegroundMode};

/// Decisions that differ between platform versions
pub trait ForegroundPolicy: Send + Sync + 'static {
    /// Whether a player in this state keeps the service in the foreground
    fn should_run_in_foreground(&self, player: &PlayerState) -> bool;

    /// Stop call to use, given whether notifications should be removed
    fn stop_mode(&self, remove_notification: bool) -> StopForegroundMode;

    /// Service type to declare when promoting, if the platform needs one
    fn foreground_service_type(&self) -> Option<ForegroundServiceType>;

    /// Whether the session token is attached to notification extras
    fn attaches_session_token(&self) -> bool;
}

/// Whether a session currently warrants a notification at all
///
/// The player must have something queued and must not be idle.
pub fn should_show_notification(player: &PlayerState) -> bool {
    !player.timeline_empty && player.playback_state != PlaybackState::Idle
}

/// Policy derived from the platform api level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionedPolicy {
    platform: PlatformDescriptor,
}

impl VersionedPolicy {
    pub fn from_descriptor(platform: &PlatformDescriptor) -> Self {
        Self {
            platform: *platform,
        }
    }
}

impl ForegroundPolicy for VersionedPolicy {
    fn should_run_in_foreground(&self, player: &PlayerState) -> bool {
        if self.platform.at_least(30) {
            // Newer platforms do not reliably undo an unwanted promotion, so
            // stay in the foreground whenever the player is active
            player.is_active()
        } else {
            // Older platforms let the user dismiss a paused notification
            player.play_when_ready && player.is_active()
        }
    }

    fn stop_mode(&self, remove_notification: bool) -> StopForegroundMode {
        if self.platform.at_least(24) {
            if remove_notification {
                StopForegroundMode::Remove
            } else {
                StopForegroundMode::Detach
            }
        } else {
            // Below 21 the notification is otherwise left undismissable
            StopForegroundMode::Legacy {
                remove_notification: remove_notification || !self.platform.at_least(21),
            }
        }
    }

    fn foreground_service_type(&self) -> Option<ForegroundServiceType> {
        self.platform
            .at_least(29)
            .then_some(ForegroundServiceType::MediaPlayback)
    }

    fn attaches_session_token(&self) -> bool {
        self.platform.at_least(21)
    }
}
