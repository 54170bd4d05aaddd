//! Notification payloads and the provider contract
//!
//! A [`NotificationProvider`] renders the notification for a session. It may
//! answer synchronously and may later deliver a better version (for example
//! once artwork has loaded) through the [`NotificationCallback`] it was given.
//! Late deliveries are tagged with the sequence number of the request, so the
//! coordinator can drop renders that have since been superseded.

use std::sync::Arc;

use media_session::{Extras, MediaSession, SessionCommand, SessionId};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::config::{DEFAULT_CHANNEL_ID, DEFAULT_NOTIFICATION_ID};
use crate::worker::Command;

/// Extras key holding the platform session token
pub const EXTRA_MEDIA_SESSION: &str = "android.mediaSession";

/// Platform id of a posted notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NotificationId(pub i32);

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Player commands a notification action can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerCommand {
    PlayPause,
    SeekToPrevious,
    SeekToNext,
    Stop,
}

/// What tapping an action does
#[derive(Debug, Clone, PartialEq)]
pub enum ActionIntent {
    Player(PlayerCommand),
    Custom { action: String, extras: Extras },
}

/// A tappable action in a notification
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationAction {
    pub session_id: SessionId,
    pub icon: Option<String>,
    pub title: String,
    pub intent: ActionIntent,
}

/// A button of a session's custom layout
#[derive(Debug, Clone, PartialEq)]
pub struct CommandButton {
    pub session_command: Option<SessionCommand>,
    pub display_name: String,
    pub icon: Option<String>,
    pub extras: Extras,
    pub enabled: bool,
}

impl CommandButton {
    /// Enabled button running a custom session command
    pub fn custom(command: SessionCommand, display_name: impl Into<String>) -> Self {
        Self {
            session_command: Some(command),
            display_name: display_name.into(),
            icon: None,
            extras: Extras::new(),
            enabled: true,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Rendered platform notification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notification {
    pub channel_id: String,
    pub title: Option<String>,
    pub text: Option<String>,
    pub actions: Vec<NotificationAction>,
    pub extras: Extras,
    pub ongoing: bool,
}

impl Notification {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.actions.push(action);
        self
    }
}

/// A notification together with the id it is posted under
#[derive(Debug, Clone, PartialEq)]
pub struct MediaNotification {
    pub notification_id: NotificationId,
    pub notification: Notification,
}

impl MediaNotification {
    pub fn new(notification_id: NotificationId, notification: Notification) -> Self {
        Self {
            notification_id,
            notification,
        }
    }
}

/// Builds the actions placed in a notification
pub trait ActionFactory: Send + Sync + 'static {
    fn media_action(
        &self,
        session: &dyn MediaSession,
        icon: Option<&str>,
        title: &str,
        command: PlayerCommand,
    ) -> NotificationAction;

    fn custom_action(
        &self,
        session: &dyn MediaSession,
        icon: Option<&str>,
        title: &str,
        action: &str,
        extras: &Extras,
    ) -> NotificationAction;

    /// Action for a custom layout button, if the button runs a custom command
    fn custom_action_from_button(
        &self,
        session: &dyn MediaSession,
        button: &CommandButton,
    ) -> Option<NotificationAction> {
        let command = button.session_command.as_ref().filter(|c| c.is_custom())?;
        Some(self.custom_action(
            session,
            button.icon.as_deref(),
            &button.display_name,
            &command.custom_action,
            &command.extras,
        ))
    }
}

/// Plain action factory producing intents addressed to the session
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultActionFactory;

impl ActionFactory for DefaultActionFactory {
    fn media_action(
        &self,
        session: &dyn MediaSession,
        icon: Option<&str>,
        title: &str,
        command: PlayerCommand,
    ) -> NotificationAction {
        NotificationAction {
            session_id: session.id().clone(),
            icon: icon.map(str::to_string),
            title: title.to_string(),
            intent: ActionIntent::Player(command),
        }
    }

    fn custom_action(
        &self,
        session: &dyn MediaSession,
        icon: Option<&str>,
        title: &str,
        action: &str,
        extras: &Extras,
    ) -> NotificationAction {
        NotificationAction {
            session_id: session.id().clone(),
            icon: icon.map(str::to_string),
            title: title.to_string(),
            intent: ActionIntent::Custom {
                action: action.to_string(),
                extras: extras.clone(),
            },
        }
    }
}

/// Handle a provider uses to deliver a notification later
#[derive(Clone)]
pub struct NotificationCallback {
    sequence: u64,
    session_id: SessionId,
    commands: mpsc::UnboundedSender<Command>,
}

impl NotificationCallback {
    pub(crate) fn new(
        sequence: u64,
        session_id: SessionId,
        commands: mpsc::UnboundedSender<Command>,
    ) -> Self {
        Self {
            sequence,
            session_id,
            commands,
        }
    }

    /// Sequence number of the render request this callback belongs to
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Deliver an updated notification; dropped if it is no longer the latest
    pub fn on_notification_changed(&self, notification: MediaNotification) {
        let command = Command::NotificationUpdated {
            sequence: self.sequence,
            session_id: self.session_id.clone(),
            notification,
        };
        if self.commands.send(command).is_err() {
            tracing::debug!(
                "Notification for {} arrived after the coordinator stopped",
                self.session_id
            );
        }
    }
}

impl std::fmt::Debug for NotificationCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCallback")
            .field("sequence", &self.sequence)
            .field("session_id", &self.session_id)
            .finish()
    }
}

/// Renders notifications for sessions
pub trait NotificationProvider: Send + Sync + 'static {
    /// Render a notification now, optionally delivering a newer one later
    fn create_notification(
        &self,
        session: &Arc<dyn MediaSession>,
        custom_layout: &[CommandButton],
        action_factory: &dyn ActionFactory,
        callback: NotificationCallback,
    ) -> MediaNotification;

    /// Handle a custom action before it is forwarded to the session
    ///
    /// Returning `true` consumes the action.
    fn handle_custom_command(
        &self,
        _session: &Arc<dyn MediaSession>,
        _action: &str,
        _extras: &Extras,
    ) -> bool {
        false
    }
}

/// Provider rendering a minimal notification synchronously
#[derive(Debug, Clone)]
pub struct DefaultNotificationProvider {
    notification_id: NotificationId,
    channel_id: String,
}

impl DefaultNotificationProvider {
    pub fn new(notification_id: i32, channel_id: impl Into<String>) -> Self {
        Self {
            notification_id: NotificationId(notification_id),
            channel_id: channel_id.into(),
        }
    }
}

impl Default for DefaultNotificationProvider {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_ID, DEFAULT_CHANNEL_ID)
    }
}

impl NotificationProvider for DefaultNotificationProvider {
    fn create_notification(
        &self,
        session: &Arc<dyn MediaSession>,
        custom_layout: &[CommandButton],
        action_factory: &dyn ActionFactory,
        _callback: NotificationCallback,
    ) -> MediaNotification {
        let player = session.player_state();
        let mut notification = Notification::new(self.channel_id.clone())
            .with_title(session.id().as_str())
            .with_action(action_factory.media_action(
                &**session,
                None,
                if player.play_when_ready { "Pause" } else { "Play" },
                PlayerCommand::PlayPause,
            ));

        notification.actions.extend(
            custom_layout
                .iter()
                .filter(|button| button.enabled)
                .filter_map(|button| action_factory.custom_action_from_button(&**session, button)),
        );
        notification.ongoing = player.play_when_ready;

        MediaNotification::new(self.notification_id, notification)
    }
}
