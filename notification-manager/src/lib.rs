//! # Notification Manager
//!
//! Coordinates the media notification of a background media service and
//! decides when the service must run in the foreground.
//!
//! ## Overview
//!
//! Sessions register with a [`NotificationManager`]. For each one the
//! coordinator opens a control link, listens for player and layout events and
//! asks a [`NotificationProvider`] to render the notification. The platform is
//! promoted to the foreground while at least one session needs it and demoted
//! only after re-checking every registered session.
//!
//! ```text
//! NotificationManager (sync handle)
//!        │ Command
//!        ▼
//! worker thread ── NotificationCoordinator ──▶ ForegroundService
//!        ▲                 │
//!        │                 └── NotificationProvider ── NotificationCallback ─┐
//!        └─────────── SessionEventSender / late renders ◀──────────────────────┘
//! ```
//!
//! Renders carry a sequence number. A late render is applied only while its
//! number is the latest issued and its session is still registered.
//!
//! ## Platform differences
//!
//! Version-specific behaviour is captured once in a [`ForegroundPolicy`],
//! by default a [`VersionedPolicy`] built from the configured
//! [`PlatformDescriptor`].

pub mod config;
pub mod coordinator;
pub mod error;
pub mod link;
pub mod manager;
pub mod notification;
pub mod platform;
pub mod policy;
pub mod sequence;
mod worker;

// Re-export main types for convenience
pub use config::NotificationConfig;
pub use coordinator::{CoordinatorSnapshot, ForegroundState};
pub use error::{NotificationError, Result};
pub use link::{ControllerLinkFactory, SessionController, SessionEvent, SessionEventSender};
pub use manager::{NotificationManager, NotificationManagerBuilder};
pub use notification::{
    ActionFactory, ActionIntent, CommandButton, DefaultActionFactory,
    DefaultNotificationProvider, MediaNotification, Notification, NotificationAction,
    NotificationCallback, NotificationId, NotificationProvider, PlayerCommand,
};
pub use platform::{
    ForegroundService, ForegroundServiceType, PlatformDescriptor, PlatformError,
    StopForegroundMode,
};
pub use policy::{should_show_notification, ForegroundPolicy, VersionedPolicy};
pub use sequence::NotificationSequence;
