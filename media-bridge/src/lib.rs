//! # Media Bridge
//!
//! A sync-first media library service. It lets legacy hierarchical browsing
//! clients talk to modern, future-based library sessions, and it decides when
//! the hosting service has to run in the foreground.
//!
//! ```rust,ignore
//! use media_bridge::prelude::*;
//!
//! media_bridge::logging::init_logging_from_env()?;
//!
//! let service = MediaLibraryService::builder()
//!     .with_config(ServiceConfig::from_json_file("media-bridge.json")?)
//!     .with_foreground_service(platform)
//!     .build()?;
//!
//! let bridge = service.add_session(library)?;
//!
//! // Legacy client asks for the first page of the root's children
//! let (result, response) = legacy_result();
//! bridge.load_children(&client, "root", Some(page_extras), result);
//! let children = response.recv();
//! ```
//!
//! ## Architecture
//!
//! ```text
//! media-bridge (MediaLibraryService)
//!     ├── legacy-browser (LegacyBridge per session)
//!     │       └── SessionHandler ──▶ LibrarySession futures
//!     └── notification-manager (one coordinator worker)
//!             └── LocalLinkFactory ──▶ session events, custom commands
//!     ↓
//! media-session (data model and contracts)
//! ```

pub mod config;
pub mod error;
pub mod link;
pub mod logging;
pub mod service;

// Re-export main types for convenience
pub use config::ServiceConfig;
pub use error::{Result, ServiceError};
pub use link::LocalLinkFactory;
pub use service::{MediaLibraryService, MediaLibraryServiceBuilder};

// Re-export the component crates
pub use legacy_browser;
pub use media_session;
pub use notification_manager;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{MediaLibraryService, ServiceConfig, ServiceError};
    pub use legacy_browser::{
        legacy_result, BridgeConfig, BrowserItem, BrowserRoot, LegacyBridge, LegacyBrowserHost,
        LegacyResponse,
    };
    pub use media_session::prelude::*;
    pub use notification_manager::{
        CommandButton, ForegroundService, ForegroundState, NotificationConfig, NotificationId,
        NotificationProvider, PlatformDescriptor,
    };
}
