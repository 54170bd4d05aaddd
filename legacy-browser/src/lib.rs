//! # Legacy Browser
//!
//! Lets legacy hierarchical browsing clients (paginated child listing,
//! single-slot search) talk to a modern [`LibrarySession`](media_session::LibrarySession)
//! whose operations return futures.
//!
//! ## Overview
//!
//! ```text
//! legacy client ──▶ LegacyBridge ──post──▶ SessionHandler ──▶ LibrarySession
//!      ▲                 │                                         │
//!      │           SearchRequestLedger ◀── search result changed ──┤
//!      │                                                           │
//!      └──── LegacyResult (exactly once) ◀── convert + truncate ◀──┘
//! ```
//!
//! Every legacy request carries a [`LegacyResult`] sink that is consumed by
//! its single terminal answer. Faults inside the session never cross back to
//! the legacy client as anything but a null result or an error response.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use legacy_browser::{legacy_result, BridgeConfig, LegacyBridge, LoggingHost};
//! use media_session::{LibrarySession, RemoteIdentity, SessionHandler};
//!
//! fn browse(session: Arc<dyn LibrarySession>) -> Result<(), Box<dyn std::error::Error>> {
//!     let handler = SessionHandler::spawn("library")?;
//!     let bridge = LegacyBridge::new(session, handler, Arc::new(LoggingHost), BridgeConfig::default());
//!
//!     let car = RemoteIdentity::new("com.example.car", 10_001);
//!     let root = bridge.get_root(&car, None).ok_or("no root")?;
//!
//!     let (sink, response) = legacy_result();
//!     bridge.load_children(&car, &root.root_id, None, sink);
//!     if let Some(items) = response.recv().and_then(|r| r.into_value()) {
//!         println!("{} children", items.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod browser_item;
mod callback;
pub mod config;
pub mod controllers;
mod dispatch;
pub mod error;
pub mod host;
pub mod ledger;
pub mod options;
pub mod response;

// Re-export main types for convenience
pub use bridge::LegacyBridge;
pub use browser_item::{BrowserItem, BrowserRoot, MediaDescription, FLAG_BROWSABLE, FLAG_PLAYABLE};
pub use config::BridgeConfig;
pub use controllers::{ControllerCallback, ControllerInfo, ControllerRegistry};
pub use error::{BridgeError, Result};
pub use host::{LegacyBrowserHost, LoggingHost};
pub use ledger::{PendingSearchRequest, SearchRequestLedger};
pub use response::{legacy_result, LegacyResponse, LegacyResult, ResponseHandle};
