//! Integration tests for the legacy bridge.
//!
//! These tests drive a real session handler thread with a spy session and
//! check both what reaches the session and what the legacy caller receives.


use std::sync::atomic::Ordering;
use std::time::Duration;

use legacy_browser::options::{
    EXTRA_PAGE, EXTRA_PAGE_SIZE, EXTRA_RECENT, EXTRA_SEARCH_SUPPORTED,
};
use legacy_browser::{legacy_result, BridgeConfig, BridgeError, BrowserItem, LegacyResponse};
use media_session::command::{
    COMMAND_CODE_LIBRARY_GET_CHILDREN, COMMAND_CODE_LIBRARY_GET_LIBRARY_ROOT,
    COMMAND_CODE_LIBRARY_SEARCH, COMMAND_CODE_LIBRARY_SUBSCRIBE, COMMAND_CODE_LIBRARY_UNSUBSCRIBE,
};
use media_session::{Extras, LibraryParams, MediaItem, SessionCommands};
use mock_session::{identity, numbered_items, RootBehavior, TestBridge};

const WAIT: Duration = Duration::from_secs(5);

fn page_extras(page: i32, page_size: i32) -> Extras {
    Extras::new()
        .with_int(EXTRA_PAGE, page)
        .with_int(EXTRA_PAGE_SIZE, page_size)
}

fn ids(items: &[BrowserItem]) -> Vec<&str> {
    items.iter().map(|item| item.media_id.as_str()).collect()
}

// ============================================================================
// Connection and root
// ============================================================================

#[test]
fn test_get_root_connects_and_advertises_search() {
    let test = TestBridge::new();
    let params = LibraryParams::new().recent(true);
    test.session.set_root(RootBehavior::Item(
        MediaItem::new("library-root").browsable(true),
        Some(params),
    ));
    let car = identity("com.example.car");

    let root = test.bridge.get_root(&car, None).unwrap();

    assert_eq!(root.root_id, "library-root");
    let extras = root.extras.unwrap();
    assert_eq!(extras.get_bool(EXTRA_SEARCH_SUPPORTED), Ok(Some(true)));
    assert_eq!(extras.get_bool(EXTRA_RECENT), Ok(Some(true)));
    assert!(test.bridge.registry().is_connected(&car));
    assert_eq!(test.session.connect_count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_get_root_without_search_permission() {
    let test = TestBridge::new();
    test.session.set_commands(Some(
        SessionCommands::library_defaults().without_code(COMMAND_CODE_LIBRARY_SEARCH),
    ));
    let car = identity("com.example.car");

    let root = test.bridge.get_root(&car, None).unwrap();
    assert_eq!(
        root.extras.unwrap().get_bool(EXTRA_SEARCH_SUPPORTED),
        Ok(Some(false))
    );
}

#[test]
fn test_get_root_without_permission_returns_none_but_stays_connected() {
    let test = TestBridge::new();
    test.session.set_commands(Some(
        SessionCommands::library_defaults().without_code(COMMAND_CODE_LIBRARY_GET_LIBRARY_ROOT),
    ));
    let car = identity("com.example.car");

    assert!(test.bridge.get_root(&car, None).is_none());
    assert!(test.bridge.registry().is_connected(&car));
    assert_eq!(test.session.root_count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_rejected_controller_gets_no_root() {
    let test = TestBridge::new();
    test.session.set_commands(None);
    let car = identity("com.example.car");

    assert!(test.bridge.get_root(&car, None).is_none());
    assert!(!test.bridge.registry().is_connected(&car));
    assert!(matches!(
        test.bridge.connect(car, None),
        Err(BridgeError::Rejected(_))
    ));
}

#[test]
fn test_get_root_fault_degrades_to_default_root() {
    let test = TestBridge::new();
    test.session.set_root(RootBehavior::Fault);

    let root = test.bridge.get_root(&identity("com.example.car"), None).unwrap();
    assert_eq!(root.root_id, BridgeConfig::default().default_root_id);
    assert!(root.extras.is_none());
}

#[test]
fn test_get_root_null_payload_degrades_to_default_root() {
    let config = BridgeConfig::default().with_default_root_id("fallback");
    let test = TestBridge::with_config(config);
    test.session.set_root(RootBehavior::Empty);

    let root = test.bridge.get_root(&identity("com.example.car"), None).unwrap();
    assert_eq!(root.root_id, "fallback");
}

#[test]
fn test_connect_twice_is_rejected() {
    let test = TestBridge::new();
    let car = identity("com.example.car");
    test.bridge.connect(car.clone(), None).unwrap();
    assert!(matches!(
        test.bridge.connect(car, None),
        Err(BridgeError::AlreadyConnected(_))
    ));
}

// ============================================================================
// Subscribe / unsubscribe
// ============================================================================

#[test]
fn test_subscribe_without_permission_never_reaches_session() {
    let test = TestBridge::new();
    test.session.set_commands(Some(
        SessionCommands::library_defaults()
            .without_code(COMMAND_CODE_LIBRARY_SUBSCRIBE)
            .without_code(COMMAND_CODE_LIBRARY_UNSUBSCRIBE),
    ));
    let car = identity("com.example.car");
    test.bridge.connect(car.clone(), None).unwrap();

    for _ in 0..5 {
        test.bridge.subscribe(&car, "albums", None);
        test.bridge.unsubscribe(&car, "albums");
    }
    test.settle();

    assert_eq!(test.session.subscribe_count.load(Ordering::SeqCst), 0);
    assert_eq!(test.session.unsubscribe_count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_subscribe_dispatches_and_ignores_empty_id() {
    let test = TestBridge::new();
    let car = identity("com.example.car");
    test.bridge.connect(car.clone(), None).unwrap();

    test.bridge.subscribe(&car, "", None);
    test.bridge.unsubscribe(&car, "");
    test.settle();
    assert_eq!(test.session.subscribe_count.load(Ordering::SeqCst), 0);
    assert_eq!(test.session.unsubscribe_count.load(Ordering::SeqCst), 0);

    test.bridge.subscribe(&car, "albums", None);
    test.bridge.unsubscribe(&car, "albums");
    test.settle();
    assert_eq!(test.session.subscribe_count.load(Ordering::SeqCst), 1);
    assert_eq!(test.session.unsubscribe_count.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Load children / load item
// ============================================================================

#[test]
fn test_load_children_paginated() {
    let test = TestBridge::new();
    test.session.set_items(numbered_items(10));
    let car = identity("com.example.car");
    test.bridge.connect(car.clone(), None).unwrap();

    let (sink, handle) = legacy_result();
    test.bridge
        .load_children(&car, "albums", Some(page_extras(1, 3)), sink);
    assert!(handle.is_detached());

    let items = handle.recv_timeout(WAIT).unwrap().into_value().unwrap();
    assert_eq!(ids(&items), vec!["item-3", "item-4", "item-5"]);

    let call = test.session.last_children_call().unwrap();
    assert_eq!((call.page, call.page_size), (1, 3));
    assert!(call.params.is_some());
}

#[test]
fn test_load_children_without_pagination_requests_everything() {
    let test = TestBridge::new();
    test.session.set_items(numbered_items(4));
    let car = identity("com.example.car");
    test.bridge.connect(car.clone(), None).unwrap();

    for options in [
        None,
        Some(Extras::new()),
        Some(page_extras(-1, 10)),
        Some(page_extras(0, 0)),
        Some(Extras::new().with_string(EXTRA_PAGE, "one").with_int(EXTRA_PAGE_SIZE, 2)),
    ] {
        let (sink, handle) = legacy_result();
        test.bridge.load_children(&car, "albums", options, sink);
        let items = handle.recv_timeout(WAIT).unwrap().into_value().unwrap();
        assert_eq!(items.len(), 4);

        let call = test.session.last_children_call().unwrap();
        assert_eq!((call.page, call.page_size), (0, i32::MAX));
        assert_eq!(call.params, None);
    }
}

#[test]
fn test_load_children_truncates_to_transaction_limit() {
    let probe = BrowserItem::from(&numbered_items(1)[0]);
    let limit = probe.serialized_size() * 3 + 1;
    let test = TestBridge::with_config(BridgeConfig::default().with_transaction_size_limit(limit));
    test.session.set_items(numbered_items(8));
    let car = identity("com.example.car");
    test.bridge.connect(car.clone(), None).unwrap();

    let (sink, handle) = legacy_result();
    test.bridge.load_children(&car, "albums", None, sink);
    let items = handle.recv_timeout(WAIT).unwrap().into_value().unwrap();

    assert_eq!(ids(&items), vec!["item-0", "item-1", "item-2"]);
}

#[test]
fn test_load_children_rejections() {
    let test = TestBridge::new();
    let car = identity("com.example.car");

    // Unknown controller: answered immediately, never detached
    let (sink, handle) = legacy_result();
    test.bridge.load_children(&car, "albums", None, sink);
    assert!(!handle.is_detached());
    assert_eq!(handle.try_recv(), Some(LegacyResponse::Error(None)));

    test.bridge.connect(car.clone(), None).unwrap();

    let (sink, handle) = legacy_result();
    test.bridge.load_children(&car, "", None, sink);
    assert!(!handle.is_detached());
    assert_eq!(handle.try_recv(), Some(LegacyResponse::Error(None)));

    assert!(test.session.children_calls.lock().is_empty());
}

#[test]
fn test_load_children_without_permission_yields_null() {
    let test = TestBridge::new();
    test.session.set_commands(Some(
        SessionCommands::library_defaults().without_code(COMMAND_CODE_LIBRARY_GET_CHILDREN),
    ));
    let car = identity("com.example.car");
    test.bridge.connect(car.clone(), None).unwrap();

    let (sink, handle) = legacy_result();
    test.bridge.load_children(&car, "albums", None, sink);
    assert_eq!(handle.recv_timeout(WAIT), Some(LegacyResponse::Result(None)));
    assert!(test.session.children_calls.lock().is_empty());
}

#[test]
fn test_load_children_fault_yields_error() {
    let test = TestBridge::new();
    test.session.set_children_fault(true);
    let car = identity("com.example.car");
    test.bridge.connect(car.clone(), None).unwrap();

    let (sink, handle) = legacy_result();
    test.bridge.load_children(&car, "albums", None, sink);
    assert_eq!(handle.recv_timeout(WAIT), Some(LegacyResponse::Error(None)));
}

#[test]
fn test_load_item() {
    let test = TestBridge::new();
    test.session.set_items(numbered_items(3));
    let car = identity("com.example.car");
    test.bridge.connect(car.clone(), None).unwrap();

    let (sink, handle) = legacy_result();
    test.bridge.load_item(&car, "item-2", sink);
    let item = handle.recv_timeout(WAIT).unwrap().into_value().unwrap();
    assert_eq!(item.media_id, "item-2");
    assert!(item.is_playable());

    // Error result codes become a null result
    let (sink, handle) = legacy_result();
    test.bridge.load_item(&car, "missing", sink);
    assert_eq!(handle.recv_timeout(WAIT), Some(LegacyResponse::Result(None)));

    let (sink, handle) = legacy_result();
    test.bridge.load_item(&car, "", sink);
    assert_eq!(handle.try_recv(), Some(LegacyResponse::Error(None)));
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn test_search_fan_out_matches_only_same_identity() {
    let test = TestBridge::new();
    test.session.set_items(numbered_items(10));
    let a = identity("com.example.a");
    let b = identity("com.example.b");
    test.bridge.connect(a.clone(), None).unwrap();
    test.bridge.connect(b.clone(), None).unwrap();

    let (first, first_handle) = legacy_result();
    let (second, second_handle) = legacy_result();
    let (other, other_handle) = legacy_result();
    test.bridge.search(&a, "jazz", Some(page_extras(0, 2)), first);
    test.bridge.search(&a, "jazz", Some(page_extras(1, 4)), second);
    test.bridge.search(&b, "jazz", None, other);
    test.settle();

    assert_eq!(test.session.search_count.load(Ordering::SeqCst), 3);
    assert!(first_handle.try_recv().is_none());
    assert_eq!(test.bridge.pending_search_count(&a), 2);

    test.bridge.notify_search_result_changed(&a, "jazz", 10, None);

    let first_items = first_handle.recv_timeout(WAIT).unwrap().into_value().unwrap();
    let second_items = second_handle.recv_timeout(WAIT).unwrap().into_value().unwrap();
    assert_eq!(ids(&first_items), vec!["item-0", "item-1"]);
    assert_eq!(ids(&second_items), vec!["item-4", "item-5", "item-6", "item-7"]);

    assert_eq!(test.bridge.pending_search_count(&a), 0);
    assert_eq!(test.bridge.pending_search_count(&b), 1);
    assert!(other_handle.try_recv().is_none());
}

#[test]
fn test_search_malformed_extras_only_fails_that_request() {
    let test = TestBridge::new();
    test.session.set_items(numbered_items(3));
    let a = identity("com.example.a");
    test.bridge.connect(a.clone(), None).unwrap();

    let (bad, bad_handle) = legacy_result();
    let (good, good_handle) = legacy_result();
    let malformed = Extras::new().with_bool(EXTRA_PAGE, true);
    test.bridge.search(&a, "rock", Some(malformed), bad);
    test.bridge.search(&a, "rock", None, good);
    test.settle();

    test.bridge.notify_search_result_changed(&a, "rock", 3, None);

    assert_eq!(bad_handle.recv_timeout(WAIT), Some(LegacyResponse::Result(None)));
    let items = good_handle.recv_timeout(WAIT).unwrap().into_value().unwrap();
    assert_eq!(items.len(), 3);

    let calls = test.session.search_result_calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!((calls[0].page, calls[0].page_size), (0, i32::MAX));
}

#[test]
fn test_search_rejections() {
    let test = TestBridge::new();
    let a = identity("com.example.a");

    let (sink, handle) = legacy_result();
    test.bridge.search(&a, "jazz", None, sink);
    assert_eq!(handle.try_recv(), Some(LegacyResponse::Error(None)));

    test.bridge.connect(a.clone(), None).unwrap();
    let (sink, handle) = legacy_result();
    test.bridge.search(&a, "", None, sink);
    assert_eq!(handle.try_recv(), Some(LegacyResponse::Error(None)));

    test.settle();
    assert_eq!(test.session.search_count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_disconnect_abandons_pending_searches() {
    let test = TestBridge::new();
    let a = identity("com.example.a");
    test.bridge.connect(a.clone(), None).unwrap();

    let (sink, handle) = legacy_result();
    test.bridge.search(&a, "jazz", None, sink);
    test.settle();
    assert_eq!(test.bridge.pending_search_count(&a), 1);

    assert!(test.bridge.disconnect(&a));
    assert!(!test.bridge.disconnect(&a));
    assert!(handle.recv_timeout(WAIT).is_none());

    // Late notifications for the vanished client are ignored
    test.bridge.notify_search_result_changed(&a, "jazz", 1, None);
    test.settle();
    assert!(test.session.search_result_calls.lock().is_empty());
}

#[test]
fn test_disconnect_before_search_runs_skips_session() {
    let test = TestBridge::new();
    let a = identity("com.example.a");
    test.bridge.connect(a.clone(), None).unwrap();

    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    test.bridge
        .handler()
        .post(move || {
            let _ = release_rx.recv_timeout(WAIT);
        })
        .unwrap();

    let (sink, handle) = legacy_result();
    test.bridge.search(&a, "jazz", None, sink);
    assert!(test.bridge.disconnect(&a));
    release_tx.send(()).unwrap();
    test.settle();

    assert_eq!(test.session.search_count.load(Ordering::SeqCst), 0);
    assert!(handle.recv_timeout(WAIT).is_none());
}

// ============================================================================
// Custom actions and children-changed notifications
// ============================================================================

#[test]
fn test_custom_action() {
    let test = TestBridge::new();
    let a = identity("com.example.a");
    test.bridge.connect(a.clone(), None).unwrap();

    let (sink, handle) = legacy_result();
    test.bridge
        .custom_action(&a, "like", Extras::new().with_int("rating", 5), sink);
    let extras = handle.recv_timeout(WAIT).unwrap().into_value().unwrap();
    assert_eq!(extras.get_string("handled"), Ok(Some("like")));
    assert_eq!(extras.get_int("rating"), Ok(Some(5)));

    let (sink, handle) = legacy_result();
    test.bridge.custom_action(&a, "unknown", Extras::new(), sink);
    assert_eq!(handle.recv_timeout(WAIT), Some(LegacyResponse::Error(None)));

    let (sink, handle) = legacy_result();
    test.bridge.custom_action(&a, "explode", Extras::new(), sink);
    assert_eq!(handle.recv_timeout(WAIT), Some(LegacyResponse::Error(None)));

    assert_eq!(test.session.custom_count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_children_changed_reaches_host() {
    let test = TestBridge::new();
    let a = identity("com.example.a");
    test.bridge.connect(a.clone(), None).unwrap();

    let params = LibraryParams::new().with_extras(Extras::new().with_string("reason", "sync"));
    test.bridge
        .notify_children_changed(Some(&a), "albums", 4, Some(&params));
    test.bridge.notify_children_changed(None, "playlists", 2, None);
    test.bridge
        .notify_children_changed(Some(&identity("com.example.gone")), "albums", 1, None);

    let changes = test.host.changes.lock();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].target, Some(a));
    assert_eq!(changes[0].parent_id, "albums");
    assert_eq!(changes[0].extras.get_string("reason"), Ok(Some("sync")));
    assert_eq!(changes[1].target, None);
    assert_eq!(changes[1].parent_id, "playlists");
    assert!(changes[1].extras.is_empty());
}

#[test]
fn test_stopped_handler_still_answers_requests() {
    let test = TestBridge::new();
    let a = identity("com.example.a");
    test.bridge.connect(a.clone(), None).unwrap();
    test.session.set_items(numbered_items(3));
    test.bridge.handler().shutdown();

    let (sink, handle) = legacy_result();
    test.bridge.load_children(&a, "root", None, sink);
    assert_eq!(handle.recv_timeout(WAIT), Some(LegacyResponse::Error(None)));

    let (sink, handle) = legacy_result();
    test.bridge.load_item(&a, "item-1", sink);
    assert_eq!(handle.recv_timeout(WAIT), Some(LegacyResponse::Error(None)));

    let (sink, handle) = legacy_result();
    test.bridge.custom_action(&a, "like", Extras::new(), sink);
    assert_eq!(handle.recv_timeout(WAIT), Some(LegacyResponse::Error(None)));
}
