//! Decoding of legacy option bundles
//!
//! Legacy clients pass pagination and library hints as loosely typed extras.
//! This module turns them into page windows and [`LibraryParams`], and turns
//! session params back into root hints.

use media_session::{Extras, ExtrasError, LibraryParams};

/// Page index requested by a legacy client
pub const EXTRA_PAGE: &str = "android.media.browse.extra.PAGE";

/// Page size requested by a legacy client
pub const EXTRA_PAGE_SIZE: &str = "android.media.browse.extra.PAGE_SIZE";

/// Root hint asking for recently played items
pub const EXTRA_RECENT: &str = "android.service.media.extra.RECENT";

/// Root hint asking for items available offline
pub const EXTRA_OFFLINE: &str = "android.service.media.extra.OFFLINE";

/// Root hint asking for suggested items
pub const EXTRA_SUGGESTED: &str = "android.service.media.extra.SUGGESTED";

/// Root extra advertising search support
pub const EXTRA_SEARCH_SUPPORTED: &str = "android.media.browse.SEARCH_SUPPORTED";

/// A validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i32,
    pub page_size: i32,
}

impl PageRequest {
    /// Accept only `page >= 0` and `page_size > 0`
    pub fn new(page: i32, page_size: i32) -> Option<Self> {
        (page >= 0 && page_size > 0).then_some(Self { page, page_size })
    }

    /// Everything, in one page
    pub fn unbounded(page_size: i32) -> Self {
        Self { page: 0, page_size }
    }
}

/// Page window for a children request
///
/// Missing keys read as `0`, so a bundle without a page size never paginates.
/// A malformed bundle is treated the same as no pagination.
pub fn children_page(options: Option<&Extras>) -> Option<PageRequest> {
    let options = options?;
    match read_page(options, 0) {
        Ok((page, page_size)) => PageRequest::new(page, page_size),
        Err(e) => {
            tracing::debug!("Ignoring malformed pagination options: {}", e);
            None
        }
    }
}

/// Page window for a search result request
///
/// Missing keys read as `-1`. Out of range values fall back to the unbounded
/// window; a type mismatch is returned to the caller.
pub fn search_page(
    extras: Option<&Extras>,
    unbounded_page_size: i32,
) -> Result<PageRequest, ExtrasError> {
    let Some(extras) = extras else {
        return Ok(PageRequest::unbounded(unbounded_page_size));
    };

    let (page, page_size) = read_page(extras, -1)?;
    Ok(PageRequest::new(page, page_size)
        .unwrap_or_else(|| PageRequest::unbounded(unbounded_page_size)))
}

fn read_page(extras: &Extras, missing: i32) -> Result<(i32, i32), ExtrasError> {
    let page = extras.get_int_or(EXTRA_PAGE, missing)?;
    let page_size = extras.get_int_or(EXTRA_PAGE_SIZE, missing)?;
    Ok((page, page_size))
}

/// Convert a legacy bundle into library params
///
/// The hint flags read as `false` when absent or malformed; the whole bundle
/// is carried along as the params' extras.
pub fn to_library_params(extras: Option<&Extras>) -> Option<LibraryParams> {
    let extras = extras?;
    let flag = |key: &str| extras.get_bool(key).ok().flatten().unwrap_or(false);

    Some(
        LibraryParams::new()
            .recent(flag(EXTRA_RECENT))
            .offline(flag(EXTRA_OFFLINE))
            .suggested(flag(EXTRA_SUGGESTED))
            .with_extras(extras.clone()),
    )
}

/// Convert library params into legacy root hints
pub fn to_root_hints(params: &LibraryParams) -> Extras {
    let mut hints = params.extras.clone();
    hints.put_bool(EXTRA_RECENT, params.recent);
    hints.put_bool(EXTRA_OFFLINE, params.offline);
    hints.put_bool(EXTRA_SUGGESTED, params.suggested);
    hints
}
