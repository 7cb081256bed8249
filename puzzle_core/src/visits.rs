//! Page-visitation log.
//!
//! Collaborator pages append their own path on load; the ending gate reads
//! the log to derive the understanding requirement. No component other than
//! the host ever writes here.

use crate::storage::{self, keys, ProgressStore};

/// Record a page visit. Paths are deduplicated; returns true on the first
/// visit to a path.
pub fn record_page_visit(store: &mut dyn ProgressStore, path: &str) -> bool {
    storage::append_unique(store, keys::VISITED_PAGES, path)
}

/// All visited page paths, in first-visit order.
pub fn visited_pages(store: &dyn ProgressStore) -> Vec<String> {
    storage::read_list(store, keys::VISITED_PAGES)
}

/// Check that every given page has been visited. True for an empty set.
pub fn has_visited_all<'a>(
    store: &dyn ProgressStore,
    pages: impl IntoIterator<Item = &'a str>,
) -> bool {
    let visited = visited_pages(store);
    pages
        .into_iter()
        .all(|page| visited.iter().any(|seen| seen == page))
}
