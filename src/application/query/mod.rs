//! Read-side query composition over the local store.
//!
//! Queries are built with `sea_query`, joined under the active fiat currency
//! and mapped into the view structs of [`crate::domain::models::views`].

mod asset_query;
mod columns;
mod snapshot_query;

pub use asset_query::{AssetFilter, AssetQuery, AssetQueryComposer, AssetSort};
pub use snapshot_query::{SnapshotFilter, SnapshotQueryComposer, MAX_PAGE_LIMIT};

/// Escape character of every LIKE pattern built from user text
pub const LIKE_ESCAPE: char = '!';

/// Escape LIKE metacharacters so user text matches literally
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, LIKE_ESCAPE | '%' | '_') {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
