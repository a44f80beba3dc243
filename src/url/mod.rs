//! URL handling module for navtree
//!
//! This module provides the canonical URL form used as the crawl dedup key
//! and the same-origin test that keeps a crawl on its starting site.

mod origin;

pub use origin::{canonicalize, same_origin};
