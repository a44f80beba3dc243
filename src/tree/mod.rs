//! Navigation tree model
//!
//! [`CrawlNode`] is the crawler's output; [`find_best_match`] looks pages up
//! by keyword and reports how to reach them from the root.

mod navigate;
mod node;

pub use navigate::{find_best_match, similarity, NavigationMatch};
pub use node::CrawlNode;
