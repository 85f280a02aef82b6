//! URL handling module for List-Harvest
//!
//! This module turns page indices into URLs, reads page indices back out of
//! pagination hrefs, and resolves relative links found inside item blocks.

mod resolve;
mod template;

pub use resolve::resolve_link;
pub use template::PageUrlTemplate;
