//! Configuration snippets
//!
//! One directory of TOML files, each enabled or disabled by name.

mod errors;
mod repository;

pub use errors::{SnippetError, SnippetResult};
pub use repository::{
    disabled_path, enabled_path, extension, load, SnippetListing, SnippetRepository,
};
