//! CLI command implementations.
//!
//! Each submodule reads files, runs the pure analysis pipeline over them in
//! parallel and renders or persists the result.

pub mod analyze;
pub mod docs;
pub mod fix;
pub mod init;

pub use analyze::{handle_analyze, AnalyzeConfig};
pub use docs::{handle_docs, DocsConfig};
pub use fix::{handle_fix, FixConfig};
pub use init::init_config;
