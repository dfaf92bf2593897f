//! Command line front end for ngramlab: dataset loading and the chat session.
//!
//! The `clap` surface lives behind the `cli` feature, and so do its tests:
//! run them with `cargo test -p ngramlab-cli --features cli` (`cargo test
//! --workspace` enables the feature through the root binary).

#[cfg(feature = "cli")]
pub mod cli;
pub mod dataset;
pub mod session;

#[cfg(feature = "cli")]
pub use cli::*;
pub use dataset::*;
pub use session::*;
