//! Command implementations for extfile-cli

pub mod convert;
pub mod node;
pub mod status;
pub mod sync;

pub use convert::run_convert;
pub use node::{run_remove, run_rename};
pub use status::run_status;
pub use sync::{run_export, run_sync};
