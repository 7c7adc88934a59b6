pub mod catalog;
pub mod commands;
pub mod config;
pub mod dialog;
pub mod error;
pub mod output;
pub mod record;
pub mod renamer;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use dialog::{DialogState, RenameDialog};
pub use error::{RenameError, Result, RunlogError};
pub use record::RunRecord;
pub use renamer::{Renamed, RunRenamer};
pub use storage::{FileStore, RecordStore};
