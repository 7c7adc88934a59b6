//! Command implementations behind the `runlog` subcommands.

use crate::catalog::{load_record, load_records, names_in_use};
use crate::config::Config;
use crate::dialog::{DialogState, RenameDialog};
use crate::error::{Result, RunlogError};
use crate::output::{
    print_config, print_dialog_outcome, print_info, print_record, print_record_list,
};
use crate::renamer::RunRenamer;
use crate::storage::FileStore;
use std::path::Path;

/// `runlog list`
pub fn list_command(store: &FileStore) -> Result<()> {
    let records = load_records(store)?;
    print_record_list(store.dir(), &records);
    Ok(())
}

/// `runlog show <key>`
pub fn show_command(store: &FileStore, key: &str) -> Result<()> {
    let record = load_record(store, key)?;
    print_record(key, &record);
    Ok(())
}

/// `runlog rename <key> <name>`
///
/// Returns the final dialog state; anything but `Success` means the run was
/// left untouched. `Idle` means there was nothing to do.
pub fn rename_command(
    store: FileStore,
    config: &Config,
    key: &str,
    new_name: &str,
) -> Result<DialogState> {
    let current = load_record(&store, key)?;

    let len = new_name.chars().count();
    if len > config.max_name_len {
        return Err(RunlogError::NameTooLong {
            len,
            max: config.max_name_len,
        });
    }
    if new_name == current.pretty_name() {
        print_info(&format!("Run '{}' is already named \"{}\"", key, new_name));
        return Ok(DialogState::Idle);
    }

    let existing = names_in_use(&store, key)?;
    let renamer = if config.serialize_renames {
        RunRenamer::serialized(store)
    } else {
        RunRenamer::new(store)
    };

    let mut dialog = RenameDialog::new(config.max_name_len);
    dialog.open(key, current.pretty_name());
    dialog.input(new_name);
    let state = dialog.submit(&renamer, &existing).clone();
    print_dialog_outcome(&state);
    Ok(state)
}

/// `runlog config`
pub fn config_command(config_path: &Path, store: &FileStore, config: &Config) -> Result<()> {
    print_config(config_path, store.dir(), config);
    Ok(())
}
