use crate::config::Config;
use crate::dialog::DialogState;
use crate::error::RenameError;
use crate::record::RunRecord;
use crate::renamer::Renamed;
use serde_json::Value;
use std::path::Path;

// ANSI color codes
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";
pub const RED: &str = "\x1b[31m";
pub const GRAY: &str = "\x1b[90m";

pub fn print_error(msg: &str) {
    eprintln!("{RED}{BOLD}Error:{RESET} {}", msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{YELLOW}Warning:{RESET} {}", msg);
}

pub fn print_info(msg: &str) {
    println!("{CYAN}Info:{RESET} {}", msg);
}

pub fn print_renamed(renamed: &Renamed) {
    println!(
        "{GREEN}{BOLD}Renamed{RESET} {GRAY}{}{RESET}: {DIM}{}{RESET} → {BOLD}{}{RESET}",
        renamed.file_key, renamed.previous_name, renamed.pretty_name
    );
}

/// Print the terminal message for a submitted rename dialog.
pub fn print_dialog_outcome(state: &DialogState) {
    if let DialogState::Success(renamed) = state {
        print_renamed(renamed);
    } else if let Some(message) = dialog_error_message(state) {
        print_error(&message);
    }
}

/// Error text for a dialog that ended in an error state.
fn dialog_error_message(state: &DialogState) -> Option<String> {
    match state {
        DialogState::DuplicateError { input, .. } => {
            Some(RenameError::DuplicateName(input.clone()).to_string())
        }
        DialogState::Failed { message, .. } => Some(message.clone()),
        DialogState::Idle | DialogState::Editing { .. } | DialogState::Success(_) => None,
    }
}

pub fn print_record_list(dir: &Path, records: &[(String, RunRecord)]) {
    println!("{BLUE}Runs in{RESET} {}", dir.display());
    if records.is_empty() {
        println!("  {GRAY}(no runs){RESET}");
        return;
    }

    let key_width = records.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, record) in records {
        println!(
            "  {GRAY}{:<width$}{RESET}  {BOLD}{}{RESET}",
            key,
            record.pretty_name(),
            width = key_width
        );
    }
}

pub fn print_record(key: &str, record: &RunRecord) {
    println!("{BLUE}Key:{RESET}       {}", key);
    println!("{BLUE}Name:{RESET}      {BOLD}{}{RESET}", record.pretty_name());
    for (field, value) in record.fields() {
        if field == crate::record::PRETTY_NAME_FIELD {
            continue;
        }
        println!("  {GRAY}{}:{RESET} {}", field, format_value(value));
    }
}

pub fn print_config(path: &Path, storage_dir: &Path, config: &Config) {
    println!("{BLUE}Config file:{RESET}       {}", path.display());
    println!("{BLUE}Storage dir:{RESET}       {}", storage_dir.display());
    println!("{BLUE}Max name length:{RESET}   {}", config.max_name_len);
    println!("{BLUE}Serialize renames:{RESET} {}", config.serialize_renames);
    println!("{BLUE}Atomic writes:{RESET}     {}", config.atomic_writes);
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
