//! Headless model of the rename dialog.
//!
//! The dialog moves through a small set of states:
//!
//! ```text
//! Idle ──open──▶ Editing ──submit──▶ Success
//!                  ▲  │
//!            input │  ├──submit──▶ DuplicateError ──input──▶ Editing
//!                  │  └──submit──▶ Failed ─────────input──▶ Editing
//! ```
//!
//! `cancel` returns to `Idle` from anywhere. The front end renders whichever
//! state it is in; it never tracks the chosen name anywhere else.

use crate::config::DEFAULT_MAX_NAME_LEN;
use crate::renamer::{Renamed, RunRenamer};
use crate::storage::RecordStore;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState {
    Idle,
    Editing { file_key: String, input: String },
    DuplicateError { file_key: String, input: String },
    Failed {
        file_key: String,
        input: String,
        message: String,
    },
    Success(Renamed),
}

#[derive(Debug, Clone)]
pub struct RenameDialog {
    state: DialogState,
    max_name_len: usize,
}

impl RenameDialog {
    pub fn new(max_name_len: usize) -> Self {
        Self {
            state: DialogState::Idle,
            max_name_len,
        }
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn max_name_len(&self) -> usize {
        self.max_name_len
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, DialogState::Idle | DialogState::Success(_))
    }

    /// Start editing `file_key`, prefilled with its current name.
    pub fn open(&mut self, file_key: &str, current_name: &str) {
        self.state = DialogState::Editing {
            file_key: file_key.to_string(),
            input: self.clamp(current_name),
        };
    }

    /// Replace the text in the input field.
    ///
    /// Text beyond `max_name_len` characters is dropped, the way a length
    /// limited text field behaves. Returns `false` if no dialog is open.
    pub fn input(&mut self, text: &str) -> bool {
        let clamped = self.clamp(text);
        let file_key = match &mut self.state {
            DialogState::Editing { input, .. } => {
                *input = clamped;
                return true;
            }
            DialogState::DuplicateError { file_key, .. } | DialogState::Failed { file_key, .. } => {
                std::mem::take(file_key)
            }
            DialogState::Idle | DialogState::Success(_) => return false,
        };
        self.state = DialogState::Editing {
            file_key,
            input: clamped,
        };
        true
    }

    /// Submit the current input. Only acts while `Editing`.
    pub fn submit<S: RecordStore>(
        &mut self,
        renamer: &RunRenamer<S>,
        existing_names: &HashSet<String>,
    ) -> &DialogState {
        let editing = match &self.state {
            DialogState::Editing { file_key, input } => Some((file_key.clone(), input.clone())),
            _ => None,
        };
        let Some((file_key, input)) = editing else {
            return &self.state;
        };

        self.state = match renamer.rename(&input, &file_key, existing_names) {
            Ok(renamed) => DialogState::Success(renamed),
            Err(e) if e.is_duplicate() => DialogState::DuplicateError { file_key, input },
            Err(e) => DialogState::Failed {
                file_key,
                input,
                message: e.to_string(),
            },
        };
        &self.state
    }

    pub fn cancel(&mut self) {
        self.state = DialogState::Idle;
    }

    fn clamp(&self, text: &str) -> String {
        text.chars().take(self.max_name_len).collect()
    }
}

impl Default for RenameDialog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NAME_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{names, SpyStore};

    fn renamer() -> RunRenamer<SpyStore> {
        let spy = SpyStore::new();
        spy.insert(
            "run_001",
            br#"{"pretty_name":"Run A","duration_ms":142000}"#.to_vec(),
        );
        RunRenamer::new(spy)
    }

    #[test]
    fn test_new_dialog_is_idle() {
        let dialog = RenameDialog::default();
        assert_eq!(dialog.state(), &DialogState::Idle);
        assert_eq!(dialog.max_name_len(), 14);
        assert!(!dialog.is_open());
    }

    #[test]
    fn test_open_prefills_current_name() {
        let mut dialog = RenameDialog::default();
        dialog.open("run_001", "Run A");
        assert_eq!(
            dialog.state(),
            &DialogState::Editing {
                file_key: "run_001".to_string(),
                input: "Run A".to_string()
            }
        );
        assert!(dialog.is_open());
    }

    #[test]
    fn test_input_is_clamped_by_characters() {
        let mut dialog = RenameDialog::new(4);
        dialog.open("run_001", "");
        assert!(dialog.input("ééééé"));
        match dialog.state() {
            DialogState::Editing { input, .. } => assert_eq!(input, "éééé"),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_input_without_open_dialog_is_ignored() {
        let mut dialog = RenameDialog::default();
        assert!(!dialog.input("Run B"));
        assert_eq!(dialog.state(), &DialogState::Idle);
    }

    #[test]
    fn test_submit_success() {
        let renamer = renamer();
        let mut dialog = RenameDialog::default();
        dialog.open("run_001", "Run A");
        dialog.input("Run B");

        let state = dialog.submit(&renamer, &names(&["Run C"]));
        assert_eq!(
            state,
            &DialogState::Success(Renamed {
                file_key: "run_001".to_string(),
                previous_name: "Run A".to_string(),
                pretty_name: "Run B".to_string(),
            })
        );
        assert!(!dialog.is_open());
    }

    #[test]
    fn test_submit_duplicate_then_correct() {
        let renamer = renamer();
        let mut dialog = RenameDialog::default();
        dialog.open("run_001", "Run A");
        dialog.input("Run C");

        let state = dialog.submit(&renamer, &names(&["Run C"])).clone();
        assert!(matches!(state, DialogState::DuplicateError { ref input, .. } if input == "Run C"));
        assert_eq!(renamer.store().reads(), 0);

        assert!(dialog.input("Run D"));
        assert!(matches!(dialog.state(), DialogState::Editing { .. }));
        assert!(matches!(
            dialog.submit(&renamer, &names(&["Run C"])),
            DialogState::Success(_)
        ));
    }

    #[test]
    fn test_submit_storage_error_is_failed() {
        let renamer = renamer();
        let mut dialog = RenameDialog::default();
        dialog.open("run_404", "Ghost");

        match dialog.submit(&renamer, &HashSet::new()) {
            DialogState::Failed {
                file_key, message, ..
            } => {
                assert_eq!(file_key, "run_404");
                assert!(message.contains("run_404"));
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert!(dialog.is_open());
    }

    #[test]
    fn test_submit_outside_editing_does_nothing() {
        let renamer = renamer();
        let mut dialog = RenameDialog::default();
        assert_eq!(dialog.submit(&renamer, &HashSet::new()), &DialogState::Idle);
        assert_eq!(renamer.store().reads(), 0);
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut dialog = RenameDialog::default();
        dialog.open("run_001", "Run A");
        dialog.cancel();
        assert_eq!(dialog.state(), &DialogState::Idle);
    }
}
