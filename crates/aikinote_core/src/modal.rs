//! Open/closed state for the page list's dialogs.
//!
//! Edit and delete dialogs carry their payload inside the open flag, so a
//! dialog can never be open without a payload or closed with a stale one.

use crate::models::page::TrainingPageRecord;

/// Dialog state owned by the page list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalState {
    create_open: bool,
    editing: Option<TrainingPageRecord>,
    delete_target: Option<String>,
    tag_manager_open: bool,
}

impl ModalState {
    pub fn open_create(&mut self) {
        self.create_open = true;
    }

    pub fn close_create(&mut self) {
        self.create_open = false;
    }

    pub fn is_create_open(&self) -> bool {
        self.create_open
    }

    /// Open the edit dialog for `record`.
    pub fn open_edit(&mut self, record: TrainingPageRecord) {
        self.editing = Some(record);
    }

    /// Close the edit dialog and drop its payload.
    pub fn close_edit(&mut self) {
        self.editing = None;
    }

    pub fn is_edit_open(&self) -> bool {
        self.editing.is_some()
    }

    /// Record being edited, if the edit dialog is open.
    pub fn editing(&self) -> Option<&TrainingPageRecord> {
        self.editing.as_ref()
    }

    /// Open the delete confirmation for page `id`.
    pub fn open_delete(&mut self, id: impl Into<String>) {
        self.delete_target = Some(id.into());
    }

    /// Close the delete confirmation and drop its target.
    pub fn close_delete(&mut self) {
        self.delete_target = None;
    }

    pub fn is_delete_open(&self) -> bool {
        self.delete_target.is_some()
    }

    /// Page id awaiting delete confirmation.
    pub fn delete_target(&self) -> Option<&str> {
        self.delete_target.as_deref()
    }

    pub fn open_tag_manager(&mut self) {
        self.tag_manager_open = true;
    }

    pub fn close_tag_manager(&mut self) {
        self.tag_manager_open = false;
    }

    pub fn is_tag_manager_open(&self) -> bool {
        self.tag_manager_open
    }
}
