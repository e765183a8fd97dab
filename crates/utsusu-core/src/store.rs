//! Conversion history and the record currently on screen.

use crate::record::{ConversionRecord, RecordId};

/// In-memory history of one session, newest first.
///
/// `active_id` always names a record in `history` or is `None`, and
/// `selected_title` is always a valid index into the active record's
/// title options.
#[derive(Debug, Default)]
pub struct SessionStore {
    history: Vec<ConversionRecord>,
    active_id: Option<RecordId>,
    selected_title: usize,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a new record and make it active.
    pub fn add_record(&mut self, record: ConversionRecord) {
        tracing::debug!(id = %record.id(), "Adding record to history");
        self.active_id = Some(record.id());
        self.history.insert(0, record);
        self.selected_title = 0;
    }

    /// Activate `id` if it is in history. Returns whether it was found.
    pub fn select_active(&mut self, id: RecordId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.active_id = Some(id);
        self.selected_title = 0;
        true
    }

    /// Remove `id` from history. Unknown ids are ignored.
    ///
    /// If the removed record was active, the new head of history becomes
    /// active (or nothing, when history is now empty).
    pub fn delete_record(&mut self, id: RecordId) -> bool {
        let Some(pos) = self.history.iter().position(|r| r.id() == id) else {
            return false;
        };
        self.history.remove(pos);
        if self.active_id == Some(id) {
            self.active_id = self.history.first().map(ConversionRecord::id);
            self.selected_title = 0;
        }
        true
    }

    /// Return to the input form. History is left alone.
    pub fn start_new(&mut self) {
        self.active_id = None;
        self.selected_title = 0;
    }

    /// Pick a title option of the active record.
    ///
    /// Out-of-range indices (or no active record) are rejected and leave the
    /// selection unchanged.
    pub fn select_title(&mut self, index: usize) -> bool {
        match self.active() {
            Some(record) if index < record.article_title_options().len() => {
                self.selected_title = index;
                true
            }
            _ => false,
        }
    }

    pub fn history(&self) -> &[ConversionRecord] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.history.iter().any(|r| r.id() == id)
    }

    pub fn get(&self, id: RecordId) -> Option<&ConversionRecord> {
        self.history.iter().find(|r| r.id() == id)
    }

    pub fn active_id(&self) -> Option<RecordId> {
        self.active_id
    }

    pub fn active(&self) -> Option<&ConversionRecord> {
        self.active_id.and_then(|id| self.get(id))
    }

    pub fn selected_title_index(&self) -> usize {
        self.selected_title
    }

    /// Currently selected title text of the active record
    pub fn selected_title(&self) -> Option<&str> {
        self.active().and_then(|r| r.title(self.selected_title))
    }
}
