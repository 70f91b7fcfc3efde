use crate::data::export::canonical_csv;
use crate::state::table::{StateTable, FONT_RANGE, RADIUS_RANGE, WIDTH_RANGE};

/// A single editable cell of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    X,
    Y,
    Radius,
    Font,
    Width,
}

/// The one mutable snapshot of the working table, keyed by a fingerprint
/// of the base it was derived from.
///
/// Edits survive anything that leaves the base table identical (re-renders,
/// slider nudges, canvas echoes) and are discarded exactly when the base
/// fingerprint changes: a new upload, URL, or column selection.
#[derive(Debug, Default)]
pub struct SessionStore {
    fingerprint: Option<String>,
    data: Option<StateTable>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash of the table's canonical CSV serialization.
    pub fn fingerprint_of(table: &StateTable) -> String {
        blake3::hash(&canonical_csv(table)).to_hex().to_string()
    }

    /// Ensure the store holds a snapshot for this base, resetting to a
    /// clamp-normalized copy when the fingerprint moved. Returns whether a
    /// reset happened.
    pub fn get_or_init(&mut self, base: &StateTable) -> bool {
        let fingerprint = Self::fingerprint_of(base);
        if self.data.is_some() && self.fingerprint.as_deref() == Some(fingerprint.as_str()) {
            return false;
        }

        let mut data = base.clone();
        for record in &mut data.records {
            record.clamp_visuals();
        }
        self.data = Some(data);
        self.fingerprint = Some(fingerprint);
        true
    }

    pub fn current(&self) -> Option<&StateTable> {
        self.data.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut StateTable> {
        self.data.as_mut()
    }

    /// Update one cell of the record with this label. Visual fields are
    /// clamped to their valid ranges; coordinates are taken as-is.
    pub fn apply_edit(&mut self, label: &str, field: EditField, value: f64) {
        let Some(record) = self.data.as_mut().and_then(|t| t.record_mut(label)) else {
            return;
        };
        match field {
            EditField::X => record.x = value,
            EditField::Y => record.y = value,
            EditField::Radius => record.radius_px = value.clamp(RADIUS_RANGE.0, RADIUS_RANGE.1),
            EditField::Font => record.font_px = value.clamp(FONT_RANGE.0, FONT_RANGE.1),
            EditField::Width => record.width_px = value.clamp(WIDTH_RANGE.0, WIDTH_RANGE.1),
        }
    }

    /// Swap in a table recovered from the drawing surface. The fingerprint
    /// stays: reconciled edits belong to the same base.
    pub fn replace(&mut self, table: StateTable) {
        self.data = Some(table);
    }
}
