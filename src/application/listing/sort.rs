//! Single-column sort state with toggle semantics.

use crate::domain::types::SortDirection;

/// At most one active sort column. Toggling the active column flips the
/// direction; toggling another column selects it ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    key: Option<String>,
    direction: SortDirection,
}

impl SortState {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: Some(key.into()),
            direction,
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Direction of the active column; `None` when unsorted.
    pub fn direction(&self) -> Option<SortDirection> {
        self.key.as_ref().map(|_| self.direction)
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }

    pub fn toggle(&mut self, key: &str) {
        if self.is_active(key) {
            self.direction = self.direction.flipped();
        } else {
            self.key = Some(key.to_string());
            self.direction = SortDirection::Asc;
        }
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.direction = SortDirection::Asc;
    }
}
