//! Byte-range edit application for committing tree mutations.
//!
//! All structural mutations on a [`crate::tree::JavaTree`] are reduced to a
//! set of byte-range edits against the original source. Edits are validated
//! for bounds and overlap, then applied back-to-front so earlier offsets stay
//! valid while the string is modified.

use crate::tree::TreeError;

/// A single edit against the original source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Start byte offset (inclusive).
    pub start_byte: usize,
    /// End byte offset (exclusive). Equal to `start_byte` for insertions.
    pub end_byte: usize,
    /// Replacement content.
    pub replacement: String,
}

impl Edit {
    /// Create a replacement edit.
    #[must_use]
    pub fn new(start_byte: usize, end_byte: usize, replacement: impl Into<String>) -> Self {
        Self {
            start_byte,
            end_byte,
            replacement: replacement.into(),
        }
    }

    /// Create a deletion edit.
    #[must_use]
    pub fn delete(start_byte: usize, end_byte: usize) -> Self {
        Self::new(start_byte, end_byte, "")
    }

    /// Create an insertion edit at the given position.
    #[must_use]
    pub fn insert(position: usize, content: impl Into<String>) -> Self {
        Self::new(position, position, content)
    }

    /// Whether two edits cover overlapping ranges.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }
}

/// An ordered collection of pending edits.
#[derive(Debug, Default)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    /// Create an empty edit set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an edit.
    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Number of queued edits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Whether no edits are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Validate bounds and overlap without applying.
    pub fn validate(&self, source_len: usize) -> Result<(), TreeError> {
        for edit in &self.edits {
            if edit.end_byte > source_len {
                return Err(TreeError::EditOutOfBounds {
                    end_byte: edit.end_byte,
                    source_len,
                });
            }
        }
        for i in 0..self.edits.len() {
            for j in (i + 1)..self.edits.len() {
                if self.edits[i].overlaps(&self.edits[j]) {
                    return Err(TreeError::OverlappingEdits {
                        first: self.edits[i].start_byte,
                        second: self.edits[j].start_byte,
                    });
                }
            }
        }
        Ok(())
    }

    /// Apply all edits to `source` and return the rewritten text.
    ///
    /// Edits are sorted by start position descending so each application
    /// leaves the offsets of the remaining edits untouched. The sort is
    /// stable: insertions queued at the same position are applied in queue
    /// order, so the last-queued one ends up closest to that position.
    pub fn apply(self, source: &str) -> Result<String, TreeError> {
        self.validate(source.len())?;

        let mut result = source.to_owned();
        let mut sorted = self.edits;
        sorted.sort_by(|a, b| b.start_byte.cmp(&a.start_byte));

        for edit in sorted {
            result.replace_range(edit.start_byte..edit.end_byte, &edit.replacement);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_replacement() {
        let mut edits = EditSet::new();
        edits.push(Edit::new(0, 5, "hi"));
        assert_eq!(edits.apply("hello world").unwrap(), "hi world");
    }

    #[test]
    fn deletion_and_insertion() {
        let mut edits = EditSet::new();
        edits.push(Edit::delete(5, 11));
        edits.push(Edit::insert(0, ">> "));
        assert_eq!(edits.apply("hello world").unwrap(), ">> hello");
    }

    #[test]
    fn overlapping_edits_rejected() {
        let mut edits = EditSet::new();
        edits.push(Edit::new(0, 8, "a"));
        edits.push(Edit::new(5, 10, "b"));
        assert!(matches!(
            edits.apply("hello world"),
            Err(TreeError::OverlappingEdits { .. })
        ));
    }

    #[test]
    fn out_of_bounds_rejected() {
        let mut edits = EditSet::new();
        edits.push(Edit::delete(0, 100));
        assert!(matches!(
            edits.apply("short"),
            Err(TreeError::EditOutOfBounds { .. })
        ));
    }

    #[test]
    fn insertion_next_to_deletion_is_not_overlap() {
        // Deleting a statement line and inserting at the position just past it
        // is the common synthesis-after-cleanup pattern.
        let src = "aaa\nbbb\nccc\n";
        let mut edits = EditSet::new();
        edits.push(Edit::delete(4, 8));
        edits.push(Edit::insert(8, "xxx\n"));
        assert_eq!(edits.apply(src).unwrap(), "aaa\nxxx\nccc\n");
    }

    #[test]
    fn same_position_insertions_apply_in_queue_order() {
        let mut edits = EditSet::new();
        edits.push(Edit::insert(3, "1"));
        edits.push(Edit::insert(3, "2"));
        // Stable descending sort keeps queue order; the later application
        // lands closest to the insertion point.
        assert_eq!(edits.apply("abcdef").unwrap(), "abc21def");
    }

    #[test]
    fn empty_set_is_identity() {
        let edits = EditSet::new();
        assert_eq!(edits.apply("unchanged").unwrap(), "unchanged");
    }
}
