//! Mutable syntax-tree model for one Java compilation unit.
//!
//! Parsing is delegated to tree-sitter; the parsed unit is lowered into an
//! arena of nodes addressed by stable [`NodeId`]s. Deletions are tombstones
//! and insertions splice synthetic nodes into ordered child lists, so
//! references captured before a mutation stay valid afterwards. A final
//! [`JavaTree::commit`] renders all mutations transactionally through a
//! validated byte-range edit set.

mod edit;
mod model;
mod parser;

pub use edit::{Edit, EditSet};
pub use model::{
    AnnotationValue, Commit, JavaTree, NodeId, NodeKind, Param, StatementKind, SyntheticMethod,
    SyntheticStatement,
};

use thiserror::Error;

/// Error raised by tree construction or mutation.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The source could not be parsed at all.
    #[error("failed to parse Java source: {0}")]
    Parse(String),
    /// A node id referred to a node of the wrong kind.
    #[error("node is not a {expected}")]
    WrongKind {
        /// Kind the operation required.
        expected: &'static str,
    },
    /// An insertion anchor was not found in its container.
    #[error("anchor node is not a child of the target container")]
    AnchorNotFound,
    /// Synthesized text failed shape validation.
    #[error("malformed synthesized snippet: {0}")]
    MalformedSnippet(String),
    /// Two queued edits cover overlapping byte ranges.
    #[error("overlapping edits at byte offsets {first} and {second}")]
    OverlappingEdits {
        /// Start offset of the first edit.
        first: usize,
        /// Start offset of the second edit.
        second: usize,
    },
    /// A queued edit runs past the end of the source.
    #[error("edit ends at byte {end_byte} but source is {source_len} bytes")]
    EditOutOfBounds {
        /// End offset of the offending edit.
        end_byte: usize,
        /// Length of the source text.
        source_len: usize,
    },
}
