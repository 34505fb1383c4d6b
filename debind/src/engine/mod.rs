//! The annotation-driven rewrite engine.
//!
//! Sequences one pass over a compilation unit: applicability gate, anchor
//! resolution, annotation collection, binding synthesis, and cleanup, then
//! recursion into nested types with completely fresh per-type state. All
//! per-type failures are reported on the diagnostics sink and never abort
//! the pass.

mod anchor;
mod cleanup;
mod collect;
mod synth;

pub use collect::{ClickBindingSpec, FieldBindingSpec};

use std::cell::OnceCell;

use thiserror::Error;

use crate::constants::{BIND_CALL_MARKER, DEBOUNCING_IMPORT, FRAMEWORK_MARKER};
use crate::diagnostics::DiagnosticSink;
use crate::listener::{ListenerClass, ListenerLookup};
use crate::tree::{JavaTree, NodeId, StatementKind, TreeError};

/// Error raised for a whole unit; everything narrower is a diagnostic.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The unit parsed but holds no type declaration to rewrite.
    #[error("unit contains no type declaration")]
    NoTypeDeclaration,
    /// A tree operation failed at the unit level.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// The insertion point chosen for one type: the method hosting synthesized
/// calls and the statement they follow.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    /// Method that must host the synthesized calls.
    pub method: NodeId,
    /// Statement after which the calls are inserted.
    pub statement: NodeId,
}

/// Per-type rewrite state.
///
/// Built fresh for every type declaration, including nested ones, so no
/// qualifier or captured statement leaks between scopes.
#[derive(Debug, Default)]
pub struct TypeContext {
    /// The chosen insertion point, if any probe matched.
    pub anchor: Option<Anchor>,
    /// Expression prefix for generated lookup calls.
    pub qualifier: Option<String>,
    /// The framework bind statement captured by the bind-call probe.
    pub bind_statement: Option<NodeId>,
}

/// The rewrite engine, shared across the units of one batch run.
pub struct Engine<'a> {
    lookup: &'a dyn ListenerLookup,
    // Memoized project-wide search result; derived from the project, not
    // from any unit's mutable state.
    listener: OnceCell<Option<ListenerClass>>,
}

impl<'a> Engine<'a> {
    /// Create an engine backed by the given listener lookup.
    #[must_use]
    pub fn new(lookup: &'a dyn ListenerLookup) -> Self {
        Self {
            lookup,
            listener: OnceCell::new(),
        }
    }

    /// Rewrite one compilation unit in place.
    ///
    /// Returns `Ok(false)` when the unit does not reference the framework at
    /// all (not an error); `Ok(true)` when the unit was processed and
    /// mutated.
    pub fn rewrite_unit(
        &self,
        tree: &mut JavaTree,
        unit_name: &str,
        sink: &mut DiagnosticSink,
    ) -> Result<bool, RewriteError> {
        if !is_applicable(tree) {
            sink.info(unit_name, "no framework reference found, not processed");
            return Ok(false);
        }

        let types = tree.top_level_types();
        if types.is_empty() {
            return Err(RewriteError::NoTypeDeclaration);
        }

        self.swap_debouncing_import(tree, unit_name, sink);

        for ty in types {
            self.process_type(tree, ty, sink);
        }

        cleanup::delete_framework_imports(tree);
        sink.info(unit_name, "processed");
        Ok(true)
    }

    fn process_type(&self, tree: &mut JavaTree, ty: NodeId, sink: &mut DiagnosticSink) {
        let label = tree
            .type_name(ty)
            .unwrap_or("<anonymous>")
            .to_owned();
        let mut ctx = TypeContext::default();

        let (field_specs, field_annotations) = collect::field_bindings(tree, ty);
        let clicks_pending = collect::has_click_annotations(tree, ty);

        if !field_specs.is_empty() || clicks_pending {
            if let Some(anchor) = anchor::resolve(tree, ty, &mut ctx, &label, sink) {
                ctx.anchor = Some(anchor);
                let (click_specs, click_annotations) =
                    collect::click_bindings(tree, ty, ctx.qualifier.as_deref());
                // Click wiring is inserted first, field wiring second; both
                // sit right after the original anchor statement, so the
                // field call ends up closest to it.
                synth::insert_bind_clicks(
                    tree,
                    ty,
                    &ctx,
                    &click_specs,
                    &click_annotations,
                    self.listener(),
                    &label,
                    sink,
                );
                synth::insert_bind_views(
                    tree,
                    ty,
                    &ctx,
                    &field_specs,
                    &field_annotations,
                    &label,
                    sink,
                );
            } else {
                sink.error(
                    &label,
                    "no suitable insertion point found, skipping code generation",
                );
            }
        }

        cleanup::run(tree, ty, &ctx);

        for nested in tree.nested_types_of(ty) {
            self.process_type(tree, nested, sink);
        }
    }

    /// Swap the framework's own debounce-listener import for the project
    /// replacement before any type is visited.
    fn swap_debouncing_import(
        &self,
        tree: &mut JavaTree,
        unit_name: &str,
        sink: &mut DiagnosticSink,
    ) {
        let Some(old) = tree.imports().into_iter().find(|&i| {
            tree.import_name(i)
                .is_some_and(|n| n.contains(DEBOUNCING_IMPORT))
        }) else {
            return;
        };
        if let Some(listener) = self.listener() {
            tree.add_import(&listener.qualified_name, Some(old));
            tree.remove(old);
        } else {
            sink.error(
                unit_name,
                "no replacement DebouncingOnClickListener class found in project",
            );
        }
    }

    fn listener(&self) -> Option<&ListenerClass> {
        self.listener
            .get_or_init(|| self.lookup.find_replacement())
            .as_ref()
    }
}

/// Whether a statement is itself a framework bind call. Only expression
/// statements qualify; a compound statement (an `if` block, say) that merely
/// contains a bind call somewhere inside it must not be treated as one, or
/// cleanup would delete its unrelated statements with it.
pub(crate) fn is_bind_call(tree: &JavaTree, statement: NodeId) -> bool {
    tree.statement_kind(statement) == StatementKind::Expression
        && tree.text(statement).contains(BIND_CALL_MARKER)
}

/// Applicability gate: true iff the import list names the framework.
#[must_use]
pub fn is_applicable(tree: &JavaTree) -> bool {
    tree.imports().into_iter().any(|i| {
        tree.import_name(i)
            .is_some_and(|n| n.to_lowercase().contains(FRAMEWORK_MARKER))
    })
}
