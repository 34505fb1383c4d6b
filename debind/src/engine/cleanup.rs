//! Deletion of the framework residue left after synthesis.
//!
//! Runs once per type, after code generation, and removes whatever still
//! refers to the framework: the captured bind statement, stray bind calls
//! in other lifecycle methods, the unbinder field with its call and guard
//! statements. Import deletion is unit-wide and runs once at the end.

use crate::constants::{FRAMEWORK_MARKER, FRAMEWORK_TYPE_MARKER, UNBINDER_TYPE};
use crate::engine::{is_bind_call, TypeContext};
use crate::tree::{JavaTree, NodeId, StatementKind};

/// Remove all framework references from one type's direct members.
pub(crate) fn run(tree: &mut JavaTree, ty: NodeId, ctx: &TypeContext) {
    // The anchor statement is only deleted when it is itself a framework
    // call; a super.onCreate anchor stays, and so does any compound
    // statement that happens to mention the framework inside its body.
    if let Some(anchor) = ctx.anchor {
        if tree.statement_kind(anchor.statement) == StatementKind::Expression
            && tree.text(anchor.statement).contains(FRAMEWORK_TYPE_MARKER)
        {
            tree.remove(anchor.statement);
        }
    }
    if let Some(bind) = ctx.bind_statement {
        tree.remove(bind);
    }

    // Bind calls can also live outside the anchored method, e.g. a rebind
    // in onResume.
    for method in tree.methods_of(ty) {
        for statement in tree.body_of(method) {
            if is_bind_call(tree, statement) {
                tree.remove(statement);
            }
        }
    }

    remove_unbinder(tree, ty);
}

/// Remove the unbinder field together with every statement that calls
/// through it or null-guards it.
fn remove_unbinder(tree: &mut JavaTree, ty: NodeId) {
    let Some((field, name)) = tree.fields_of(ty).into_iter().find_map(|f| {
        let ty_name = tree.field_type(f)?;
        if ty_name.contains(UNBINDER_TYPE) {
            Some((f, tree.field_name(f)?.to_owned()))
        } else {
            None
        }
    }) else {
        return;
    };

    let call_prefix = format!("{name}.");
    for method in tree.methods_of(ty) {
        for statement in tree.body_of(method) {
            let text = tree.text(statement);
            let delete = match tree.statement_kind(statement) {
                StatementKind::Expression => text.trim_start().starts_with(&call_prefix),
                StatementKind::If => condition_first_operand(&text) == Some(name.as_str()),
                _ => false,
            };
            if delete {
                tree.remove(statement);
            }
        }
    }

    tree.remove(field);
}

/// Delete every import that names the framework.
pub(crate) fn delete_framework_imports(tree: &mut JavaTree) {
    for import in tree.imports() {
        if tree
            .import_name(import)
            .is_some_and(|n| n.to_lowercase().contains(FRAMEWORK_MARKER))
        {
            tree.remove(import);
        }
    }
}

/// First identifier inside an `if (...)` condition, e.g. `unbinder` for
/// `if (unbinder != null) { ... }`.
fn condition_first_operand(text: &str) -> Option<&str> {
    let rest = text.trim_start().strip_prefix("if")?.trim_start();
    let rest = rest.strip_prefix('(')?.trim_start();
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    Some(&rest[..end])
}
