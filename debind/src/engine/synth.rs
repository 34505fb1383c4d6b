//! Generation of the replacement binding methods.
//!
//! Turns the collected binding specs into two synthesized private methods,
//! `__bindViews` and `__bindClicks`, plus their calls at the anchor. Every
//! insertion is attempted independently; a failed one is reported on the
//! sink and leaves the rest of the type intact.

use crate::constants::{BIND_CLICKS_METHOD, BIND_VIEWS_METHOD, DEBOUNCING_LISTENER};
use crate::diagnostics::DiagnosticSink;
use crate::engine::{ClickBindingSpec, FieldBindingSpec, TypeContext};
use crate::listener::ListenerClass;
use crate::tree::{JavaTree, NodeId, SyntheticMethod, SyntheticStatement};

/// Synthesize `__bindViews` and its call, then delete the consumed
/// annotations.
pub(crate) fn insert_bind_views(
    tree: &mut JavaTree,
    ty: NodeId,
    ctx: &TypeContext,
    specs: &[FieldBindingSpec],
    annotations: &[NodeId],
    label: &str,
    sink: &mut DiagnosticSink,
) {
    if specs.is_empty() && annotations.is_empty() {
        return;
    }
    let Some(anchor) = ctx.anchor else {
        return;
    };
    let recv = ctx.qualifier.as_deref();

    if !specs.is_empty() {
        let mut method = SyntheticMethod::new(BIND_VIEWS_METHOD, signature(BIND_VIEWS_METHOD, recv));
        if let Some(q) = recv {
            method = method.with_param(q, "View");
        }
        for spec in specs {
            let Some(field_name) = tree.field_name(spec.field) else {
                continue;
            };
            let text = format!(
                "{field_name} = {}findViewById({});",
                receiver_prefix(recv),
                spec.resource_id
            );
            match SyntheticStatement::parse(text) {
                Ok(stmt) => method = method.with_statement(stmt),
                Err(err) => sink.warning(label, format!("view binding skipped: {err}")),
            }
        }

        if let Err(err) = tree.insert_method_after(ty, anchor.method, method) {
            sink.warning(label, format!("could not insert {BIND_VIEWS_METHOD}: {err}"));
            return;
        }
        insert_call(tree, anchor, BIND_VIEWS_METHOD, recv, label, sink);
    }

    for &annotation in annotations {
        tree.remove(annotation);
    }
}

/// Synthesize `__bindClicks` and its call, then delete the consumed
/// annotations.
///
/// Without a replacement listener class the generated casts would not
/// compile, so the whole click side is skipped and the annotations stay in
/// place for a later run.
#[allow(clippy::too_many_arguments)]
pub(crate) fn insert_bind_clicks(
    tree: &mut JavaTree,
    ty: NodeId,
    ctx: &TypeContext,
    specs: &[ClickBindingSpec],
    annotations: &[NodeId],
    listener: Option<&ListenerClass>,
    label: &str,
    sink: &mut DiagnosticSink,
) {
    if annotations.is_empty() {
        return;
    }
    let Some(anchor) = ctx.anchor else {
        return;
    };
    let Some(listener) = listener else {
        sink.error(
            label,
            "no replacement DebouncingOnClickListener class found in project",
        );
        return;
    };
    let recv = ctx.qualifier.as_deref();

    if !specs.is_empty() {
        ensure_listener_import(tree, listener);

        let mut method =
            SyntheticMethod::new(BIND_CLICKS_METHOD, signature(BIND_CLICKS_METHOD, recv));
        if let Some(q) = recv {
            method = method.with_param(q, "View");
        }
        for spec in specs {
            let text = format!(
                "{}findViewById({}).setOnClickListener(({}) {} -> {});",
                receiver_prefix(recv),
                spec.view_id,
                listener.simple_name,
                spec.lambda_param,
                spec.forward_call
            );
            match SyntheticStatement::parse(text) {
                Ok(stmt) => method = method.with_statement(stmt),
                Err(err) => sink.warning(label, format!("click binding skipped: {err}")),
            }
        }

        if let Err(err) = tree.insert_method_after(ty, anchor.method, method) {
            sink.warning(label, format!("could not insert {BIND_CLICKS_METHOD}: {err}"));
            return;
        }
        insert_call(tree, anchor, BIND_CLICKS_METHOD, recv, label, sink);
    }

    for &annotation in annotations {
        tree.remove(annotation);
    }
}

fn signature(name: &str, recv: Option<&str>) -> String {
    match recv {
        Some(q) => format!("private void {name}(View {q})"),
        None => format!("private void {name}()"),
    }
}

fn receiver_prefix(recv: Option<&str>) -> String {
    recv.map(|q| format!("{q}.")).unwrap_or_default()
}

fn insert_call(
    tree: &mut JavaTree,
    anchor: crate::engine::Anchor,
    name: &str,
    recv: Option<&str>,
    label: &str,
    sink: &mut DiagnosticSink,
) {
    let text = format!("{name}({});", recv.unwrap_or(""));
    let result = SyntheticStatement::parse(text)
        .and_then(|stmt| tree.insert_statement_after(anchor.method, anchor.statement, stmt));
    if let Err(err) = result {
        sink.warning(label, format!("could not insert call to {name}: {err}"));
    }
}

/// Add the replacement listener import unless one is already present.
fn ensure_listener_import(tree: &mut JavaTree, listener: &ListenerClass) {
    let already = tree.imports().into_iter().any(|i| {
        tree.import_name(i)
            .is_some_and(|n| n.contains(DEBOUNCING_LISTENER))
    });
    if !already {
        tree.add_import(&listener.qualified_name, None);
    }
}
