//! Anchor resolution: a prioritized cascade of structural probes over one
//! type's methods.
//!
//! Each probe either finds (or synthesizes) a `(method, statement)` pair and
//! records any view qualifier it discovered, or passes. The resolver is a
//! first-match fold over the cascade; no probe success means synthesis is
//! skipped for the type.

use crate::constants::BIND_CALL_MARKER;
use crate::diagnostics::DiagnosticSink;
use crate::engine::{is_bind_call, Anchor, TypeContext};
use crate::tree::{JavaTree, NodeId, SyntheticMethod, SyntheticStatement, TreeError};

/// Run the probe cascade for one type.
pub(crate) fn resolve(
    tree: &mut JavaTree,
    ty: NodeId,
    ctx: &mut TypeContext,
    label: &str,
    sink: &mut DiagnosticSink,
) -> Option<Anchor> {
    if let Some(anchor) = probe_bind_call(tree, ty, ctx) {
        return Some(anchor);
    }
    if let Some(anchor) = probe_super_create_view(tree, ty, ctx) {
        return Some(anchor);
    }
    if let Some(anchor) = probe_view_ready(tree, ty, ctx) {
        return Some(anchor);
    }
    if let Some(anchor) = probe_super_create(tree, ty) {
        return Some(anchor);
    }
    match probe_synthesize_inflate(tree, ty, ctx) {
        Ok(Some(anchor)) => return Some(anchor),
        Ok(None) => {}
        Err(e) => sink.warning(label, format!("could not synthesize inflate statement: {e}")),
    }
    if let Some(anchor) = probe_constructor(tree, ty, ctx) {
        return Some(anchor);
    }
    match probe_synthesize_create_view(tree, ty, ctx) {
        Ok(Some(anchor)) => return Some(anchor),
        Ok(None) => {}
        Err(e) => sink.warning(label, format!("could not synthesize onCreateView override: {e}")),
    }
    None
}

/// Find the first statement in any direct method matching the predicate.
fn find_statement<F>(tree: &JavaTree, ty: NodeId, pred: F) -> Option<Anchor>
where
    F: Fn(&str) -> bool,
{
    for method in tree.methods_of(ty) {
        for statement in tree.body_of(method) {
            if pred(tree.text(statement).trim()) {
                return Some(Anchor { method, statement });
            }
        }
    }
    None
}

/// Probe 1: a `ButterKnife.bind(` expression statement. Also captures the
/// statement for later deletion and recovers the qualifier from a
/// two-argument call, whether direct or on the right side of an assignment.
/// A bind call buried inside a compound statement does not anchor.
fn probe_bind_call(tree: &JavaTree, ty: NodeId, ctx: &mut TypeContext) -> Option<Anchor> {
    let anchor = tree.methods_of(ty).into_iter().find_map(|method| {
        tree.body_of(method)
            .into_iter()
            .find(|&s| is_bind_call(tree, s))
            .map(|statement| Anchor { method, statement })
    })?;
    ctx.bind_statement = Some(anchor.statement);
    if let Some(arg) = second_bind_argument(&tree.text(anchor.statement)) {
        ctx.qualifier = Some(arg);
    }
    Some(anchor)
}

/// Probe 2: a `super.onCreateView(` statement; qualifier defaults to the
/// conventional view parameter.
fn probe_super_create_view(tree: &JavaTree, ty: NodeId, ctx: &mut TypeContext) -> Option<Anchor> {
    let anchor = find_statement(tree, ty, |t| t.contains("super.onCreateView("))?;
    ctx.qualifier = Some("view".to_owned());
    Some(anchor)
}

/// Probe 3: the first statement of an `onViewCreated` method.
fn probe_view_ready(tree: &JavaTree, ty: NodeId, ctx: &mut TypeContext) -> Option<Anchor> {
    let method = tree
        .methods_of(ty)
        .into_iter()
        .find(|&m| tree.text(m).contains("onViewCreated("))?;
    let statement = tree.body_of(method).first().copied()?;
    ctx.qualifier = Some("view".to_owned());
    Some(Anchor { method, statement })
}

/// Probe 4: a `super.onCreate(` statement; the qualifier stays unset so
/// generated lookups run unqualified.
fn probe_super_create(tree: &JavaTree, ty: NodeId) -> Option<Anchor> {
    find_statement(tree, ty, |t| t.starts_with("super.onCreate("))
}

/// Probe 5: when the type has a three-parameter `onCreateView` and a
/// `provideLayout` method, synthesize the inflate statement as the first
/// statement of `onCreateView` and anchor on it.
fn probe_synthesize_inflate(
    tree: &mut JavaTree,
    ty: NodeId,
    ctx: &mut TypeContext,
) -> Result<Option<Anchor>, TreeError> {
    let methods = tree.methods_of(ty);
    let Some(on_create_view) = methods
        .iter()
        .copied()
        .find(|&m| tree.text(m).contains("View onCreateView(") && tree.has_body(m))
    else {
        return Ok(None);
    };
    if !methods
        .iter()
        .any(|&m| tree.text(m).contains("int provideLayout("))
    {
        return Ok(None);
    }
    let params = tree.params_of(on_create_view);
    if params.len() != 3 {
        return Ok(None);
    }

    let statement = SyntheticStatement::parse(format!(
        "View _view = {}.inflate(provideLayout(), {}, false);",
        params[0].name, params[1].name
    ))?;
    let inserted = tree.insert_statement_first(on_create_view, statement)?;
    ctx.qualifier = Some("_view".to_owned());
    Ok(Some(Anchor {
        method: on_create_view,
        statement: inserted,
    }))
}

/// Probe 6: a constructor with a `View`-typed parameter; anchor is its
/// first statement and the qualifier is the parameter name.
fn probe_constructor(tree: &JavaTree, ty: NodeId, ctx: &mut TypeContext) -> Option<Anchor> {
    for method in tree.methods_of(ty) {
        if !tree.is_constructor(method) {
            continue;
        }
        let Some(param) = tree
            .params_of(method)
            .into_iter()
            .find(|p| p.type_name.contains("View"))
        else {
            continue;
        };
        if let Some(&statement) = tree.body_of(method).first() {
            ctx.qualifier = Some(param.name);
            return Some(Anchor { method, statement });
        }
    }
    None
}

/// Probe 7: for fragment-shaped types (recognized by a `myInit` initializer
/// method), synthesize a full `onCreateView` override right before the
/// initializer and anchor on its inflate statement.
fn probe_synthesize_create_view(
    tree: &mut JavaTree,
    ty: NodeId,
    ctx: &mut TypeContext,
) -> Result<Option<Anchor>, TreeError> {
    let Some(init) = tree
        .methods_of(ty)
        .into_iter()
        .find(|&m| tree.text(m).contains("myInit("))
    else {
        return Ok(None);
    };

    let method = SyntheticMethod::new(
        "onCreateView",
        "public View onCreateView(LayoutInflater inflater, ViewGroup container, Bundle savedInstanceState)",
    )
    .with_prefix_line("@Override")
    .with_param("inflater", "LayoutInflater")
    .with_param("container", "ViewGroup")
    .with_param("savedInstanceState", "Bundle")
    .with_statement(SyntheticStatement::parse(
        "View view = inflater.inflate(provideLayout(), container, false);",
    )?)
    .with_statement(SyntheticStatement::parse(
        "return super.onCreateView(inflater, container, savedInstanceState);",
    )?);

    let inserted = tree.insert_method_before(ty, init, method)?;
    let Some(&statement) = tree.body_of(inserted).first() else {
        return Ok(None);
    };
    ctx.qualifier = Some("view".to_owned());
    Ok(Some(Anchor {
        method: inserted,
        statement,
    }))
}

/// Extract the second argument of a `ButterKnife.bind(a, b)` call from the
/// statement text; covers both the direct call and the assignment form.
fn second_bind_argument(text: &str) -> Option<String> {
    let start = text.find(BIND_CALL_MARKER)? + BIND_CALL_MARKER.len();
    let rest = &text[start..];
    let mut depth = 1i32;
    let mut args = Vec::new();
    let mut current = String::new();
    for c in rest.chars() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            ',' if depth == 1 => {
                args.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        args.push(current);
    }
    if args.len() == 2 {
        Some(args[1].trim().to_owned())
    } else {
        None
    }
}
