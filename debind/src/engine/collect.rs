//! Annotation scans producing binding specifications.
//!
//! Two independent, read-only passes over one type's direct members. Field
//! scan: `@BindView` annotations become [`FieldBindingSpec`]s. Method scan:
//! `@OnClick` annotations expand into one [`ClickBindingSpec`] per declared
//! id. Both collect the annotation nodes so synthesis can delete them after
//! the generated code is in place.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::constants::{BIND_VIEW_ANNOTATION, ON_CLICK_ANNOTATION};
use crate::tree::{AnnotationValue, JavaTree, NodeId};

/// Everything needed to generate one `findViewById` assignment.
#[derive(Debug, Clone)]
pub struct FieldBindingSpec {
    /// Normalized resource id, e.g. `R.id.tv_title`.
    pub resource_id: String,
    /// The annotated field.
    pub field: NodeId,
}

/// Everything needed to generate one click-listener attachment.
#[derive(Debug, Clone)]
pub struct ClickBindingSpec {
    /// Normalized resource id.
    pub view_id: String,
    /// Lambda parameter name, derived from the active view qualifier.
    pub lambda_param: String,
    /// Forwarding call into the annotated method, e.g. `onOkClicked(_view)`.
    pub forward_call: String,
}

/// Scan a type's fields for reference-binding annotations.
///
/// Returns the specs keyed by resource id (a later field with the same id
/// replaces the earlier one) and the annotation nodes to delete. Fields
/// whose annotation has no resolvable scalar id are skipped entirely.
pub(crate) fn field_bindings(
    tree: &JavaTree,
    ty: NodeId,
) -> (Vec<FieldBindingSpec>, Vec<NodeId>) {
    let mut specs: Vec<FieldBindingSpec> = Vec::new();
    let mut by_id: FxHashMap<String, usize> = FxHashMap::default();
    let mut annotations = Vec::new();

    for field in tree.fields_of(ty) {
        for annotation in tree.annotations_of(field) {
            if !tree
                .annotation_name(annotation)
                .is_some_and(|n| n.contains(BIND_VIEW_ANNOTATION))
            {
                continue;
            }
            let Some(AnnotationValue::Scalar(raw)) = tree.annotation_value(annotation) else {
                continue;
            };
            let resource_id = raw.replace("R2", "R");
            if let Some(&idx) = by_id.get(&resource_id) {
                specs[idx].field = field;
            } else {
                by_id.insert(resource_id.clone(), specs.len());
                specs.push(FieldBindingSpec { resource_id, field });
            }
            annotations.push(annotation);
        }
    }

    (specs, annotations)
}

/// Whether any direct method carries a click-binding annotation.
pub(crate) fn has_click_annotations(tree: &JavaTree, ty: NodeId) -> bool {
    tree.methods_of(ty).into_iter().any(|m| {
        tree.annotations_of(m).into_iter().any(|a| {
            tree.annotation_name(a)
                .is_some_and(|n| n.contains(ON_CLICK_ANNOTATION))
        })
    })
}

/// Scan a type's methods for click-binding annotations.
///
/// One spec per declared id, whether the annotation value is a scalar or an
/// array. The annotation node is collected for deletion regardless of how
/// many ids it expanded into.
pub(crate) fn click_bindings(
    tree: &JavaTree,
    ty: NodeId,
    qualifier: Option<&str>,
) -> (Vec<ClickBindingSpec>, Vec<NodeId>) {
    let mut specs = Vec::new();
    let mut annotations = Vec::new();
    let lambda_param = match qualifier {
        Some(q) if !q.is_empty() => format!("_{q}"),
        _ => "_v".to_owned(),
    };

    for method in tree.methods_of(ty) {
        for annotation in tree.annotations_of(method) {
            if !tree
                .annotation_name(annotation)
                .is_some_and(|n| n.contains(ON_CLICK_ANNOTATION))
            {
                continue;
            }
            let ids: SmallVec<[String; 2]> = match tree.annotation_value(annotation) {
                Some(AnnotationValue::Scalar(v)) => SmallVec::from_iter([v.clone()]),
                Some(AnnotationValue::Array(items)) => items.iter().cloned().collect(),
                None => SmallVec::new(),
            };
            for id in ids {
                let view_id = id.replace("R2.", "R.");
                let arg = if tree.params_of(method).is_empty() {
                    ""
                } else {
                    lambda_param.as_str()
                };
                let name = tree.method_name(method).unwrap_or_default();
                specs.push(ClickBindingSpec {
                    view_id,
                    lambda_param: lambda_param.clone(),
                    forward_call: format!("{name}({arg})"),
                });
            }
            annotations.push(annotation);
        }
    }

    (specs, annotations)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = r"import butterknife.BindView;
import butterknife.OnClick;

public class Screen {
    @BindView(R2.id.tv_title)
    TextView tvTitle;

    @BindView
    TextView broken;

    TextView plain;

    @OnClick({R2.id.btn_ok, R.id.btn_cancel})
    void onButton(View clicked) {
        finish();
    }

    @OnClick(R.id.fab)
    void onFab() {
        refresh();
    }
}
";

    #[test]
    fn field_scan_normalizes_and_skips_unresolvable() {
        let tree = JavaTree::parse(SRC).unwrap();
        let ty = tree.top_level_types()[0];
        let (specs, annotations) = field_bindings(&tree, ty);

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].resource_id, "R.id.tv_title");
        assert_eq!(tree.field_name(specs[0].field), Some("tvTitle"));
        // The valueless annotation is neither bound nor scheduled.
        assert_eq!(annotations.len(), 1);
    }

    #[test]
    fn click_scan_expands_arrays() {
        let tree = JavaTree::parse(SRC).unwrap();
        let ty = tree.top_level_types()[0];
        let (specs, annotations) = click_bindings(&tree, ty, Some("view"));

        assert_eq!(specs.len(), 3);
        assert_eq!(annotations.len(), 2);
        assert_eq!(specs[0].view_id, "R.id.btn_ok");
        assert_eq!(specs[1].view_id, "R.id.btn_cancel");
        assert_eq!(specs[2].view_id, "R.id.fab");
    }

    #[test]
    fn forwarding_call_arity_follows_target_method() {
        let tree = JavaTree::parse(SRC).unwrap();
        let ty = tree.top_level_types()[0];
        let (specs, _) = click_bindings(&tree, ty, Some("view"));

        assert_eq!(specs[0].lambda_param, "_view");
        assert_eq!(specs[0].forward_call, "onButton(_view)");
        // The no-parameter target is called without arguments.
        assert_eq!(specs[2].forward_call, "onFab()");
    }

    #[test]
    fn lambda_param_falls_back_without_qualifier() {
        let tree = JavaTree::parse(SRC).unwrap();
        let ty = tree.top_level_types()[0];
        let (specs, _) = click_bindings(&tree, ty, None);
        assert_eq!(specs[0].lambda_param, "_v");
        assert_eq!(specs[0].forward_call, "onButton(_v)");
    }

    #[test]
    fn duplicate_field_ids_keep_single_spec() {
        let src = r"public class D {
    @BindView(R.id.a)
    TextView first;

    @BindView(R.id.a)
    TextView second;
}
";
        let tree = JavaTree::parse(src).unwrap();
        let ty = tree.top_level_types()[0];
        let (specs, annotations) = field_bindings(&tree, ty);

        assert_eq!(specs.len(), 1);
        assert_eq!(tree.field_name(specs[0].field), Some("second"));
        // Both annotations are still consumed.
        assert_eq!(annotations.len(), 2);
    }
}
