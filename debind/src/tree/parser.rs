//! Lowers a tree-sitter parse of one Java source file into the arena model.
//!
//! Only the shapes the rewrite engine needs survive lowering: imports, type
//! declarations with their ordered members, method bodies as flat statement
//! lists, and annotations with their `value` attribute. Everything else stays
//! opaque source text addressed by byte ranges.

use tree_sitter::{Node, Parser};

use crate::tree::model::{
    AnnotationData, FieldData, ImportData, JavaTree, MethodData, NodeData, NodeId, Param, Span,
    StatementData, TypeData, UnitData,
};
use crate::tree::{AnnotationValue, StatementKind, TreeError};

pub(crate) fn parse(source: &str) -> Result<JavaTree, TreeError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| TreeError::Parse(e.to_string()))?;
    let ts_tree = parser
        .parse(source, None)
        .ok_or_else(|| TreeError::Parse("parser produced no tree".into()))?;
    let root = ts_tree.root_node();

    let mut tree = JavaTree {
        source: source.to_owned(),
        nodes: Vec::new(),
        root: NodeId(0),
        mutated: false,
    };
    let root_id = tree.push_node(
        NodeData::Unit(UnitData {
            imports: Vec::new(),
            types: Vec::new(),
            header_end: 0,
        }),
        Some(span_of(root)),
    );
    tree.root = root_id;

    let mut imports = Vec::new();
    let mut types = Vec::new();
    let mut header_end = 0;

    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        match child.kind() {
            "package_declaration" => {
                header_end = tree.line_end_after(child.end_byte());
            }
            "import_declaration" => {
                imports.push(lower_import(&mut tree, child, source));
            }
            "class_declaration" => {
                types.push(lower_type(&mut tree, child, source));
            }
            _ => {}
        }
    }

    if let NodeData::Unit(unit) = &mut tree.nodes[root_id.0 as usize].data {
        unit.imports = imports;
        unit.types = types;
        unit.header_end = header_end;
    }

    Ok(tree)
}

fn span_of(node: Node<'_>) -> Span {
    Span {
        start: node.start_byte(),
        end: node.end_byte(),
    }
}

fn text_of<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.start_byte()..node.end_byte()]
}

fn lower_import(tree: &mut JavaTree, node: Node<'_>, source: &str) -> NodeId {
    // Everything between the `import` keyword and the `;` is the name,
    // including `static` and wildcard forms.
    let raw = text_of(node, source);
    let qualified_name = raw
        .trim_start_matches("import")
        .trim_end_matches(';')
        .trim()
        .to_owned();
    tree.push_node(
        NodeData::Import(ImportData { qualified_name }),
        Some(span_of(node)),
    )
}

fn lower_type(tree: &mut JavaTree, node: Node<'_>, source: &str) -> NodeId {
    let name = node
        .child_by_field_name("name")
        .map(|n| text_of(n, source).to_owned())
        .unwrap_or_default();
    let interfaces = node
        .child_by_field_name("interfaces")
        .map(|n| collect_interface_names(n, source))
        .unwrap_or_default();

    let mut members = Vec::new();
    let mut body_start = node.end_byte();
    if let Some(body) = node.child_by_field_name("body") {
        body_start = body.start_byte() + 1;
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "field_declaration" => members.push(lower_field(tree, member, source)),
                "method_declaration" | "constructor_declaration" => {
                    members.push(lower_method(tree, member, source));
                }
                "class_declaration" => members.push(lower_type(tree, member, source)),
                _ => {}
            }
        }
    }

    tree.push_node(
        NodeData::Type(TypeData {
            name,
            interfaces,
            members,
            body_start,
        }),
        Some(span_of(node)),
    )
}

fn collect_interface_names(node: Node<'_>, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "type_list" {
            let mut inner = child.walk();
            for ty in child.named_children(&mut inner) {
                names.push(text_of(ty, source).to_owned());
            }
        }
    }
    names
}

fn lower_field(tree: &mut JavaTree, node: Node<'_>, source: &str) -> NodeId {
    let annotations = lower_annotations(tree, node, source);
    let type_name = node
        .child_by_field_name("type")
        .map(|n| text_of(n, source).to_owned())
        .unwrap_or_default();
    let name = node
        .child_by_field_name("declarator")
        .and_then(|d| d.child_by_field_name("name"))
        .map(|n| text_of(n, source).to_owned())
        .unwrap_or_default();
    tree.push_node(
        NodeData::Field(FieldData {
            name,
            type_name,
            annotations,
        }),
        Some(span_of(node)),
    )
}

fn lower_method(tree: &mut JavaTree, node: Node<'_>, source: &str) -> NodeId {
    let is_constructor = node.kind() == "constructor_declaration";
    let annotations = lower_annotations(tree, node, source);
    let name = node
        .child_by_field_name("name")
        .map(|n| text_of(n, source).to_owned())
        .unwrap_or_default();
    let params = node
        .child_by_field_name("parameters")
        .map(|n| lower_params(n, source))
        .unwrap_or_default();

    let mut body = Vec::new();
    let mut body_start = None;
    if let Some(block) = node.child_by_field_name("body") {
        body_start = Some(block.start_byte() + 1);
        let mut cursor = block.walk();
        for stmt in block.named_children(&mut cursor) {
            if matches!(stmt.kind(), "line_comment" | "block_comment") {
                continue;
            }
            body.push(lower_statement(tree, stmt));
        }
    }

    tree.push_node(
        NodeData::Method(MethodData {
            name,
            is_constructor,
            params,
            annotations,
            body,
            body_start,
            header: None,
            prefix_lines: Vec::new(),
        }),
        Some(span_of(node)),
    )
}

fn lower_params(node: Node<'_>, source: &str) -> Vec<Param> {
    let mut params = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "formal_parameter" && child.kind() != "spread_parameter" {
            continue;
        }
        let type_name = child
            .child_by_field_name("type")
            .map(|n| text_of(n, source).to_owned())
            .unwrap_or_default();
        let name = child
            .child_by_field_name("name")
            .map(|n| text_of(n, source).to_owned())
            .unwrap_or_default();
        params.push(Param { name, type_name });
    }
    params
}

fn lower_statement(tree: &mut JavaTree, node: Node<'_>) -> NodeId {
    let kind = match node.kind() {
        "expression_statement" => StatementKind::Expression,
        "if_statement" => StatementKind::If,
        "local_variable_declaration" => StatementKind::LocalVar,
        "return_statement" => StatementKind::Return,
        _ => StatementKind::Other,
    };
    tree.push_node(
        NodeData::Statement(StatementData { kind, text: None }),
        Some(span_of(node)),
    )
}

fn lower_annotations(tree: &mut JavaTree, decl: Node<'_>, source: &str) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        if child.kind() != "modifiers" {
            continue;
        }
        let mut inner = child.walk();
        for modifier in child.named_children(&mut inner) {
            match modifier.kind() {
                "annotation" | "marker_annotation" => {
                    out.push(lower_annotation(tree, modifier, source));
                }
                _ => {}
            }
        }
    }
    out
}

fn lower_annotation(tree: &mut JavaTree, node: Node<'_>, source: &str) -> NodeId {
    let qualified_name = node
        .child_by_field_name("name")
        .map(|n| text_of(n, source).to_owned())
        .unwrap_or_default();
    let value = node
        .child_by_field_name("arguments")
        .and_then(|args| extract_value_attribute(args, source));
    tree.push_node(
        NodeData::Annotation(AnnotationData {
            qualified_name,
            value,
        }),
        Some(span_of(node)),
    )
}

/// Resolve the `value` attribute of an annotation: either the named
/// `value = ...` pair or the single positional argument.
fn extract_value_attribute(args: Node<'_>, source: &str) -> Option<AnnotationValue> {
    let mut cursor = args.walk();
    let mut positional = None;
    for child in args.named_children(&mut cursor) {
        if child.kind() == "element_value_pair" {
            let key = child
                .child_by_field_name("key")
                .map(|n| text_of(n, source))
                .unwrap_or_default();
            if key == "value" {
                return child
                    .child_by_field_name("value")
                    .map(|v| lower_value(v, source));
            }
        } else if positional.is_none() {
            positional = Some(child);
        }
    }
    positional.map(|v| lower_value(v, source))
}

fn lower_value(node: Node<'_>, source: &str) -> AnnotationValue {
    if node.kind() == "element_value_array_initializer" {
        let mut cursor = node.walk();
        let items = node
            .named_children(&mut cursor)
            .map(|n| text_of(n, source).to_owned())
            .collect();
        AnnotationValue::Array(items)
    } else {
        AnnotationValue::Scalar(text_of(node, source).to_owned())
    }
}

#[cfg(test)]
mod tests {
    use crate::tree::{AnnotationValue, JavaTree, StatementKind};

    const SRC: &str = r"package com.example;

import butterknife.BindView;
import butterknife.OnClick;
import butterknife.Unbinder;

public class MainActivity implements Refreshable {
    @BindView(R2.id.tv_title)
    TextView tvTitle;

    private Unbinder unbinder;

    protected void onCreate(Bundle savedInstanceState) {
        super.onCreate(savedInstanceState);
        unbinder = ButterKnife.bind(this);
    }

    @OnClick({R2.id.btn_ok, R2.id.btn_cancel})
    void onButtonClicked(View v) {
        finish();
    }

    class Holder {
        @BindView(R.id.tv_item)
        TextView tvItem;

        Holder(View itemView) {
            ButterKnife.bind(this, itemView);
        }
    }
}
";

    #[test]
    fn lowers_imports_and_types() {
        let tree = JavaTree::parse(SRC).unwrap();
        let imports = tree.imports();
        assert_eq!(imports.len(), 3);
        assert_eq!(tree.import_name(imports[0]), Some("butterknife.BindView"));

        let types = tree.top_level_types();
        assert_eq!(types.len(), 1);
        assert_eq!(tree.type_name(types[0]), Some("MainActivity"));
        assert_eq!(tree.interfaces_of(types[0]), vec!["Refreshable".to_owned()]);
    }

    #[test]
    fn lowers_fields_with_annotations() {
        let tree = JavaTree::parse(SRC).unwrap();
        let ty = tree.top_level_types()[0];
        let fields = tree.fields_of(ty);
        assert_eq!(fields.len(), 2);
        assert_eq!(tree.field_name(fields[0]), Some("tvTitle"));
        assert_eq!(tree.field_type(fields[1]), Some("Unbinder"));

        let annos = tree.annotations_of(fields[0]);
        assert_eq!(annos.len(), 1);
        assert_eq!(tree.annotation_name(annos[0]), Some("BindView"));
        match tree.annotation_value(annos[0]) {
            Some(AnnotationValue::Scalar(v)) => assert_eq!(v, "R2.id.tv_title"),
            other => panic!("expected scalar value, got {other:?}"),
        }
    }

    #[test]
    fn lowers_click_annotation_array() {
        let tree = JavaTree::parse(SRC).unwrap();
        let ty = tree.top_level_types()[0];
        let method = tree
            .methods_of(ty)
            .into_iter()
            .find(|&m| tree.method_name(m) == Some("onButtonClicked"))
            .unwrap();
        let annos = tree.annotations_of(method);
        assert_eq!(annos.len(), 1);
        match tree.annotation_value(annos[0]) {
            Some(AnnotationValue::Array(items)) => {
                assert_eq!(items, &["R2.id.btn_ok".to_owned(), "R2.id.btn_cancel".to_owned()]);
            }
            other => panic!("expected array value, got {other:?}"),
        }
        assert_eq!(tree.params_of(method).len(), 1);
    }

    #[test]
    fn lowers_method_bodies_as_statements() {
        let tree = JavaTree::parse(SRC).unwrap();
        let ty = tree.top_level_types()[0];
        let on_create = tree
            .methods_of(ty)
            .into_iter()
            .find(|&m| tree.method_name(m) == Some("onCreate"))
            .unwrap();
        let body = tree.body_of(on_create);
        assert_eq!(body.len(), 2);
        assert_eq!(tree.statement_kind(body[0]), StatementKind::Expression);
        assert!(tree.text(body[1]).contains("ButterKnife.bind(this)"));
    }

    #[test]
    fn lowers_nested_types_with_constructors() {
        let tree = JavaTree::parse(SRC).unwrap();
        let ty = tree.top_level_types()[0];
        let nested = tree.nested_types_of(ty);
        assert_eq!(nested.len(), 1);
        assert_eq!(tree.type_name(nested[0]), Some("Holder"));

        let ctor = tree
            .methods_of(nested[0])
            .into_iter()
            .find(|&m| tree.is_constructor(m))
            .unwrap();
        let params = tree.params_of(ctor);
        assert_eq!(params[0].name, "itemView");
        assert_eq!(params[0].type_name, "View");
    }
}
