//! Arena node model and mutation/commit API.

use crate::tree::edit::{Edit, EditSet};
use crate::tree::TreeError;

/// Stable identifier of a node in the arena.
///
/// Identifiers are never invalidated: deletion marks a node removed without
/// shifting the identifiers of unrelated nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

/// Byte range of an original node in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
}

/// Coarse node classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The compilation unit root.
    Unit,
    /// An import declaration.
    Import,
    /// A class or interface declaration.
    Type,
    /// A field declaration.
    Field,
    /// A method or constructor declaration.
    Method,
    /// A body statement, treated as an opaque shape.
    Statement,
    /// An annotation attached to a field or method.
    Annotation,
}

/// Statement shape as reported by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// An expression statement (method call, assignment, ...).
    Expression,
    /// An `if` statement.
    If,
    /// A local variable declaration.
    LocalVar,
    /// A `return` statement.
    Return,
    /// Anything else.
    Other,
}

/// A method or constructor parameter.
#[derive(Debug, Clone)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Declared type text.
    pub type_name: String,
}

/// Annotation attribute value: scalar or array of scalars.
#[derive(Debug, Clone)]
pub enum AnnotationValue {
    /// A single value expression, e.g. `R.id.tv_title`.
    Scalar(String),
    /// An array initializer, e.g. `{R.id.a, R.id.b}`.
    Array(Vec<String>),
}

#[derive(Debug)]
pub(crate) struct UnitData {
    pub imports: Vec<NodeId>,
    pub types: Vec<NodeId>,
    /// Byte offset right after the package declaration line, where imports
    /// are spliced when the unit has none.
    pub header_end: usize,
}

#[derive(Debug)]
pub(crate) struct ImportData {
    pub qualified_name: String,
}

#[derive(Debug)]
pub(crate) struct TypeData {
    pub name: String,
    pub interfaces: Vec<String>,
    /// Ordered member list: fields, methods, constructors, nested types.
    pub members: Vec<NodeId>,
    /// Byte offset right after the `{` of the class body.
    pub body_start: usize,
}

#[derive(Debug)]
pub(crate) struct FieldData {
    pub name: String,
    pub type_name: String,
    pub annotations: Vec<NodeId>,
}

#[derive(Debug)]
pub(crate) struct MethodData {
    pub name: String,
    pub is_constructor: bool,
    pub params: Vec<Param>,
    pub annotations: Vec<NodeId>,
    /// Ordered top-level statements of the body.
    pub body: Vec<NodeId>,
    /// Byte offset right after the `{` of the body block, for original
    /// methods with a body.
    pub body_start: Option<usize>,
    /// Signature text of a synthetic method, e.g.
    /// `private void __bindViews(View view)`.
    pub header: Option<String>,
    /// Lines emitted above the signature of a synthetic method, e.g.
    /// `@Override`.
    pub prefix_lines: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct StatementData {
    pub kind: StatementKind,
    /// Text of a synthetic statement; original statements slice the source.
    pub text: Option<String>,
}

#[derive(Debug)]
pub(crate) struct AnnotationData {
    pub qualified_name: String,
    pub value: Option<AnnotationValue>,
}

#[derive(Debug)]
pub(crate) enum NodeData {
    Unit(UnitData),
    Import(ImportData),
    Type(TypeData),
    Field(FieldData),
    Method(MethodData),
    Statement(StatementData),
    Annotation(AnnotationData),
}

#[derive(Debug)]
pub(crate) struct Node {
    pub data: NodeData,
    pub span: Option<Span>,
    pub removed: bool,
}

/// A validated synthetic statement ready for insertion.
#[derive(Debug, Clone)]
pub struct SyntheticStatement {
    text: String,
    kind: StatementKind,
}

impl SyntheticStatement {
    /// Validate `text` against the statement shape the tree accepts.
    ///
    /// The check is deliberately shallow: balanced brackets outside string
    /// and character literals, plus a statement terminator. Templated text
    /// that fails here is reported instead of being spliced blindly.
    pub fn parse(text: impl Into<String>) -> Result<Self, TreeError> {
        let text = text.into();
        validate_snippet(&text)?;
        let trimmed = text.trim_start();
        let kind = if trimmed.starts_with("if ") || trimmed.starts_with("if(") {
            StatementKind::If
        } else if trimmed.starts_with("return ") || trimmed.starts_with("return;") {
            StatementKind::Return
        } else if trimmed.starts_with("View ") {
            StatementKind::LocalVar
        } else {
            StatementKind::Expression
        };
        Ok(Self { text, kind })
    }
}

/// A synthetic method under construction.
#[derive(Debug, Clone, Default)]
pub struct SyntheticMethod {
    name: String,
    header: String,
    params: Vec<Param>,
    prefix_lines: Vec<String>,
    body: Vec<SyntheticStatement>,
}

impl SyntheticMethod {
    /// Create a synthetic method from its name and signature text.
    #[must_use]
    pub fn new(name: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: header.into(),
            ..Self::default()
        }
    }

    /// Declare a parameter (used for forwarding-call arity decisions).
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            type_name: type_name.into(),
        });
        self
    }

    /// Add a line emitted above the signature, e.g. `@Override`.
    #[must_use]
    pub fn with_prefix_line(mut self, line: impl Into<String>) -> Self {
        self.prefix_lines.push(line.into());
        self
    }

    /// Append a body statement.
    #[must_use]
    pub fn with_statement(mut self, statement: SyntheticStatement) -> Self {
        self.body.push(statement);
        self
    }
}

fn validate_snippet(text: &str) -> Result<(), TreeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TreeError::MalformedSnippet("empty statement".into()));
    }
    let mut depth_paren = 0i32;
    let mut depth_brace = 0i32;
    let mut depth_bracket = 0i32;
    let mut chars = trimmed.chars().peekable();
    let mut in_string = false;
    let mut in_char = false;
    while let Some(c) = chars.next() {
        if in_string {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        if in_char {
            match c {
                '\\' => {
                    chars.next();
                }
                '\'' => in_char = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '\'' => in_char = true,
            '(' => depth_paren += 1,
            ')' => depth_paren -= 1,
            '{' => depth_brace += 1,
            '}' => depth_brace -= 1,
            '[' => depth_bracket += 1,
            ']' => depth_bracket -= 1,
            _ => {}
        }
        if depth_paren < 0 || depth_brace < 0 || depth_bracket < 0 {
            return Err(TreeError::MalformedSnippet(trimmed.to_owned()));
        }
    }
    if depth_paren != 0 || depth_brace != 0 || depth_bracket != 0 || in_string || in_char {
        return Err(TreeError::MalformedSnippet(trimmed.to_owned()));
    }
    if !(trimmed.ends_with(';') || trimmed.ends_with('}')) {
        return Err(TreeError::MalformedSnippet(trimmed.to_owned()));
    }
    Ok(())
}

/// Result of committing a tree's mutations.
#[derive(Debug)]
pub struct Commit {
    /// The rewritten source text.
    pub source: String,
    /// Whether the text differs from the original.
    pub changed: bool,
}

/// The mutable model of one compilation unit.
#[derive(Debug)]
pub struct JavaTree {
    pub(crate) source: String,
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) mutated: bool,
}

impl JavaTree {
    /// Parse Java source into a tree model.
    pub fn parse(source: &str) -> Result<Self, TreeError> {
        crate::tree::parser::parse(source)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub(crate) fn push_node(&mut self, data: NodeData, span: Option<Span>) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            data,
            span,
            removed: false,
        });
        id
    }

    /// Kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        match self.node(id).data {
            NodeData::Unit(_) => NodeKind::Unit,
            NodeData::Import(_) => NodeKind::Import,
            NodeData::Type(_) => NodeKind::Type,
            NodeData::Field(_) => NodeKind::Field,
            NodeData::Method(_) => NodeKind::Method,
            NodeData::Statement(_) => NodeKind::Statement,
            NodeData::Annotation(_) => NodeKind::Annotation,
        }
    }

    /// Whether a node has been deleted.
    #[must_use]
    pub fn is_removed(&self, id: NodeId) -> bool {
        self.node(id).removed
    }

    fn unit(&self) -> &UnitData {
        match &self.node(self.root).data {
            NodeData::Unit(u) => u,
            // The root is constructed as a unit and never replaced.
            _ => unreachable!("root node is always a unit"),
        }
    }

    pub(crate) fn type_data(&self, id: NodeId) -> Option<&TypeData> {
        match &self.node(id).data {
            NodeData::Type(t) => Some(t),
            _ => None,
        }
    }

    pub(crate) fn method_data(&self, id: NodeId) -> Option<&MethodData> {
        match &self.node(id).data {
            NodeData::Method(m) => Some(m),
            _ => None,
        }
    }

    pub(crate) fn field_data(&self, id: NodeId) -> Option<&FieldData> {
        match &self.node(id).data {
            NodeData::Field(f) => Some(f),
            _ => None,
        }
    }

    pub(crate) fn statement_data(&self, id: NodeId) -> Option<&StatementData> {
        match &self.node(id).data {
            NodeData::Statement(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn annotation_data(&self, id: NodeId) -> Option<&AnnotationData> {
        match &self.node(id).data {
            NodeData::Annotation(a) => Some(a),
            _ => None,
        }
    }

    pub(crate) fn import_data(&self, id: NodeId) -> Option<&ImportData> {
        match &self.node(id).data {
            NodeData::Import(i) => Some(i),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Read API
    // ------------------------------------------------------------------

    /// Import declarations of the unit, live ones only.
    #[must_use]
    pub fn imports(&self) -> Vec<NodeId> {
        self.live(&self.unit().imports)
    }

    /// Qualified name of an import.
    #[must_use]
    pub fn import_name(&self, id: NodeId) -> Option<&str> {
        self.import_data(id).map(|i| i.qualified_name.as_str())
    }

    /// Top-level type declarations of the unit.
    #[must_use]
    pub fn top_level_types(&self) -> Vec<NodeId> {
        self.live(&self.unit().types)
    }

    /// Name of a type declaration.
    #[must_use]
    pub fn type_name(&self, id: NodeId) -> Option<&str> {
        self.type_data(id).map(|t| t.name.as_str())
    }

    /// Implemented-interface list of a type declaration.
    #[must_use]
    pub fn interfaces_of(&self, id: NodeId) -> Vec<String> {
        self.type_data(id)
            .map(|t| t.interfaces.clone())
            .unwrap_or_default()
    }

    /// Methods and constructors declared directly on a type.
    #[must_use]
    pub fn methods_of(&self, ty: NodeId) -> Vec<NodeId> {
        self.members_of_kind(ty, NodeKind::Method)
    }

    /// Fields declared directly on a type.
    #[must_use]
    pub fn fields_of(&self, ty: NodeId) -> Vec<NodeId> {
        self.members_of_kind(ty, NodeKind::Field)
    }

    /// Nested type declarations of a type.
    #[must_use]
    pub fn nested_types_of(&self, ty: NodeId) -> Vec<NodeId> {
        self.members_of_kind(ty, NodeKind::Type)
    }

    fn members_of_kind(&self, ty: NodeId, kind: NodeKind) -> Vec<NodeId> {
        self.type_data(ty)
            .map(|t| {
                t.members
                    .iter()
                    .copied()
                    .filter(|&m| !self.is_removed(m) && self.kind(m) == kind)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn live(&self, ids: &[NodeId]) -> Vec<NodeId> {
        ids.iter()
            .copied()
            .filter(|&id| !self.is_removed(id))
            .collect()
    }

    /// Name of a method or constructor.
    #[must_use]
    pub fn method_name(&self, id: NodeId) -> Option<&str> {
        self.method_data(id).map(|m| m.name.as_str())
    }

    /// Whether the method node is a constructor.
    #[must_use]
    pub fn is_constructor(&self, id: NodeId) -> bool {
        self.method_data(id).is_some_and(|m| m.is_constructor)
    }

    /// Parameters of a method or constructor.
    #[must_use]
    pub fn params_of(&self, id: NodeId) -> Vec<Param> {
        self.method_data(id)
            .map(|m| m.params.clone())
            .unwrap_or_default()
    }

    /// Whether a method node has a body block (synthetic ones always do).
    #[must_use]
    pub fn has_body(&self, id: NodeId) -> bool {
        self.method_data(id)
            .is_some_and(|m| m.body_start.is_some() || m.header.is_some())
    }

    /// Live top-level statements of a method body, in order.
    #[must_use]
    pub fn body_of(&self, method: NodeId) -> Vec<NodeId> {
        self.method_data(method)
            .map(|m| self.live(&m.body))
            .unwrap_or_default()
    }

    /// Annotations on a field or method.
    #[must_use]
    pub fn annotations_of(&self, id: NodeId) -> Vec<NodeId> {
        let ids = match &self.node(id).data {
            NodeData::Field(f) => &f.annotations,
            NodeData::Method(m) => &m.annotations,
            _ => return Vec::new(),
        };
        self.live(ids)
    }

    /// Qualified name of an annotation.
    #[must_use]
    pub fn annotation_name(&self, id: NodeId) -> Option<&str> {
        self.annotation_data(id).map(|a| a.qualified_name.as_str())
    }

    /// The `value` attribute of an annotation (named or positional).
    #[must_use]
    pub fn annotation_value(&self, id: NodeId) -> Option<&AnnotationValue> {
        self.annotation_data(id).and_then(|a| a.value.as_ref())
    }

    /// Name of a field.
    #[must_use]
    pub fn field_name(&self, id: NodeId) -> Option<&str> {
        self.field_data(id).map(|f| f.name.as_str())
    }

    /// Declared type text of a field.
    #[must_use]
    pub fn field_type(&self, id: NodeId) -> Option<&str> {
        self.field_data(id).map(|f| f.type_name.as_str())
    }

    /// Shape of a statement.
    #[must_use]
    pub fn statement_kind(&self, id: NodeId) -> StatementKind {
        self.statement_data(id)
            .map_or(StatementKind::Other, |s| s.kind)
    }

    /// Source text of a node.
    ///
    /// Original nodes slice the source; synthetic nodes render their stored
    /// text.
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        if let Some(span) = self.node(id).span {
            return self.source[span.start..span.end].to_owned();
        }
        match &self.node(id).data {
            NodeData::Statement(s) => s.text.clone().unwrap_or_default(),
            NodeData::Method(m) => {
                let mut out = String::new();
                for line in &m.prefix_lines {
                    out.push_str(line);
                    out.push('\n');
                }
                out.push_str(m.header.as_deref().unwrap_or_default());
                out.push_str(" {\n");
                for &stmt in &m.body {
                    if !self.is_removed(stmt) {
                        out.push_str(&self.text(stmt));
                        out.push('\n');
                    }
                }
                out.push('}');
                out
            }
            NodeData::Import(i) => format!("import {};", i.qualified_name),
            _ => String::new(),
        }
    }

    // ------------------------------------------------------------------
    // Mutation API
    // ------------------------------------------------------------------

    /// Delete a node. Tolerates nodes that are already gone.
    pub fn remove(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        if !node.removed {
            node.removed = true;
            self.mutated = true;
        }
    }

    /// Insert a synthetic statement immediately after `anchor` inside
    /// `method`'s body.
    ///
    /// Later insertions after the same anchor land closer to it.
    pub fn insert_statement_after(
        &mut self,
        method: NodeId,
        anchor: NodeId,
        statement: SyntheticStatement,
    ) -> Result<NodeId, TreeError> {
        let id = self.push_statement(statement);
        let m = self.require_method_mut(method)?;
        let idx = m
            .body
            .iter()
            .position(|&s| s == anchor)
            .ok_or(TreeError::AnchorNotFound)?;
        m.body.insert(idx + 1, id);
        self.mutated = true;
        Ok(id)
    }

    /// Insert a synthetic statement as the first statement of `method`.
    pub fn insert_statement_first(
        &mut self,
        method: NodeId,
        statement: SyntheticStatement,
    ) -> Result<NodeId, TreeError> {
        let id = self.push_statement(statement);
        let m = self.require_method_mut(method)?;
        m.body.insert(0, id);
        self.mutated = true;
        Ok(id)
    }

    /// Insert a synthetic method immediately after `anchor` in the member
    /// list of `ty`.
    pub fn insert_method_after(
        &mut self,
        ty: NodeId,
        anchor: NodeId,
        method: SyntheticMethod,
    ) -> Result<NodeId, TreeError> {
        self.insert_method_at(ty, anchor, method, true)
    }

    /// Insert a synthetic method immediately before `anchor` in the member
    /// list of `ty`.
    pub fn insert_method_before(
        &mut self,
        ty: NodeId,
        anchor: NodeId,
        method: SyntheticMethod,
    ) -> Result<NodeId, TreeError> {
        self.insert_method_at(ty, anchor, method, false)
    }

    fn insert_method_at(
        &mut self,
        ty: NodeId,
        anchor: NodeId,
        method: SyntheticMethod,
        after: bool,
    ) -> Result<NodeId, TreeError> {
        let body: Vec<NodeId> = method
            .body
            .into_iter()
            .map(|s| self.push_statement(s))
            .collect();
        let id = self.push_node(
            NodeData::Method(MethodData {
                name: method.name,
                is_constructor: false,
                params: method.params,
                annotations: Vec::new(),
                body,
                body_start: None,
                header: Some(method.header),
                prefix_lines: method.prefix_lines,
            }),
            None,
        );
        let t = match &mut self.node_mut(ty).data {
            NodeData::Type(t) => t,
            _ => return Err(TreeError::WrongKind { expected: "type" }),
        };
        let idx = t
            .members
            .iter()
            .position(|&m| m == anchor)
            .ok_or(TreeError::AnchorNotFound)?;
        t.members.insert(if after { idx + 1 } else { idx }, id);
        self.mutated = true;
        Ok(id)
    }

    /// Add an import declaration, positioned after `anchor` when given and
    /// after the last existing import otherwise.
    pub fn add_import(&mut self, qualified_name: &str, anchor: Option<NodeId>) -> NodeId {
        let id = self.push_node(
            NodeData::Import(ImportData {
                qualified_name: qualified_name.to_owned(),
            }),
            None,
        );
        let root = self.root;
        if let NodeData::Unit(u) = &mut self.nodes[root.0 as usize].data {
            let idx = anchor
                .and_then(|a| u.imports.iter().position(|&i| i == a).map(|i| i + 1))
                .unwrap_or(u.imports.len());
            u.imports.insert(idx, id);
        }
        self.mutated = true;
        id
    }

    fn push_statement(&mut self, statement: SyntheticStatement) -> NodeId {
        self.push_node(
            NodeData::Statement(StatementData {
                kind: statement.kind,
                text: Some(statement.text),
            }),
            None,
        )
    }

    fn require_method_mut(&mut self, id: NodeId) -> Result<&mut MethodData, TreeError> {
        match &mut self.node_mut(id).data {
            NodeData::Method(m) => Ok(m),
            _ => Err(TreeError::WrongKind { expected: "method" }),
        }
    }

    // ------------------------------------------------------------------
    // Commit
    // ------------------------------------------------------------------

    /// Render all mutations into the final source text.
    ///
    /// Acts as the transaction boundary: either every queued mutation
    /// applies, or the commit fails and the original text is untouched.
    pub fn commit(self) -> Result<Commit, TreeError> {
        if !self.mutated {
            return Ok(Commit {
                source: self.source,
                changed: false,
            });
        }
        let mut edits = EditSet::new();
        self.emit_import_edits(&mut edits);
        for &ty in &self.unit().types {
            self.emit_type_edits(ty, &mut edits);
        }
        let rendered = edits.apply(&self.source)?;
        let changed = rendered != self.source;
        Ok(Commit {
            source: rendered,
            changed,
        })
    }

    fn emit_import_edits(&self, edits: &mut EditSet) {
        let unit = self.unit();
        let mut insert_at = unit.header_end;
        let mut pending = String::new();
        for &id in &unit.imports {
            let node = self.node(id);
            if let Some(span) = node.span {
                if !pending.is_empty() {
                    edits.push(Edit::insert(insert_at, std::mem::take(&mut pending)));
                }
                if node.removed {
                    let (s, e) = self.expand_to_lines(span);
                    edits.push(Edit::delete(s, e));
                }
                insert_at = self.line_end_after(span.end);
            } else if !node.removed {
                pending.push_str(&self.text(id));
                pending.push('\n');
            }
        }
        if !pending.is_empty() {
            edits.push(Edit::insert(insert_at, pending));
        }
    }

    fn emit_type_edits(&self, ty: NodeId, edits: &mut EditSet) {
        let Some(data) = self.type_data(ty) else {
            return;
        };
        let member_indent = self.member_indent(data);
        let mut insert_at = data.body_start;
        let mut pending = String::new();
        for &member in &data.members {
            let node = self.node(member);
            if let Some(span) = node.span {
                if !pending.is_empty() {
                    edits.push(Edit::insert(insert_at, std::mem::take(&mut pending)));
                }
                if node.removed {
                    let (s, e) = self.expand_to_lines(span);
                    edits.push(Edit::delete(s, e));
                } else {
                    match &node.data {
                        NodeData::Field(f) => self.emit_annotation_edits(&f.annotations, edits),
                        NodeData::Method(m) => {
                            self.emit_annotation_edits(&m.annotations, edits);
                            self.emit_body_edits(member, edits);
                        }
                        NodeData::Type(_) => self.emit_type_edits(member, edits),
                        _ => {}
                    }
                }
                insert_at = self.line_end_after(span.end);
            } else if !node.removed {
                // Rendered methods start with their own line break, so the
                // same text works right after `{` and after a member line.
                pending.push_str(&self.render_method(member, &member_indent));
            }
        }
        if !pending.is_empty() {
            edits.push(Edit::insert(insert_at, pending));
        }
    }

    fn emit_annotation_edits(&self, annotations: &[NodeId], edits: &mut EditSet) {
        for &a in annotations {
            if self.is_removed(a) {
                if let Some(span) = self.node(a).span {
                    let (s, e) = self.expand_to_lines(span);
                    edits.push(Edit::delete(s, e));
                }
            }
        }
    }

    fn emit_body_edits(&self, method: NodeId, edits: &mut EditSet) {
        let Some(m) = self.method_data(method) else {
            return;
        };
        let Some(body_start) = m.body_start else {
            return;
        };
        let indent = self.statement_indent(m, method);
        let mut insert_at = body_start;
        let mut at_block_start = true;
        let mut pending: Vec<String> = Vec::new();
        for &stmt in &m.body {
            let node = self.node(stmt);
            if let Some(span) = node.span {
                if !pending.is_empty() {
                    Self::flush_statements(edits, insert_at, at_block_start, &indent, &mut pending);
                }
                if node.removed {
                    let (s, e) = self.expand_to_lines(span);
                    edits.push(Edit::delete(s, e));
                }
                insert_at = self.line_end_after(span.end);
                at_block_start = false;
            } else if !node.removed {
                pending.push(self.text(stmt));
            }
        }
        if !pending.is_empty() {
            Self::flush_statements(edits, insert_at, at_block_start, &indent, &mut pending);
        }
    }

    fn flush_statements(
        edits: &mut EditSet,
        at: usize,
        at_block_start: bool,
        indent: &str,
        pending: &mut Vec<String>,
    ) {
        let mut text = String::new();
        if at_block_start {
            // Right after the `{`; the original text supplies the newline
            // before the next statement.
            for stmt in pending.drain(..) {
                text.push('\n');
                text.push_str(indent);
                text.push_str(&stmt);
            }
        } else {
            for stmt in pending.drain(..) {
                text.push_str(indent);
                text.push_str(&stmt);
                text.push('\n');
            }
        }
        edits.push(Edit::insert(at, text));
    }

    fn render_method(&self, method: NodeId, indent: &str) -> String {
        let Some(m) = self.method_data(method) else {
            return String::new();
        };
        let mut out = String::from("\n");
        for line in &m.prefix_lines {
            out.push_str(indent);
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(indent);
        out.push_str(m.header.as_deref().unwrap_or_default());
        out.push_str(" {\n");
        for &stmt in &m.body {
            if !self.is_removed(stmt) {
                out.push_str(indent);
                out.push_str("    ");
                out.push_str(&self.text(stmt));
                out.push('\n');
            }
        }
        out.push_str(indent);
        out.push_str("}\n");
        out
    }

    fn member_indent(&self, data: &TypeData) -> String {
        for &m in &data.members {
            if let Some(span) = self.node(m).span {
                return self.line_indent_at(span.start);
            }
        }
        // No original member to copy from; derive from the body position.
        let mut indent = self.line_indent_at(data.body_start.saturating_sub(1));
        indent.push_str("    ");
        indent
    }

    fn statement_indent(&self, m: &MethodData, method: NodeId) -> String {
        for &s in &m.body {
            if let Some(span) = self.node(s).span {
                return self.line_indent_at(span.start);
            }
        }
        let mut indent = self
            .node(method)
            .span
            .map(|span| self.line_indent_at(span.start))
            .unwrap_or_default();
        indent.push_str("    ");
        indent
    }

    // ------------------------------------------------------------------
    // Line helpers
    // ------------------------------------------------------------------

    fn line_start(&self, offset: usize) -> usize {
        self.source[..offset]
            .rfind('\n')
            .map_or(0, |idx| idx + 1)
    }

    pub(crate) fn line_end_after(&self, offset: usize) -> usize {
        self.source[offset..]
            .find('\n')
            .map_or(self.source.len(), |idx| offset + idx + 1)
    }

    fn line_indent_at(&self, offset: usize) -> String {
        let start = self.line_start(offset);
        self.source[start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    /// Expand a span to whole lines when the node sits alone on them;
    /// otherwise trim just the span plus trailing spaces.
    fn expand_to_lines(&self, span: Span) -> (usize, usize) {
        let ls = self.line_start(span.start);
        let le = self.line_end_after(span.end);
        let before_ok = self.source[ls..span.start].chars().all(char::is_whitespace);
        let tail = &self.source[span.end..le];
        let after_ok = tail.chars().all(char::is_whitespace);
        if before_ok && after_ok {
            (ls, le)
        } else {
            let mut end = span.end;
            for c in self.source[span.end..].chars() {
                if c == ' ' || c == '\t' {
                    end += c.len_utf8();
                } else {
                    break;
                }
            }
            (span.start, end)
        }
    }
}
