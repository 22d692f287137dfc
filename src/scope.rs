//! Scope resolution: walk up from a located node to its method, type and namespace.

use serde::Serialize;
use tree_sitter::Node;

use crate::error::BindFailure;
use crate::locator::SourceDocument;
use crate::naming;
use crate::types::{BindOutcome, ResolvedScope};

/// A method-like declaration found while listing a document's scopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodScope {
    /// One-based last line of the declaration.
    pub end_line: usize,
    /// Names the declaration resolves to.
    #[serde(flatten)]
    pub scope: ResolvedScope,
    /// One-based first line of the declaration.
    pub start_line: usize,
}

/// How a syntax node takes part in scope resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Something with a compiled body: method, constructor, accessor, operator, local function.
    Method,
    /// A block or file-scoped namespace declaration.
    Namespace,
    /// Anything else.
    Other,
    /// A class, struct, interface or record.
    Type,
}

/// Classify a node by its kind. Expression bodies only count as methods
/// when they are the getter of a property or indexer.
pub fn classify(node: Node<'_>) -> ScopeKind {
    return match node.kind() {
        "accessor_declaration"
        | "constructor_declaration"
        | "conversion_operator_declaration"
        | "destructor_declaration"
        | "local_function_statement"
        | "method_declaration"
        | "operator_declaration" => ScopeKind::Method,
        "arrow_expression_clause" => {
            let is_getter = node
                .parent()
                .is_some_and(|p| return matches!(p.kind(), "indexer_declaration" | "property_declaration"));
            if is_getter { ScopeKind::Method } else { ScopeKind::Other }
        },
        "class_declaration"
        | "interface_declaration"
        | "record_declaration"
        | "record_struct_declaration"
        | "struct_declaration" => ScopeKind::Type,
        "file_scoped_namespace_declaration" | "namespace_declaration" => ScopeKind::Namespace,
        _ => ScopeKind::Other,
    };
}

/// List every method-like declaration in a document, in source order.
/// Declarations that don't resolve (e.g. a method outside any type) are skipped.
pub fn list_method_scopes(document: &SourceDocument) -> Vec<MethodScope> {
    let mut scopes = Vec::new();
    let mut stack = vec![document.root()];

    while let Some(node) = stack.pop() {
        if classify(node) == ScopeKind::Method
            && let Ok(scope) = resolve_from(document, node, 0)
        {
            scopes.push(MethodScope {
                end_line: node.end_position().row.saturating_add(1),
                scope,
                start_line: node.start_position().row.saturating_add(1),
            });
        }

        // Push in reverse so children pop in source order.
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    return scopes;
}

/// Resolve the scope enclosing a located node.
///
/// The walk includes the node itself, so a line holding a whole one-line
/// method binds to that method. `line` is only used in failures.
///
/// # Errors
///
/// Returns `BindFailure::NotInsideMethod` if no method encloses the node,
/// or `BindFailure::NotInsideType` if no type encloses the method.
pub fn resolve_from(document: &SourceDocument, node: Node<'_>, line: u32) -> BindOutcome {
    let source = document.text();

    let Some((method, method_name)) = enclosing_method(node, source) else {
        return Err(BindFailure::NotInsideMethod { file: document.path().to_path_buf(), line });
    };

    let Some((ty, type_name)) = nearest_named(method.parent(), ScopeKind::Type, source) else {
        return Err(BindFailure::NotInsideType {
            file: document.path().to_path_buf(),
            line,
            method: method_name,
        });
    };

    let namespace_name = enclosing_namespace(document, ty);
    tracing::debug!(
        file = %document.path().display(),
        line,
        namespace = %namespace_name,
        type_name = %type_name,
        method = %method_name,
        "resolved scope"
    );

    return Ok(ResolvedScope { method_name, namespace_name, type_name });
}

/// Walk up from `start` (inclusive) to the method it sits in. A property,
/// indexer or event reached first stands for its first body, so a one-line
/// `int X => _x;` or `int X { get { return _x; } }` binds to its accessor.
fn enclosing_method<'tree>(start: Node<'tree>, source: &str) -> Option<(Node<'tree>, String)> {
    let mut current = Some(start);
    while let Some(node) = current {
        let candidate = if classify(node) == ScopeKind::Method { Some(node) } else { first_body(node) };
        if let Some(method) = candidate
            && let Some(name) = scope_name(method, ScopeKind::Method, source)
        {
            return Some((method, name));
        }
        current = node.parent();
    }
    return None;
}

/// Dotted namespace of a type: enclosing block namespaces outermost first,
/// prefixed by the file-scoped namespace if the file declares one.
/// Empty for the global namespace.
fn enclosing_namespace(document: &SourceDocument, ty: Node<'_>) -> String {
    let source = document.text();
    let mut segments = Vec::new();
    let mut file_scoped_seen = false;

    let mut current = ty.parent();
    while let Some(node) = current {
        if classify(node) == ScopeKind::Namespace
            && let Some(name) = scope_name(node, ScopeKind::Namespace, source)
        {
            file_scoped_seen |= node.kind() == "file_scoped_namespace_declaration";
            segments.push(name);
        }
        current = node.parent();
    }

    // Some grammar versions make members siblings of the file-scoped declaration.
    if !file_scoped_seen && let Some(name) = preceding_file_scoped_namespace(document, ty) {
        segments.push(name);
    }

    segments.reverse();
    return segments.join(".");
}

/// The expression body of a property or indexer, or else its first accessor
/// that has a body. `None` for auto-properties and non-property nodes.
fn first_body(node: Node<'_>) -> Option<Node<'_>> {
    if !matches!(node.kind(), "event_declaration" | "indexer_declaration" | "property_declaration") {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
    if let Some(arrow) = children.iter().find(|c| return c.kind() == "arrow_expression_clause") {
        return Some(*arrow);
    }

    let accessors = children.iter().find(|c| return c.kind() == "accessor_list")?;
    let mut cursor = accessors.walk();
    let body = accessors.named_children(&mut cursor).find(|accessor| {
        let mut inner = accessor.walk();
        let has_body = accessor
            .named_children(&mut inner)
            .any(|c| return matches!(c.kind(), "arrow_expression_clause" | "block"));
        return accessor.kind() == "accessor_declaration" && has_body;
    });
    return body;
}

/// Walk up from `start` (inclusive) to the nearest node of `wanted` kind that has a name.
/// Unnamed matches (broken by syntax errors) are stepped over.
fn nearest_named<'tree>(
    start: Option<Node<'tree>>,
    wanted: ScopeKind,
    source: &str,
) -> Option<(Node<'tree>, String)> {
    let mut current = start;
    while let Some(node) = current {
        if classify(node) == wanted
            && let Some(name) = scope_name(node, wanted, source)
        {
            return Some((node, name));
        }
        current = node.parent();
    }
    return None;
}

/// A file-scoped namespace declared at the top level before `node`.
fn preceding_file_scoped_namespace(document: &SourceDocument, node: Node<'_>) -> Option<String> {
    let root = document.root();
    let mut cursor = root.walk();
    let declaration = root.children(&mut cursor).find(|c| {
        return c.kind() == "file_scoped_namespace_declaration" && c.start_byte() <= node.start_byte();
    })?;
    return scope_name(declaration, ScopeKind::Namespace, document.text());
}

/// Name of a classified scope node.
fn scope_name(node: Node<'_>, kind: ScopeKind, source: &str) -> Option<String> {
    return match kind {
        ScopeKind::Method => naming::member_name(node, source),
        ScopeKind::Namespace | ScopeKind::Type => {
            let text = node.child_by_field_name("name")?.utf8_text(source.as_bytes()).ok()?;
            let compact: String = text.chars().filter(|c| return !c.is_whitespace()).collect();
            if compact.is_empty() { None } else { Some(compact) }
        },
        ScopeKind::Other => None,
    };
}
