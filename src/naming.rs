//! Metadata names for C# members whose compiled body isn't named by a plain identifier.

use tree_sitter::Node;

/// Name the compiled body of a method-like declaration.
///
/// Returns `None` for nodes that aren't method-like, and for method-like
/// nodes too damaged by syntax errors to name.
pub fn member_name(node: Node<'_>, source: &str) -> Option<String> {
    return match node.kind() {
        "accessor_declaration" => accessor_name(node, source),
        "arrow_expression_clause" => {
            let owner = node.parent()?;
            property_name(owner, source).map(|name| return format!("get_{name}"))
        },
        "constructor_declaration" => {
            let name = if has_modifier(node, "static", source) { ".cctor" } else { ".ctor" };
            Some(name.to_string())
        },
        "conversion_operator_declaration" => conversion_name(node),
        "destructor_declaration" => Some("Finalize".to_string()),
        "local_function_statement" | "method_declaration" => field_text(node, "name", source),
        "operator_declaration" => operator_name(node, source),
        _ => None,
    };
}

/// `get_X`, `set_X`, `add_X` or `remove_X` for a property, indexer or event accessor.
fn accessor_name(node: Node<'_>, source: &str) -> Option<String> {
    let keyword = accessor_keyword(node, source)?;
    let prefix = match keyword {
        "add" => "add_",
        "get" => "get_",
        "init" | "set" => "set_",
        "remove" => "remove_",
        _ => return None,
    };

    // accessor_declaration -> accessor_list -> property/indexer/event declaration
    let owner = node.parent()?.parent()?;
    let name = property_name(owner, source)?;
    return Some(format!("{prefix}{name}"));
}

/// The `get`/`set`/`init`/`add`/`remove` keyword of an accessor.
fn accessor_keyword<'a>(node: Node<'_>, source: &'a str) -> Option<&'a str> {
    if let Some(name) = node.child_by_field_name("name") {
        return name.utf8_text(source.as_bytes()).ok();
    }

    let mut cursor = node.walk();
    let keyword = node
        .children(&mut cursor)
        .find(|c| return matches!(c.kind(), "add" | "get" | "init" | "remove" | "set"))?;
    return keyword.utf8_text(source.as_bytes()).ok();
}

/// `op_Implicit` or `op_Explicit`.
fn conversion_name(node: Node<'_>) -> Option<String> {
    let mut cursor = node.walk();
    let kind = node
        .children(&mut cursor)
        .find_map(|c| {
            return match c.kind() {
                "explicit" => Some("op_Explicit"),
                "implicit" => Some("op_Implicit"),
                _ => None,
            };
        })?;
    return Some(kind.to_string());
}

/// Text of a named field, with whitespace removed.
fn field_text(node: Node<'_>, field: &str, source: &str) -> Option<String> {
    let child = node.child_by_field_name(field)?;
    let text = child.utf8_text(source.as_bytes()).ok()?;
    let compact: String = text.chars().filter(|c| return !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    return Some(compact);
}

/// Whether a declaration carries a modifier keyword such as `static`.
fn has_modifier(node: Node<'_>, keyword: &str, source: &str) -> bool {
    let mut cursor = node.walk();
    return node.children(&mut cursor).any(|c| {
        if c.kind() == keyword {
            return true;
        }
        return c.kind() == "modifier" && c.utf8_text(source.as_bytes()).is_ok_and(|t| return t == keyword);
    });
}

/// `op_*` name for a user-defined operator. Unary and binary forms of `+`
/// and `-` are told apart by parameter count.
fn operator_name(node: Node<'_>, source: &str) -> Option<String> {
    let symbol = node.child_by_field_name("operator")?.utf8_text(source.as_bytes()).ok()?;
    let unary = parameter_count(node) == 1;

    let name = match (symbol, unary) {
        ("!", _) => "op_LogicalNot",
        ("!=", _) => "op_Inequality",
        ("%", _) => "op_Modulus",
        ("&", _) => "op_BitwiseAnd",
        ("*", _) => "op_Multiply",
        ("+", false) => "op_Addition",
        ("+", true) => "op_UnaryPlus",
        ("++", _) => "op_Increment",
        ("-", false) => "op_Subtraction",
        ("-", true) => "op_UnaryNegation",
        ("--", _) => "op_Decrement",
        ("/", _) => "op_Division",
        ("<", _) => "op_LessThan",
        ("<<", _) => "op_LeftShift",
        ("<=", _) => "op_LessThanOrEqual",
        ("==", _) => "op_Equality",
        (">", _) => "op_GreaterThan",
        (">=", _) => "op_GreaterThanOrEqual",
        (">>", _) => "op_RightShift",
        (">>>", _) => "op_UnsignedRightShift",
        ("^", _) => "op_ExclusiveOr",
        ("false", _) => "op_False",
        ("true", _) => "op_True",
        ("|", _) => "op_BitwiseOr",
        ("~", _) => "op_OnesComplement",
        _ => return None,
    };
    return Some(name.to_string());
}

/// Number of parameters in a declaration's parameter list.
fn parameter_count(node: Node<'_>) -> usize {
    let Some(list) = node.child_by_field_name("parameters") else {
        return 0;
    };
    let mut cursor = list.walk();
    return list.children(&mut cursor).filter(|c| return c.kind() == "parameter").count();
}

/// Name a property-like owner of accessors: indexers are always `Item`.
fn property_name(owner: Node<'_>, source: &str) -> Option<String> {
    return match owner.kind() {
        "event_declaration" | "property_declaration" => field_text(owner, "name", source),
        "indexer_declaration" => Some("Item".to_string()),
        _ => None,
    };
}
