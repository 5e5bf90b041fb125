//! Structural extraction
//!
//! Visits the top-level statements of a parsed file and records function
//! definitions, load statements, calls and assignments. Nested scopes are
//! never entered.

use std::collections::BTreeMap;

use starquery_core::{Arg, Assign, Call, Def, File, FileKind, Load};
use tracing::debug;
use tree_sitter::Node;

use crate::ast::{line_of, string_literal_value, SyntaxTree};

/// Extract index data from a parsed file
pub fn extract_file(tree: &SyntaxTree, path: &str, kind: FileKind) -> File {
    let mut file = File::new(path, kind);
    let root = tree.root();

    let mut cursor = root.walk();
    for stmt in root.named_children(&mut cursor) {
        match stmt.kind() {
            "function_definition" => {
                if let Some(def) = extract_def(tree, stmt, path) {
                    file.defs.push(def);
                }
            }
            "expression_statement" => extract_expression_statement(tree, stmt, path, &mut file),
            _ => {}
        }
    }

    debug!(
        "Extracted {}: {} defs, {} loads, {} calls, {} assigns",
        path,
        file.defs.len(),
        file.loads.len(),
        file.calls.len(),
        file.assigns.len()
    );
    file
}

fn extract_expression_statement(tree: &SyntaxTree, stmt: Node<'_>, path: &str, file: &mut File) {
    let line = line_of(stmt);
    let mut cursor = stmt.walk();
    for expr in stmt.named_children(&mut cursor) {
        match expr.kind() {
            "call" => {
                if let Some(load) = extract_load(tree, expr, path) {
                    file.loads.push(load);
                } else if let Some(call) = extract_call(tree, expr, path) {
                    file.calls.push(call);
                }
            }
            "assignment" | "augmented_assignment" => {
                for name in assignment_names(tree, expr) {
                    file.assigns.push(Assign {
                        name,
                        file: path.to_string(),
                        line,
                    });
                }
            }
            _ => {}
        }
    }
}

fn extract_def(tree: &SyntaxTree, node: Node<'_>, path: &str) -> Option<Def> {
    let name = tree.text(node.child_by_field_name("name")?).to_string();
    let params = node
        .child_by_field_name("parameters")
        .map(|p| extract_params(tree, p))
        .unwrap_or_default();
    let docstring = node
        .child_by_field_name("body")
        .and_then(|body| extract_docstring(tree, body))
        .unwrap_or_default();

    Some(Def {
        name,
        file: path.to_string(),
        line: line_of(node),
        params,
        docstring,
    })
}

fn extract_params(tree: &SyntaxTree, node: Node<'_>) -> Vec<String> {
    let mut params = Vec::new();
    let mut cursor = node.walk();
    for param in node.named_children(&mut cursor) {
        if let Some(name) = param_name(tree, param) {
            params.push(name);
        }
    }
    params
}

fn param_name(tree: &SyntaxTree, node: Node<'_>) -> Option<String> {
    match node.kind() {
        "identifier" => Some(tree.text(node).to_string()),
        "default_parameter" | "typed_default_parameter" => node
            .child_by_field_name("name")
            .and_then(|n| param_name(tree, n)),
        // name: type  (the name is the first named child)
        "typed_parameter" => node.named_child(0).and_then(|n| param_name(tree, n)),
        "list_splat_pattern" => first_identifier(tree, node).map(|n| format!("*{n}")),
        "dictionary_splat_pattern" => first_identifier(tree, node).map(|n| format!("**{n}")),
        // bare `*` and `/` separators bind nothing
        _ => None,
    }
}

fn first_identifier(tree: &SyntaxTree, node: Node<'_>) -> Option<String> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "identifier")
        .map(|c| tree.text(c).to_string());
    found
}

fn extract_docstring(tree: &SyntaxTree, body: Node<'_>) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment")?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }
    string_value(tree, first.named_child(0)?)
}

/// Value of a (possibly implicitly concatenated) string literal
fn string_value(tree: &SyntaxTree, node: Node<'_>) -> Option<String> {
    match node.kind() {
        "string" => Some(string_literal_value(tree.text(node))),
        "concatenated_string" => {
            let mut value = String::new();
            let mut cursor = node.walk();
            for part in node.named_children(&mut cursor) {
                value.push_str(&string_value(tree, part)?);
            }
            Some(value)
        }
        _ => None,
    }
}

/// `load("//pkg:file.bzl", "a", b = "c")`
fn extract_load(tree: &SyntaxTree, call: Node<'_>, path: &str) -> Option<Load> {
    let function = call.child_by_field_name("function")?;
    if function.kind() != "identifier" || tree.text(function) != "load" {
        return None;
    }
    let args = call.child_by_field_name("arguments")?;
    if args.kind() != "argument_list" {
        return None;
    }

    let mut cursor = args.walk();
    let mut items = args
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment");
    let module = string_value(tree, items.next()?)?;

    let mut symbols = BTreeMap::new();
    for item in items {
        match item.kind() {
            "keyword_argument" => {
                let alias = item.child_by_field_name("name").map(|n| tree.text(n));
                let exported = item
                    .child_by_field_name("value")
                    .and_then(|v| string_value(tree, v));
                if let (Some(alias), Some(exported)) = (alias, exported) {
                    symbols.insert(alias.to_string(), exported);
                }
            }
            _ => {
                if let Some(name) = string_value(tree, item) {
                    symbols.insert(name.clone(), name);
                }
            }
        }
    }

    Some(Load {
        module,
        symbols,
        file: path.to_string(),
        line: line_of(call),
    })
}

fn extract_call(tree: &SyntaxTree, call: Node<'_>, path: &str) -> Option<Call> {
    let function = function_name(tree, call.child_by_field_name("function")?)?;

    let mut args = Vec::new();
    if let Some(arguments) = call.child_by_field_name("arguments") {
        if arguments.kind() == "argument_list" {
            let mut cursor = arguments.walk();
            for arg in arguments.named_children(&mut cursor) {
                match arg.kind() {
                    "comment" => {}
                    "keyword_argument" => {
                        let name = arg.child_by_field_name("name").map(|n| tree.text(n));
                        let value = arg.child_by_field_name("value");
                        if let (Some(name), Some(value)) = (name, value) {
                            args.push(Arg::keyword(name, render(tree, value)));
                        }
                    }
                    _ => args.push(Arg::positional(render(tree, arg))),
                }
            }
        } else {
            // f(x for x in xs)
            args.push(Arg::positional(render(tree, arguments)));
        }
    }

    Some(Call {
        function,
        args,
        file: path.to_string(),
        line: line_of(call),
    })
}

/// Dotted name of a callee; `None` for callees that are not names
fn function_name(tree: &SyntaxTree, node: Node<'_>) -> Option<String> {
    match node.kind() {
        "identifier" => Some(tree.text(node).to_string()),
        "attribute" => {
            let attr = tree.text(node.child_by_field_name("attribute")?);
            match node
                .child_by_field_name("object")
                .and_then(|obj| function_name(tree, obj))
            {
                Some(base) => Some(format!("{base}.{attr}")),
                None => Some(attr.to_string()),
            }
        }
        _ => None,
    }
}

/// Best-effort source rendering of an argument value. Nothing is evaluated.
fn render(tree: &SyntaxTree, node: Node<'_>) -> String {
    match node.kind() {
        "string" | "concatenated_string" => {
            string_value(tree, node).unwrap_or_else(|| tree.text(node).to_string())
        }
        "identifier" | "integer" | "float" | "true" | "false" | "none" => {
            tree.text(node).to_string()
        }
        "list" => format!("[{}]", render_children(tree, node)),
        "tuple" => format!("({})", render_children(tree, node)),
        "set" => format!("{{{}}}", render_children(tree, node)),
        "dictionary" => format!("{{{}}}", render_children(tree, node)),
        "pair" => {
            let key = node.child_by_field_name("key").map(|k| render(tree, k));
            let value = node.child_by_field_name("value").map(|v| render(tree, v));
            format!("{}: {}", key.unwrap_or_default(), value.unwrap_or_default())
        }
        "parenthesized_expression" => node
            .named_child(0)
            .map(|inner| render(tree, inner))
            .unwrap_or_default(),
        "call" => {
            let name = node
                .child_by_field_name("function")
                .and_then(|f| function_name(tree, f))
                .unwrap_or_default();
            format!("{name}(...)")
        }
        "binary_operator" | "boolean_operator" | "comparison_operator" => {
            let mut parts = Vec::new();
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.is_named() {
                    parts.push(render(tree, child));
                } else {
                    parts.push(tree.text(child).to_string());
                }
            }
            parts.join(" ")
        }
        "unary_operator" => {
            let op = node
                .child_by_field_name("operator")
                .map(|o| tree.text(o))
                .unwrap_or("");
            let arg = node
                .child_by_field_name("argument")
                .map(|a| render(tree, a))
                .unwrap_or_default();
            format!("{op}{arg}")
        }
        "not_operator" => {
            let arg = node
                .child_by_field_name("argument")
                .map(|a| render(tree, a))
                .unwrap_or_default();
            format!("not {arg}")
        }
        "attribute" => {
            let object = node
                .child_by_field_name("object")
                .map(|o| render(tree, o))
                .unwrap_or_default();
            let attr = node
                .child_by_field_name("attribute")
                .map(|a| tree.text(a))
                .unwrap_or("");
            format!("{object}.{attr}")
        }
        "subscript" => {
            let value = node
                .child_by_field_name("value")
                .map(|v| render(tree, v))
                .unwrap_or_default();
            match node.child_by_field_name("subscript") {
                Some(index) if index.kind() == "slice" => format!("{value}[...]"),
                Some(index) => format!("{value}[{}]", render(tree, index)),
                None => format!("{value}[]"),
            }
        }
        "list_comprehension"
        | "dictionary_comprehension"
        | "set_comprehension"
        | "generator_expression" => "[...]".to_string(),
        "conditional_expression" => {
            let then = node.named_child(0).map(|n| render(tree, n)).unwrap_or_default();
            let otherwise = node.named_child(2).map(|n| render(tree, n)).unwrap_or_default();
            format!("{then} if ... else {otherwise}")
        }
        "lambda" => "lambda(...)".to_string(),
        "list_splat" => format!("*{}", render_first_child(tree, node)),
        "dictionary_splat" => format!("**{}", render_first_child(tree, node)),
        _ => "<expr>".to_string(),
    }
}

fn render_children(tree: &SyntaxTree, node: Node<'_>) -> String {
    let mut cursor = node.walk();
    let items: Vec<String> = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .map(|c| render(tree, c))
        .collect();
    items.join(", ")
}

fn render_first_child(tree: &SyntaxTree, node: Node<'_>) -> String {
    node.named_child(0)
        .map(|inner| render(tree, inner))
        .unwrap_or_default()
}

/// Names bound by an assignment; chained assignments bind every target
fn assignment_names(tree: &SyntaxTree, node: Node<'_>) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(left) = node.child_by_field_name("left") {
        target_names(tree, left, &mut names);
    }
    if let Some(right) = node.child_by_field_name("right") {
        if right.kind() == "assignment" {
            names.extend(assignment_names(tree, right));
        }
    }
    names
}

/// Recurse through tuple/list unpacking only; attribute and subscript
/// targets bind no name
fn target_names(tree: &SyntaxTree, node: Node<'_>, names: &mut Vec<String>) {
    match node.kind() {
        "identifier" => names.push(tree.text(node).to_string()),
        "pattern_list" | "tuple_pattern" | "list_pattern" | "tuple" | "list"
        | "expression_list" | "list_splat_pattern" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                target_names(tree, child, names);
            }
        }
        _ => {}
    }
}
