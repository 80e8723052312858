//! Syntax model builder for Python.
//!
//! Parses source text with tree-sitter and reduces the tree to a
//! [`StructuralSummary`] in a single pre-order walk. Every per-function
//! figure (cyclomatic, cognitive, nesting, bindings, raises) and every
//! layout fact the formatting rules need is gathered during that walk.

use super::{Analysis, Analyzer};
use crate::complexity::{cognitive, cyclomatic, halstead, is_nesting_construct};
use crate::config::PyqualConfig;
use crate::core::{
    Binding, ClassEntity, CommaSite, Entity, Error, FunctionEntity, HalsteadCounts, IdentRole,
    Identifier, Import, Language, LineEnding, OperatorSite, ParamKind, Parameter, Result, Span,
    StructuralSummary, SyntaxError,
};
use crate::{metrics, rules};
use tracing::debug;
use tree_sitter::{Node, Parser, Tree};

/// Parse Python source into a tree-sitter tree. The tree may contain error
/// nodes; use [`build`] for validated input.
pub fn parse_tree(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| Error::Parser(e.to_string()))?;

    parser
        .parse(source, None)
        .ok_or_else(|| Error::Parser("tree-sitter produced no tree".to_string()))
}

/// Build the structural summary of `source`.
///
/// Fails with [`Error::Syntax`] pointing at the first construct the grammar
/// rejects.
pub fn build(source: &str) -> Result<StructuralSummary> {
    let tree = parse_tree(source)?;
    let root = tree.root_node();

    let rejected = if root.has_error() {
        Some(first_syntax_error(root, source))
    } else {
        find_invalid_construct(root, source)
    };
    if let Some(error) = rejected {
        debug!(line = error.line, column = error.column, "Python source failed to parse");
        return Err(error.into());
    }

    let mut builder = SummaryBuilder::new(source);
    builder.visit(root, Context::module());
    let summary = builder.finish();

    debug!(
        entities = summary.entities.len(),
        identifiers = summary.identifiers.len(),
        "Built structural summary"
    );
    Ok(summary)
}

/// Locate the first error or missing node in source order.
fn first_syntax_error(root: Node, source: &str) -> SyntaxError {
    let node = find_error_node(root).unwrap_or(root);
    let message = if node.is_missing() {
        format!("missing '{}'", node.kind())
    } else {
        let snippet: String = node_text(&node, source)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .chars()
            .take(40)
            .collect();
        if snippet.is_empty() {
            "invalid syntax".to_string()
        } else {
            format!("invalid syntax near '{}'", snippet)
        }
    };

    syntax_error_at(&node, source, message)
}

fn syntax_error_at(node: &Node, source: &str, message: impl Into<String>) -> SyntaxError {
    let offset = node.start_byte();
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    SyntaxError {
        line: node.start_position().row + 1,
        column: source[line_start..offset].chars().count() + 1,
        message: message.into(),
    }
}

fn find_error_node(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(find_error_node)
}

/// The grammar is more permissive than the compiler: it keeps Python 2
/// statements, tolerates broken indentation and leaves some target and
/// parameter rules unchecked. Returns the first such construct in source
/// order.
fn find_invalid_construct(node: Node, source: &str) -> Option<SyntaxError> {
    let found = match node.kind() {
        "print_statement" => Some(syntax_error_at(
            &node,
            source,
            "Missing parentheses in call to 'print'",
        )),
        "exec_statement" => Some(syntax_error_at(
            &node,
            source,
            "Missing parentheses in call to 'exec'",
        )),
        "augmented_assignment" => node
            .child_by_field_name("left")
            .filter(|left| !is_single_target(left))
            .map(|left| {
                syntax_error_at(&left, source, "illegal expression for augmented assignment")
            }),
        "parameters" | "lambda_parameters" => misplaced_required_parameter(&node).map(|param| {
            syntax_error_at(
                &param,
                source,
                "parameter without a default follows parameter with a default",
            )
        }),
        "module" => statements(&node)
            .into_iter()
            .find(|stmt| line_indent(stmt, source).is_some_and(|indent| indent > 0))
            .map(|stmt| syntax_error_at(&stmt, source, "unexpected indent")),
        "block" => misindented_block(&node, source),
        "elif_clause" | "else_clause" | "except_clause" | "except_group_clause"
        | "finally_clause" => {
            let header = node.parent().map(|p| p.start_position().column);
            line_indent(&node, source)
                .filter(|indent| Some(*indent) != header)
                .map(|_| {
                    syntax_error_at(
                        &node,
                        source,
                        "unindent does not match any outer indentation level",
                    )
                })
        }
        _ => None,
    };
    if found.is_some() {
        return found;
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find_map(|child| find_invalid_construct(child, source))
}

/// Statements of a module or block, without comments and continuations.
fn statements<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    named_children(node)
        .into_iter()
        .filter(|c| !c.is_extra())
        .collect()
}

/// Indentation of `node` when it is the first token on its line, `None`
/// when it follows other code (after `;` or a header's `:`).
fn line_indent(node: &Node, source: &str) -> Option<usize> {
    let offset = node.start_byte();
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let prefix = &source[line_start..offset];
    prefix
        .chars()
        .all(char::is_whitespace)
        .then_some(prefix.len())
}

/// A body must be indented past its header, and every statement that
/// starts a line must share the first one's indentation.
fn misindented_block(block: &Node, source: &str) -> Option<SyntaxError> {
    let body = statements(block);
    let Some(first) = body.first() else {
        let at = block
            .parent()
            .and_then(|p| p.next_named_sibling())
            .unwrap_or(*block);
        return Some(syntax_error_at(&at, source, "expected an indented block"));
    };

    // `if x: pass` keeps its body on the header line.
    let indent = line_indent(first, source)?;
    let header = block.parent().map_or(0, |p| p.start_position().column);
    if indent <= header {
        return Some(syntax_error_at(first, source, "expected an indented block"));
    }

    body.iter().skip(1).find_map(|stmt| {
        let message = match line_indent(stmt, source)? {
            other if other == indent => return None,
            other if other > indent => "unexpected indent",
            _ => "unindent does not match any outer indentation level",
        };
        Some(syntax_error_at(stmt, source, message))
    })
}

/// A name, attribute or subscript, possibly parenthesized. `(x) += 1` is
/// fine, `(x,) += 1` and `a, b += 1` are not.
fn is_single_target(node: &Node) -> bool {
    match node.kind() {
        "identifier" | "attribute" | "subscript" => true,
        "tuple_pattern" | "parenthesized_expression" => {
            node.child_count() == 3
                && node
                    .named_child(0)
                    .is_some_and(|inner| is_single_target(&inner))
        }
        _ => false,
    }
}

/// Outside the keyword-only section, a parameter without a default may not
/// follow one with a default.
fn misplaced_required_parameter<'t>(params: &Node<'t>) -> Option<Node<'t>> {
    let mut seen_default = false;
    for param in statements(params) {
        match param.kind() {
            "default_parameter" | "typed_default_parameter" => seen_default = true,
            "list_splat_pattern" | "dictionary_splat_pattern" | "keyword_separator" => {
                seen_default = false
            }
            "typed_parameter" => {
                let splat = named_children(&param).first().is_some_and(|target| {
                    matches!(target.kind(), "list_splat_pattern" | "dictionary_splat_pattern")
                });
                if splat {
                    seen_default = false;
                } else if seen_default {
                    return Some(param);
                }
            }
            "identifier" | "tuple_pattern" if seen_default => return Some(param),
            _ => {}
        }
    }
    None
}

/// Get text for a tree-sitter node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Get the line number for a tree-sitter node (1-indexed)
pub fn node_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Last line a node occupies, not counting a trailing newline it consumed.
fn node_end_line(node: &Node) -> usize {
    let end = node.end_position();
    if end.column == 0 && end.row > node.start_position().row {
        end.row
    } else {
        end.row + 1
    }
}

fn node_span(node: &Node) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scope {
    Module,
    /// Index of the class entity whose body is being walked.
    Class(usize),
    Function,
}

#[derive(Clone, Copy, Debug)]
struct Context {
    /// Branch depth relative to the innermost function (or module).
    depth: u32,
    /// Cognitive nesting relative to the innermost function.
    nesting: u32,
    /// Branch constructs between the node and the root.
    enclosing: u32,
    scope: Scope,
    in_string: bool,
}

impl Context {
    fn module() -> Self {
        Self {
            depth: 0,
            nesting: 0,
            enclosing: 0,
            scope: Scope::Module,
            in_string: false,
        }
    }
}

/// Per-function accumulator while its body is walked.
#[derive(Default)]
struct Frame {
    entity: usize,
    decision_points: u32,
    cognitive: u32,
    max_depth: u32,
    returns_value: bool,
    raises: Vec<String>,
    locals: Vec<Binding>,
    declared_outer: Vec<String>,
    bare_excepts: Vec<usize>,
}

struct SummaryBuilder<'a> {
    source: &'a str,
    entities: Vec<Entity>,
    imports: Vec<Import>,
    module_decision_points: u32,
    halstead: HalsteadCounts,
    operator_sites: Vec<OperatorSite>,
    comma_sites: Vec<CommaSite>,
    string_spans: Vec<Span>,
    identifiers: Vec<Identifier>,
    module_bindings: Vec<Binding>,
    frames: Vec<Frame>,
}

impl<'a> SummaryBuilder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            entities: Vec::new(),
            imports: Vec::new(),
            module_decision_points: 0,
            halstead: HalsteadCounts::default(),
            operator_sites: Vec::new(),
            comma_sites: Vec::new(),
            string_spans: Vec::new(),
            identifiers: Vec::new(),
            module_bindings: Vec::new(),
            frames: Vec::new(),
        }
    }

    fn finish(self) -> StructuralSummary {
        StructuralSummary {
            entities: self.entities,
            imports: self.imports,
            module_decision_points: self.module_decision_points,
            halstead: self.halstead,
            operator_sites: self.operator_sites,
            comma_sites: self.comma_sites,
            string_spans: self.string_spans,
            identifiers: self.identifiers,
            module_bindings: self.module_bindings,
            line_ending: LineEnding::detect(self.source),
        }
    }

    fn text(&self, node: &Node) -> &'a str {
        node_text(node, self.source)
    }

    fn visit(&mut self, node: Node, ctx: Context) {
        match node.kind() {
            "function_definition" => return self.visit_function(node, ctx),
            "class_definition" => return self.visit_class(node, ctx),
            "string" => return self.visit_string(node, ctx),
            "comment" => return,
            _ => {}
        }

        if node.child_count() == 0 {
            self.record_leaf(node, ctx);
            return;
        }

        self.record_node(node, ctx);

        let child_ctx = self.child_context(node, ctx);
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, child_ctx);
        }
    }

    fn child_context(&self, node: Node, ctx: Context) -> Context {
        let kind = node.kind();
        let mut next = ctx;
        if is_nesting_construct(kind) {
            next.depth += 1;
            next.enclosing += 1;
        }
        if cognitive::node_metrics(kind, 0, false).increases_nesting {
            next.nesting += 1;
        }
        next
    }

    fn record_leaf(&mut self, node: Node, ctx: Context) {
        if node.start_byte() == node.end_byte() {
            return;
        }
        let kind = node.kind();
        let text = self.text(&node);

        if kind == "identifier" {
            self.identifiers.push(Identifier {
                name: text.to_string(),
                span: node_span(&node),
                role: identifier_role(&node),
            });
        }

        if ctx.in_string {
            return;
        }

        if kind == "," {
            self.record_comma(&node);
        }

        match halstead::classify_leaf(kind, node.is_named()) {
            Some(halstead::TokenClass::Operand) => self.halstead.add_operand(text),
            Some(halstead::TokenClass::Operator) => self.halstead.add_operator(kind),
            None => {}
        }
    }

    fn record_comma(&mut self, node: &Node) {
        let offset = node.end_byte();
        let Some(next) = self.source[offset..].chars().next() else {
            return;
        };
        if next.is_whitespace() || matches!(next, ')' | ']' | '}') {
            return;
        }
        self.comma_sites.push(CommaSite {
            offset,
            line: node_line(node),
        });
    }

    fn record_node(&mut self, node: Node, ctx: Context) {
        let kind = node.kind();
        self.record_complexity(&node, ctx);

        match kind {
            "return_statement" => {
                let has_value = named_children(&node)
                    .iter()
                    .any(|c| c.kind() != "comment" && c.kind() != "none");
                if has_value {
                    if let Some(frame) = self.frames.last_mut() {
                        frame.returns_value = true;
                    }
                }
            }
            "raise_statement" => self.record_raise(&node),
            "except_clause" => {
                let bare = named_children(&node)
                    .iter()
                    .all(|c| matches!(c.kind(), "block" | "comment"));
                if bare {
                    if let Some(frame) = self.frames.last_mut() {
                        frame.bare_excepts.push(node_line(&node));
                    }
                }
            }
            "assignment" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.record_bindings(&left, ctx);
                }
                if !ctx.in_string {
                    let before_value = node
                        .child_by_field_name("type")
                        .or_else(|| node.child_by_field_name("left"));
                    if let (Some(lhs), Some(rhs)) = (before_value, node.child_by_field_name("right")) {
                        self.record_operator_gap(&lhs, &rhs);
                    }
                }
            }
            "augmented_assignment" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.record_bindings(&left, ctx);
                }
                if !ctx.in_string {
                    if let (Some(lhs), Some(rhs)) = (
                        node.child_by_field_name("left"),
                        node.child_by_field_name("right"),
                    ) {
                        self.record_operator_gap(&lhs, &rhs);
                    }
                }
            }
            "binary_operator" if !ctx.in_string => {
                if let (Some(lhs), Some(rhs)) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) {
                    self.record_operator_gap(&lhs, &rhs);
                }
            }
            "typed_default_parameter" if !ctx.in_string => {
                if let (Some(annotation), Some(value)) = (
                    node.child_by_field_name("type"),
                    node.child_by_field_name("value"),
                ) {
                    self.record_operator_gap(&annotation, &value);
                }
            }
            "comparison_operator" if !ctx.in_string => {
                let operands: Vec<Node> = named_children(&node)
                    .into_iter()
                    .filter(|c| c.kind() != "comment")
                    .collect();
                for pair in operands.windows(2) {
                    self.record_operator_gap(&pair[0], &pair[1]);
                }
            }
            "for_statement" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.record_bindings(&left, ctx);
                }
            }
            "global_statement" | "nonlocal_statement" => {
                let names: Vec<String> = named_children(&node)
                    .iter()
                    .filter(|c| c.kind() == "identifier")
                    .map(|c| self.text(c).to_string())
                    .collect();
                if let Some(frame) = self.frames.last_mut() {
                    frame.declared_outer.extend(names);
                }
            }
            "import_statement" => self.record_import(&node),
            "import_from_statement" => self.record_import_from(&node),
            _ => {}
        }
    }

    fn record_complexity(&mut self, node: &Node, ctx: Context) {
        let kind = node.kind();
        let points = cyclomatic::decision_points(kind);
        let continues_sequence = kind == "boolean_operator" && continues_boolean_run(node);
        let increment = cognitive::node_metrics(kind, ctx.nesting, continues_sequence).increment;

        match self.frames.last_mut() {
            Some(frame) => {
                frame.decision_points += points;
                frame.cognitive += increment;
                if is_nesting_construct(kind) {
                    frame.max_depth = frame.max_depth.max(ctx.depth + 1);
                }
            }
            None => self.module_decision_points += points,
        }
    }

    fn record_operator_gap(&mut self, lhs: &Node, rhs: &Node) {
        if lhs.end_position().row != rhs.start_position().row {
            return;
        }
        let span = Span::new(lhs.end_byte(), rhs.start_byte());
        let operator = self.source[span.start..span.end].trim();
        if operator.is_empty() || operator.contains('#') {
            return;
        }
        self.operator_sites.push(OperatorSite {
            operator: operator.to_string(),
            span,
            line: node_line(lhs),
        });
    }

    fn record_bindings(&mut self, target: &Node, ctx: Context) {
        let mut names = Vec::new();
        collect_target_names(target, self.source, &mut names);
        let bindings = names.into_iter().map(|(name, line)| Binding { name, line });

        match ctx.scope {
            Scope::Function => {
                if let Some(frame) = self.frames.last_mut() {
                    frame.locals.extend(bindings);
                }
            }
            Scope::Module => push_first_bindings(&mut self.module_bindings, bindings),
            Scope::Class(idx) => {
                if let Some(Entity::Class(class)) = self.entities.get_mut(idx) {
                    push_first_bindings(&mut class.attributes, bindings);
                }
            }
        }
    }

    fn record_raise(&mut self, node: &Node) {
        let Some(exception) = named_children(node)
            .into_iter()
            .find(|c| c.kind() != "comment")
        else {
            return;
        };
        let target = if exception.kind() == "call" {
            exception.child_by_field_name("function").unwrap_or(exception)
        } else {
            exception
        };
        let name = self.text(&target).to_string();
        if let Some(frame) = self.frames.last_mut() {
            if !frame.raises.contains(&name) {
                frame.raises.push(name);
            }
        }
    }

    fn record_import(&mut self, node: &Node) {
        for child in named_children(node) {
            let module = match child.kind() {
                "dotted_name" => self.text(&child),
                "aliased_import" => child
                    .child_by_field_name("name")
                    .map(|n| self.text(&n))
                    .unwrap_or_default(),
                _ => continue,
            };
            self.imports.push(Import {
                module: module.to_string(),
                names: Vec::new(),
                line: node_line(node),
            });
        }
    }

    fn record_import_from(&mut self, node: &Node) {
        let module_node = node.child_by_field_name("module_name");
        let module = module_node
            .map(|n| self.text(&n).to_string())
            .unwrap_or_default();
        let names = named_children(node)
            .into_iter()
            .filter(|c| Some(*c) != module_node)
            .filter_map(|c| match c.kind() {
                "dotted_name" => Some(self.text(&c).to_string()),
                "aliased_import" => c
                    .child_by_field_name("name")
                    .map(|n| self.text(&n).to_string()),
                "wildcard_import" => Some("*".to_string()),
                _ => None,
            })
            .collect();
        self.imports.push(Import {
            module,
            names,
            line: node_line(node),
        });
    }

    fn visit_string(&mut self, node: Node, ctx: Context) {
        if !ctx.in_string {
            self.string_spans.push(node_span(&node));
            self.halstead.add_operand(self.text(&node));
        }
        let inner = Context {
            in_string: true,
            ..ctx
        };
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, inner);
        }
    }

    fn visit_function(&mut self, node: Node, ctx: Context) {
        let name_node = node.child_by_field_name("name");
        let name = name_node
            .map(|n| self.text(&n).to_string())
            .unwrap_or_default();
        let (start_line, decorators) = self.decorations(&node);
        let parameters = node
            .child_by_field_name("parameters")
            .map(|p| extract_parameters(&p, self.source))
            .unwrap_or_default();
        let return_annotation = node
            .child_by_field_name("return_type")
            .map(|n| self.text(&n).to_string());
        let docstring = node
            .child_by_field_name("body")
            .and_then(|body| docstring_of(&body, self.source));
        let is_async = node.child(0).is_some_and(|c| c.kind() == "async");

        let class_index = match ctx.scope {
            Scope::Class(idx) => Some(idx),
            _ => None,
        };
        let (class_name, in_nested_class) = match class_index.map(|idx| &self.entities[idx]) {
            Some(Entity::Class(c)) => (Some(c.name.clone()), c.is_nested),
            _ => (None, false),
        };

        let index = self.entities.len();
        self.entities.push(Entity::Function(FunctionEntity {
            name: name.clone(),
            line: node_line(&node),
            start_line,
            end_line: node_end_line(&node),
            span: node_span(&node),
            name_span: name_node.map(|n| node_span(&n)).unwrap_or_default(),
            parameters: parameters.clone(),
            return_annotation,
            decorators,
            is_async,
            class_name,
            is_nested: ctx.scope == Scope::Function || in_nested_class,
            enclosing_depth: ctx.enclosing,
            nesting_depth: 0,
            cyclomatic: 1,
            cognitive: 0,
            docstring,
            returns_value: false,
            raises: Vec::new(),
            locals: Vec::new(),
            bare_excepts: Vec::new(),
        }));

        if let Some(Entity::Class(class)) = class_index.and_then(|idx| self.entities.get_mut(idx)) {
            class.methods.push(name.clone());
            if name == "__init__" {
                class.parameters = parameters
                    .iter()
                    .skip(usize::from(parameters.first().is_some_and(Parameter::is_receiver)))
                    .cloned()
                    .collect();
            }
        }

        self.frames.push(Frame {
            entity: index,
            ..Frame::default()
        });

        let body_ctx = Context {
            depth: 0,
            nesting: 0,
            enclosing: ctx.enclosing,
            scope: Scope::Function,
            in_string: false,
        };
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, body_ctx);
        }

        let frame = self.frames.pop().unwrap_or_default();
        self.close_function(frame, &parameters);

        if let Some(idx) = class_index {
            let depth = match &self.entities[index] {
                Entity::Function(f) => f.nesting_depth,
                Entity::Class(_) => 0,
            };
            if let Entity::Class(class) = &mut self.entities[idx] {
                class.nesting_depth = class.nesting_depth.max(depth);
            }
        }
    }

    fn close_function(&mut self, frame: Frame, parameters: &[Parameter]) {
        let mut locals: Vec<Binding> = Vec::new();
        for binding in frame.locals {
            let shadowed = parameters.iter().any(|p| p.name == binding.name)
                || frame.declared_outer.contains(&binding.name)
                || locals.iter().any(|b| b.name == binding.name);
            if !shadowed {
                locals.push(binding);
            }
        }

        if let Some(Entity::Function(function)) = self.entities.get_mut(frame.entity) {
            function.cyclomatic = cyclomatic::function_cyclomatic(frame.decision_points);
            function.cognitive = frame.cognitive;
            function.nesting_depth = frame.max_depth;
            function.returns_value = frame.returns_value;
            function.raises = frame.raises;
            function.locals = locals;
            function.bare_excepts = frame.bare_excepts;
        }
    }

    fn visit_class(&mut self, node: Node, ctx: Context) {
        let name_node = node.child_by_field_name("name");
        let name = name_node
            .map(|n| self.text(&n).to_string())
            .unwrap_or_default();
        let (start_line, decorators) = self.decorations(&node);
        let bases = node
            .child_by_field_name("superclasses")
            .map(|args| {
                named_children(&args)
                    .iter()
                    .filter(|c| c.kind() != "comment")
                    .map(|c| self.text(c).to_string())
                    .collect()
            })
            .unwrap_or_default();
        let docstring = node
            .child_by_field_name("body")
            .and_then(|body| docstring_of(&body, self.source));

        let index = self.entities.len();
        self.entities.push(Entity::Class(ClassEntity {
            name,
            line: node_line(&node),
            start_line,
            end_line: node_end_line(&node),
            span: node_span(&node),
            name_span: name_node.map(|n| node_span(&n)).unwrap_or_default(),
            bases,
            parameters: Vec::new(),
            decorators,
            is_nested: ctx.scope == Scope::Function,
            enclosing_depth: ctx.enclosing,
            nesting_depth: 0,
            docstring,
            methods: Vec::new(),
            attributes: Vec::new(),
        }));

        let body_ctx = Context {
            scope: Scope::Class(index),
            ..ctx
        };
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, body_ctx);
        }
    }

    /// First line including decorators, and the decorator expressions.
    fn decorations(&self, node: &Node) -> (usize, Vec<String>) {
        match node.parent() {
            Some(parent) if parent.kind() == "decorated_definition" => {
                let decorators = named_children(&parent)
                    .iter()
                    .filter(|c| c.kind() == "decorator")
                    .map(|c| self.text(c).trim_start_matches('@').trim().to_string())
                    .collect();
                (node_line(&parent), decorators)
            }
            _ => (node_line(node), Vec::new()),
        }
    }
}

fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn identifier_role(node: &Node) -> IdentRole {
    let Some(parent) = node.parent() else {
        return IdentRole::Plain;
    };
    match parent.kind() {
        "attribute" if parent.child_by_field_name("attribute") == Some(*node) => {
            IdentRole::Attribute
        }
        "keyword_argument" if parent.child_by_field_name("name") == Some(*node) => {
            IdentRole::Keyword
        }
        _ => IdentRole::Plain,
    }
}

/// `a and b and c` nests as `(a and b) and c`; only the outermost operator
/// of a same-operator run is charged.
fn continues_boolean_run(node: &Node) -> bool {
    let operator = |n: &Node| n.child_by_field_name("operator").map(|op| op.kind().to_string());
    match node.parent() {
        Some(parent) if parent.kind() == "boolean_operator" => operator(&parent) == operator(node),
        _ => false,
    }
}

fn push_first_bindings(into: &mut Vec<Binding>, bindings: impl Iterator<Item = Binding>) {
    for binding in bindings {
        if !into.iter().any(|b| b.name == binding.name) {
            into.push(binding);
        }
    }
}

fn collect_target_names(node: &Node, source: &str, out: &mut Vec<(String, usize)>) {
    match node.kind() {
        "identifier" => out.push((node_text(node, source).to_string(), node_line(node))),
        "pattern_list" | "tuple_pattern" | "list_pattern" | "tuple" | "list"
        | "parenthesized_expression" | "list_splat_pattern" => {
            for child in named_children(node) {
                collect_target_names(&child, source, out);
            }
        }
        _ => {}
    }
}

fn extract_parameters(params: &Node, source: &str) -> Vec<Parameter> {
    let text = |n: Node| node_text(&n, source).to_string();
    let splat_kind = |kind: &str| match kind {
        "list_splat_pattern" => Some(ParamKind::VarArgs),
        "dictionary_splat_pattern" => Some(ParamKind::KwArgs),
        _ => None,
    };
    let splat_name = |n: &Node| {
        named_children(n)
            .into_iter()
            .find(|c| c.kind() == "identifier")
            .map(text)
            .unwrap_or_default()
    };

    named_children(params)
        .into_iter()
        .filter_map(|child| match child.kind() {
            "identifier" => Some(Parameter {
                name: text(child),
                annotation: None,
                default: None,
                kind: ParamKind::Regular,
            }),
            "typed_parameter" => {
                let target = named_children(&child).into_iter().next()?;
                let (name, kind) = match splat_kind(target.kind()) {
                    Some(kind) => (splat_name(&target), kind),
                    None => (text(target), ParamKind::Regular),
                };
                Some(Parameter {
                    name,
                    annotation: child.child_by_field_name("type").map(text),
                    default: None,
                    kind,
                })
            }
            "default_parameter" | "typed_default_parameter" => Some(Parameter {
                name: child.child_by_field_name("name").map(text)?,
                annotation: child.child_by_field_name("type").map(text),
                default: child.child_by_field_name("value").map(text),
                kind: ParamKind::Regular,
            }),
            kind => splat_kind(kind).map(|kind| Parameter {
                name: splat_name(&child),
                annotation: None,
                default: None,
                kind,
            }),
        })
        .collect()
}

/// The docstring of a function or class body, cleaned of quotes and
/// indentation.
fn docstring_of(body: &Node, source: &str) -> Option<String> {
    let first = named_children(body)
        .into_iter()
        .find(|c| c.kind() != "comment")?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }
    let literal = first.named_child(0)?;
    if literal.kind() != "string" {
        return None;
    }
    Some(clean_docstring(node_text(&literal, source)))
}

fn literal_body(raw: &str) -> &str {
    let unprefixed = raw.trim_start_matches(|c: char| "rRuUbBfF".contains(c));
    ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find(|quote| {
            unprefixed.len() >= 2 * quote.len()
                && unprefixed.starts_with(*quote)
                && unprefixed.ends_with(*quote)
        })
        .map(|quote| &unprefixed[quote.len()..unprefixed.len() - quote.len()])
        .unwrap_or(unprefixed)
}

/// Strip literal quotes and common indentation the way documentation tools
/// present a docstring.
pub fn clean_docstring(raw: &str) -> String {
    let body = literal_body(raw);
    let lines: Vec<&str> = body.lines().collect();

    let indent = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<&str> = Vec::with_capacity(lines.len());
    if let Some(first) = lines.first() {
        cleaned.push(first.trim());
    }
    for line in lines.iter().skip(1) {
        let dedented = line.get(indent..).unwrap_or_else(|| line.trim_start());
        cleaned.push(dedented.trim_end());
    }

    while cleaned.first().is_some_and(|l| l.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|l| l.is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}

/// Full pipeline for Python files: build, review, score. Input the builder
/// rejects yields exactly one critical syntax finding.
#[derive(Clone, Copy, Debug, Default)]
pub struct PythonAnalyzer;

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for PythonAnalyzer {
    fn analyze(&self, content: &str, config: &PyqualConfig, autofix: bool) -> Analysis {
        match build(content) {
            Ok(summary) => {
                let findings = rules::review_with_config(content, &summary, config, autofix);
                let metrics = metrics::score_with_findings(content, &summary, &findings, config);
                Analysis {
                    language: Language::Python,
                    metrics,
                    findings,
                    summary: Some(summary),
                }
            }
            Err(error) => {
                debug!(syntax = error.is_syntax(), "Reporting unparseable source");
                let findings = vec![rules::syntax_finding(&error)];
                Analysis {
                    language: Language::Python,
                    metrics: metrics::unparseable(content, &findings, config),
                    findings,
                    summary: None,
                }
            }
        }
    }

    fn language(&self) -> Language {
        Language::Python
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn function<'s>(summary: &'s StructuralSummary, name: &str) -> &'s FunctionEntity {
        summary
            .functions()
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("function {name} not found"))
    }

    #[test]
    fn test_build_simple_function() {
        let source = indoc! {r#"
            def greet(name: str, greeting="Hello") -> str:
                """Greet someone."""
                return f"{greeting}, {name}!"
        "#};
        let summary = build(source).unwrap();

        assert_eq!(summary.entities.len(), 1);
        let func = function(&summary, "greet");
        assert_eq!(func.line, 1);
        assert_eq!(func.end_line, 3);
        assert_eq!(func.docstring.as_deref(), Some("Greet someone."));
        assert_eq!(func.return_annotation.as_deref(), Some("str"));
        assert_eq!(func.parameters.len(), 2);
        assert_eq!(func.parameters[0].annotation.as_deref(), Some("str"));
        assert_eq!(func.parameters[1].default.as_deref(), Some("\"Hello\""));
        assert!(func.returns_value);
        assert_eq!(func.cyclomatic, 1);
    }

    #[test]
    fn test_syntax_error_location() {
        let source = "def broken()\n    return 1\n";
        let err = build(source).unwrap_err();
        match err {
            Error::Syntax(syntax) => assert_eq!(syntax.line, 1),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    fn syntax_error(source: &str) -> SyntaxError {
        match build(source) {
            Err(Error::Syntax(syntax)) => syntax,
            other => panic!("expected syntax error for {source:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_constructs_the_grammar_tolerates() {
        let cases = [
            ("def f():\n  x = 1\n    y = 2\n", 3, "unexpected indent"),
            ("class A:\npass\n", 2, "expected an indented block"),
            ("print 'hello'\n", 1, "'print'"),
            ("exec 'x = 1'\n", 1, "'exec'"),
            ("a, b += 1\n", 1, "augmented assignment"),
            ("def f(x=1, y):\n    pass\n", 1, "follows parameter with a default"),
            ("f = lambda x=1, y: x\n", 1, "follows parameter with a default"),
        ];
        for (source, line, message) in cases {
            let error = syntax_error(source);
            assert_eq!(error.line, line, "{source:?}");
            assert!(error.message.contains(message), "{source:?}: {}", error.message);
        }
    }

    #[test]
    fn test_misplaced_parameter_column() {
        let error = syntax_error("def f(x=1, y):\n    pass\n");
        assert_eq!(error.column, 12);
    }

    #[test]
    fn test_indented_module_statement_rejected() {
        assert_eq!(syntax_error("  x = 1\n").line, 1);
    }

    #[test]
    fn test_accepts_valid_layouts() {
        let source = indoc! {r#"
            import os; import sys


            def f(a, b=1, /, c=2, *args, d, e=3, **kwargs):
                """Doc."""
                if a: return b
                total = (a +
                         b)
            # flush-left comment
                counts = {}
                counts["a"] += 1
                (total) += 1
                try:
                    pass
                except ValueError:
                    pass
                else:
                    pass
                finally:
                    pass
                g = lambda p, q=1, *r, s: p
                return total


            class A: pass


            @staticmethod
            def h(*, key, flag=False): return key
        "#};
        if let Err(err) = build(source) {
            panic!("valid source rejected: {err}");
        }
    }

    #[test]
    fn test_annotated_default_is_an_operator_site() {
        let summary = build("def f(x: int=3, y=4):\n    return x\n").unwrap();
        let operators: Vec<&str> = summary
            .operator_sites
            .iter()
            .map(|s| s.operator.as_str())
            .collect();
        assert_eq!(operators, vec!["="]);
        assert_eq!(summary.operator_sites[0].span, Span::new(12, 13));
    }

    #[test]
    fn test_module_and_class_bindings() {
        let source = indoc! {"
            totalCount = 0
            totalCount += 1
            for idx in range(3):
                pass


            class Config:
                maxItems = 3

                def run(self):
                    local = 1
        "};
        let summary = build(source).unwrap();
        let module: Vec<(&str, usize)> = summary
            .module_bindings
            .iter()
            .map(|b| (b.name.as_str(), b.line))
            .collect();
        assert_eq!(module, vec![("totalCount", 1), ("idx", 3)]);

        let class = summary.classes().next().unwrap();
        assert_eq!(class.attributes.len(), 1);
        assert_eq!(class.attributes[0].name, "maxItems");
        assert_eq!(function(&summary, "run").locals[0].name, "local");
    }

    #[test]
    fn test_cyclomatic_counts_decision_points() {
        let source = indoc! {"
            def check(a, b, items):
                if a and b:
                    return 1
                elif a or b:
                    return 2
                for item in items:
                    while item:
                        item -= 1
                try:
                    pass
                except ValueError:
                    pass
                except KeyError:
                    pass
                values = [x for x in items if x]
                return 3 if a else 4
        "};
        let summary = build(source).unwrap();
        // if, and, elif, or, for, while, 2 except, if-clause, conditional
        assert_eq!(function(&summary, "check").cyclomatic, 11);
    }

    #[test]
    fn test_nesting_depth_and_cognitive() {
        let source = indoc! {"
            def deep(a, b, c):
                if a:
                    for x in b:
                        if c:
                            return x
                return None
        "};
        let summary = build(source).unwrap();
        let func = function(&summary, "deep");
        assert_eq!(func.nesting_depth, 3);
        // 1 + 2 + 3
        assert_eq!(func.cognitive, 6);
        assert!(func.returns_value);
    }

    #[test]
    fn test_return_none_is_not_a_value() {
        let source = "def f():\n    return None\n\ndef g():\n    return\n";
        let summary = build(source).unwrap();
        assert!(!function(&summary, "f").returns_value);
        assert!(!function(&summary, "g").returns_value);
    }

    #[test]
    fn test_methods_and_classes() {
        let source = indoc! {r#"
            class Account(Base):
                """An account."""

                def __init__(self, owner, balance=0):
                    self.owner = owner
                    self.balance = balance

                @property
                def total(self):
                    return self.balance
        "#};
        let summary = build(source).unwrap();
        let class = summary.classes().next().unwrap();
        assert_eq!(class.name, "Account");
        assert_eq!(class.bases, vec!["Base".to_string()]);
        assert_eq!(class.methods, vec!["__init__".to_string(), "total".to_string()]);
        assert_eq!(class.parameters.len(), 2);
        assert_eq!(class.docstring.as_deref(), Some("An account."));

        let total = function(&summary, "total");
        assert_eq!(total.class_name.as_deref(), Some("Account"));
        assert_eq!(total.decorators, vec!["property".to_string()]);
        assert_eq!(total.start_line, 8);
        assert_eq!(total.line, 9);
    }

    #[test]
    fn test_locals_exclude_parameters_and_globals() {
        let source = indoc! {"
            COUNT = 0

            def bump(step):
                global COUNT
                COUNT += step
                step = step * 2
                newValue, other = step, 1
                for idx in range(3):
                    pass
                return newValue
        "};
        let summary = build(source).unwrap();
        let names: Vec<&str> = function(&summary, "bump")
            .locals
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(names, vec!["newValue", "other", "idx"]);
    }

    #[test]
    fn test_raises_and_bare_except() {
        let source = indoc! {"
            def load(path):
                if not path:
                    raise ValueError('empty')
                try:
                    return open(path)
                except:
                    raise
        "};
        let summary = build(source).unwrap();
        let func = function(&summary, "load");
        assert_eq!(func.raises, vec!["ValueError".to_string()]);
        assert_eq!(func.bare_excepts, vec![6]);
    }

    #[test]
    fn test_operator_and_comma_sites() {
        let source = "def f(x,y):\n    total=x+y\n    return total == 3\n";
        let summary = build(source).unwrap();
        let operators: Vec<&str> = summary
            .operator_sites
            .iter()
            .map(|s| s.operator.as_str())
            .collect();
        assert_eq!(operators, vec!["=", "+", "=="]);
        assert_eq!(summary.comma_sites.len(), 1);
        assert_eq!(summary.comma_sites[0].line, 1);
    }

    #[test]
    fn test_strings_are_opaque_to_layout() {
        let source = "x = \"a+b,c\"\n";
        let summary = build(source).unwrap();
        assert_eq!(summary.operator_sites.len(), 1);
        assert!(summary.comma_sites.is_empty());
        assert_eq!(summary.string_spans.len(), 1);
    }

    #[test]
    fn test_identifier_roles() {
        let source = "obj.value = call(value=value)\n";
        let summary = build(source).unwrap();
        let roles: Vec<(String, IdentRole)> = summary
            .identifiers
            .iter()
            .map(|id| (id.name.clone(), id.role))
            .collect();
        assert_eq!(
            roles,
            vec![
                ("obj".to_string(), IdentRole::Plain),
                ("value".to_string(), IdentRole::Attribute),
                ("call".to_string(), IdentRole::Plain),
                ("value".to_string(), IdentRole::Keyword),
                ("value".to_string(), IdentRole::Plain),
            ]
        );
    }

    #[test]
    fn test_imports() {
        let source = "import os, sys as system\nfrom pkg.mod import a, b as c\n";
        let summary = build(source).unwrap();
        assert_eq!(summary.imports.len(), 3);
        assert_eq!(summary.imports[1].module, "sys");
        assert_eq!(summary.imports[2].module, "pkg.mod");
        assert_eq!(summary.imports[2].names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_tolerates_crlf_and_unicode() {
        let source = "def größe(wert):\r\n    return wert  \r\n";
        let summary = build(source).unwrap();
        assert_eq!(function(&summary, "größe").parameters[0].name, "wert");
        assert_eq!(summary.line_ending, LineEnding::CrLf);
    }

    #[test]
    fn test_module_decision_points() {
        let source = "if flag:\n    x = 1\nelse:\n    x = 2\n";
        let summary = build(source).unwrap();
        assert_eq!(summary.module_decision_points, 1);
        assert!(summary.entities.is_empty());
    }

    #[test]
    fn test_clean_docstring() {
        let raw = "\"\"\"Summary line.\n\n    Args:\n        x: value\n    \"\"\"";
        assert_eq!(clean_docstring(raw), "Summary line.\n\nArgs:\n    x: value");
        assert_eq!(clean_docstring("r'''raw'''"), "raw");
        assert_eq!(clean_docstring("'single'"), "single");
    }
}
