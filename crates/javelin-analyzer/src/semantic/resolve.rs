//! Single-pass resolution over a compilation unit.
//!
//! Declarations enter scope as they are encountered; identifier references
//! bind to the nearest enclosing declaration; expression nodes get the
//! static type needed to answer subtype/signature/boxing queries. Anything
//! outside the reach of the classpath index resolves to unknown.

use std::collections::HashMap;

use tracing::trace;

use javelin_parser::ast::Span;
use javelin_parser::{kind, Node, NodeExt, Tree};

use crate::classpath::ClasspathIndex;
use crate::scope::{ScopeKind, ScopeManager, SymbolKind};
use crate::semantic::{SemanticModel, SymbolEntry};
use crate::types::{JavaType, PrimitiveTag};

pub(crate) fn run<'t>(
    source: &'t str,
    tree: &'t Tree,
    classpath: &'t ClasspathIndex,
) -> SemanticModel<'t> {
    let mut resolver = Resolver {
        source,
        classpath,
        scopes: ScopeManager::new(),
        imports: HashMap::new(),
        wildcard_imports: Vec::new(),
        unit_classes: HashMap::new(),
        package: None,
        model: SemanticModel::new(source, classpath),
    };
    resolver.visit_unit(tree.root_node());
    resolver.model
}

struct Resolver<'t> {
    source: &'t str,
    classpath: &'t ClasspathIndex,
    scopes: ScopeManager,
    /// Explicit single-type imports: simple name -> fully qualified name
    imports: HashMap<String, String>,
    /// On-demand (`.*`) import prefixes
    wildcard_imports: Vec<String>,
    /// Types declared in this unit: simple name -> fully qualified name
    unit_classes: HashMap<String, String>,
    package: Option<String>,
    model: SemanticModel<'t>,
}

impl<'t> Resolver<'t> {
    fn visit_unit(&mut self, root: Node<'t>) {
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                kind::PACKAGE_DECLARATION => {
                    let name = {
                        let mut pc = child.walk();
                        let found = child.named_children(&mut pc).find(|n| !n.is_extra());
                        found
                    };
                    if let Some(name) = name {
                        self.package = Some(name.text(self.source).to_string());
                    }
                }
                kind::IMPORT_DECLARATION => self.visit_import(child),
                kind::CLASS_DECLARATION
                | kind::INTERFACE_DECLARATION
                | kind::ENUM_DECLARATION => self.visit_class(child),
                _ => {}
            }
        }
    }

    fn visit_import(&mut self, node: Node<'t>) {
        let mut cursor = node.walk();
        let is_static = node.children(&mut cursor).any(|c| c.kind() == "static");
        let name_node = node
            .child_by_kind(kind::SCOPED_IDENTIFIER)
            .or_else(|| node.child_by_kind(kind::IDENTIFIER));
        let Some(name_node) = name_node else {
            return;
        };
        let path = name_node.text(self.source);

        if is_static {
            // Static member imports are outside the per-unit symbol table
            trace!(path, "skipping static import");
            return;
        }

        if node.child_by_kind(kind::ASTERISK).is_some() {
            self.wildcard_imports.push(path.to_string());
        } else if let Some(simple) = path.rsplit('.').next() {
            self.imports.insert(simple.to_string(), path.to_string());
        }
    }

    fn visit_class(&mut self, node: Node<'t>) {
        let Some(name_node) = node.child_by_field("name") else {
            return;
        };
        let name = name_node.text(self.source).to_string();
        let fqn = match &self.package {
            Some(pkg) => format!("{pkg}.{name}"),
            None => name.clone(),
        };
        self.unit_classes.insert(name.clone(), fqn.clone());
        self.define(name_node, node, SymbolKind::Class, JavaType::class(&fqn));

        self.scopes.enter_scope(ScopeKind::Class { name: name.clone() });

        if let Some(body) = node.child_by_field("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                if member.is_extra() {
                    continue;
                }
                match member.kind() {
                    kind::FIELD_DECLARATION => self.visit_field_declaration(member),
                    kind::METHOD_DECLARATION => self.visit_method(member),
                    kind::CONSTRUCTOR_DECLARATION => self.visit_constructor(member),
                    kind::STATIC_INITIALIZER => {
                        if let Some(block) = member.child_by_kind(kind::BLOCK) {
                            self.visit_statement(block);
                        }
                    }
                    kind::CLASS_DECLARATION
                    | kind::INTERFACE_DECLARATION
                    | kind::ENUM_DECLARATION => self.visit_class(member),
                    _ => {}
                }
            }
        }

        self.scopes.exit_scope();
    }

    fn visit_field_declaration(&mut self, node: Node<'t>) {
        let ty = node
            .child_by_field("type")
            .map_or(JavaType::Unknown, |t| self.resolve_type_node(t));
        for declarator in node.children_by_field("declarator") {
            if let Some(value) = declarator.child_by_field("value") {
                self.visit_expr(value);
            }
            if let Some(name_node) = declarator.child_by_field("name") {
                self.define(name_node, declarator, SymbolKind::Field, ty.clone());
            }
        }
    }

    fn visit_method(&mut self, node: Node<'t>) {
        let return_ty = node
            .child_by_field("type")
            .map_or(JavaType::Unknown, |t| self.resolve_type_node(t));
        let name = if let Some(name_node) = node.child_by_field("name") {
            self.define(name_node, node, SymbolKind::Method, return_ty);
            name_node.text(self.source).to_string()
        } else {
            String::new()
        };

        self.scopes.enter_scope(ScopeKind::Method { name });
        if let Some(params) = node.child_by_field("parameters") {
            self.visit_formal_parameters(params);
        }
        if let Some(body) = node.child_by_field("body") {
            self.visit_block_contents(body);
        }
        self.scopes.exit_scope();
    }

    fn visit_constructor(&mut self, node: Node<'t>) {
        let name = node
            .child_by_field("name")
            .map(|n| n.text(self.source).to_string())
            .unwrap_or_default();

        self.scopes.enter_scope(ScopeKind::Method { name });
        if let Some(params) = node.child_by_field("parameters") {
            self.visit_formal_parameters(params);
        }
        if let Some(body) = node.child_by_field("body") {
            self.visit_block_contents(body);
        }
        self.scopes.exit_scope();
    }

    fn visit_formal_parameters(&mut self, params: Node<'t>) {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            if param.kind() != kind::FORMAL_PARAMETER && param.kind() != "spread_parameter" {
                continue;
            }
            let ty = param
                .child_by_field("type")
                .map_or(JavaType::Unknown, |t| self.resolve_type_node(t));
            if let Some(name_node) = param.child_by_field("name") {
                self.define(name_node, param, SymbolKind::Parameter, ty);
            }
        }
    }

    fn visit_block_contents(&mut self, block: Node<'t>) {
        let mut cursor = block.walk();
        for child in block.named_children(&mut cursor) {
            if child.is_extra() {
                continue;
            }
            self.visit_statement(child);
        }
    }

    fn visit_statement(&mut self, node: Node<'t>) {
        match node.kind() {
            kind::LOCAL_VARIABLE_DECLARATION => self.visit_local_variable(node),
            kind::BLOCK => {
                self.scopes.enter_scope(ScopeKind::Block);
                self.visit_block_contents(node);
                self.scopes.exit_scope();
            }
            kind::IF_STATEMENT => {
                if let Some(condition) = node.child_by_field("condition") {
                    self.visit_expr(condition);
                }
                if let Some(consequence) = node.child_by_field("consequence") {
                    self.visit_statement(consequence);
                }
                if let Some(alternative) = node.child_by_field("alternative") {
                    self.visit_statement(alternative);
                }
            }
            kind::WHILE_STATEMENT | kind::DO_STATEMENT => {
                if let Some(condition) = node.child_by_field("condition") {
                    self.visit_expr(condition);
                }
                if let Some(body) = node.child_by_field("body") {
                    self.visit_statement(body);
                }
            }
            kind::FOR_STATEMENT => {
                self.scopes.enter_scope(ScopeKind::Block);
                for init in node.children_by_field("init") {
                    if init.kind() == kind::LOCAL_VARIABLE_DECLARATION {
                        self.visit_local_variable(init);
                    } else {
                        self.visit_expr(init);
                    }
                }
                if let Some(condition) = node.child_by_field("condition") {
                    self.visit_expr(condition);
                }
                for update in node.children_by_field("update") {
                    self.visit_expr(update);
                }
                if let Some(body) = node.child_by_field("body") {
                    self.visit_statement(body);
                }
                self.scopes.exit_scope();
            }
            kind::ENHANCED_FOR_STATEMENT => {
                self.scopes.enter_scope(ScopeKind::Block);
                if let Some(value) = node.child_by_field("value") {
                    self.visit_expr(value);
                }
                let ty = node
                    .child_by_field("type")
                    .map_or(JavaType::Unknown, |t| self.resolve_type_node(t));
                if let Some(name_node) = node.child_by_field("name") {
                    self.define(name_node, node, SymbolKind::Variable, ty);
                }
                if let Some(body) = node.child_by_field("body") {
                    self.visit_statement(body);
                }
                self.scopes.exit_scope();
            }
            kind::SYNCHRONIZED_STATEMENT => {
                if let Some(monitor) = node.child_by_kind(kind::PARENTHESIZED_EXPRESSION) {
                    self.visit_expr(monitor);
                }
                if let Some(body) = node.child_by_field("body") {
                    self.visit_statement(body);
                }
            }
            kind::TRY_STATEMENT => {
                if let Some(body) = node.child_by_field("body") {
                    self.visit_statement(body);
                }
                for catch in node.children_by_kind(kind::CATCH_CLAUSE) {
                    self.scopes.enter_scope(ScopeKind::Block);
                    if let Some(param) = catch.child_by_kind("catch_formal_parameter") {
                        if let Some(name_node) = param.child_by_field("name") {
                            // Multi-catch types stay untyped; binding is enough
                            self.define(name_node, param, SymbolKind::Parameter, JavaType::Unknown);
                        }
                    }
                    if let Some(body) = catch.child_by_field("body") {
                        self.visit_statement(body);
                    }
                    self.scopes.exit_scope();
                }
                if let Some(finally) = node.child_by_kind(kind::FINALLY_CLAUSE) {
                    if let Some(block) = finally.child_by_kind(kind::BLOCK) {
                        self.visit_statement(block);
                    }
                }
            }
            kind::RETURN_STATEMENT | kind::THROW_STATEMENT | kind::EXPRESSION_STATEMENT => {
                let expr = {
                    let mut cursor = node.walk();
                    let found = node.named_children(&mut cursor).find(|n| !n.is_extra());
                    found
                };
                if let Some(expr) = expr {
                    self.visit_expr(expr);
                }
            }
            kind::CONTINUE_STATEMENT | kind::BREAK_STATEMENT => {}
            kind::LABELED_STATEMENT => {
                let mut cursor = node.walk();
                if let Some(stmt) = node.named_children(&mut cursor).filter(|n| !n.is_extra()).last()
                {
                    self.visit_statement(stmt);
                }
            }
            kind::CLASS_DECLARATION => self.visit_class(node),
            _ if is_expression(node.kind()) => {
                self.visit_expr(node);
            }
            _ => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if !child.is_extra() {
                        self.visit_statement(child);
                    }
                }
            }
        }
    }

    fn visit_local_variable(&mut self, node: Node<'t>) {
        let ty = node
            .child_by_field("type")
            .map_or(JavaType::Unknown, |t| self.resolve_type_node(t));
        for declarator in node.children_by_field("declarator") {
            // The initializer resolves against the enclosing bindings,
            // so visit it before the variable enters scope
            if let Some(value) = declarator.child_by_field("value") {
                self.visit_expr(value);
            }
            if let Some(name_node) = declarator.child_by_field("name") {
                self.define(name_node, declarator, SymbolKind::Variable, ty.clone());
            }
        }
    }

    fn visit_expr(&mut self, node: Node<'t>) -> JavaType {
        let ty = self.expr_type(node);
        if !ty.is_unknown() {
            self.model.set_type(node.id(), ty.clone());
        }
        ty
    }

    fn expr_type(&mut self, node: Node<'t>) -> JavaType {
        match node.kind() {
            kind::IDENTIFIER => {
                let name = node.text(self.source);
                if let Some(id) = self.scopes.lookup(name) {
                    self.model.bind(node, id);
                    return self.model.symbol(id).ty.clone();
                }
                if let Some(fqn) = self.resolve_class_name(name) {
                    // Class reference: the expression's type is the class
                    // itself, so static calls match at the declared owner
                    return JavaType::Class(fqn);
                }
                trace!(name, "unresolved identifier");
                JavaType::Unknown
            }
            kind::SCOPED_IDENTIFIER => {
                let path = node.text(self.source);
                if self.classpath.has_class(path) {
                    JavaType::class(path)
                } else {
                    JavaType::Unknown
                }
            }
            kind::FIELD_ACCESS => {
                let object_ty = node
                    .child_by_field("object")
                    .map_or(JavaType::Unknown, |o| self.visit_expr(o));
                let Some(field_node) = node.child_by_field("field") else {
                    return JavaType::Unknown;
                };
                let field_name = field_node.text(self.source);
                match object_ty {
                    JavaType::Class(owner) => self
                        .classpath
                        .field_type(&owner, field_name)
                        .map(|ty| self.type_from_name(ty))
                        .unwrap_or(JavaType::Unknown),
                    _ => JavaType::Unknown,
                }
            }
            kind::METHOD_INVOCATION => {
                let object_ty = node.child_by_field("object").map(|o| self.visit_expr(o));
                let name = node
                    .child_by_field("name")
                    .map(|n| n.text(self.source))
                    .unwrap_or("");
                let mut arity = 0;
                if let Some(args) = node.child_by_field("arguments") {
                    let mut cursor = args.walk();
                    for arg in args.named_children(&mut cursor) {
                        if arg.is_extra() {
                            continue;
                        }
                        self.visit_expr(arg);
                        arity += 1;
                    }
                }
                match object_ty {
                    Some(JavaType::Class(owner)) => self
                        .classpath
                        .find_method(&owner, name, arity)
                        .and_then(|m| m.return_type.clone())
                        .map(|ret| self.type_from_name(&ret))
                        .unwrap_or(JavaType::Unknown),
                    _ => JavaType::Unknown,
                }
            }
            kind::OBJECT_CREATION_EXPRESSION => {
                let ty = node
                    .child_by_field("type")
                    .map_or(JavaType::Unknown, |t| self.resolve_type_node(t));
                if let Some(args) = node.child_by_field("arguments") {
                    let mut cursor = args.walk();
                    for arg in args.named_children(&mut cursor) {
                        if !arg.is_extra() {
                            self.visit_expr(arg);
                        }
                    }
                }
                ty
            }
            kind::PARENTHESIZED_EXPRESSION => {
                let inner = {
                    let mut cursor = node.walk();
                    let found = node.named_children(&mut cursor).find(|n| !n.is_extra());
                    found
                };
                inner.map_or(JavaType::Unknown, |inner| self.visit_expr(inner))
            }
            kind::CAST_EXPRESSION => {
                if let Some(value) = node.child_by_field("value") {
                    self.visit_expr(value);
                }
                node.child_by_field("type")
                    .map_or(JavaType::Unknown, |t| self.resolve_type_node(t))
            }
            kind::ASSIGNMENT_EXPRESSION => {
                let left_ty = node
                    .child_by_field("left")
                    .map_or(JavaType::Unknown, |l| self.visit_expr(l));
                if let Some(right) = node.child_by_field("right") {
                    self.visit_expr(right);
                }
                left_ty
            }
            kind::BINARY_EXPRESSION => {
                let left_ty = node
                    .child_by_field("left")
                    .map_or(JavaType::Unknown, |l| self.visit_expr(l));
                let right_ty = node
                    .child_by_field("right")
                    .map_or(JavaType::Unknown, |r| self.visit_expr(r));
                let operator = node
                    .child_by_field("operator")
                    .map(|o| o.text(self.source))
                    .unwrap_or("");
                match operator {
                    "==" | "!=" | "<" | "<=" | ">" | ">=" | "&&" | "||" => {
                        JavaType::Primitive(PrimitiveTag::Boolean)
                    }
                    "+" if left_ty.is("java.lang.String") || right_ty.is("java.lang.String") => {
                        JavaType::string()
                    }
                    _ if left_ty == right_ty && left_ty.is_primitive() => left_ty,
                    _ => JavaType::Unknown,
                }
            }
            kind::UNARY_EXPRESSION => {
                let operand_ty = node
                    .child_by_field("operand")
                    .map_or(JavaType::Unknown, |o| self.visit_expr(o));
                let operator = node
                    .child_by_field("operator")
                    .map(|o| o.text(self.source))
                    .unwrap_or("");
                match operator {
                    "!" => JavaType::Primitive(PrimitiveTag::Boolean),
                    _ => operand_ty,
                }
            }
            kind::TERNARY_EXPRESSION => {
                if let Some(condition) = node.child_by_field("condition") {
                    self.visit_expr(condition);
                }
                let then_ty = node
                    .child_by_field("consequence")
                    .map_or(JavaType::Unknown, |n| self.visit_expr(n));
                let else_ty = node
                    .child_by_field("alternative")
                    .map_or(JavaType::Unknown, |n| self.visit_expr(n));
                if then_ty == else_ty {
                    then_ty
                } else {
                    JavaType::Unknown
                }
            }
            kind::INSTANCEOF_EXPRESSION => {
                if let Some(left) = node.child_by_field("left") {
                    self.visit_expr(left);
                }
                JavaType::Primitive(PrimitiveTag::Boolean)
            }
            kind::LAMBDA_EXPRESSION => {
                self.scopes.enter_scope(ScopeKind::Block);
                if let Some(params) = node.child_by_field("parameters") {
                    self.visit_lambda_parameters(params);
                }
                if let Some(body) = node.child_by_field("body") {
                    if body.kind() == kind::BLOCK {
                        self.visit_statement(body);
                    } else {
                        self.visit_expr(body);
                    }
                }
                self.scopes.exit_scope();
                JavaType::Unknown
            }
            kind::STRING_LITERAL => JavaType::string(),
            kind::DECIMAL_INTEGER_LITERAL
            | kind::HEX_INTEGER_LITERAL
            | kind::OCTAL_INTEGER_LITERAL
            | kind::BINARY_INTEGER_LITERAL => {
                let text = node.text(self.source);
                if text.ends_with('l') || text.ends_with('L') {
                    JavaType::Primitive(PrimitiveTag::Long)
                } else {
                    JavaType::Primitive(PrimitiveTag::Int)
                }
            }
            kind::DECIMAL_FLOATING_POINT_LITERAL | kind::HEX_FLOATING_POINT_LITERAL => {
                let text = node.text(self.source);
                if text.ends_with('f') || text.ends_with('F') {
                    JavaType::Primitive(PrimitiveTag::Float)
                } else {
                    JavaType::Primitive(PrimitiveTag::Double)
                }
            }
            kind::TRUE | kind::FALSE => JavaType::Primitive(PrimitiveTag::Boolean),
            kind::CHARACTER_LITERAL | kind::NULL_LITERAL => JavaType::Unknown,
            _ => {
                // Unmodeled expression shape: keep binding identifiers
                // inside it so usage lists stay complete
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if !child.is_extra() {
                        self.visit_expr(child);
                    }
                }
                JavaType::Unknown
            }
        }
    }

    fn visit_lambda_parameters(&mut self, params: Node<'t>) {
        match params.kind() {
            kind::IDENTIFIER => {
                self.define(params, params, SymbolKind::Parameter, JavaType::Unknown);
            }
            kind::FORMAL_PARAMETERS => self.visit_formal_parameters(params),
            _ => {
                let mut cursor = params.walk();
                for child in params.named_children(&mut cursor) {
                    if child.kind() == kind::IDENTIFIER {
                        self.define(child, child, SymbolKind::Parameter, JavaType::Unknown);
                    }
                }
            }
        }
    }

    /// Resolve a type node to the type model
    fn resolve_type_node(&mut self, node: Node<'t>) -> JavaType {
        match node.kind() {
            kind::INTEGRAL_TYPE | kind::FLOATING_POINT_TYPE | kind::BOOLEAN_TYPE => {
                let text = node.text(self.source);
                PrimitiveTag::from_name(text)
                    .map(JavaType::Primitive)
                    .unwrap_or(JavaType::Unknown)
            }
            kind::TYPE_IDENTIFIER => {
                let name = node.text(self.source);
                self.resolve_class_name(name)
                    .map(JavaType::Class)
                    .unwrap_or(JavaType::Unknown)
            }
            kind::SCOPED_TYPE_IDENTIFIER => {
                let path = node.text(self.source);
                if self.classpath.has_class(path) {
                    JavaType::class(path)
                } else {
                    JavaType::Unknown
                }
            }
            kind::GENERIC_TYPE => {
                let base = {
                    let mut cursor = node.walk();
                    let found = node.named_children(&mut cursor).find(|n| {
                        n.kind() == kind::TYPE_IDENTIFIER
                            || n.kind() == kind::SCOPED_TYPE_IDENTIFIER
                    });
                    found
                };
                base.map_or(JavaType::Unknown, |base| self.resolve_type_node(base))
            }
            _ => JavaType::Unknown,
        }
    }

    /// Map a type name from the index (fully qualified or primitive) to
    /// the type model
    fn type_from_name(&self, name: &str) -> JavaType {
        if let Some(tag) = PrimitiveTag::from_name(name) {
            return JavaType::Primitive(tag);
        }
        if name == "void" || name == "char" {
            return JavaType::Unknown;
        }
        JavaType::class(name)
    }

    /// Resolve a source-level class name: unit-local types first, then
    /// explicit imports, then on-demand imports, then the implicit
    /// `java.lang.*` fallback
    fn resolve_class_name(&self, name: &str) -> Option<String> {
        if let Some(fqn) = self.unit_classes.get(name) {
            return Some(fqn.clone());
        }
        if let Some(fqn) = self.imports.get(name) {
            return Some(fqn.clone());
        }
        for prefix in &self.wildcard_imports {
            let candidate = format!("{prefix}.{name}");
            if self.classpath.has_class(&candidate) {
                return Some(candidate);
            }
        }
        self.classpath.resolve_name(name)
    }

    fn define(
        &mut self,
        name_node: Node<'t>,
        decl: Node<'t>,
        kind: SymbolKind,
        ty: JavaType,
    ) -> Option<crate::scope::SymbolId> {
        let name = name_node.text(self.source);
        if self.scopes.lookup_local(name).is_some() {
            trace!(name, "duplicate definition in scope, first wins");
            return None;
        }
        let id = self.model.add_symbol(SymbolEntry::new(
            name.to_string(),
            kind,
            ty,
            Span::new(name_node.start_byte(), name_node.end_byte()),
            decl,
        ));
        let _ = self.scopes.define(name, id);
        self.model.set_declaration(decl.id(), id);
        Some(id)
    }
}

fn is_expression(grammar_kind: &str) -> bool {
    matches!(
        grammar_kind,
        kind::IDENTIFIER
            | kind::SCOPED_IDENTIFIER
            | kind::FIELD_ACCESS
            | kind::ARRAY_ACCESS
            | kind::METHOD_INVOCATION
            | kind::OBJECT_CREATION_EXPRESSION
            | kind::PARENTHESIZED_EXPRESSION
            | kind::CAST_EXPRESSION
            | kind::ASSIGNMENT_EXPRESSION
            | kind::BINARY_EXPRESSION
            | kind::UNARY_EXPRESSION
            | kind::TERNARY_EXPRESSION
            | kind::INSTANCEOF_EXPRESSION
            | kind::LAMBDA_EXPRESSION
            | kind::STRING_LITERAL
            | kind::CHARACTER_LITERAL
            | kind::DECIMAL_INTEGER_LITERAL
            | kind::HEX_INTEGER_LITERAL
            | kind::OCTAL_INTEGER_LITERAL
            | kind::BINARY_INTEGER_LITERAL
            | kind::DECIMAL_FLOATING_POINT_LITERAL
            | kind::HEX_FLOATING_POINT_LITERAL
            | kind::TRUE
            | kind::FALSE
            | kind::NULL_LITERAL
            | "update_expression"
            | "method_reference"
            | "array_creation_expression"
            | "switch_expression"
            | "this"
    )
}
