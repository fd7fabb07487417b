pub mod ast;

pub use tree_sitter::{Node, Tree, TreeCursor};

/// Parse a Java compilation unit
///
/// Returns a tree-sitter Tree which:
/// - Always succeeds (tree-sitter has error recovery)
/// - Contains ERROR nodes for unparseable sections
/// - Can be incrementally updated
pub fn parse(source: &str) -> Tree {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .expect("Failed to load Java grammar");
    parser.parse(source, None).expect("Parser returned None")
}

/// Check if the parsed tree has any errors
pub fn has_errors(tree: &Tree) -> bool {
    has_errors_in_node(tree.root_node())
}

fn has_errors_in_node(node: Node) -> bool {
    if node.is_error() || node.is_missing() {
        return true;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if has_errors_in_node(child) {
            return true;
        }
    }
    false
}

/// Tree-sitter node kinds for the Java grammar.
/// Use these constants with `node.kind()` for pattern matching.
pub mod kind {
    // Top-level
    pub const PROGRAM: &str = "program";
    pub const PACKAGE_DECLARATION: &str = "package_declaration";
    pub const IMPORT_DECLARATION: &str = "import_declaration";
    pub const CLASS_DECLARATION: &str = "class_declaration";
    pub const INTERFACE_DECLARATION: &str = "interface_declaration";
    pub const ENUM_DECLARATION: &str = "enum_declaration";

    // Class parts
    pub const CLASS_BODY: &str = "class_body";
    pub const SUPERCLASS: &str = "superclass";
    pub const SUPER_INTERFACES: &str = "super_interfaces";
    pub const FIELD_DECLARATION: &str = "field_declaration";
    pub const METHOD_DECLARATION: &str = "method_declaration";
    pub const CONSTRUCTOR_DECLARATION: &str = "constructor_declaration";
    pub const CONSTRUCTOR_BODY: &str = "constructor_body";
    pub const STATIC_INITIALIZER: &str = "static_initializer";
    pub const MODIFIERS: &str = "modifiers";

    // Parameters and variables
    pub const FORMAL_PARAMETERS: &str = "formal_parameters";
    pub const FORMAL_PARAMETER: &str = "formal_parameter";
    pub const LOCAL_VARIABLE_DECLARATION: &str = "local_variable_declaration";
    pub const VARIABLE_DECLARATOR: &str = "variable_declarator";

    // Types
    pub const TYPE_IDENTIFIER: &str = "type_identifier";
    pub const SCOPED_TYPE_IDENTIFIER: &str = "scoped_type_identifier";
    pub const GENERIC_TYPE: &str = "generic_type";
    pub const ARRAY_TYPE: &str = "array_type";
    pub const INTEGRAL_TYPE: &str = "integral_type";
    pub const FLOATING_POINT_TYPE: &str = "floating_point_type";
    pub const BOOLEAN_TYPE: &str = "boolean_type";
    pub const VOID_TYPE: &str = "void_type";

    // Statements
    pub const BLOCK: &str = "block";
    pub const IF_STATEMENT: &str = "if_statement";
    pub const FOR_STATEMENT: &str = "for_statement";
    pub const ENHANCED_FOR_STATEMENT: &str = "enhanced_for_statement";
    pub const WHILE_STATEMENT: &str = "while_statement";
    pub const DO_STATEMENT: &str = "do_statement";
    pub const SYNCHRONIZED_STATEMENT: &str = "synchronized_statement";
    pub const TRY_STATEMENT: &str = "try_statement";
    pub const CATCH_CLAUSE: &str = "catch_clause";
    pub const FINALLY_CLAUSE: &str = "finally_clause";
    pub const RETURN_STATEMENT: &str = "return_statement";
    pub const CONTINUE_STATEMENT: &str = "continue_statement";
    pub const BREAK_STATEMENT: &str = "break_statement";
    pub const THROW_STATEMENT: &str = "throw_statement";
    pub const EXPRESSION_STATEMENT: &str = "expression_statement";
    pub const LABELED_STATEMENT: &str = "labeled_statement";

    // Expressions
    pub const IDENTIFIER: &str = "identifier";
    pub const SCOPED_IDENTIFIER: &str = "scoped_identifier";
    pub const METHOD_INVOCATION: &str = "method_invocation";
    pub const ARGUMENT_LIST: &str = "argument_list";
    pub const OBJECT_CREATION_EXPRESSION: &str = "object_creation_expression";
    pub const FIELD_ACCESS: &str = "field_access";
    pub const ARRAY_ACCESS: &str = "array_access";
    pub const ASSIGNMENT_EXPRESSION: &str = "assignment_expression";
    pub const BINARY_EXPRESSION: &str = "binary_expression";
    pub const UNARY_EXPRESSION: &str = "unary_expression";
    pub const TERNARY_EXPRESSION: &str = "ternary_expression";
    pub const INSTANCEOF_EXPRESSION: &str = "instanceof_expression";
    pub const CAST_EXPRESSION: &str = "cast_expression";
    pub const PARENTHESIZED_EXPRESSION: &str = "parenthesized_expression";
    pub const LAMBDA_EXPRESSION: &str = "lambda_expression";

    // Literals
    pub const STRING_LITERAL: &str = "string_literal";
    pub const CHARACTER_LITERAL: &str = "character_literal";
    pub const DECIMAL_INTEGER_LITERAL: &str = "decimal_integer_literal";
    pub const HEX_INTEGER_LITERAL: &str = "hex_integer_literal";
    pub const OCTAL_INTEGER_LITERAL: &str = "octal_integer_literal";
    pub const BINARY_INTEGER_LITERAL: &str = "binary_integer_literal";
    pub const DECIMAL_FLOATING_POINT_LITERAL: &str = "decimal_floating_point_literal";
    pub const HEX_FLOATING_POINT_LITERAL: &str = "hex_floating_point_literal";
    pub const TRUE: &str = "true";
    pub const FALSE: &str = "false";
    pub const NULL_LITERAL: &str = "null_literal";

    // Other
    pub const LINE_COMMENT: &str = "line_comment";
    pub const BLOCK_COMMENT: &str = "block_comment";
    pub const ASTERISK: &str = "asterisk";
    pub const ERROR: &str = "ERROR";
}

/// Closed set of node categories the analyzer dispatches on.
///
/// Rule modules subscribe by tag instead of testing `node.kind()` strings
/// themselves; grammar kinds outside this set map to `Kind::Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    CompilationUnit,
    PackageDeclaration,
    ImportDeclaration,
    ClassDeclaration,
    InterfaceDeclaration,
    EnumDeclaration,
    FieldDeclaration,
    MethodDeclaration,
    ConstructorDeclaration,
    FormalParameter,
    LocalVariableDeclaration,
    VariableDeclarator,
    Block,
    IfStatement,
    ForStatement,
    EnhancedForStatement,
    WhileStatement,
    DoStatement,
    SynchronizedStatement,
    TryStatement,
    ReturnStatement,
    ContinueStatement,
    BreakStatement,
    ThrowStatement,
    ExpressionStatement,
    MethodInvocation,
    ObjectCreationExpression,
    FieldAccess,
    ArrayAccess,
    AssignmentExpression,
    BinaryExpression,
    UnaryExpression,
    TernaryExpression,
    InstanceofExpression,
    CastExpression,
    ParenthesizedExpression,
    LambdaExpression,
    Identifier,
    StringLiteral,
    CharacterLiteral,
    IntegerLiteral,
    FloatingPointLiteral,
    BooleanLiteral,
    NullLiteral,
    Other,
}

impl Kind {
    /// Category tag for a tree-sitter node
    pub fn of(node: Node) -> Kind {
        Kind::from_grammar(node.kind())
    }

    /// Map a grammar kind string to its category tag
    pub fn from_grammar(grammar_kind: &str) -> Kind {
        match grammar_kind {
            kind::PROGRAM => Kind::CompilationUnit,
            kind::PACKAGE_DECLARATION => Kind::PackageDeclaration,
            kind::IMPORT_DECLARATION => Kind::ImportDeclaration,
            kind::CLASS_DECLARATION => Kind::ClassDeclaration,
            kind::INTERFACE_DECLARATION => Kind::InterfaceDeclaration,
            kind::ENUM_DECLARATION => Kind::EnumDeclaration,
            kind::FIELD_DECLARATION => Kind::FieldDeclaration,
            kind::METHOD_DECLARATION => Kind::MethodDeclaration,
            kind::CONSTRUCTOR_DECLARATION => Kind::ConstructorDeclaration,
            kind::FORMAL_PARAMETER => Kind::FormalParameter,
            kind::LOCAL_VARIABLE_DECLARATION => Kind::LocalVariableDeclaration,
            kind::VARIABLE_DECLARATOR => Kind::VariableDeclarator,
            kind::BLOCK => Kind::Block,
            kind::IF_STATEMENT => Kind::IfStatement,
            kind::FOR_STATEMENT => Kind::ForStatement,
            kind::ENHANCED_FOR_STATEMENT => Kind::EnhancedForStatement,
            kind::WHILE_STATEMENT => Kind::WhileStatement,
            kind::DO_STATEMENT => Kind::DoStatement,
            kind::SYNCHRONIZED_STATEMENT => Kind::SynchronizedStatement,
            kind::TRY_STATEMENT => Kind::TryStatement,
            kind::RETURN_STATEMENT => Kind::ReturnStatement,
            kind::CONTINUE_STATEMENT => Kind::ContinueStatement,
            kind::BREAK_STATEMENT => Kind::BreakStatement,
            kind::THROW_STATEMENT => Kind::ThrowStatement,
            kind::EXPRESSION_STATEMENT => Kind::ExpressionStatement,
            kind::METHOD_INVOCATION => Kind::MethodInvocation,
            kind::OBJECT_CREATION_EXPRESSION => Kind::ObjectCreationExpression,
            kind::FIELD_ACCESS => Kind::FieldAccess,
            kind::ARRAY_ACCESS => Kind::ArrayAccess,
            kind::ASSIGNMENT_EXPRESSION => Kind::AssignmentExpression,
            kind::BINARY_EXPRESSION => Kind::BinaryExpression,
            kind::UNARY_EXPRESSION => Kind::UnaryExpression,
            kind::TERNARY_EXPRESSION => Kind::TernaryExpression,
            kind::INSTANCEOF_EXPRESSION => Kind::InstanceofExpression,
            kind::CAST_EXPRESSION => Kind::CastExpression,
            kind::PARENTHESIZED_EXPRESSION => Kind::ParenthesizedExpression,
            kind::LAMBDA_EXPRESSION => Kind::LambdaExpression,
            kind::IDENTIFIER => Kind::Identifier,
            kind::STRING_LITERAL => Kind::StringLiteral,
            kind::CHARACTER_LITERAL => Kind::CharacterLiteral,
            kind::DECIMAL_INTEGER_LITERAL
            | kind::HEX_INTEGER_LITERAL
            | kind::OCTAL_INTEGER_LITERAL
            | kind::BINARY_INTEGER_LITERAL => Kind::IntegerLiteral,
            kind::DECIMAL_FLOATING_POINT_LITERAL | kind::HEX_FLOATING_POINT_LITERAL => {
                Kind::FloatingPointLiteral
            }
            kind::TRUE | kind::FALSE => Kind::BooleanLiteral,
            kind::NULL_LITERAL => Kind::NullLiteral,
            _ => Kind::Other,
        }
    }
}

/// Helper extension trait for tree-sitter Node
pub trait NodeExt<'a> {
    /// Get the text content of this node from the source
    fn text(&self, source: &'a str) -> &'a str;

    /// Find first child with the given kind
    fn child_by_kind(&self, kind: &str) -> Option<Node<'a>>;

    /// Find child with the given field name
    fn child_by_field(&self, field: &str) -> Option<Node<'a>>;

    /// Iterate over all children with the given kind
    fn children_by_kind(&self, kind: &str) -> Vec<Node<'a>>;

    /// Collect every child bound to the given field name
    fn children_by_field(&self, field: &str) -> Vec<Node<'a>>;
}

impl<'a> NodeExt<'a> for Node<'a> {
    fn text(&self, source: &'a str) -> &'a str {
        self.utf8_text(source.as_bytes()).unwrap_or("")
    }

    #[allow(clippy::manual_find)]
    fn child_by_kind(&self, kind: &str) -> Option<Node<'a>> {
        let mut cursor = self.walk();
        for child in self.children(&mut cursor) {
            if child.kind() == kind {
                return Some(child);
            }
        }
        None
    }

    fn child_by_field(&self, field: &str) -> Option<Node<'a>> {
        self.child_by_field_name(field)
    }

    fn children_by_kind(&self, kind: &str) -> Vec<Node<'a>> {
        let mut cursor = self.walk();
        self.children(&mut cursor)
            .filter(|child| child.kind() == kind)
            .collect()
    }

    fn children_by_field(&self, field: &str) -> Vec<Node<'a>> {
        let mut cursor = self.walk();
        self.children_by_field_name(field, &mut cursor).collect()
    }
}
