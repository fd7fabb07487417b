use javelin_parser::ast::Span;
use javelin_parser::Node;

/// A reported finding tied to a source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Key of the rule that reported the issue
    pub rule: Option<String>,
    pub message: String,
    pub span: Span,
    /// 1-based line of the flagged node
    pub line: usize,
}

impl Issue {
    pub fn new(message: impl Into<String>, node: Node) -> Self {
        Self {
            rule: None,
            message: message.into(),
            span: Span::new(node.start_byte(), node.end_byte()),
            line: node.start_position().row + 1,
        }
    }

    pub fn with_rule(mut self, key: impl Into<String>) -> Self {
        self.rule = Some(key.into());
        self
    }
}
