//! Flags empty nested blocks.
//!
//! Method, constructor, and static-initializer bodies have their own
//! conventions and are left alone; a comment inside a block counts as
//! content.

use javelin_parser::{kind, Kind, Node};

use crate::engine::{Rule, RuleContext};
use crate::issue::Issue;

const KEY: &str = "empty-block";
const MESSAGE: &str = "Either remove or fill this block of code.";

pub struct EmptyBlockRule;

impl Rule for EmptyBlockRule {
    fn key(&self) -> &'static str {
        KEY
    }

    fn nodes_to_visit(&self) -> &'static [Kind] {
        &[Kind::Block]
    }

    fn visit_node<'m, 't>(
        &self,
        node: Node<'t>,
        _ctx: &RuleContext<'m, 't>,
        issues: &mut Vec<Issue>,
    ) {
        if node.named_child_count() > 0 {
            return;
        }
        if let Some(parent) = node.parent() {
            if matches!(
                parent.kind(),
                kind::METHOD_DECLARATION | kind::STATIC_INITIALIZER | kind::LAMBDA_EXPRESSION
            ) {
                return;
            }
        }
        issues.push(Issue::new(MESSAGE, node).with_rule(KEY));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Analyzer, RuleRegistry};
    use javelin_parser::parse;

    fn check(source: &str) -> Vec<Issue> {
        let tree = parse(source);
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(EmptyBlockRule));
        Analyzer::new(registry).analyze(source, &tree, None)
    }

    #[test]
    fn test_flags_empty_if_block() {
        let source = r#"
class A {
    void run(boolean flag) {
        if (flag) {
        }
    }
}
"#;
        let issues = check(source);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 4);
        assert_eq!(issues[0].message, MESSAGE);
    }

    #[test]
    fn test_comment_counts_as_content() {
        let source = r#"
class A {
    void run(boolean flag) {
        if (flag) {
            // deliberately nothing to do
        }
    }
}
"#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_empty_method_body_not_flagged() {
        let source = r#"
class A {
    void noop() {
    }
}
"#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_empty_nested_block_flagged() {
        let source = r#"
class A {
    void run() {
        {
        }
    }
}
"#;
        let issues = check(source);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_empty_loop_body_flagged() {
        let source = r#"
class A {
    void run(int n) {
        while (n-- > 0) {
        }
    }
}
"#;
        assert_eq!(check(source).len(), 1);
    }

    #[test]
    fn test_filled_blocks_not_flagged() {
        let source = r#"
class A {
    void run(boolean flag) {
        if (flag) {
            work();
        }
    }
}
"#;
        assert!(check(source).is_empty());
    }
}
