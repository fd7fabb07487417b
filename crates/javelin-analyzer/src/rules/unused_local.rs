//! Flags local variables that are never referenced.

use javelin_parser::{Kind, Node, NodeExt};

use crate::engine::{Rule, RuleContext};
use crate::issue::Issue;
use crate::scope::SymbolKind;

const KEY: &str = "unused-local";

pub struct UnusedLocalRule;

impl Rule for UnusedLocalRule {
    fn key(&self) -> &'static str {
        KEY
    }

    fn nodes_to_visit(&self) -> &'static [Kind] {
        &[Kind::LocalVariableDeclaration]
    }

    fn visit_node<'m, 't>(
        &self,
        node: Node<'t>,
        ctx: &RuleContext<'m, 't>,
        issues: &mut Vec<Issue>,
    ) {
        let Some(model) = ctx.semantic() else {
            return;
        };
        for declarator in node.children_by_field("declarator") {
            let Some(id) = model.symbol_of_declaration(declarator) else {
                continue;
            };
            let symbol = model.symbol(id);
            if symbol.kind == SymbolKind::Variable && model.usages(id).is_empty() {
                issues.push(
                    Issue::new(
                        format!("Remove this unused \"{}\" local variable.", symbol.name),
                        declarator,
                    )
                    .with_rule(KEY),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classpath::ClasspathIndex;
    use crate::engine::{Analyzer, RuleRegistry};
    use javelin_parser::parse;

    fn classpath() -> ClasspathIndex {
        let toml = include_str!("../../../../classpath-definitions/java.core.toml");
        ClasspathIndex::load_from_str(toml).expect("should parse")
    }

    fn check(source: &str) -> Vec<Issue> {
        let tree = parse(source);
        let index = classpath();
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(UnusedLocalRule));
        Analyzer::new(registry).analyze(source, &tree, Some(&index))
    }

    #[test]
    fn test_flags_unused_local() {
        let source = r#"
class A {
    void run() {
        int unused = 42;
    }
}
"#;
        let issues = check(source);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 4);
        assert!(issues[0].message.contains("\"unused\""));
    }

    #[test]
    fn test_used_local_not_flagged() {
        let source = r#"
class A {
    int run() {
        int used = 42;
        return used;
    }
}
"#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_multiple_declarators() {
        let source = r#"
class A {
    int run() {
        int used = 1, unused = 2;
        return used;
    }
}
"#;
        let issues = check(source);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("\"unused\""));
    }

    #[test]
    fn test_skipped_without_semantic_model() {
        let source = r#"
class A {
    void run() {
        int unused = 42;
    }
}
"#;
        let tree = parse(source);
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(UnusedLocalRule));
        let issues = Analyzer::new(registry).analyze(source, &tree, None);
        assert!(issues.is_empty());
    }
}
