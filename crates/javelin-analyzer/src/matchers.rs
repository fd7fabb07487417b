//! Declarative invocation matching.
//!
//! A matcher describes a call shape (owner type, method name, parameter
//! type names) once; rules evaluate it against call nodes instead of
//! hand-walking the tree. Matching is pure: the same matcher, node, and
//! model always produce the same answer.

use javelin_parser::{Kind, Node, NodeExt};

use crate::semantic::SemanticModel;

/// Matcher for method invocations.
///
/// Built once, reused across evaluations. Every declared constraint must
/// hold for a call to match; a matcher with no constraints matches
/// nothing. Unresolved types on the receiver or arguments are non-matches,
/// never errors.
#[derive(Debug, Clone, Default)]
pub struct MethodMatcher {
    type_definition: Option<String>,
    name: Option<String>,
    parameters: Option<Vec<String>>,
}

impl MethodMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the receiver's static type to be the named type or one of
    /// its subtypes. Subtype matching is what lets inherited methods match
    /// at the declared supertype.
    pub fn type_definition(mut self, fully_qualified_name: impl Into<String>) -> Self {
        self.type_definition = Some(fully_qualified_name.into());
        self
    }

    /// Require the invoked method's simple name
    pub fn name(mut self, method_name: impl Into<String>) -> Self {
        self.name = Some(method_name.into());
        self
    }

    /// Append a parameter type name to the declared signature. Once any
    /// parameter is declared, the argument count must match exactly and
    /// each argument's static type must be the declared name positionally;
    /// no widening or boxing counts as a match.
    pub fn add_parameter(mut self, type_name: impl Into<String>) -> Self {
        self.parameters
            .get_or_insert_with(Vec::new)
            .push(type_name.into());
        self
    }

    /// Evaluate this matcher against a call node
    pub fn matches(&self, node: Node, model: &SemanticModel) -> bool {
        if Kind::of(node) != Kind::MethodInvocation {
            return false;
        }
        // No constraints means nothing to assert; refuse to match
        if self.type_definition.is_none() && self.name.is_none() && self.parameters.is_none() {
            return false;
        }

        if let Some(expected) = &self.name {
            let Some(name_node) = node.child_by_field("name") else {
                return false;
            };
            if name_node.text(model.source()) != expected {
                return false;
            }
        }

        if let Some(owner) = &self.type_definition {
            let Some(receiver) = node.child_by_field("object") else {
                return false;
            };
            let receiver_ty = model.type_of(receiver);
            if !receiver_ty.is(owner) && !receiver_ty.is_subtype_of(owner, model.classpath()) {
                return false;
            }
        }

        if let Some(expected_params) = &self.parameters {
            let Some(args) = node.child_by_field("arguments") else {
                return false;
            };
            let mut cursor = args.walk();
            let arguments: Vec<Node> = args
                .named_children(&mut cursor)
                .filter(|n| !n.is_extra())
                .collect();
            if arguments.len() != expected_params.len() {
                return false;
            }
            for (argument, expected) in arguments.iter().zip(expected_params) {
                if !model.type_of(*argument).is(expected) {
                    return false;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classpath::ClasspathIndex;
    use javelin_parser::{kind, parse, Tree};

    fn classpath() -> ClasspathIndex {
        let toml = include_str!("../../../classpath-definitions/java.core.toml");
        ClasspathIndex::load_from_str(toml).expect("should parse")
    }

    fn find_invocations<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
        if node.kind() == kind::METHOD_INVOCATION {
            out.push(node);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            find_invocations(child, out);
        }
    }

    fn first_invocation(tree: &Tree) -> Node<'_> {
        let mut calls = Vec::new();
        find_invocations(tree.root_node(), &mut calls);
        *calls.first().expect("should contain an invocation")
    }

    fn value_of_matcher() -> MethodMatcher {
        MethodMatcher::new()
            .type_definition("java.lang.Integer")
            .name("valueOf")
            .add_parameter("java.lang.String")
    }

    const VALUE_OF_SOURCE: &str = r#"
class A {
    void run() {
        Integer x = Integer.valueOf("42");
    }
}
"#;

    #[test]
    fn test_matches_static_value_of() {
        let tree = parse(VALUE_OF_SOURCE);
        let index = classpath();
        let model = SemanticModel::resolve(VALUE_OF_SOURCE, &tree, &index);
        let call = first_invocation(&tree);

        assert!(value_of_matcher().matches(call, &model));
    }

    #[test]
    fn test_determinism() {
        let tree = parse(VALUE_OF_SOURCE);
        let index = classpath();
        let model = SemanticModel::resolve(VALUE_OF_SOURCE, &tree, &index);
        let call = first_invocation(&tree);

        let matcher = value_of_matcher();
        let first = matcher.matches(call, &model);
        for _ in 0..10 {
            assert_eq!(matcher.matches(call, &model), first);
        }
    }

    #[test]
    fn test_rejects_wrong_name() {
        let source = r#"
class A {
    void run() {
        int x = Integer.parseInt("42");
    }
}
"#;
        let tree = parse(source);
        let index = classpath();
        let model = SemanticModel::resolve(source, &tree, &index);
        let call = first_invocation(&tree);

        assert!(!value_of_matcher().matches(call, &model));
    }

    #[test]
    fn test_rejects_wrong_owner() {
        let source = r#"
class A {
    void run() {
        Boolean x = Boolean.valueOf("true");
    }
}
"#;
        let tree = parse(source);
        let index = classpath();
        let model = SemanticModel::resolve(source, &tree, &index);
        let call = first_invocation(&tree);

        assert!(!value_of_matcher().matches(call, &model));
        let boolean_matcher = MethodMatcher::new()
            .type_definition("java.lang.Boolean")
            .name("valueOf")
            .add_parameter("java.lang.String");
        assert!(boolean_matcher.matches(call, &model));
    }

    #[test]
    fn test_rejects_wrong_argument_type() {
        let source = r#"
class A {
    void run() {
        Integer x = Integer.valueOf(42);
    }
}
"#;
        let tree = parse(source);
        let index = classpath();
        let model = SemanticModel::resolve(source, &tree, &index);
        let call = first_invocation(&tree);

        // valueOf(int) does not satisfy the valueOf(String) signature
        assert!(!value_of_matcher().matches(call, &model));
    }

    #[test]
    fn test_rejects_wrong_arity() {
        let source = r#"
class A {
    void run() {
        String s = "a".concat("b");
    }
}
"#;
        let tree = parse(source);
        let index = classpath();
        let model = SemanticModel::resolve(source, &tree, &index);
        let call = first_invocation(&tree);

        let two_params = MethodMatcher::new()
            .type_definition("java.lang.String")
            .name("concat")
            .add_parameter("java.lang.String")
            .add_parameter("java.lang.String");
        assert!(!two_params.matches(call, &model));
    }

    #[test]
    fn test_inherited_method_matches_at_supertype() {
        let source = r#"
class A {
    void run(Integer boxed) {
        int x = boxed.intValue();
    }
}
"#;
        let tree = parse(source);
        let index = classpath();
        let model = SemanticModel::resolve(source, &tree, &index);
        let call = first_invocation(&tree);

        // intValue is declared on Number; an Integer receiver must match
        let matcher = MethodMatcher::new()
            .type_definition("java.lang.Number")
            .name("intValue");
        assert!(matcher.matches(call, &model));
    }

    #[test]
    fn test_rejects_bare_call_when_owner_declared() {
        let source = r#"
class A {
    void run() {
        valueOf("42");
    }
}
"#;
        let tree = parse(source);
        let index = classpath();
        let model = SemanticModel::resolve(source, &tree, &index);
        let call = first_invocation(&tree);

        assert!(!value_of_matcher().matches(call, &model));
    }

    #[test]
    fn test_unconstrained_matcher_never_matches() {
        let tree = parse(VALUE_OF_SOURCE);
        let index = classpath();
        let model = SemanticModel::resolve(VALUE_OF_SOURCE, &tree, &index);
        let call = first_invocation(&tree);

        assert!(!MethodMatcher::new().matches(call, &model));
    }

    #[test]
    fn test_rejects_non_call_node() {
        let tree = parse(VALUE_OF_SOURCE);
        let index = classpath();
        let model = SemanticModel::resolve(VALUE_OF_SOURCE, &tree, &index);

        assert!(!value_of_matcher().matches(tree.root_node(), &model));
    }

    #[test]
    fn test_unresolved_receiver_is_no_match() {
        let source = r#"
class A {
    void run(Mystery m) {
        m.valueOf("42");
    }
}
"#;
        let tree = parse(source);
        let index = classpath();
        let model = SemanticModel::resolve(source, &tree, &index);
        let call = first_invocation(&tree);

        assert!(!value_of_matcher().matches(call, &model));
    }
}
