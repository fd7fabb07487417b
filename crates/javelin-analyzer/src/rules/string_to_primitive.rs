//! Flags boxed conversions from `String` to a primitive.
//!
//! `Integer.parseInt("42")` yields the primitive directly;
//! `Integer.valueOf("42")` and `new Integer("42")` allocate a box that an
//! unboxing conversion immediately throws away. The rule follows the
//! initializer through a single-use local so the intermediate variable
//! form is caught as well.

use javelin_parser::{Kind, Node, NodeExt};

use crate::engine::{Rule, RuleContext};
use crate::issue::Issue;
use crate::matchers::MethodMatcher;
use crate::scope::SymbolKind;
use crate::semantic::SemanticModel;
use crate::types::PrimitiveTag;

const KEY: &str = "string-to-primitive";
const STRING: &str = "java.lang.String";

pub struct StringToPrimitiveRule {
    checks: Vec<PrimitiveCheck>,
}

impl Default for StringToPrimitiveRule {
    fn default() -> Self {
        Self::new()
    }
}

impl StringToPrimitiveRule {
    pub fn new() -> Self {
        let checks = vec![
            PrimitiveCheck::new("int", "Integer", PrimitiveTag::Int),
            PrimitiveCheck::new("boolean", "Boolean", PrimitiveTag::Boolean),
            PrimitiveCheck::new("byte", "Byte", PrimitiveTag::Byte),
            PrimitiveCheck::new("double", "Double", PrimitiveTag::Double),
            PrimitiveCheck::new("float", "Float", PrimitiveTag::Float),
            PrimitiveCheck::new("long", "Long", PrimitiveTag::Long),
            PrimitiveCheck::new("short", "Short", PrimitiveTag::Short),
        ];
        Self { checks }
    }
}

impl Rule for StringToPrimitiveRule {
    fn key(&self) -> &'static str {
        KEY
    }

    fn nodes_to_visit(&self) -> &'static [Kind] {
        &[Kind::LocalVariableDeclaration, Kind::MethodInvocation]
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
        match Kind::of(node) {
            Kind::LocalVariableDeclaration => {
                for declarator in node.children_by_field("declarator") {
                    let Some(id) = model.symbol_of_declaration(declarator) else {
                        continue;
                    };
                    let variable_ty = &model.symbol(id).ty;
                    let Some(check) = self.checks.iter().find(|c| variable_ty.is_tagged(c.tag))
                    else {
                        continue;
                    };
                    if let Some(initializer) = declarator.child_by_field("value") {
                        check.check_instantiation(initializer, model, issues);
                    }
                }
            }
            Kind::MethodInvocation => {
                for check in &self.checks {
                    check.check_method_invocation(node, model, issues);
                }
            }
            _ => {}
        }
    }
}

struct PrimitiveCheck {
    tag: PrimitiveTag,
    /// Fully qualified name of the boxed class
    owner: String,
    message: String,
    /// `<primitive>Value()` on the boxed class
    unboxing_matcher: MethodMatcher,
    /// `valueOf(String)` on the boxed class
    value_of_matcher: MethodMatcher,
}

impl PrimitiveCheck {
    fn new(primitive: &str, class_name: &str, tag: PrimitiveTag) -> Self {
        let owner = format!("java.lang.{class_name}");
        let message = format!(
            "Use \"{class_name}.parse{}\" for this string-to-{primitive} conversion.",
            capitalize(primitive)
        );
        let unboxing_matcher = MethodMatcher::new()
            .type_definition(owner.clone())
            .name(format!("{primitive}Value"));
        let value_of_matcher = MethodMatcher::new()
            .type_definition(owner.clone())
            .name("valueOf")
            .add_parameter(STRING);
        Self {
            tag,
            owner,
            message,
            unboxing_matcher,
            value_of_matcher,
        }
    }

    fn check_method_invocation<'t>(
        &self,
        invocation: Node<'t>,
        model: &SemanticModel<'t>,
        issues: &mut Vec<Issue>,
    ) {
        if self.unboxing_matcher.matches(invocation, model) {
            if let Some(receiver) = invocation.child_by_field("object") {
                self.check_instantiation(receiver, model, issues);
            }
        }
    }

    fn check_instantiation<'t>(
        &self,
        expression: Node<'t>,
        model: &SemanticModel<'t>,
        issues: &mut Vec<Issue>,
    ) {
        if self.is_badly_instantiated(expression, model) {
            issues.push(Issue::new(self.message.clone(), expression).with_rule(KEY));
        }
    }

    fn is_badly_instantiated<'t>(&self, expression: Node<'t>, model: &SemanticModel<'t>) -> bool {
        match Kind::of(expression) {
            Kind::ObjectCreationExpression => {
                model.type_of(expression).is(&self.owner)
                    && first_argument(expression)
                        .is_some_and(|argument| model.type_of(argument).is(STRING))
            }
            Kind::MethodInvocation => {
                self.value_of_matcher.matches(expression, model)
                    && string_argument_traceable(expression, model)
            }
            Kind::Identifier => {
                let Some(id) = model.resolve_reference(expression) else {
                    return false;
                };
                let symbol = model.symbol(id);
                if symbol.kind != SymbolKind::Variable || model.usages(id).len() != 1 {
                    return false;
                }
                // Only the variable's own initializer is inspected; flows
                // through fields or parameters stay out of reach
                let Some(initializer) = model.declaring_node(id).child_by_field("value") else {
                    return false;
                };
                self.is_badly_instantiated(initializer, model)
            }
            _ => false,
        }
    }
}

/// A string local with other consumers does not qualify: the conversion
/// is only reported when the string flows straight into it.
fn string_argument_traceable<'t>(invocation: Node<'t>, model: &SemanticModel<'t>) -> bool {
    let Some(argument) = first_argument(invocation) else {
        return false;
    };
    if Kind::of(argument) != Kind::Identifier {
        return true;
    }
    match model.resolve_reference(argument) {
        Some(id) if model.symbol(id).kind == SymbolKind::Variable => model.usages(id).len() == 1,
        _ => true,
    }
}

fn first_argument(node: Node) -> Option<Node> {
    let args = node.child_by_field("arguments")?;
    let mut cursor = args.walk();
    let argument = args.named_children(&mut cursor).find(|n| !n.is_extra());
    argument
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
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
        registry.register(Box::new(StringToPrimitiveRule::new()));
        Analyzer::new(registry).analyze(source, &tree, Some(&index))
    }

    #[test]
    fn test_value_of_literal_flagged() {
        let source = r#"
class A {
    void run() {
        int x = Integer.valueOf("42");
    }
}
"#;
        let issues = check(source);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 4);
        assert!(issues[0].message.contains("Integer.parseInt"));
        assert!(issues[0].message.contains("string-to-int"));
    }

    #[test]
    fn test_parse_int_not_flagged() {
        let source = r#"
class A {
    void run() {
        int x = Integer.parseInt("42");
    }
}
"#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_string_constructor_flagged() {
        let source = r#"
class A {
    void run() {
        int x = new Integer("42");
    }
}
"#;
        let issues = check(source);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("Integer.parseInt"));
    }

    #[test]
    fn test_int_constructor_not_flagged() {
        let source = r#"
class A {
    void run() {
        int x = new Integer(42);
    }
}
"#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_single_use_string_argument_flagged() {
        let source = r#"
class A {
    void run() {
        String s = "5";
        int x = Integer.valueOf(s);
    }
}
"#;
        let issues = check(source);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 5);
    }

    #[test]
    fn test_multi_use_string_argument_not_flagged() {
        let source = r#"
class A {
    void run() {
        String s = "5";
        log(s);
        int x = Integer.valueOf(s);
    }
}
"#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_single_use_boxed_intermediate_flagged() {
        let source = r#"
class A {
    void run() {
        Integer parsed = Integer.valueOf("42");
        int x = parsed;
    }
}
"#;
        let issues = check(source);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 5);
    }

    #[test]
    fn test_multi_use_boxed_intermediate_not_flagged() {
        let source = r#"
class A {
    void run() {
        Integer parsed = Integer.valueOf("42");
        keep(parsed);
        int x = parsed;
    }
}
"#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_unboxing_call_on_construction_flagged() {
        let source = r#"
class A {
    void run() {
        int x = new Integer("42").intValue();
    }
}
"#;
        let issues = check(source);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_unboxing_call_through_single_use_variable_flagged() {
        let source = r#"
class A {
    void run() {
        Integer boxed = Integer.valueOf("42");
        int x = boxed.intValue();
    }
}
"#;
        let issues = check(source);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_other_primitives_have_their_own_messages() {
        let source = r#"
class A {
    void run() {
        boolean b = Boolean.valueOf("true");
        double d = Double.valueOf("1.5");
    }
}
"#;
        let issues = check(source);
        assert_eq!(issues.len(), 2);
        assert!(issues[0].message.contains("Boolean.parseBoolean"));
        assert!(issues[1].message.contains("Double.parseDouble"));
    }

    #[test]
    fn test_boxed_target_not_flagged() {
        // The declared variable keeps the box; no conversion happens here
        let source = r#"
class A {
    void run() {
        Integer boxed = Integer.valueOf("42");
        keep(boxed);
    }
}
"#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_skipped_without_semantic_model() {
        let source = r#"
class A {
    void run() {
        int x = Integer.valueOf("42");
    }
}
"#;
        let tree = parse(source);
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(StringToPrimitiveRule::new()));
        assert!(Analyzer::new(registry).analyze(source, &tree, None).is_empty());
    }
}
