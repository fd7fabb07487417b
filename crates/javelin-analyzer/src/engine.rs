//! Rule dispatch engine.
//!
//! Rules declare the node kinds they want to observe; the engine walks the
//! tree exactly once per compilation unit, pre-order and left-to-right, and
//! invokes each subscribed rule per matching node. Issues come back in
//! traversal order.

use std::collections::HashMap;

use tracing::debug;

use javelin_parser::{Kind, Node, Tree};

use crate::classpath::ClasspathIndex;
use crate::issue::Issue;
use crate::rules;
use crate::semantic::SemanticModel;

/// A pluggable unit of analysis logic.
///
/// Rules must not mutate the tree or the semantic model; both are handed
/// out by shared reference only. A rule that panics on an unexpected tree
/// shape is a programming error and aborts the unit's analysis.
pub trait Rule: Send + Sync {
    /// Stable key identifying this rule in reported issues
    fn key(&self) -> &'static str;

    /// The node kinds this rule wants to observe
    fn nodes_to_visit(&self) -> &'static [Kind];

    /// Called once per matching node during the traversal
    fn visit_node<'m, 't>(
        &self,
        node: Node<'t>,
        ctx: &RuleContext<'m, 't>,
        issues: &mut Vec<Issue>,
    );
}

/// Per-unit context handed to rules during the traversal
pub struct RuleContext<'m, 't> {
    source: &'t str,
    semantic: Option<&'m SemanticModel<'t>>,
}

impl<'m, 't> RuleContext<'m, 't> {
    pub fn source(&self) -> &'t str {
        self.source
    }

    /// Whether semantic information is available for this unit. Purely
    /// syntactic rules keep running without a resolvable classpath.
    pub fn has_semantic(&self) -> bool {
        self.semantic.is_some()
    }

    pub fn semantic(&self) -> Option<&'m SemanticModel<'t>> {
        self.semantic
    }
}

/// Explicit start-time registry of rule instances.
///
/// There is no runtime discovery; hosts construct the rules they want and
/// register them in order. Dispatch order per node follows registration
/// order.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a registry with the standard rules
    pub fn with_default_rules() -> Self {
        let mut registry = Self::new();
        for rule in rules::default_rules() {
            registry.register(rule);
        }
        registry
    }

    /// Register a rule
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Traversal lifecycle for one compilation unit
#[derive(Debug, PartialEq, Eq)]
enum TraversalState {
    NotStarted,
    Traversing,
    Done,
}

struct Traversal<'r> {
    registry: &'r RuleRegistry,
    /// Node kind -> indices of subscribed rules, in registration order
    subscriptions: HashMap<Kind, Vec<usize>>,
    state: TraversalState,
}

impl<'r> Traversal<'r> {
    fn new(registry: &'r RuleRegistry) -> Self {
        let mut subscriptions: HashMap<Kind, Vec<usize>> = HashMap::new();
        for (index, rule) in registry.rules.iter().enumerate() {
            for kind in rule.nodes_to_visit() {
                subscriptions.entry(*kind).or_default().push(index);
            }
        }
        Self {
            registry,
            subscriptions,
            state: TraversalState::NotStarted,
        }
    }

    fn run<'m, 't>(
        &mut self,
        root: Node<'t>,
        ctx: &RuleContext<'m, 't>,
        issues: &mut Vec<Issue>,
    ) {
        assert_eq!(self.state, TraversalState::NotStarted);
        self.state = TraversalState::Traversing;
        self.visit(root, ctx, issues);
        self.state = TraversalState::Done;
    }

    fn visit<'m, 't>(&self, node: Node<'t>, ctx: &RuleContext<'m, 't>, issues: &mut Vec<Issue>) {
        if let Some(subscribers) = self.subscriptions.get(&Kind::of(node)) {
            for &index in subscribers {
                self.registry.rules[index].visit_node(node, ctx, issues);
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, ctx, issues);
        }
    }
}

/// Analyzes compilation units with a fixed set of rules.
///
/// Analysis of one unit is single-threaded and synchronous; independent
/// units may be analyzed in parallel from separate workers, each owning
/// its tree and model exclusively.
pub struct Analyzer {
    registry: RuleRegistry,
}

impl Analyzer {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn with_default_rules() -> Self {
        Self::new(RuleRegistry::with_default_rules())
    }

    /// Analyze one compilation unit: resolve (when a classpath index is
    /// supplied), traverse once, collect issues in traversal order.
    pub fn analyze(
        &self,
        source: &str,
        tree: &Tree,
        classpath: Option<&ClasspathIndex>,
    ) -> Vec<Issue> {
        let semantic = classpath.map(|index| SemanticModel::resolve(source, tree, index));
        let ctx = RuleContext {
            source,
            semantic: semantic.as_ref(),
        };

        let mut issues = Vec::new();
        let mut traversal = Traversal::new(&self.registry);
        traversal.run(tree.root_node(), &ctx, &mut issues);
        debug!(
            rules = self.registry.len(),
            issues = issues.len(),
            has_semantic = ctx.has_semantic(),
            "unit analysis complete"
        );
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_parser::parse;
    use std::sync::{Arc, Mutex};

    /// Records every node id it is shown, for traversal assertions
    struct RecordingRule {
        kinds: &'static [Kind],
        seen: Arc<Mutex<Vec<(usize, usize)>>>,
    }

    impl RecordingRule {
        fn new(kinds: &'static [Kind]) -> (Self, Arc<Mutex<Vec<(usize, usize)>>>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    kinds,
                    seen: Arc::clone(&seen),
                },
                seen,
            )
        }
    }

    impl Rule for RecordingRule {
        fn key(&self) -> &'static str {
            "recording"
        }

        fn nodes_to_visit(&self) -> &'static [Kind] {
            self.kinds
        }

        fn visit_node<'m, 't>(
            &self,
            node: Node<'t>,
            _ctx: &RuleContext<'m, 't>,
            _issues: &mut Vec<Issue>,
        ) {
            self.seen
                .lock()
                .expect("lock should not be poisoned")
                .push((node.id(), node.start_byte()));
        }
    }

    struct FlagEveryIdentifier;

    impl Rule for FlagEveryIdentifier {
        fn key(&self) -> &'static str {
            "flag-identifiers"
        }

        fn nodes_to_visit(&self) -> &'static [Kind] {
            &[Kind::Identifier]
        }

        fn visit_node<'m, 't>(
            &self,
            node: Node<'t>,
            ctx: &RuleContext<'m, 't>,
            issues: &mut Vec<Issue>,
        ) {
            issues.push(Issue::new(format!("saw {}", node.start_byte()), node).with_rule(self.key()));
            // Syntactic rules run even without semantic information
            assert!(!ctx.has_semantic());
        }
    }

    const SOURCE: &str = r#"
class A {
    void run(int x) {
        int a = x;
        int b = x + a;
    }
}
"#;

    fn count_identifiers(node: Node) -> usize {
        let mut count = usize::from(Kind::of(node) == Kind::Identifier);
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            count += count_identifiers(child);
        }
        count
    }

    #[test]
    fn test_single_traversal_completeness() {
        let tree = parse(SOURCE);
        let expected = count_identifiers(tree.root_node());
        assert!(expected > 0);

        let (rule, seen) = RecordingRule::new(&[Kind::Identifier]);
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(rule));
        let analyzer = Analyzer::new(registry);
        analyzer.analyze(SOURCE, &tree, None);

        let seen = seen.lock().expect("lock should not be poisoned");

        // Every identifier visited exactly once
        assert_eq!(seen.len(), expected);
        let mut ids: Vec<usize> = seen.iter().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), expected);

        // Pre-order means strictly increasing start offsets for leaves
        for pair in seen.windows(2) {
            assert!(pair[0].1 < pair[1].1);
        }
    }

    #[test]
    fn test_issue_order_is_traversal_order() {
        let tree = parse(SOURCE);
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(FlagEveryIdentifier));
        let analyzer = Analyzer::new(registry);

        let issues = analyzer.analyze(SOURCE, &tree, None);
        assert!(!issues.is_empty());
        for pair in issues.windows(2) {
            assert!(pair[0].span.start < pair[1].span.start);
        }
    }

    #[test]
    fn test_unsubscribed_kinds_not_delivered() {
        let tree = parse(SOURCE);
        let (rule, seen) = RecordingRule::new(&[Kind::SynchronizedStatement]);
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(rule));
        Analyzer::new(registry).analyze(SOURCE, &tree, None);

        let seen = seen.lock().expect("lock should not be poisoned");
        assert!(seen.is_empty());
    }

    #[test]
    fn test_empty_registry_reports_nothing() {
        let tree = parse(SOURCE);
        let analyzer = Analyzer::new(RuleRegistry::new());
        assert!(analyzer.analyze(SOURCE, &tree, None).is_empty());
    }

    #[test]
    fn test_default_registry_is_populated() {
        let registry = RuleRegistry::with_default_rules();
        assert!(!registry.is_empty());
    }
}
