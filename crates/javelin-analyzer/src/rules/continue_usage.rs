//! Flags `continue` statements.
//!
//! A loop that needs `continue` resists being restructured into simpler
//! control flow; the rule is purely syntactic and runs without a
//! classpath.

use javelin_parser::{Kind, Node};

use crate::engine::{Rule, RuleContext};
use crate::issue::Issue;

const KEY: &str = "continue-usage";
const MESSAGE: &str = "Refactor this loop so it does not need a \"continue\" statement.";

pub struct ContinueUsageRule;

impl Rule for ContinueUsageRule {
    fn key(&self) -> &'static str {
        KEY
    }

    fn nodes_to_visit(&self) -> &'static [Kind] {
        &[Kind::ContinueStatement]
    }

    fn visit_node<'m, 't>(
        &self,
        node: Node<'t>,
        _ctx: &RuleContext<'m, 't>,
        issues: &mut Vec<Issue>,
    ) {
        issues.push(Issue::new(MESSAGE, node).with_rule(KEY));
    }
}
