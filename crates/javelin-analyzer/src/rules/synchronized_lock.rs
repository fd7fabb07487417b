//! Flags `synchronized` blocks guarding a `java.util.concurrent.locks.Lock`.
//!
//! A `Lock` carries its own acquire/release protocol; entering its monitor
//! with `synchronized` bypasses that protocol entirely.

use javelin_parser::{kind, Kind, Node, NodeExt};

use crate::engine::{Rule, RuleContext};
use crate::issue::Issue;

const KEY: &str = "synchronized-lock";
const LOCK_INTERFACE: &str = "java.util.concurrent.locks.Lock";
const MESSAGE: &str =
    "Use the \"lock()\" and \"unlock()\" methods of this \"Lock\" instead of synchronizing on it.";

pub struct SynchronizedLockRule;

impl Rule for SynchronizedLockRule {
    fn key(&self) -> &'static str {
        KEY
    }

    fn nodes_to_visit(&self) -> &'static [Kind] {
        &[Kind::SynchronizedStatement]
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
        let Some(monitor) = node.child_by_kind(kind::PARENTHESIZED_EXPRESSION) else {
            return;
        };
        if model
            .type_of(monitor)
            .is_subtype_of(LOCK_INTERFACE, model.classpath())
        {
            issues.push(Issue::new(MESSAGE, node).with_rule(KEY));
        }
    }
}
