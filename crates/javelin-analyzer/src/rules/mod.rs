//! Standard rule modules.
//!
//! Each rule is a client of the dispatch engine: it subscribes to node
//! kinds and reports issues through its visit callback. Rules hold no
//! per-unit state; a single instance serves any number of units.

mod continue_usage;
mod empty_block;
mod string_to_primitive;
mod synchronized_lock;
mod unused_local;

pub use continue_usage::ContinueUsageRule;
pub use empty_block::EmptyBlockRule;
pub use string_to_primitive::StringToPrimitiveRule;
pub use synchronized_lock::SynchronizedLockRule;
pub use unused_local::UnusedLocalRule;

use crate::engine::Rule;

/// The standard rules, in registration order
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(EmptyBlockRule),
        Box::new(ContinueUsageRule),
        Box::new(UnusedLocalRule),
        Box::new(StringToPrimitiveRule::new()),
        Box::new(SynchronizedLockRule),
    ]
}
