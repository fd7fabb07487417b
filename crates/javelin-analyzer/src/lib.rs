pub mod classpath;
pub mod engine;
pub mod issue;
pub mod matchers;
pub mod rules;
pub mod scope;
pub mod semantic;
pub mod types;

pub use classpath::ClasspathIndex;
pub use engine::{Analyzer, Rule, RuleContext, RuleRegistry};
pub use issue::Issue;
pub use matchers::MethodMatcher;
pub use scope::{ScopeManager, SymbolId, SymbolKind};
pub use semantic::SemanticModel;
pub use types::{JavaType, PrimitiveTag};
