//! Semantic model for one compilation unit.
//!
//! Resolution binds syntactic references to symbols and attaches static
//! types to expression nodes. All semantic data is keyed by node identity;
//! tree nodes never own or reference symbols, so the tree and the model
//! cannot form an ownership cycle. The model borrows the tree and is
//! dropped with it when analysis of the unit completes.

mod resolve;

use std::collections::HashMap;

use javelin_parser::ast::Span;
use javelin_parser::{Node, Tree};

use crate::classpath::ClasspathIndex;
use crate::scope::{SymbolId, SymbolKind};
use crate::types::JavaType;

/// A resolved symbol: the semantic identity behind a declared name
#[derive(Debug)]
pub struct SymbolEntry<'t> {
    pub name: String,
    pub kind: SymbolKind,
    /// Declared type of the symbol
    pub ty: JavaType,
    /// Span of the declaring identifier
    pub name_span: Span,
    decl: Node<'t>,
    usages: Vec<Node<'t>>,
}

impl<'t> SymbolEntry<'t> {
    pub(crate) fn new(
        name: String,
        kind: SymbolKind,
        ty: JavaType,
        name_span: Span,
        decl: Node<'t>,
    ) -> Self {
        Self {
            name,
            kind,
            ty,
            name_span,
            decl,
            usages: Vec::new(),
        }
    }
}

const UNKNOWN: JavaType = JavaType::Unknown;

/// Semantic facts for one compilation unit, keyed by node identity
pub struct SemanticModel<'t> {
    source: &'t str,
    classpath: &'t ClasspathIndex,
    symbols: Vec<SymbolEntry<'t>>,
    /// Reference node -> bound symbol
    bindings: HashMap<usize, SymbolId>,
    /// Declaration node -> declared symbol
    declarations: HashMap<usize, SymbolId>,
    /// Expression node -> static type
    types: HashMap<usize, JavaType>,
}

impl<'t> SemanticModel<'t> {
    /// Run the single resolution pass over a parsed compilation unit.
    ///
    /// Resolution never fails: references that cannot be bound stay
    /// unresolved and dependent queries degrade to "no match".
    pub fn resolve(
        source: &'t str,
        tree: &'t Tree,
        classpath: &'t ClasspathIndex,
    ) -> SemanticModel<'t> {
        resolve::run(source, tree, classpath)
    }

    pub(crate) fn new(source: &'t str, classpath: &'t ClasspathIndex) -> Self {
        Self {
            source,
            classpath,
            symbols: Vec::new(),
            bindings: HashMap::new(),
            declarations: HashMap::new(),
            types: HashMap::new(),
        }
    }

    pub fn source(&self) -> &'t str {
        self.source
    }

    pub fn classpath(&self) -> &'t ClasspathIndex {
        self.classpath
    }

    /// The symbol a reference node is bound to, if resolution bound one
    pub fn resolve_reference(&self, node: Node) -> Option<SymbolId> {
        self.bindings.get(&node.id()).copied()
    }

    /// The symbol introduced by a declaration node
    pub fn symbol_of_declaration(&self, node: Node) -> Option<SymbolId> {
        self.declarations.get(&node.id()).copied()
    }

    pub fn symbol(&self, id: SymbolId) -> &SymbolEntry<'t> {
        &self.symbols[id.0]
    }

    /// The tree node that declared this symbol
    pub fn declaring_node(&self, id: SymbolId) -> Node<'t> {
        self.symbols[id.0].decl
    }

    /// Every reference to this symbol, in encounter order
    pub fn usages(&self, id: SymbolId) -> &[Node<'t>] {
        &self.symbols[id.0].usages
    }

    /// Static type of an expression node; `Unknown` when resolution had
    /// nothing to say about it
    pub fn type_of(&self, node: Node) -> &JavaType {
        self.types.get(&node.id()).unwrap_or(&UNKNOWN)
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub(crate) fn add_symbol(&mut self, entry: SymbolEntry<'t>) -> SymbolId {
        let id = SymbolId(self.symbols.len());
        self.symbols.push(entry);
        id
    }

    pub(crate) fn bind(&mut self, reference: Node<'t>, id: SymbolId) {
        self.bindings.insert(reference.id(), id);
        self.symbols[id.0].usages.push(reference);
    }

    pub(crate) fn set_declaration(&mut self, node_id: usize, id: SymbolId) {
        self.declarations.insert(node_id, id);
    }

    pub(crate) fn set_type(&mut self, node_id: usize, ty: JavaType) {
        self.types.insert(node_id, ty);
    }
}
