//! Classpath-derived type index.
//!
//! The host supplies an index of the types reachable from the analysis
//! classpath, loaded from external TOML files. The analyzer never scans
//! bytecode or source for this; whatever the index does not know resolves
//! to "unknown" and downstream queries fail open.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;

/// Type index loaded from external TOML files
#[derive(Debug, Default, Deserialize)]
pub struct ClasspathIndex {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    classes: HashMap<String, ClassDef>,
    /// Memoized transitive supertype closures. The index is shared across
    /// per-unit workers, so the cache must tolerate concurrent lookups.
    #[serde(skip)]
    closure_cache: DashMap<String, Arc<HashSet<String>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassDef {
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub interface: bool,
    /// Field name -> fully qualified (or primitive) type name
    #[serde(default)]
    pub fields: HashMap<String, String>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    #[serde(default)]
    pub constructors: Vec<ConstructorDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(rename = "return", default)]
    pub return_type: Option<String>,
    #[serde(rename = "static", default)]
    pub is_static: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConstructorDef {
    #[serde(default)]
    pub params: Vec<String>,
}

impl ClasspathIndex {
    /// Load an index from a TOML file
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let index: ClasspathIndex = toml::from_str(&content)?;
        Ok(index)
    }

    /// Load an index from a TOML string
    pub fn load_from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get a class by fully qualified name
    pub fn get_class(&self, fqn: &str) -> Option<&ClassDef> {
        self.classes.get(fqn)
    }

    pub fn has_class(&self, fqn: &str) -> bool {
        self.classes.contains_key(fqn)
    }

    /// All indexed class names
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Resolve a source-level type name to a fully qualified name.
    ///
    /// Already-qualified names resolve to themselves when indexed; simple
    /// names fall back to the implicit `java.lang.*` import.
    pub fn resolve_name(&self, name: &str) -> Option<String> {
        if self.classes.contains_key(name) {
            return Some(name.to_string());
        }
        if !name.contains('.') {
            let implicit = format!("java.lang.{name}");
            if self.classes.contains_key(&implicit) {
                return Some(implicit);
            }
        }
        None
    }

    /// Transitive closure of declared superclasses and interfaces.
    ///
    /// Unknown classes yield an empty closure. The result excludes the
    /// class itself; reflexivity is the caller's concern.
    pub fn supertypes_of(&self, fqn: &str) -> Arc<HashSet<String>> {
        if let Some(cached) = self.closure_cache.get(fqn) {
            return Arc::clone(&cached);
        }

        let mut closure = HashSet::new();
        let mut pending = vec![fqn.to_string()];
        while let Some(current) = pending.pop() {
            let Some(class) = self.classes.get(&current) else {
                continue;
            };
            for parent in class.extends.iter().chain(class.implements.iter()) {
                if closure.insert(parent.clone()) {
                    pending.push(parent.clone());
                }
            }
        }

        let closure = Arc::new(closure);
        self.closure_cache
            .insert(fqn.to_string(), Arc::clone(&closure));
        closure
    }

    /// Look up a method by name and arity, walking the declared hierarchy
    /// so inherited methods resolve at the supertype.
    pub fn find_method(&self, owner: &str, name: &str, arity: usize) -> Option<&MethodDef> {
        if let Some(class) = self.classes.get(owner) {
            if let Some(method) = class
                .methods
                .iter()
                .find(|m| m.name == name && m.params.len() == arity)
            {
                return Some(method);
            }
        }
        for parent in self.supertypes_of(owner).iter() {
            if let Some(class) = self.classes.get(parent) {
                if let Some(method) = class
                    .methods
                    .iter()
                    .find(|m| m.name == name && m.params.len() == arity)
                {
                    return Some(method);
                }
            }
        }
        None
    }

    /// Look up a declared constructor by arity
    pub fn find_constructor(&self, owner: &str, arity: usize) -> Option<&ConstructorDef> {
        self.classes
            .get(owner)?
            .constructors
            .iter()
            .find(|c| c.params.len() == arity)
    }

    /// Declared type of a field, walking the hierarchy
    pub fn field_type(&self, owner: &str, field: &str) -> Option<&str> {
        if let Some(ty) = self
            .classes
            .get(owner)
            .and_then(|c| c.fields.get(field))
        {
            return Some(ty.as_str());
        }
        for parent in self.supertypes_of(owner).iter() {
            if let Some(ty) = self.classes.get(parent).and_then(|c| c.fields.get(field)) {
                return Some(ty.as_str());
            }
        }
        None
    }
}
