//! Type model for Java semantic queries.
//!
//! Types answer identity, primitive-tag, and subtype questions; anything the
//! resolver could not pin down is `Unknown` and answers no to everything.

use std::fmt;

use crate::classpath::ClasspathIndex;

/// The tagged primitive categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTag {
    Int,
    Boolean,
    Byte,
    Double,
    Float,
    Long,
    Short,
}

impl PrimitiveTag {
    /// The reserved Java name for this primitive
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveTag::Int => "int",
            PrimitiveTag::Boolean => "boolean",
            PrimitiveTag::Byte => "byte",
            PrimitiveTag::Double => "double",
            PrimitiveTag::Float => "float",
            PrimitiveTag::Long => "long",
            PrimitiveTag::Short => "short",
        }
    }

    /// Parse a reserved primitive name
    pub fn from_name(name: &str) -> Option<PrimitiveTag> {
        match name {
            "int" => Some(PrimitiveTag::Int),
            "boolean" => Some(PrimitiveTag::Boolean),
            "byte" => Some(PrimitiveTag::Byte),
            "double" => Some(PrimitiveTag::Double),
            "float" => Some(PrimitiveTag::Float),
            "long" => Some(PrimitiveTag::Long),
            "short" => Some(PrimitiveTag::Short),
            _ => None,
        }
    }
}

/// Represents a resolved Java type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    Primitive(PrimitiveTag),
    /// Reference type, identified by fully qualified name
    Class(String),
    /// Unknown type (for fail-open recovery)
    Unknown,
}

impl JavaType {
    /// Reference type from a fully qualified name
    pub fn class(name: impl Into<String>) -> Self {
        JavaType::Class(name.into())
    }

    /// The `java.lang.String` type
    pub fn string() -> Self {
        JavaType::Class("java.lang.String".to_string())
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, JavaType::Primitive(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, JavaType::Unknown)
    }

    /// The primitive tag, if any
    pub fn tag(&self) -> Option<PrimitiveTag> {
        match self {
            JavaType::Primitive(tag) => Some(*tag),
            _ => None,
        }
    }

    /// True only for primitives whose tag matches
    pub fn is_tagged(&self, tag: PrimitiveTag) -> bool {
        self.tag() == Some(tag)
    }

    /// Exact identity check. Primitives are addressed by their reserved
    /// names, reference types by fully qualified name. `Unknown` never
    /// matches anything.
    pub fn is(&self, name: &str) -> bool {
        match self {
            JavaType::Primitive(tag) => tag.name() == name,
            JavaType::Class(fqn) => fqn == name,
            JavaType::Unknown => false,
        }
    }

    /// True if the declared hierarchy (direct and transitive superclasses
    /// and interfaces) contains `name`. Reflexive for reference types; a
    /// primitive only matches its own reserved name; `Unknown` matches
    /// nothing.
    pub fn is_subtype_of(&self, name: &str, index: &ClasspathIndex) -> bool {
        match self {
            JavaType::Primitive(tag) => tag.name() == name,
            JavaType::Class(fqn) => fqn == name || index.supertypes_of(fqn).contains(name),
            JavaType::Unknown => false,
        }
    }

    /// Source-level name of the type
    pub fn type_name(&self) -> &str {
        match self {
            JavaType::Primitive(tag) => tag.name(),
            JavaType::Class(fqn) => fqn.as_str(),
            JavaType::Unknown => "?",
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TAGS: [PrimitiveTag; 7] = [
        PrimitiveTag::Int,
        PrimitiveTag::Boolean,
        PrimitiveTag::Byte,
        PrimitiveTag::Double,
        PrimitiveTag::Float,
        PrimitiveTag::Long,
        PrimitiveTag::Short,
    ];

    fn index() -> ClasspathIndex {
        let toml = include_str!("../../../classpath-definitions/java.core.toml");
        ClasspathIndex::load_from_str(toml).expect("should parse")
    }

    #[test]
    fn test_primitive_tag_names_round_trip() {
        for tag in ALL_TAGS {
            assert_eq!(PrimitiveTag::from_name(tag.name()), Some(tag));
        }
        assert_eq!(PrimitiveTag::from_name("char"), None);
        assert_eq!(PrimitiveTag::from_name("String"), None);
    }

    #[test]
    fn test_primitive_tag_exclusivity() {
        for tag in ALL_TAGS {
            let ty = JavaType::Primitive(tag);
            let matching: Vec<_> = ALL_TAGS.iter().filter(|t| ty.is_tagged(**t)).collect();
            assert_eq!(matching, vec![&tag]);
        }
    }

    #[test]
    fn test_is_exact_identity() {
        assert!(JavaType::Primitive(PrimitiveTag::Int).is("int"));
        assert!(!JavaType::Primitive(PrimitiveTag::Int).is("long"));
        assert!(JavaType::string().is("java.lang.String"));
        assert!(!JavaType::string().is("String"));
        assert!(!JavaType::Unknown.is("java.lang.String"));
        assert!(!JavaType::Unknown.is("int"));
    }

    #[test]
    fn test_subtype_reflexive() {
        let idx = index();
        let integer = JavaType::class("java.lang.Integer");
        assert!(integer.is_subtype_of("java.lang.Integer", &idx));

        // Reflexivity holds even for classes the index does not know
        let foreign = JavaType::class("com.example.Foo");
        assert!(foreign.is_subtype_of("com.example.Foo", &idx));
    }

    #[test]
    fn test_subtype_transitive() {
        let idx = index();
        let lock = JavaType::class("java.util.concurrent.locks.ReentrantLock");
        assert!(lock.is_subtype_of("java.util.concurrent.locks.Lock", &idx));

        // Integer -> Number -> Object
        let integer = JavaType::class("java.lang.Integer");
        assert!(integer.is_subtype_of("java.lang.Number", &idx));
        assert!(integer.is_subtype_of("java.lang.Object", &idx));
        assert!(integer.is_subtype_of("java.lang.Comparable", &idx));
    }

    #[test]
    fn test_primitives_never_subtype_reference_names() {
        let idx = index();
        for tag in ALL_TAGS {
            let ty = JavaType::Primitive(tag);
            assert!(!ty.is_subtype_of("java.lang.Object", &idx));
            assert!(!ty.is_subtype_of("java.lang.Number", &idx));
            // ...but each primitive denotes itself
            assert!(ty.is_subtype_of(tag.name(), &idx));
        }
    }

    #[test]
    fn test_unknown_fails_open() {
        let idx = index();
        assert!(!JavaType::Unknown.is_subtype_of("java.lang.Object", &idx));
        assert!(!JavaType::Unknown.is_primitive());
        assert!(JavaType::Unknown.tag().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", JavaType::Primitive(PrimitiveTag::Long)), "long");
        assert_eq!(format!("{}", JavaType::string()), "java.lang.String");
        assert_eq!(format!("{}", JavaType::Unknown), "?");
    }
}
