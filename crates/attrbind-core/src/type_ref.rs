//! Opaque type identifiers.
//!
//! A [`TypeRef`] names a type of the host type system without knowing anything
//! about it beyond its shape: a primitive, an array of some element type, or a
//! declared (class/interface) type identified by its fully-qualified name.
//! Everything else (ancestry, boxing, methods) is answered by a
//! [`TypeModel`](crate::TypeModel).

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Primitive kinds understood by the resolver.
///
/// Numeric kinds are ordered on the implicit widening ladder
/// `byte < char < short < int < long < float < double`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveKind {
    /// All primitive kinds, in declaration order.
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Void,
    ];

    /// The source-level keyword for this primitive.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Void => "void",
        }
    }

    /// Look up a primitive by its keyword.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Position on the widening ladder, `None` for `boolean` and `void`.
    pub fn widening_level(self) -> Option<u8> {
        match self {
            PrimitiveKind::Byte => Some(0),
            PrimitiveKind::Char => Some(1),
            PrimitiveKind::Short => Some(2),
            PrimitiveKind::Int => Some(3),
            PrimitiveKind::Long => Some(4),
            PrimitiveKind::Float => Some(5),
            PrimitiveKind::Double => Some(6),
            PrimitiveKind::Boolean | PrimitiveKind::Void => None,
        }
    }

    /// Distance of an implicit widening from `self` to `target`.
    ///
    /// Returns `None` when no implicit widening exists. Nothing widens into
    /// `char`, and `boolean` never participates.
    pub fn widening_distance(self, target: PrimitiveKind) -> Option<u8> {
        if target == PrimitiveKind::Char {
            return None;
        }
        let from = self.widening_level()?;
        let to = target.widening_level()?;
        (from < to).then(|| to - from)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fully-qualified identifier of a host type.
///
/// # Examples
///
/// ```
/// use attrbind_core::{PrimitiveKind, TypeRef};
///
/// let ty = TypeRef::parse("int[]");
/// assert_eq!(ty, TypeRef::array_of(TypeRef::Primitive(PrimitiveKind::Int)));
/// assert_eq!(ty.to_string(), "int[]");
///
/// let view = TypeRef::declared("android.widget.TextView");
/// assert!(view.is_object());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeRef {
    /// A primitive value type.
    Primitive(PrimitiveKind),
    /// An array; the element type is itself a `TypeRef`.
    Array(Box<TypeRef>),
    /// A declared class or interface, by qualified name.
    Declared(String),
}

impl TypeRef {
    /// A declared type by qualified name.
    pub fn declared(name: impl Into<String>) -> Self {
        TypeRef::Declared(name.into())
    }

    /// An array of `element`.
    pub fn array_of(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    /// Parse the textual form produced by `Display`.
    ///
    /// Trailing `[]` pairs become array levels, primitive keywords become
    /// primitives, and anything else is a declared name.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(element) = text.strip_suffix("[]") {
            return TypeRef::array_of(TypeRef::parse(element));
        }
        match PrimitiveKind::from_name(text) {
            Some(kind) => TypeRef::Primitive(kind),
            None => TypeRef::Declared(text.to_string()),
        }
    }

    /// Whether this is a primitive (including `void`).
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }

    /// Whether values of this type are object references.
    pub fn is_object(&self) -> bool {
        !self.is_primitive()
    }

    /// Whether this is `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Primitive(PrimitiveKind::Void))
    }

    /// The primitive kind, if any.
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            TypeRef::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// The element type of an array.
    pub fn element_type(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Array(element) => Some(element),
            _ => None,
        }
    }

    /// The declared name, if this is a declared type.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            TypeRef::Declared(name) => Some(name),
            _ => None,
        }
    }

    /// Rewrite short declared names through the given import aliases.
    ///
    /// Array element types are rewritten recursively; primitives and names
    /// with no alias are returned unchanged.
    pub fn with_imports(&self, imports: &FxHashMap<String, String>) -> TypeRef {
        match self {
            TypeRef::Declared(name) => match imports.get(name) {
                Some(qualified) => TypeRef::Declared(qualified.clone()),
                None => self.clone(),
            },
            TypeRef::Array(element) => TypeRef::array_of(element.with_imports(imports)),
            TypeRef::Primitive(_) => self.clone(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(kind) => write!(f, "{kind}"),
            TypeRef::Array(element) => write!(f, "{element}[]"),
            TypeRef::Declared(name) => f.write_str(name),
        }
    }
}

impl From<PrimitiveKind> for TypeRef {
    fn from(kind: PrimitiveKind) -> Self {
        TypeRef::Primitive(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_agree() {
        for text in ["int", "boolean", "java.lang.String", "byte[][]", "Foo[]"] {
            assert_eq!(TypeRef::parse(text).to_string(), text);
        }
    }

    #[test]
    fn widening_ladder() {
        assert_eq!(PrimitiveKind::Int.widening_distance(PrimitiveKind::Long), Some(1));
        assert_eq!(PrimitiveKind::Byte.widening_distance(PrimitiveKind::Double), Some(6));
        assert_eq!(PrimitiveKind::Long.widening_distance(PrimitiveKind::Int), None);
        assert_eq!(PrimitiveKind::Byte.widening_distance(PrimitiveKind::Char), None);
        assert_eq!(PrimitiveKind::Boolean.widening_distance(PrimitiveKind::Int), None);
        assert_eq!(PrimitiveKind::Int.widening_distance(PrimitiveKind::Int), None);
    }

    #[test]
    fn imports_rewrite_short_names() {
        let mut imports = FxHashMap::default();
        imports.insert("Drawable".to_string(), "android.graphics.Drawable".to_string());

        let ty = TypeRef::parse("Drawable[]").with_imports(&imports);
        assert_eq!(ty.to_string(), "android.graphics.Drawable[]");
        assert_eq!(
            TypeRef::parse("int").with_imports(&imports),
            TypeRef::Primitive(PrimitiveKind::Int)
        );
    }
}
