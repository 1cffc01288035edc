//! Table keys for adapter entries.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use attrbind_core::{AttributeName, TypeRef};
use serde::{Deserialize, Serialize};

/// Identifies one single-attribute adapter for a given attribute.
///
/// Two keys are equal iff both the view type and the value type match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccessorKey {
    pub view_type: TypeRef,
    pub value_type: TypeRef,
}

impl AccessorKey {
    pub fn new(view_type: TypeRef, value_type: TypeRef) -> Self {
        Self {
            view_type,
            value_type,
        }
    }
}

impl fmt::Display for AccessorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AK({}, {})", self.view_type, self.value_type)
    }
}

/// Identifies a multi-attribute adapter.
///
/// Identity is the view type plus the *set* of attributes, each paired with
/// the parameter type it binds to. The order in which the attributes were
/// declared does not matter, so `(a: int, b: String)` and `(b: String, a: int)`
/// are the same key, while `(a: int, b: String)` and `(a: long, b: String)` are not.
///
/// Deserialization rebuilds the attribute index and rejects keys whose
/// attribute and parameter lists differ in length or repeat an attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "StoredMultiKey", try_from = "StoredMultiKey")]
pub struct MultiAttributeAdapterKey {
    view_type: TypeRef,
    /// Attributes in declared (parameter) order.
    attributes: Vec<AttributeName>,
    /// Parameter types, parallel to `attributes`.
    parameter_types: Vec<TypeRef>,
    /// Attribute to position in `attributes`, sorted by attribute name.
    attribute_indices: BTreeMap<AttributeName, usize>,
}

impl MultiAttributeAdapterKey {
    /// Build a key from attributes and their positional parameter types.
    ///
    /// Attribute names are stripped. Both lists must have the same length and
    /// the attributes must be distinct; declaration validation guarantees both.
    pub fn new<S: AsRef<str>>(
        view_type: TypeRef,
        attributes: &[S],
        parameter_types: Vec<TypeRef>,
    ) -> Self {
        debug_assert_eq!(attributes.len(), parameter_types.len());
        let attributes: Vec<AttributeName> = attributes
            .iter()
            .map(|a| AttributeName::new(a.as_ref()))
            .collect();
        let attribute_indices = attributes
            .iter()
            .enumerate()
            .map(|(i, a)| (a.clone(), i))
            .collect();
        Self {
            view_type,
            attributes,
            parameter_types,
            attribute_indices,
        }
    }

    pub fn view_type(&self) -> &TypeRef {
        &self.view_type
    }

    /// Attributes in declared order.
    pub fn attributes(&self) -> &[AttributeName] {
        &self.attributes
    }

    /// Parameter types in declared order.
    pub fn parameter_types(&self) -> &[TypeRef] {
        &self.parameter_types
    }

    /// Number of attributes the adapter requires.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Position of `attribute` in the adapter's parameter list.
    pub fn index_of(&self, attribute: &AttributeName) -> Option<usize> {
        self.attribute_indices.get(attribute).copied()
    }

    /// Parameter type bound to `attribute`.
    pub fn parameter_for(&self, attribute: &AttributeName) -> Option<&TypeRef> {
        self.index_of(attribute).map(|i| &self.parameter_types[i])
    }

    /// `(attribute, parameter type)` pairs sorted by attribute name.
    pub fn sorted_bindings(&self) -> impl Iterator<Item = (&AttributeName, &TypeRef)> + '_ {
        self.attribute_indices
            .iter()
            .map(|(attribute, &i)| (attribute, &self.parameter_types[i]))
    }

    /// Whether the adapter requires `attribute`.
    pub fn requires(&self, attribute: &AttributeName) -> bool {
        self.attribute_indices.contains_key(attribute)
    }
}

// Persisted form of a multi-attribute key; the index is derived on load.
#[derive(Serialize, Deserialize)]
struct StoredMultiKey {
    view_type: TypeRef,
    attributes: Vec<AttributeName>,
    parameter_types: Vec<TypeRef>,
}

impl From<MultiAttributeAdapterKey> for StoredMultiKey {
    fn from(key: MultiAttributeAdapterKey) -> Self {
        Self {
            view_type: key.view_type,
            attributes: key.attributes,
            parameter_types: key.parameter_types,
        }
    }
}

impl TryFrom<StoredMultiKey> for MultiAttributeAdapterKey {
    type Error = String;

    fn try_from(stored: StoredMultiKey) -> Result<Self, Self::Error> {
        if stored.attributes.len() != stored.parameter_types.len() {
            return Err(format!(
                "multi-attribute key on {} has {} attribute(s) but {} parameter type(s)",
                stored.view_type,
                stored.attributes.len(),
                stored.parameter_types.len()
            ));
        }
        let mut attribute_indices = BTreeMap::new();
        for (i, attribute) in stored.attributes.iter().enumerate() {
            if attribute_indices.insert(attribute.clone(), i).is_some() {
                return Err(format!(
                    "multi-attribute key on {} repeats attribute {attribute}",
                    stored.view_type
                ));
            }
        }
        Ok(Self {
            view_type: stored.view_type,
            attributes: stored.attributes,
            parameter_types: stored.parameter_types,
            attribute_indices,
        })
    }
}

impl PartialEq for MultiAttributeAdapterKey {
    fn eq(&self, other: &Self) -> bool {
        self.view_type == other.view_type
            && self.attributes.len() == other.attributes.len()
            && self.sorted_bindings().eq(other.sorted_bindings())
    }
}

impl Eq for MultiAttributeAdapterKey {}

impl Ord for MultiAttributeAdapterKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.view_type
            .cmp(&other.view_type)
            .then_with(|| self.sorted_bindings().cmp(other.sorted_bindings()))
    }
}

impl PartialOrd for MultiAttributeAdapterKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for MultiAttributeAdapterKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.view_type.hash(state);
        for (attribute, parameter) in self.sorted_bindings() {
            attribute.hash(state);
            parameter.hash(state);
        }
    }
}

impl fmt::Display for MultiAttributeAdapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MK({}", self.view_type)?;
        for (attribute, parameter) in self.attributes.iter().zip(&self.parameter_types) {
            write!(f, ", {attribute}: {parameter}")?;
        }
        f.write_str(")")
    }
}
