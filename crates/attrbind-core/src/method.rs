//! Method identities and reflected method signatures.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::TypeRef;

/// Lowest platform version a generated call can require.
pub const MIN_PLATFORM_VERSION: u32 = 1;

/// Identity of a method: its declaring type and simple name.
///
/// Registry tables store these as values; the declaring type doubles as the
/// owner used by incremental invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Type that declares the method.
    pub declaring_type: TypeRef,
    /// Simple method name.
    pub method_name: String,
}

impl MethodDescriptor {
    pub fn new(declaring_type: TypeRef, method_name: impl Into<String>) -> Self {
        Self {
            declaring_type,
            method_name: method_name.into(),
        }
    }

    /// `Type.method` as it appears in a static call.
    pub fn qualified_call_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.method_name)
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}()", self.declaring_type, self.method_name)
    }
}

bitflags! {
    /// Declaration modifiers relevant to registration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MethodModifiers: u8 {
        const PUBLIC = 1 << 0;
        const STATIC = 1 << 1;
    }
}

/// A reflected method signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub declaring_type: TypeRef,
    pub name: String,
    pub params: Vec<TypeRef>,
    /// `None` for `void` methods.
    pub return_type: Option<TypeRef>,
    pub modifiers: MethodModifiers,
    /// Minimum platform version that provides this method.
    pub min_api: u32,
}

impl MethodInfo {
    /// A public instance method returning `void`.
    pub fn setter(declaring_type: TypeRef, name: impl Into<String>, params: Vec<TypeRef>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            params,
            return_type: None,
            modifiers: MethodModifiers::PUBLIC,
            min_api: MIN_PLATFORM_VERSION,
        }
    }

    /// Set the minimum platform version.
    pub fn with_min_api(mut self, min_api: u32) -> Self {
        self.min_api = min_api;
        self
    }

    pub fn is_void(&self) -> bool {
        self.return_type.as_ref().is_none_or(TypeRef::is_void)
    }

    pub fn is_public(&self) -> bool {
        self.modifiers.contains(MethodModifiers::PUBLIC)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(MethodModifiers::STATIC)
    }

    pub fn descriptor(&self) -> MethodDescriptor {
        MethodDescriptor::new(self.declaring_type.clone(), self.name.clone())
    }
}
