//! An in-memory [`TypeModel`].
//!
//! [`StaticTypeModel`] describes a type system up front: classes with a single
//! superclass, interfaces, methods, boxing pairs and binding containers. Hosts
//! that already hold a symbol table can mirror it here; tests and benchmarks
//! use it to build small hierarchies.
//!
//! # Example
//!
//! ```
//! use attrbind_core::{StaticTypeModel, TypeModel, TypeRef};
//!
//! let mut model = StaticTypeModel::standard();
//! model.add_class("View", None).add_class("TextView", Some("View"));
//!
//! let view = TypeRef::declared("View");
//! let text_view = TypeRef::declared("TextView");
//! assert!(model.is_assignable_from(&view, &text_view));
//! assert!(model.ancestor_depth(&text_view) > model.ancestor_depth(&view));
//! ```

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{MethodInfo, PrimitiveKind, TypeModel, TypeRef};

#[derive(Debug, Clone, Default)]
struct ClassInfo {
    superclass: Option<String>,
    interfaces: Vec<String>,
    methods: Vec<MethodInfo>,
}

/// A [`TypeModel`] backed by explicit declarations.
#[derive(Debug, Clone, Default)]
pub struct StaticTypeModel {
    /// Implicit ancestor of every declared and array type.
    root: Option<String>,
    classes: FxHashMap<String, ClassInfo>,
    boxes: FxHashMap<PrimitiveKind, String>,
    containers: Vec<String>,
}

impl StaticTypeModel {
    /// An empty model with no root type and no boxing.
    pub fn new() -> Self {
        Self::default()
    }

    /// A model with an `Object` root, `Number`, `String` and the usual box types.
    pub fn standard() -> Self {
        let mut model = Self::new();
        model.root = Some("Object".to_string());
        model.add_class("Object", None);
        model.add_class("String", Some("Object"));
        model.add_class("Number", Some("Object"));
        for (kind, name, parent) in [
            (PrimitiveKind::Boolean, "Boolean", "Object"),
            (PrimitiveKind::Char, "Character", "Object"),
            (PrimitiveKind::Byte, "Byte", "Number"),
            (PrimitiveKind::Short, "Short", "Number"),
            (PrimitiveKind::Int, "Integer", "Number"),
            (PrimitiveKind::Long, "Long", "Number"),
            (PrimitiveKind::Float, "Float", "Number"),
            (PrimitiveKind::Double, "Double", "Number"),
            (PrimitiveKind::Void, "Void", "Object"),
        ] {
            model.add_class(name, Some(parent));
            model.set_box(kind, name);
        }
        model
    }

    /// Declare a class. Redeclaring keeps existing methods and interfaces.
    pub fn add_class(&mut self, name: &str, superclass: Option<&str>) -> &mut Self {
        let superclass = superclass.map(str::to_string);
        self.classes.entry(name.to_string()).or_default().superclass = superclass;
        self
    }

    /// Declare an interface (a class with no superclass).
    pub fn add_interface(&mut self, name: &str) -> &mut Self {
        self.classes.entry(name.to_string()).or_default();
        self
    }

    /// Record that `class` implements `interface`.
    pub fn add_implements(&mut self, class: &str, interface: &str) -> &mut Self {
        self.add_interface(interface);
        let info = self.classes.entry(class.to_string()).or_default();
        if !info.interfaces.iter().any(|i| i == interface) {
            info.interfaces.push(interface.to_string());
        }
        self
    }

    /// Add a method to its declaring type, declaring the type if needed.
    pub fn add_method(&mut self, method: MethodInfo) -> &mut Self {
        let owner = method.declaring_type.to_string();
        self.classes.entry(owner).or_default().methods.push(method);
        self
    }

    /// Add a public void single-parameter instance method.
    pub fn add_setter(&mut self, owner: &str, name: &str, param: TypeRef) -> &mut Self {
        self.add_method(MethodInfo::setter(TypeRef::declared(owner), name, vec![param]))
    }

    /// Pair a primitive with its box type.
    pub fn set_box(&mut self, kind: PrimitiveKind, boxed: &str) -> &mut Self {
        self.boxes.insert(kind, boxed.to_string());
        self
    }

    /// Mark a type (and its descendants) as a binding container.
    pub fn add_binding_container(&mut self, name: &str) -> &mut Self {
        self.containers.push(name.to_string());
        self
    }

    fn erased_name(name: &str) -> &str {
        match name.find('<') {
            Some(open) => &name[..open],
            None => name,
        }
    }

    fn is_root(&self, name: &str) -> bool {
        self.root.as_deref() == Some(name)
    }

    /// Every proper ancestor of `name`, nearest first.
    fn ancestors(&self, name: &str) -> Vec<String> {
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::new();
        let mut out = Vec::new();
        queue.push_back(name.to_string());
        seen.insert(name.to_string());

        while let Some(current) = queue.pop_front() {
            let Some(info) = self.classes.get(&current) else {
                continue;
            };
            for parent in info.superclass.iter().chain(info.interfaces.iter()) {
                if seen.insert(parent.clone()) {
                    out.push(parent.clone());
                    queue.push_back(parent.clone());
                }
            }
        }
        if let Some(root) = &self.root {
            if !self.is_root(name) && seen.insert(root.clone()) {
                out.push(root.clone());
            }
        }
        out
    }

    /// Longest supertype path from `name` to the root, over superclasses and
    /// interfaces alike. Cyclic declarations stop at the repeated type.
    fn longest_path(&self, name: &str, visiting: &mut FxHashSet<String>) -> usize {
        if !visiting.insert(name.to_string()) {
            return 0;
        }
        let parents = self
            .classes
            .get(name)
            .map(|info| info.superclass.iter().chain(info.interfaces.iter()))
            .into_iter()
            .flatten();
        let depth = parents
            .map(|parent| self.longest_path(parent, visiting) + 1)
            .max()
            .unwrap_or_else(|| usize::from(self.root.is_some() && !self.is_root(name)));
        visiting.remove(name);
        depth
    }
}

impl TypeModel for StaticTypeModel {
    fn is_assignable_from(&self, target: &TypeRef, source: &TypeRef) -> bool {
        let target = self.erasure(target);
        let source = self.erasure(source);
        if target == source {
            return true;
        }
        match (&target, &source) {
            (TypeRef::Primitive(_), _) | (_, TypeRef::Primitive(_)) => false,
            (TypeRef::Declared(t), _) if self.is_root(t) => true,
            (TypeRef::Array(t), TypeRef::Array(s)) => {
                if t.is_primitive() || s.is_primitive() {
                    t == s
                } else {
                    self.is_assignable_from(t, s)
                }
            }
            (TypeRef::Declared(t), TypeRef::Declared(s)) => self.ancestors(s).iter().any(|a| a == t),
            _ => false,
        }
    }

    fn boxed(&self, ty: &TypeRef) -> TypeRef {
        match ty {
            TypeRef::Primitive(kind) => match self.boxes.get(kind) {
                Some(name) => TypeRef::declared(name.clone()),
                None => ty.clone(),
            },
            _ => ty.clone(),
        }
    }

    fn ancestor_depth(&self, ty: &TypeRef) -> usize {
        match self.erasure(ty) {
            TypeRef::Primitive(_) => 0,
            TypeRef::Array(_) => usize::from(self.root.is_some()),
            TypeRef::Declared(name) => self.longest_path(&name, &mut FxHashSet::default()),
        }
    }

    fn methods(&self, owner: &TypeRef, name: &str, arity: usize) -> Vec<MethodInfo> {
        let TypeRef::Declared(owner) = self.erasure(owner) else {
            return Vec::new();
        };
        let mut found: Vec<MethodInfo> = Vec::new();
        for class in std::iter::once(owner.clone()).chain(self.ancestors(&owner)) {
            let Some(info) = self.classes.get(&class) else {
                continue;
            };
            for method in &info.methods {
                if method.name != name || method.params.len() != arity {
                    continue;
                }
                let overridden = found
                    .iter()
                    .any(|m| m.name == method.name && m.params == method.params);
                if !overridden {
                    found.push(method.clone());
                }
            }
        }
        found
    }

    fn is_binding_container(&self, ty: &TypeRef) -> bool {
        self.containers
            .iter()
            .any(|c| self.is_assignable_from(&TypeRef::declared(c.clone()), ty))
    }

    fn erasure(&self, ty: &TypeRef) -> TypeRef {
        match ty {
            TypeRef::Declared(name) => TypeRef::declared(Self::erased_name(name)),
            TypeRef::Array(element) => TypeRef::array_of(self.erasure(element)),
            TypeRef::Primitive(_) => ty.clone(),
        }
    }
}
