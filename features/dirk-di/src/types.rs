use std::{
    any::{Any, TypeId},
    fmt::{Debug, Display},
    sync::Arc,
};

/// Error type providers may fail with. Must be Send + Sync so failures can be shared.
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Containers can be shared between threads,
/// so anything injectable needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// A built value, type erased
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    pub instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub fn new<ExistingInstance: Injectable>(instance: ExistingInstance) -> Self {
        Instance {
            info: TypeInfo::of::<ExistingInstance>(),
            instance: Arc::new(instance),
        }
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }

    /// True if both handles point at the same built value
    pub fn same_as(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}
impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// Identifies a requested value: the type plus an optional qualifier.
///
/// Two bindings for the same type can coexist if their qualifiers differ.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key {
    pub type_info: TypeInfo,
    pub qualifier: Option<&'static str>,
}
impl Key {
    pub fn of<T: 'static + ?Sized>() -> Key {
        Key {
            type_info: TypeInfo::of::<T>(),
            qualifier: None,
        }
    }

    pub fn named<T: 'static + ?Sized>(qualifier: &'static str) -> Key {
        Key {
            type_info: TypeInfo::of::<T>(),
            qualifier: Some(qualifier),
        }
    }
}
impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.qualifier {
            Some(qualifier) => write!(f, "@{qualifier} {}", self.type_info),
            None => write!(f, "{}", self.type_info),
        }
    }
}

/// Lifetime class of a binding.
///
/// `Root` values live as long as the process, `Named` values live as long as
/// the child scope instance carrying the same tag.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Scope {
    Root,
    Named(&'static str),
}
impl Scope {
    pub const fn named(name: &'static str) -> Scope {
        Scope::Named(name)
    }
}
impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Root => f.write_str("Root"),
            Scope::Named(name) => f.write_str(name),
        }
    }
}

/// Information about a binding's dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyInfo {
    /// The required Key
    pub key: Key,
    /// If it is optional or required
    pub optional: bool,
}
impl DependencyInfo {
    pub fn required(key: Key) -> Self {
        DependencyInfo {
            key,
            optional: false,
        }
    }

    pub fn optional(key: Key) -> Self {
        DependencyInfo {
            key,
            optional: true,
        }
    }
}
