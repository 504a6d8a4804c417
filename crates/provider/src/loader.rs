// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-process object loader backing `python:` locators
//!
//! Modules are registered as initializers (dotted module path -> function
//! building a [`Namespace`]). A module is built on first use and cached;
//! `reload` evicts the cached namespace and runs the initializer again.
//! Initializers run outside the cache lock, so concurrent reloads of the
//! same module are last-writer-wins.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

pub type Object = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
pub enum Member {
    Value(Object),
    Namespace(Arc<Namespace>),
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Value(_) => f.write_str("Value(..)"),
            Member::Namespace(ns) => f.debug_tuple("Namespace").field(ns).finish(),
        }
    }
}

/// Named members of a module or nested namespace
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    members: BTreeMap<String, Member>,
}

impl Namespace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value<T: Any + Send + Sync>(mut self, name: &str, value: T) -> Self {
        self.insert(name, Member::Value(Arc::new(value)));
        self
    }

    #[must_use]
    pub fn with_namespace(mut self, name: &str, namespace: Namespace) -> Self {
        self.insert(name, Member::Namespace(Arc::new(namespace)));
        self
    }

    pub fn insert(&mut self, name: &str, member: Member) {
        let _ = self.members.insert(name.to_string(), member);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }
}

/// An object resolved from a dotted path
#[derive(Clone)]
pub struct LoadedObject {
    path: String,
    object: Object,
}

impl LoadedObject {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn object(&self) -> &Object {
        &self.object
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object.downcast_ref::<T>()
    }

    /// The object is a module or nested namespace
    #[must_use]
    pub fn as_namespace(&self) -> Option<&Namespace> {
        self.downcast_ref::<Namespace>()
    }
}

impl fmt::Debug for LoadedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedObject")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl PartialEq for LoadedObject {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && Arc::ptr_eq(&self.object, &other.object)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    #[error("no module registered for '{0}'")]
    ModuleNotFound(String),

    #[error("module '{module}' has no attribute '{attribute}'")]
    AttributeNotFound { module: String, attribute: String },
}

type Initializer = Arc<dyn Fn() -> Namespace + Send + Sync>;

#[derive(Default)]
pub struct ObjectLoader {
    modules: RwLock<HashMap<String, Initializer>>,
    cache: Mutex<HashMap<String, Arc<Namespace>>>,
}

impl fmt::Debug for ObjectLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut modules: Vec<String> = self
            .modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        modules.sort();
        f.debug_struct("ObjectLoader")
            .field("modules", &modules)
            .finish_non_exhaustive()
    }
}

impl ObjectLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the initializer for a dotted module path.
    /// Replacing drops any cached namespace.
    pub fn register_module<F>(&self, module: &str, init: F)
    where
        F: Fn() -> Namespace + Send + Sync + 'static,
    {
        let _ = self
            .modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(module.to_string(), Arc::new(init));
        let _ = self.evict(module);
    }

    #[must_use]
    pub fn is_registered(&self, module: &str) -> bool {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(module)
    }

    #[must_use]
    pub fn is_loaded(&self, module: &str) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(module)
    }

    /// Drop a cached module; true if it was loaded
    pub fn evict(&self, module: &str) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(module)
            .is_some()
    }

    /// Namespace of `module`, building it if needed
    pub fn load(&self, module: &str, reload: bool) -> Result<Arc<Namespace>, LocateError> {
        if reload {
            let _ = self.evict(module);
        } else if let Some(ns) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(module)
        {
            return Ok(ns.clone());
        }

        let init = self
            .modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(module)
            .cloned()
            .ok_or_else(|| LocateError::ModuleNotFound(module.to_string()))?;

        let built = Arc::new(init());
        diagnostics::debug!("loaded module {module}", module: module, reload: reload);

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if reload {
            let _ = cache.insert(module.to_string(), built.clone());
            Ok(built)
        } else {
            Ok(cache.entry(module.to_string()).or_insert(built).clone())
        }
    }

    /// Resolve `a.b.c`: the longest registered module prefix, then the
    /// remaining attribute chain.
    pub fn locate(&self, dotted: &str, reload: bool) -> Result<LoadedObject, LocateError> {
        let segments: Vec<&str> = dotted.split('.').collect();
        let split = (1..=segments.len())
            .rev()
            .find(|k| self.is_registered(&segments[..*k].join(".")))
            .ok_or_else(|| LocateError::ModuleNotFound(dotted.to_string()))?;

        let module = segments[..split].join(".");
        let namespace = self.load(&module, reload)?;

        let mut current = Member::Namespace(namespace);
        for attribute in &segments[split..] {
            let next = match &current {
                Member::Namespace(ns) => ns.get(attribute).cloned(),
                Member::Value(_) => None,
            };
            current = next.ok_or_else(|| LocateError::AttributeNotFound {
                module: module.clone(),
                attribute: (*attribute).to_string(),
            })?;
        }

        let object: Object = match current {
            Member::Value(value) => value,
            Member::Namespace(ns) => ns as Object,
        };
        Ok(LoadedObject {
            path: dotted.to_string(),
            object,
        })
    }
}
