//! # Method Registry
//!
//! The process-wide table mapping a component's declared name to its
//! implementation factory and stub constructors. The placement layer reads
//! it to decide, per component, which stub a caller receives.
//!
//! The registry is an explicit object: construct it at startup, register
//! every component before any call traffic, then share it read-only behind
//! an `Arc`. Lookups take no locks.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::server::Server;
use crate::transport::Transport;

/// A component implementation or stub, type-erased for the registry.
///
/// The generated code on both ends of a `fn` field knows the concrete type
/// (`Arc<dyn Trait>` for the component's method surface); a mismatch is a
/// registration bug and panics on downcast.
pub type AnyHandle = Box<dyn Any + Send + Sync>;

/// Load-reporting hook passed to server stubs: (routing key, load delta).
pub type LoadFn = Arc<dyn Fn(u64, f64) + Send + Sync>;

/// Optional accessor for an implementation's configuration block.
pub type ConfigFn = fn(&(dyn Any + Send + Sync)) -> Option<&(dyn Any + Send + Sync)>;

/// Everything the runtime needs to instantiate one component and build any
/// of its three stubs. Created once at load time, immutable thereafter.
pub struct Registration {
    /// Globally unique, fully-qualified component name.
    pub name: &'static str,
    /// Method names in declaration order. The index of a name is its wire
    /// ordinal; this table is part of the component's wire contract, and a
    /// skew between caller and callee builds is not detectable at runtime.
    pub methods: &'static [&'static str],
    /// Builds a fresh implementation instance.
    pub new_impl: fn() -> AnyHandle,
    /// Accessor for the implementation's configuration, if it carries one.
    pub config: Option<ConfigFn>,
    /// Wraps an implementation in the colocated stub.
    pub local_stub: fn(AnyHandle) -> AnyHandle,
    /// Builds the remote-calling stub over a transport, on behalf of the
    /// named caller.
    pub client_stub: fn(Arc<dyn Transport>, &str) -> AnyHandle,
    /// Wraps an implementation in the callee-side dispatch adapter.
    pub server_stub: fn(AnyHandle, Option<LoadFn>) -> Arc<dyn Server>,
}

/// Registry failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A second registration arrived under an already-taken name. This is
    /// a fatal configuration error; the process has no way to pick one.
    Duplicate(&'static str),
    /// No component is registered under the requested name.
    NotFound(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(name) => write!(f, "component registered twice: {}", name),
            Self::NotFound(name) => write!(f, "component not registered: {}", name),
        }
    }
}

impl std::error::Error for RegistryError {}

/// The process-wide component table.
pub struct Registry {
    components: HashMap<&'static str, Registration>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { components: HashMap::new() }
    }

    /// Adds a component. Duplicate names are rejected.
    pub fn register(&mut self, registration: Registration) -> Result<(), RegistryError> {
        let name = registration.name;
        if self.components.contains_key(name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.components.insert(name, registration);
        Ok(())
    }

    /// Looks up a component by its declared name.
    pub fn lookup(&self, name: &str) -> Result<&Registration, RegistryError> {
        self.components
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Names of all registered components, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.components.keys().copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
