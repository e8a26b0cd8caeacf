//! # Node
//!
//! An explicit process-lifecycle object: one registry view, one caller
//! identity, and the deployed handle for each component this process can
//! call. The placement decision — local, remote, or loopback — is made
//! per component at deploy time; callers only ever see the component's
//! method surface.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ambirpc::registry::AnyHandle;
use ambirpc::registry::Registry;
use ambirpc::registry::RegistryError;
use ambirpc::transport::Transport;

use crate::loopback::Loopback;

/// Node failures.
#[derive(Debug)]
pub enum NodeError {
    /// The registry had no entry for the component.
    Registry(RegistryError),
    /// The component is registered but was never deployed on this node.
    NotDeployed(String),
    /// The deployed handle does not match the requested method surface.
    HandleType(String),
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(err) => write!(f, "registry error: {}", err),
            Self::NotDeployed(name) => write!(f, "component not deployed on this node: {}", name),
            Self::HandleType(name) => {
                write!(f, "handle type mismatch for component: {}", name)
            }
        }
    }
}

impl std::error::Error for NodeError {}

impl From<RegistryError> for NodeError {
    fn from(err: RegistryError) -> Self {
        Self::Registry(err)
    }
}

pub type Result<T> = std::result::Result<T, NodeError>;

/// One process's view of the component graph.
pub struct Node {
    registry: Arc<Registry>,
    caller: String,
    handles: HashMap<&'static str, AnyHandle>,
}

impl Node {
    /// Creates a node over a fully-populated registry.
    ///
    /// `caller` is this process's identity; it labels the method metrics of
    /// every client stub the node builds.
    pub fn new(registry: Arc<Registry>, caller: impl Into<String>) -> Self {
        Self {
            registry,
            caller: caller.into(),
            handles: HashMap::new(),
        }
    }

    /// Instantiates the component in-process behind its colocated stub.
    pub fn deploy_local(&mut self, name: &str) -> Result<()> {
        let reg = self.registry.lookup(name)?;
        let handle = (reg.local_stub)((reg.new_impl)());
        tracing::debug!(component = reg.name, placement = "local", "deployed component");
        self.handles.insert(reg.name, handle);
        Ok(())
    }

    /// Connects the component's client stub to a remote transport.
    pub fn deploy_client(&mut self, name: &str, transport: Arc<dyn Transport>) -> Result<()> {
        let reg = self.registry.lookup(name)?;
        let handle = (reg.client_stub)(transport, &self.caller);
        tracing::debug!(component = reg.name, placement = "client", "deployed component");
        self.handles.insert(reg.name, handle);
        Ok(())
    }

    /// Instantiates the component in-process, but routes every call through
    /// the full encode → dispatch → decode path over a [`Loopback`]
    /// transport.
    pub fn deploy_loopback(&mut self, name: &str) -> Result<()> {
        let reg = self.registry.lookup(name)?;
        let server = (reg.server_stub)((reg.new_impl)(), None);
        let transport = Arc::new(Loopback::new(reg.methods, server));
        let handle = (reg.client_stub)(transport, &self.caller);
        tracing::debug!(component = reg.name, placement = "loopback", "deployed component");
        self.handles.insert(reg.name, handle);
        Ok(())
    }

    /// Returns the deployed handle, typed to the component's method
    /// surface: `node.handle::<dyn MyComponent>(name)`.
    pub fn handle<T>(&self, name: &str) -> Result<Arc<T>>
    where
        T: ?Sized + 'static,
    {
        let any = self
            .handles
            .get(name)
            .ok_or_else(|| NodeError::NotDeployed(name.to_string()))?;
        any.downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| NodeError::HandleType(name.to_string()))
    }
}
