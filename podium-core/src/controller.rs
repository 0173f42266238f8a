// Controller trait and the boot-time controller registry

use crate::{Error, HttpResponse, context::RequestContext};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Controller namespaces. Admin controllers live in their own lookup space,
/// addressed by the configured admin directory prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    General,
    Admin,
}

/// A dispatchable controller.
///
/// `call` returns `None` when the named method does not exist on the
/// controller; the lifecycle turns that into a 404. Session and user state
/// are ambient, reachable through the context extensions, never passed as
/// method arguments.
#[async_trait]
pub trait Controller: Send + Sync {
    async fn call(
        &self,
        method: &str,
        ctx: &mut RequestContext,
    ) -> Option<Result<HttpResponse, Error>>;
}

/// Constructor for a controller, invoked once per dispatch.
pub type ControllerFactory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// Registry of controller paths, filled at boot.
///
/// Controller paths may be nested (`admin/Users`, `shop/cart/Checkout`); the
/// resolver probes the registry the way the original probed the controllers
/// directory tree: "is there anything under this prefix" before "is this a
/// controller".
#[derive(Default)]
pub struct ControllerRegistry {
    general: HashMap<String, ControllerFactory>,
    admin: HashMap<String, ControllerFactory>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller under `path` in `namespace`.
    pub fn register<F, C>(&mut self, namespace: Namespace, path: impl Into<String>, factory: F)
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        let path = path.into().trim_matches('/').to_string();
        self.map_mut(namespace).insert(
            path,
            Arc::new(move || Box::new(factory()) as Box<dyn Controller>),
        );
    }

    /// Whether `name` is a registered controller.
    pub fn contains(&self, namespace: Namespace, name: &str) -> bool {
        self.map(namespace).contains_key(name)
    }

    /// Whether any registered controller lives under `candidate/`.
    pub fn has_prefix(&self, namespace: Namespace, candidate: &str) -> bool {
        let prefix = format!("{}/", candidate.trim_end_matches('/'));
        self.map(namespace).keys().any(|key| key.starts_with(&prefix))
    }

    /// Fetch the factory for a registered controller.
    pub fn factory(&self, namespace: Namespace, name: &str) -> Option<ControllerFactory> {
        self.map(namespace).get(name).cloned()
    }

    /// Number of controllers registered in `namespace`.
    pub fn len(&self, namespace: Namespace) -> usize {
        self.map(namespace).len()
    }

    pub fn is_empty(&self, namespace: Namespace) -> bool {
        self.map(namespace).is_empty()
    }

    fn map(&self, namespace: Namespace) -> &HashMap<String, ControllerFactory> {
        match namespace {
            Namespace::General => &self.general,
            Namespace::Admin => &self.admin,
        }
    }

    fn map_mut(&mut self, namespace: Namespace) -> &mut HashMap<String, ControllerFactory> {
        match namespace {
            Namespace::General => &mut self.general,
            Namespace::Admin => &mut self.admin,
        }
    }
}
