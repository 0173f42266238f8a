// Per-request context handed to controllers

use crate::http::HttpRequest;
use crate::route::Route;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Typed extension map. Carries the ambient request state (session handle,
/// authenticated user, anything the embedder attaches) without the core
/// depending on those types.
#[derive(Default)]
pub struct Extensions {
    map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast().ok())
            .map(|boxed| *boxed)
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref())
    }

    pub fn get_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.map
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut())
    }

    pub fn remove<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.map
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast().ok())
            .map(|boxed| *boxed)
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }
}

/// Everything a controller method sees for one request.
pub struct RequestContext {
    pub request: HttpRequest,
    pub route: Route,
    pub extensions: Extensions,
}

impl RequestContext {
    pub fn new(request: HttpRequest, route: Route) -> Self {
        Self {
            request,
            route,
            extensions: Extensions::new(),
        }
    }

    /// Look up a parameter, route parameters first, then request parameters.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.route.param(name).or_else(|| self.request.param(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct UserTag(&'static str);

    #[test]
    fn test_extensions_roundtrip() {
        let mut extensions = Extensions::new();
        assert!(!extensions.contains::<UserTag>());

        extensions.insert(UserTag("alice"));
        assert_eq!(extensions.get::<UserTag>(), Some(&UserTag("alice")));

        let previous = extensions.insert(UserTag("bob"));
        assert_eq!(previous, Some(UserTag("alice")));

        assert_eq!(extensions.remove::<UserTag>(), Some(UserTag("bob")));
        assert!(extensions.get::<UserTag>().is_none());
    }

    #[test]
    fn test_route_params_shadow_request_params() {
        let mut request = HttpRequest::get("/Import/show/dir/csvdata");
        request.set_param("dir", "fallback");
        request.set_param("page", "2");

        let mut route = Route::unresolved("/Import/show/dir/csvdata");
        route.params.push(("dir".to_string(), "csvdata".to_string()));

        let ctx = RequestContext::new(request, route);
        assert_eq!(ctx.param("dir"), Some("csvdata"));
        assert_eq!(ctx.param("page"), Some("2"));
        assert_eq!(ctx.param("missing"), None);
    }
}
