// Path resolution: mapping a request path to a controller, method and parameters

use crate::controller::{ControllerRegistry, Namespace};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Method used when the path names none.
pub const DEFAULT_METHOD: &str = "index";

/// A resolved route. Built once per request and immutable afterwards; only
/// [`PathResolver::reset`] discards it and re-runs resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// The raw service path the route was resolved from.
    pub raw_path: String,
    /// Whether the admin namespace was addressed.
    pub is_admin: bool,
    /// Registered controller path; empty when resolution found nothing.
    pub controller: String,
    /// Method name, `index` unless the path supplied one.
    pub method: String,
    /// Key/value parameters in path order.
    pub params: Vec<(String, String)>,
}

impl Route {
    /// An empty route for `raw_path`, before or in lieu of resolution.
    pub fn unresolved(raw_path: impl Into<String>) -> Self {
        Self {
            raw_path: raw_path.into(),
            is_admin: false,
            controller: String::new(),
            method: DEFAULT_METHOD.to_string(),
            params: Vec::new(),
        }
    }

    /// Look up a route parameter by key.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The namespace this route dispatches into.
    pub fn namespace(&self) -> Namespace {
        if self.is_admin {
            Namespace::Admin
        } else {
            Namespace::General
        }
    }
}

/// Deterministic path resolver.
///
/// Walks the path segments left to right, accumulating a candidate controller
/// name and probing the controller registry: descend while anything is
/// registered under the candidate prefix, stop at the first exact match. The
/// remainder of the path supplies the method name (odd segment count) and
/// key/value parameters. Resolution is total: it never fails, and an
/// unresolvable path is reported through [`is_illegal_controller`]
/// (Self::is_illegal_controller) instead. The result is memoized until
/// `reset`.
pub struct PathResolver {
    registry: Arc<ControllerRegistry>,
    admin_dir: String,
    public_path: PathBuf,
    service: String,
    route: Option<Route>,
    accumulated: String,
    non_defined: bool,
}

impl PathResolver {
    pub fn new(
        registry: Arc<ControllerRegistry>,
        admin_dir: impl Into<String>,
        public_path: impl Into<PathBuf>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            admin_dir: admin_dir.into(),
            public_path: public_path.into(),
            service: service.into(),
            route: None,
            accumulated: String::new(),
            non_defined: false,
        }
    }

    /// The raw service path under resolution.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Resolve (memoized) and borrow the route.
    pub fn resolve(&mut self) -> &Route {
        if self.route.is_none() {
            let route = self.run_resolution();
            self.route = Some(route);
        }
        self.route.as_ref().expect("route just resolved")
    }

    /// Resolve and clone the route.
    pub fn route(&mut self) -> Route {
        self.resolve().clone()
    }

    /// Resolved controller name, empty when nothing matched.
    pub fn controller_name(&mut self) -> String {
        self.resolve().controller.trim_end_matches('/').to_string()
    }

    /// Resolved method name.
    pub fn method_name(&mut self) -> String {
        self.resolve().method.clone()
    }

    /// Whether the admin namespace was addressed.
    pub fn is_admin(&mut self) -> bool {
        self.resolve().is_admin
    }

    /// Whether the path walked off the registry without a match. Root paths
    /// (`/` and the admin root) are not illegal, they simply resolve empty.
    pub fn is_illegal_controller(&mut self) -> bool {
        self.resolve();
        self.non_defined && !self.accumulated.is_empty()
    }

    /// Discard any prior resolution and re-resolve from `uri`.
    /// Returns the newly resolved controller name.
    pub fn reset(&mut self, uri: &str) -> String {
        self.route = None;
        self.accumulated.clear();
        self.non_defined = false;
        self.service = format!("/{}", uri.trim_start_matches('/'));
        self.controller_name()
    }

    /// Path of a static `.html`/`.htm` document under the public root that
    /// matches the unresolved path, if one exists. Consulted as the 404
    /// fallback for illegal controllers.
    pub fn html_fallback(&mut self) -> Option<PathBuf> {
        self.resolve();
        let candidate = self.accumulated.trim_end_matches('/').to_string();
        let extension = Path::new(&candidate).extension()?.to_str()?.to_lowercase();
        if extension != "html" && extension != "htm" {
            return None;
        }
        let file = self.public_path.join(&candidate);
        if file.is_file() { Some(file) } else { None }
    }

    fn run_resolution(&mut self) -> Route {
        let mut route = Route::unresolved(&self.service);

        // Admin root with no controller: flag the namespace, leave the
        // controller to the caller's configured default.
        if self.service == format!("/{}/", self.admin_dir) {
            route.is_admin = true;
            return route;
        }
        // General root: same, without the flag.
        if self.service == "/" {
            return route;
        }

        let trimmed = self.service.trim_start_matches('/').to_string();
        let mut namespace = Namespace::General;
        let mut name = String::new();
        for (i, segment) in trimmed.split('/').enumerate() {
            name.push_str(segment);
            // A leading admin marker switches the lookup namespace and is not
            // part of the controller name.
            if i == 0 && segment == self.admin_dir {
                route.is_admin = true;
                namespace = Namespace::Admin;
                name.clear();
                continue;
            }
            if !self.registry.has_prefix(namespace, &name)
                && self.registry.contains(namespace, &name)
            {
                route.controller = name.clone();
                self.accumulated = name;
                self.split_method_and_params(&mut route);
                return route;
            }
            name.push('/');
        }

        self.accumulated = name;
        self.non_defined = true;
        route
    }

    /// Split the path remainder after the controller into method name and
    /// key/value pairs. Odd segment count: first segment is the method. Even
    /// count: method stays `index` and everything pairs up.
    fn split_method_and_params(&self, route: &mut Route) {
        let prefix = if route.is_admin {
            format!("/{}/{}", self.admin_dir, route.controller)
        } else {
            format!("/{}", route.controller)
        };
        let remainder = self
            .service
            .strip_prefix(&prefix)
            .unwrap_or("")
            .trim_start_matches('/');
        if remainder.is_empty() {
            return;
        }
        let work: Vec<&str> = remainder.split('/').collect();
        // A bare trailing slash resolves to no method and no parameters.
        if work[0].is_empty() {
            return;
        }
        let mut index = 0;
        if work.len() % 2 == 1 {
            route.method = work[0].to_string();
            index = 1;
        }
        for pair in work[index..].chunks(2) {
            match pair {
                [key, value] => route.params.push((key.to_string(), value.to_string())),
                [key] => {
                    // A key without a value cannot pair up; it is dropped, as
                    // the route grammar promises pairs. Surfaced rather than
                    // silent.
                    log::warn!(
                        "dropping dangling route parameter {key:?} in {}",
                        self.service
                    );
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Controller;
    use crate::http::HttpResponse;
    use crate::{Error, RequestContext};
    use async_trait::async_trait;

    struct NullController;

    #[async_trait]
    impl Controller for NullController {
        async fn call(
            &self,
            _method: &str,
            _ctx: &mut RequestContext,
        ) -> Option<Result<HttpResponse, Error>> {
            Some(Ok(HttpResponse::ok()))
        }
    }

    fn registry() -> Arc<ControllerRegistry> {
        let mut registry = ControllerRegistry::new();
        registry.register(Namespace::General, "Import", || NullController);
        registry.register(Namespace::General, "welcome", || NullController);
        registry.register(Namespace::General, "shop/cart/Checkout", || NullController);
        registry.register(Namespace::Admin, "Users", || NullController);
        registry.register(Namespace::Admin, "Top", || NullController);
        Arc::new(registry)
    }

    fn make_resolver(service: &str) -> PathResolver {
        PathResolver::new(registry(), "pwfadmin", "public", service)
    }

    #[test]
    fn test_method_and_single_param() {
        let mut resolver = make_resolver("/Import/show/dir/csvdata");
        let route = resolver.route();
        assert_eq!(route.controller, "Import");
        assert_eq!(route.method, "show");
        assert_eq!(route.params, vec![("dir".to_string(), "csvdata".to_string())]);
        assert!(!route.is_admin);
    }

    #[test]
    fn test_admin_controller_with_method() {
        let mut resolver = make_resolver("/pwfadmin/Users/list");
        assert_eq!(resolver.controller_name(), "Users");
        assert_eq!(resolver.method_name(), "list");
        assert!(resolver.is_admin());
        assert!(resolver.route().params.is_empty());
    }

    #[test]
    fn test_even_segments_keep_default_method() {
        let mut resolver = make_resolver("/Import/dir/csvdata");
        let route = resolver.route();
        assert_eq!(route.method, DEFAULT_METHOD);
        assert_eq!(route.param("dir"), Some("csvdata"));
    }

    #[test]
    fn test_bare_controller_defaults() {
        let mut resolver = make_resolver("/Import");
        let route = resolver.route();
        assert_eq!(route.controller, "Import");
        assert_eq!(route.method, DEFAULT_METHOD);
        assert!(route.params.is_empty());
    }

    #[test]
    fn test_trailing_slash_is_no_method_no_params() {
        let mut resolver = make_resolver("/Import/");
        let route = resolver.route();
        assert_eq!(route.controller, "Import");
        assert_eq!(route.method, DEFAULT_METHOD);
        assert!(route.params.is_empty());
    }

    #[test]
    fn test_nested_controller_longest_prefix() {
        let mut resolver = make_resolver("/shop/cart/Checkout/pay/amount/10");
        let route = resolver.route();
        assert_eq!(route.controller, "shop/cart/Checkout");
        assert_eq!(route.method, "pay");
        assert_eq!(route.param("amount"), Some("10"));
    }

    #[test]
    fn test_unresolvable_path_is_illegal() {
        let mut resolver = make_resolver("/NoSuchThing");
        assert_eq!(resolver.controller_name(), "");
        assert!(resolver.is_illegal_controller());
    }

    #[test]
    fn test_roots_are_not_illegal() {
        let mut resolver = make_resolver("/");
        assert_eq!(resolver.controller_name(), "");
        assert!(!resolver.is_illegal_controller());
        assert!(!resolver.is_admin());

        let mut resolver = make_resolver("/pwfadmin/");
        assert_eq!(resolver.controller_name(), "");
        assert!(!resolver.is_illegal_controller());
        assert!(resolver.is_admin());
    }

    #[test]
    fn test_resolution_is_memoized() {
        let mut resolver = make_resolver("/Import/show/dir/csvdata");
        let first = resolver.route();
        let second = resolver.route();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_reruns_resolution() {
        let mut resolver = make_resolver("/NoSuchThing");
        assert!(resolver.is_illegal_controller());

        let controller = resolver.reset("welcome");
        assert_eq!(controller, "welcome");
        assert!(!resolver.is_illegal_controller());
        let route = resolver.route();
        assert_eq!(route.method, DEFAULT_METHOD);
        assert!(route.params.is_empty());
    }

    #[test]
    fn test_dangling_parameter_is_dropped() {
        // Method consumes the first of four segments, leaving an unmatched
        // trailing key which does not survive resolution.
        let mut resolver = make_resolver("/Import/dir/csvdata/extra");
        let route = resolver.route();
        assert_eq!(route.method, "dir");
        assert_eq!(route.params, vec![("csvdata".to_string(), "extra".to_string())]);

        let mut resolver = make_resolver("/Import/show/dir/csvdata/extra/x/y");
        let route = resolver.route();
        assert_eq!(route.method, "show");
        assert_eq!(route.params.len(), 3);
    }

    #[test]
    fn test_html_fallback_requires_extension() {
        let mut resolver = make_resolver("/NoSuchThing");
        resolver.resolve();
        assert!(resolver.html_fallback().is_none());
    }

    #[test]
    fn test_html_fallback_streams_existing_file() {
        let dir = std::env::temp_dir().join(format!("podium-route-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("pages")).unwrap();
        std::fs::write(dir.join("pages/about.html"), "<h1>about</h1>").unwrap();

        let mut resolver =
            PathResolver::new(registry(), "pwfadmin", &dir, "/pages/about.html");
        assert!(resolver.is_illegal_controller());
        let file = resolver.html_fallback().expect("static fallback");
        assert!(file.ends_with("pages/about.html"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
