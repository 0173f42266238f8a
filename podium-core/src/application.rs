// Application assembly: configuration, controllers and hooks wired together

use crate::controller::{Controller, ControllerRegistry, Namespace};
use crate::error::Result;
use crate::hooks::{HookConfigEntry, HookRegistry};
use crate::http::{HttpRequest, HttpResponse};
use crate::ignition::Ignition;
use crate::runtime::DispatchConfig;
use std::sync::Arc;

/// A booted application. Controllers and hooks are registered through the
/// [`PodiumAppBuilder`]; once built, the app is immutable and shareable, and
/// every call to [`handle`](Self::handle) drives a fresh lifecycle.
pub struct PodiumApp {
    config: DispatchConfig,
    controllers: Arc<ControllerRegistry>,
    hooks: Arc<HookRegistry>,
}

impl PodiumApp {
    pub fn builder(config: DispatchConfig) -> PodiumAppBuilder {
        PodiumAppBuilder {
            config,
            controllers: ControllerRegistry::new(),
            hooks: HookRegistry::new(),
            hook_entries: Vec::new(),
        }
    }

    /// Dispatch one request.
    pub async fn handle(&self, request: HttpRequest) -> HttpResponse {
        Ignition::new(
            self.config.clone(),
            self.hooks.clone(),
            self.controllers.clone(),
            request,
        )
        .play()
        .await
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }
}

/// Boot-time registration surface.
pub struct PodiumAppBuilder {
    config: DispatchConfig,
    controllers: ControllerRegistry,
    hooks: HookRegistry,
    hook_entries: Vec<HookConfigEntry>,
}

impl PodiumAppBuilder {
    /// Register a general-namespace controller.
    pub fn controller<F, C>(mut self, path: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        self.controllers.register(Namespace::General, path, factory);
        self
    }

    /// Register an admin-namespace controller.
    pub fn admin_controller<F, C>(mut self, path: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        self.controllers.register(Namespace::Admin, path, factory);
        self
    }

    /// Register a function hook target.
    pub fn hook_exec<F, Fut>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(crate::hooks::HookParams) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = bool> + Send + 'static,
    {
        self.hooks.register_exec(name, hook);
        self
    }

    /// Register an instantiable hook target.
    pub fn hook_new<F, H>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> H + Send + Sync + 'static,
        H: crate::hooks::LifecycleHook + 'static,
    {
        self.hooks.register_new(name, factory);
        self
    }

    /// Queue configured hook entries for binding at build time.
    pub fn hook_entries(mut self, entries: impl IntoIterator<Item = HookConfigEntry>) -> Self {
        self.hook_entries.extend(entries);
        self
    }

    /// Bind hooks and finish. Fails when an enabled hook entry names an
    /// unregistered target.
    pub fn build(mut self) -> Result<PodiumApp> {
        self.hooks.bind(&self.hook_entries)?;
        Ok(PodiumApp {
            config: self.config,
            controllers: Arc::new(self.controllers),
            hooks: Arc::new(self.hooks),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::error::Error;
    use crate::hooks::{HookKind, HookParams, Phase};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Welcome;

    #[async_trait]
    impl Controller for Welcome {
        async fn call(
            &self,
            method: &str,
            _ctx: &mut RequestContext,
        ) -> Option<std::result::Result<HttpResponse, Error>> {
            (method == "index").then(|| Ok(HttpResponse::ok().with_html("welcome")))
        }
    }

    #[tokio::test]
    async fn test_build_and_dispatch() {
        let app = PodiumApp::builder(DispatchConfig::default())
            .controller("welcome", || Welcome)
            .build()
            .unwrap();

        let response = app.handle(HttpRequest::get("/welcome")).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body_string(), "welcome");
    }

    #[tokio::test]
    async fn test_hooks_fire_per_request() {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = counter.clone();

        let app = PodiumApp::builder(DispatchConfig::default())
            .controller("welcome", || Welcome)
            .hook_exec("count", move |_params: HookParams| {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    true
                }
            })
            .hook_entries([HookConfigEntry {
                phase: Phase::Initial,
                kind: HookKind::Exec,
                target: "count".to_string(),
                params: HookParams::new(),
                enabled: true,
            }])
            .build()
            .unwrap();

        app.handle(HttpRequest::get("/welcome")).await;
        app.handle(HttpRequest::get("/welcome")).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unknown_enabled_hook_fails_build() {
        let result = PodiumApp::builder(DispatchConfig::default())
            .controller("welcome", || Welcome)
            .hook_entries([HookConfigEntry {
                phase: Phase::Final,
                kind: HookKind::New,
                target: "missing".to_string(),
                params: HookParams::new(),
                enabled: true,
            }])
            .build();
        assert!(result.is_err());
    }
}
