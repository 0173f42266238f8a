// Five-phase request lifecycle driver

use crate::context::RequestContext;
use crate::controller::ControllerRegistry;
use crate::error::{Error, Result};
use crate::hooks::{HookRegistry, Phase};
use crate::http::{HttpRequest, HttpResponse};
use crate::route::PathResolver;
use crate::runtime::DispatchConfig;
use podium_log::{LogChannel, LogWriter};
use std::sync::Arc;

/// Drives one request through the five lifecycle phases.
///
/// An `Ignition` is built per request and consumed by [`play`](Self::play).
/// Phases run in order, fail-stop: a failure renders the error and later
/// phases do not run. Log writers flush on drop, so a stopped request still
/// keeps its access log.
pub struct Ignition {
    config: DispatchConfig,
    hooks: Arc<HookRegistry>,
    controllers: Arc<ControllerRegistry>,
    resolver: PathResolver,
    request: Option<HttpRequest>,
    access_log: Option<LogWriter>,
    sql_log: Option<LogWriter>,
}

impl Ignition {
    pub fn new(
        config: DispatchConfig,
        hooks: Arc<HookRegistry>,
        controllers: Arc<ControllerRegistry>,
        request: HttpRequest,
    ) -> Self {
        let resolver = PathResolver::new(
            controllers.clone(),
            config.admin_dir.clone(),
            config.public_path.clone(),
            request.path.clone(),
        );
        Self {
            config,
            hooks,
            controllers,
            resolver,
            request: Some(request),
            access_log: None,
            sql_log: None,
        }
    }

    /// Run the lifecycle to completion and render a response.
    pub async fn play(mut self) -> HttpResponse {
        match self.run().await {
            Ok(response) => response,
            Err(error) => {
                log::debug!("request failed: {error}");
                self.error_response(&error).await
            }
        }
    }

    async fn run(&mut self) -> Result<HttpResponse> {
        self.initial().await?;
        if let Some(response) = self.pre_show().await? {
            // Static fallback is terminal, the remaining phases do not run.
            return Ok(response);
        }
        let response = self.show().await?;
        self.post_show().await;
        self.finalize().await;
        Ok(response)
    }

    /// Phase 1: open the channel logs and record the access line.
    async fn initial(&mut self) -> Result<()> {
        if self.config.access_log {
            self.access_log = Some(LogWriter::open(
                &self.config.log_directory,
                LogChannel::Access,
                false,
            )?);
        }
        if self.config.sql_log {
            self.sql_log = Some(LogWriter::open(
                &self.config.log_directory,
                LogChannel::Sql,
                true,
            )?);
        }
        if let (Some(writer), Some(request)) = (&self.access_log, &self.request) {
            writer.write(format!("{} {}", request.method, request.path))?;
        }
        self.hooks.run_phase(Phase::Initial).await;
        Ok(())
    }

    /// Phase 2: settle the route. Empty resolutions fall back to the
    /// configured default page; unresolvable paths are served from the
    /// public document root when a matching `.html` exists, otherwise
    /// they are a 404.
    async fn pre_show(&mut self) -> Result<Option<HttpResponse>> {
        self.hooks.run_phase(Phase::PreShow).await;

        if self.resolver.is_illegal_controller() {
            if let Some(file) = self.resolver.html_fallback() {
                let body = tokio::fs::read(&file).await?;
                return Ok(Some(
                    HttpResponse::ok()
                        .with_body(body)
                        .with_header("Content-Type", "text/html"),
                ));
            }
            return Err(Error::RouteNotFound(self.resolver.service().to_string()));
        }

        if self.resolver.controller_name().is_empty() {
            let target = if self.resolver.is_admin() {
                format!("{}/{}", self.config.admin_dir, self.config.admin_default_page)
            } else {
                self.config.default_page.clone()
            };
            self.resolver.reset(&target);
            if self.resolver.controller_name().is_empty() {
                return Err(Error::ControllerNotFound(target));
            }
        }
        Ok(None)
    }

    /// Phase 3: instantiate the controller and call the method.
    async fn show(&mut self) -> Result<HttpResponse> {
        self.hooks.run_phase(Phase::Show).await;

        let route = self.resolver.route();
        let factory = self
            .controllers
            .factory(route.namespace(), &route.controller)
            .ok_or_else(|| Error::ControllerNotFound(route.controller.clone()))?;
        let controller = factory();

        let request = self
            .request
            .take()
            .ok_or_else(|| Error::Internal("request already consumed".to_string()))?;
        let method = route.method.clone();
        let controller_name = route.controller.clone();
        let mut ctx = RequestContext::new(request, route);

        match controller.call(&method, &mut ctx).await {
            Some(result) => result,
            None => Err(Error::MethodNotFound {
                controller: controller_name,
                method,
            }),
        }
    }

    /// Phase 4.
    async fn post_show(&mut self) {
        self.hooks.run_phase(Phase::PostShow).await;
    }

    /// Phase 5: final hooks, then flush and close the channel logs.
    async fn finalize(&mut self) {
        self.hooks.run_phase(Phase::Final).await;
        if let Some(writer) = self.access_log.take() {
            if let Err(error) = writer.close() {
                log::warn!("access log close failed: {error}");
            }
        }
        if let Some(writer) = self.sql_log.take() {
            if let Err(error) = writer.close() {
                log::warn!("sql log close failed: {error}");
            }
        }
    }

    /// Render an error, preferring the configured static document for its
    /// status code.
    async fn error_response(&self, error: &Error) -> HttpResponse {
        let status = error.http_status();
        if let Some(page) = self.config.error_page(status.code()) {
            if let Ok(body) = tokio::fs::read(&page).await {
                return HttpResponse::new(status.code())
                    .with_body(body)
                    .with_header("Content-Type", "text/html");
            }
        }
        HttpResponse::new(status.code())
            .with_html(format!("<html><body><h1>{status}</h1></body></html>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, Namespace};
    use async_trait::async_trait;

    struct PageController {
        name: &'static str,
    }

    #[async_trait]
    impl Controller for PageController {
        async fn call(
            &self,
            method: &str,
            ctx: &mut RequestContext,
        ) -> Option<Result<HttpResponse>> {
            match method {
                "index" => Some(Ok(HttpResponse::ok().with_html(format!("{} index", self.name)))),
                "show" => {
                    let dir = ctx.param("dir").unwrap_or("-").to_string();
                    Some(Ok(HttpResponse::ok().with_html(format!("show {dir}"))))
                }
                _ => None,
            }
        }
    }

    fn registry() -> Arc<ControllerRegistry> {
        let mut registry = ControllerRegistry::new();
        registry.register(Namespace::General, "welcome", || PageController {
            name: "welcome",
        });
        registry.register(Namespace::General, "Import", || PageController {
            name: "Import",
        });
        registry.register(Namespace::Admin, "Top", || PageController { name: "Top" });
        Arc::new(registry)
    }

    fn ignition(path: &str) -> Ignition {
        Ignition::new(
            DispatchConfig::default(),
            Arc::new(HookRegistry::new()),
            registry(),
            HttpRequest::get(path),
        )
    }

    #[tokio::test]
    async fn test_dispatch_with_params() {
        let response = ignition("/Import/show/dir/csvdata").play().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body_string(), "show csvdata");
    }

    #[tokio::test]
    async fn test_root_falls_back_to_default_page() {
        let response = ignition("/").play().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body_string(), "welcome index");
    }

    #[tokio::test]
    async fn test_admin_root_uses_admin_default() {
        let response = ignition("/pwfadmin/").play().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body_string(), "Top index");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = ignition("/NoSuchThing").play().await;
        assert_eq!(response.status, 404);
        assert!(response.body_string().contains("404"));
    }

    #[tokio::test]
    async fn test_missing_method_is_404() {
        let response = ignition("/Import/explode").play().await;
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_html_fallback_serves_static_file() {
        let dir = std::env::temp_dir().join(format!("podium-ignite-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("about.html"), "<h1>about</h1>").unwrap();

        let config = DispatchConfig {
            public_path: dir.clone(),
            ..DispatchConfig::default()
        };
        let ignition = Ignition::new(
            config,
            Arc::new(HookRegistry::new()),
            registry(),
            HttpRequest::get("/about.html"),
        );
        let response = ignition.play().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body_string(), "<h1>about</h1>");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_access_log_written() {
        let dir = std::env::temp_dir().join(format!("podium-ignite-log-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let config = DispatchConfig {
            log_directory: dir.clone(),
            access_log: true,
            ..DispatchConfig::default()
        };
        let ignition = Ignition::new(
            config,
            Arc::new(HookRegistry::new()),
            registry(),
            HttpRequest::get("/welcome"),
        );
        let response = ignition.play().await;
        assert_eq!(response.status, 200);

        let mut found = false;
        for entry in std::fs::read_dir(&dir).unwrap() {
            let content = std::fs::read_to_string(entry.unwrap().path()).unwrap();
            if content.contains("GET /welcome") {
                found = true;
            }
        }
        assert!(found);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
