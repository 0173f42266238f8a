//! The admin stack end to end: session-backed login, the category/level
//! gate, and a protected controller wired into the dispatcher.

use async_trait::async_trait;
use podium::{
    Controller, DispatchConfig, HttpRequest, HttpResponse, PodiumApp, RequestContext, Result,
};
use podium_auth::{
    AccessRequirement, AdminAuth, AdminStorage, Category, FileAdminStorage, HashAlgorithm, Level,
    PasswordHasher,
};
use podium_session::{FileSessionHandler, SessionManager};
use std::path::PathBuf;
use std::sync::Arc;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("podium-it-{tag}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// Admin page that requires Manage category at editor level. The session id
/// arrives in the `X-Session` header, the way a cookie adapter would pass it.
struct ProtectedPage {
    auth: Arc<AdminAuth>,
    sessions: Arc<SessionManager>,
    required: AccessRequirement,
}

#[async_trait]
impl Controller for ProtectedPage {
    async fn call(&self, method: &str, ctx: &mut RequestContext) -> Option<Result<HttpResponse>> {
        if method != "index" {
            return None;
        }
        let sid = ctx.request.header("X-Session").cloned();
        let result = async {
            let mut session = self
                .sessions
                .start(sid.as_deref())
                .await
                .map_err(|e| podium::Error::Internal(e.to_string()))?;
            if !self.auth.check_auth(&mut session, self.required) {
                return Ok(HttpResponse::new(401).with_html("login required"));
            }
            self.sessions
                .save(&session)
                .await
                .map_err(|e| podium::Error::Internal(e.to_string()))?;
            Ok(HttpResponse::ok().with_html("secret dashboard"))
        }
        .await;
        Some(result)
    }
}

async fn setup(tag: &str) -> (PodiumApp, Arc<AdminAuth>, Arc<SessionManager>, PathBuf) {
    let root = temp_dir(tag);

    let storage = Arc::new(FileAdminStorage::new(root.join("auth")));
    storage.open().await.unwrap();
    let auth = Arc::new(AdminAuth::new(
        storage,
        PasswordHasher::new(HashAlgorithm::Bcrypt),
        3600,
    ));
    auth.register("chief", "secret", Category::Manage, Level::MANAGER)
        .await
        .unwrap();

    let sessions = Arc::new(SessionManager::new(
        Arc::new(FileSessionHandler::new(root.join("sessions"))),
        1800,
    ));
    sessions.open().await.unwrap();

    let page_auth = auth.clone();
    let page_sessions = sessions.clone();
    let app = PodiumApp::builder(DispatchConfig::default())
        .admin_controller("Dashboard", move || ProtectedPage {
            auth: page_auth.clone(),
            sessions: page_sessions.clone(),
            required: AccessRequirement::new(Category::Manage, Level::EDITOR),
        })
        .build()
        .unwrap();

    (app, auth, sessions, root)
}

#[tokio::test]
async fn anonymous_request_is_rejected() {
    let (app, _auth, _sessions, root) = setup("anon").await;
    let response = app.handle(HttpRequest::get("/pwfadmin/Dashboard")).await;
    assert_eq!(response.status, 401);
    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn logged_in_session_passes_the_gate() {
    let (app, auth, sessions, root) = setup("login").await;

    let mut session = sessions.start(None).await.unwrap();
    auth.login(&mut session, "chief", "secret").await.unwrap();
    sessions.save(&session).await.unwrap();

    let mut request = HttpRequest::get("/pwfadmin/Dashboard");
    request
        .headers
        .insert("X-Session".to_string(), session.id().to_string());
    let response = app.handle(request).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body_string(), "secret dashboard");
    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn underleveled_user_is_rejected() {
    let (app, auth, sessions, root) = setup("level").await;
    auth.register("junior", "pw", Category::Manage, Level::OPERATOR)
        .await
        .unwrap();

    let mut session = sessions.start(None).await.unwrap();
    auth.login(&mut session, "junior", "pw").await.unwrap();
    sessions.save(&session).await.unwrap();

    let mut request = HttpRequest::get("/pwfadmin/Dashboard");
    request
        .headers
        .insert("X-Session".to_string(), session.id().to_string());
    let response = app.handle(request).await;
    assert_eq!(response.status, 401);
    let _ = std::fs::remove_dir_all(&root);
}
