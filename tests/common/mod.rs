#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use axum::{
    Router,
    body::{self, Body},
    http::{HeaderMap, Method, Request, StatusCode, header},
    middleware,
};
use cookie::{Cookie, time::Duration};
use serde_json::Value;
use tower::ServiceExt;

use car_notes::{
    auth::{TokenGenerator, password::hash_password},
    config::{AppConfig, DatabaseConfig},
    db::{
        connection,
        dao::{DaoContext, NewUser},
        entities::user,
    },
    mail::{EmailMessage, RecordingMailer},
    middleware::{catch_panic_layer, json_error_middleware},
    routes::{API_PREFIX, router},
    sessions::MemorySessionStore,
    state::AppState,
};

pub const PASSWORD: &str = "Turbo-Wagon-1987";

pub fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

pub struct TestApp {
    pub state: Arc<AppState>,
    pub mailer: Arc<RecordingMailer>,
    pub sessions: Arc<MemorySessionStore>,
    router: Router,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let mut cfg = AppConfig::default();
        let db_cfg = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_idle: 1,
        };
        cfg.database = Some(db_cfg.clone());

        let db = connection::connect(&db_cfg)
            .await
            .expect("connect to sqlite");
        let mailer = Arc::new(RecordingMailer::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let state = AppState::new(
            cfg,
            db,
            sessions.clone(),
            mailer.clone(),
            TokenGenerator::new(b"integration-test-secret", 3600),
        );

        let router = router(Arc::clone(&state))
            .layer(middleware::from_fn(json_error_middleware))
            .layer(catch_panic_layer());

        Self {
            state,
            mailer,
            sessions,
            router,
        }
    }

    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookies: HashMap::new(),
            csrf_cookie: self.state.config.csrf.cookie_name.clone(),
            csrf_header: self.state.config.csrf.header_name.clone(),
        }
    }

    pub fn daos(&self) -> DaoContext {
        DaoContext::new(&self.state.db)
    }

    /// Inserts a user directly, skipping registration and activation.
    pub async fn create_user(&self, email: &str, username: &str, is_admin: bool) -> user::Model {
        self.daos()
            .user()
            .create_user(NewUser {
                email: email.to_string(),
                username: username.to_string(),
                password_hash: hash_password(PASSWORD).expect("hash password"),
                is_active: true,
                is_admin,
            })
            .await
            .expect("create user")
    }

    /// A client holding a session for `identifier`.
    pub async fn login(&self, identifier: &str) -> TestClient {
        let mut client = self.client();
        client.fetch_csrf().await;
        let res = client
            .post(
                "/auth/login",
                serde_json::json!({ "email": identifier, "password": PASSWORD }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.json);
        client
    }

    pub async fn last_email(&self) -> EmailMessage {
        self.mailer
            .sent()
            .await
            .pop()
            .expect("an email should have been sent")
    }
}

/// Pulls `(uidb64, token)` out of the link in an activation or reset email.
pub fn link_parts(message: &EmailMessage) -> (String, String) {
    let link = message
        .text_body
        .split_whitespace()
        .find(|word| word.starts_with("http"))
        .expect("email should contain a link");
    let mut segments = link.trim_end_matches('/').rsplit('/');
    let token = segments.next().expect("token segment").to_string();
    let uid = segments.next().expect("uid segment").to_string();
    (uid, token)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

/// Keeps cookies between requests and echoes the csrf cookie in the header,
/// the way the browser frontend does.
#[derive(Clone)]
pub struct TestClient {
    router: Router,
    pub cookies: HashMap<String, String>,
    csrf_cookie: String,
    csrf_header: String,
}

impl TestClient {
    pub async fn fetch_csrf(&mut self) {
        let res = self.get("/auth/csrf_cookie").await;
        assert_eq!(res.status, StatusCode::OK);
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.cookies.get(&self.csrf_cookie).map(String::as_str)
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&mut self, path: &str, body: Value) -> TestResponse {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put(&mut self, path: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&mut self, path: &str, body: Option<Value>) -> TestResponse {
        self.send(Method::DELETE, path, body).await
    }

    pub async fn send(&mut self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(api_path(path));
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(token) = self.csrf_token() {
            builder = builder.header(self.csrf_header.as_str(), token);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request should build"))
            .await
            .expect("request should succeed");
        self.store_cookies(response.headers());

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be json")
        };
        TestResponse {
            status,
            headers,
            json,
        }
    }

    fn store_cookies(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let Ok(cookie) = Cookie::parse(value) else {
                continue;
            };
            let expired = cookie.max_age() == Some(Duration::ZERO);
            if expired || cookie.value().is_empty() {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
    }
}
