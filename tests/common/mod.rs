#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::connect_info::MockConnectInfo,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

use pathshala_portal::config::PortalConfig;
use pathshala_portal::services::backend::HttpBackend;
use pathshala_portal::services::clock::ManualClock;
use pathshala_portal::{build_router, AppState};

/// Address every test request appears to come from.
pub fn peer() -> SocketAddr {
    SocketAddr::from(([203, 0, 113, 7], 50000))
}

/// 19 Oct 2026, 10:00 at the institute (IST).
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 4, 30, 0).unwrap()
}

pub fn config(backend_url: &str) -> PortalConfig {
    let env: HashMap<&str, String> = HashMap::from([
        ("BACKEND_URL", backend_url.to_string()),
        ("RAZORPAY_KEY", "rzp_test_key".to_string()),
    ]);
    PortalConfig::from_lookup(|key| env.get(key).cloned()).unwrap()
}

/// One browser talking to the portal. `cookie` is the session cookie it
/// holds, as `name=value`.
pub struct Portal {
    pub app: Router,
    pub clock: ManualClock,
    pub cookie: Option<String>,
}

pub struct Reply {
    pub status: StatusCode,
    /// Session cookie set by this response, if any.
    pub set_cookie: Option<String>,
    pub body: Value,
}

/// A local address nothing listens on.
pub fn dead_backend_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

impl Portal {
    pub fn new(server: &MockServer) -> Self {
        Self::at(&server.uri())
    }

    pub fn at(backend_url: &str) -> Self {
        let config = config(backend_url);
        let backend = HttpBackend::new(&config).unwrap();
        let clock = ManualClock::new(start_time());
        let state = AppState::new(config, Arc::new(backend)).with_clock(Arc::new(clock.clone()));
        let app = build_router(state).layer(MockConnectInfo(peer()));
        Portal { app, clock, cookie: None }
    }

    /// A second browser on the same portal and address, with no cookie.
    pub fn another_browser(&self) -> Portal {
        Portal { app: self.app.clone(), clock: self.clock.clone(), cookie: None }
    }

    pub async fn get(&mut self, uri: &str) -> Reply {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> Reply {
        self.send(Method::POST, uri, Some(body)).await
    }

    /// Sends with the held cookie and keeps whatever cookie comes back.
    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> Reply {
        let mut request = Request::builder()
            .method(method)
            .uri(format!("/api/portal{}", uri));
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        let set_cookie = set_cookie.and_then(|raw| {
            let pair = raw.split(';').next().unwrap_or_default().trim().to_string();
            let removed = pair.ends_with('=') || raw.contains("Max-Age=0");
            if removed {
                self.cookie = None;
                None
            } else {
                self.cookie = Some(pair.clone());
                Some(pair)
            }
        });
        Reply { status, set_cookie, body }
    }
}
