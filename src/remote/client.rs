//! reqwest-backed catalog client with cookie session handling.
//!
//! # Authentication
//!
//! The backend authenticates with three cookies:
//!
//! - `access_token` (path `/`), sent with every request
//! - `refresh_token` (path `/api/auth`), only reaches the refresh endpoint
//! - `csrf_token` (path `/`), mirrored into the `X-CSRF-Token` header on
//!   mutating requests
//!
//! A 401 on any request other than login or refresh triggers exactly one
//! `POST /api/auth/refresh` followed by exactly one retry of the original
//! request. Requests that hit 401 concurrently share a single refresh. If
//! the refresh fails, or the retried request is still rejected, the shared
//! [`Session`] moves to `Expired` and the caller gets
//! [`CatalogError::SessionExpired`].
//!
//! Token values are never logged. [`Credentials`] redacts itself in `Debug`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{CatalogError, Result};
use crate::session::{Session, UserProfile};

use super::{ApiError, CatalogApi, Endpoint};

const CSRF_HEADER: &str = "X-CSRF-Token";
const ACCESS_COOKIE: &str = "access_token";
const REFRESH_COOKIE: &str = "refresh_token";
const CSRF_COOKIE: &str = "csrf_token";

const LOGIN_PATH: &str = "/api/auth/login";
const LOGOUT_PATH: &str = "/api/auth/logout";
const REFRESH_PATH: &str = "/api/auth/refresh";
const USER_PATH: &str = "/api/auth/user";
const REFRESH_COOKIE_PATH: &str = "/api/auth";

/// Session cookie values, persisted between CLI invocations.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.csrf_token.is_none()
    }
}

fn redact(value: &Option<String>) -> &'static str {
    if value.is_some() { "[REDACTED]" } else { "None" }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("csrf_token", &redact(&self.csrf_token))
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    user: Option<UserProfile>,
    #[serde(default)]
    csrf_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    csrf_token: Option<String>,
}

/// Bookkeeping for single-flight token refresh.
#[derive(Debug, Default)]
struct RefreshState {
    /// Incremented after every refresh attempt
    generation: u64,
    /// Outcome of the most recent attempt
    last_failed: bool,
}

/// HTTP client for the catalog backend.
pub struct ApiClient {
    http: Client,
    jar: Arc<Jar>,
    base_url: Url,
    csrf: Mutex<Option<SecretString>>,
    refresh: tokio::sync::Mutex<RefreshState>,
    session: Session,
}

impl ApiClient {
    /// Create a client for `base_url` with a total request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::Config(format!("invalid base_url '{base_url}': {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            jar,
            base_url,
            csrf: Mutex::new(None),
            refresh: tokio::sync::Mutex::new(RefreshState::default()),
            session: Session::new(),
        })
    }

    /// Share an existing session handle instead of the client's own.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Preload stored cookies so an earlier login carries over.
    pub fn with_credentials(self, credentials: &Credentials) -> Self {
        if let Some(token) = &credentials.access_token {
            self.jar
                .add_cookie_str(&format!("{ACCESS_COOKIE}={token}; Path=/"), &self.base_url);
        }
        if let Some(token) = &credentials.refresh_token
            && let Ok(url) = self.base_url.join(REFRESH_PATH)
        {
            self.jar.add_cookie_str(
                &format!("{REFRESH_COOKIE}={token}; Path={REFRESH_COOKIE_PATH}"),
                &url,
            );
        }
        if let Some(token) = &credentials.csrf_token {
            self.jar
                .add_cookie_str(&format!("{CSRF_COOKIE}={token}; Path=/"), &self.base_url);
            self.set_csrf(token.clone());
        }
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current cookie values, for persisting to the config file.
    pub fn credentials(&self) -> Credentials {
        let refresh_url = self.base_url.join(REFRESH_PATH).ok();
        Credentials {
            access_token: self.cookie_value(&self.base_url, ACCESS_COOKIE),
            refresh_token: refresh_url.and_then(|url| self.cookie_value(&url, REFRESH_COOKIE)),
            csrf_token: self.csrf_token(),
        }
    }

    /// Sign in with email and password.
    ///
    /// The backend expects a form-encoded `username`/`password` pair and
    /// answers with the user profile plus a fresh CSRF token; the session
    /// cookies arrive via `Set-Cookie`.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        self.session.begin_auth();
        match self.login_request(email, password).await {
            Ok(user) => {
                info!(user_id = user.user_id, "signed in");
                self.session.authenticated(user.clone());
                Ok(user)
            }
            Err(err) => {
                self.session.sign_out();
                Err(err)
            }
        }
    }

    async fn login_request(&self, email: &str, password: &str) -> Result<UserProfile> {
        let url = self.url_for(&Endpoint::new(LOGIN_PATH))?;
        let form = [("username", email), ("password", password)];
        debug!(path = LOGIN_PATH, "sending login request");
        let response = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(ApiError::from)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            let message = ApiError::from_status(StatusCode::UNAUTHORIZED, body)
                .detail()
                .unwrap_or_else(|| "incorrect email or password".to_string());
            return Err(CatalogError::validation("credentials", message));
        }

        let payload: LoginResponse =
            serde_json::from_value(read_json(ensure_success(response).await?).await?)?;
        if let Some(token) = payload.csrf_token {
            self.set_csrf(token);
        }
        match payload.user {
            Some(user) => Ok(user),
            None => self.fetch_user().await,
        }
    }

    /// Verify the stored cookies by asking the backend who we are.
    pub async fn check_session(&self) -> Result<UserProfile> {
        let user = self.fetch_user().await?;
        self.session.authenticated(user.clone());
        Ok(user)
    }

    async fn fetch_user(&self) -> Result<UserProfile> {
        let value = self.get(&Endpoint::new(USER_PATH)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Sign out. Local cookies and session state are cleared even when the
    /// server call fails.
    pub async fn logout(&self) {
        let outcome = match self.dispatch(Method::POST, &Endpoint::new(LOGOUT_PATH), None).await {
            Ok(response) => ensure_success(response).await.map(|_| ()),
            Err(err) => Err(err),
        };
        if let Err(err) = outcome {
            warn!(error = %err, "logout request failed, clearing local session anyway");
        }
        self.clear_cookies();
        self.session.sign_out();
    }

    fn clear_cookies(&self) {
        for name in [ACCESS_COOKIE, CSRF_COOKIE] {
            self.jar
                .add_cookie_str(&format!("{name}=; Path=/; Max-Age=0"), &self.base_url);
        }
        if let Ok(url) = self.base_url.join(REFRESH_PATH) {
            self.jar.add_cookie_str(
                &format!("{REFRESH_COOKIE}=; Path={REFRESH_COOKIE_PATH}; Max-Age=0"),
                &url,
            );
        }
        *self.csrf.lock() = None;
    }

    fn set_csrf(&self, token: String) {
        *self.csrf.lock() = Some(SecretString::from(token));
    }

    fn csrf_token(&self) -> Option<String> {
        if let Some(token) = self.csrf.lock().as_ref() {
            return Some(token.expose_secret().to_string());
        }
        self.cookie_value(&self.base_url, CSRF_COOKIE)
    }

    fn cookie_value(&self, url: &Url, name: &str) -> Option<String> {
        let header = self.jar.cookies(url)?;
        let raw = header.to_str().ok()?;
        raw.split(';').map(str::trim).find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
    }

    fn url_for(&self, endpoint: &Endpoint) -> Result<Url> {
        self.base_url
            .join(&endpoint.path)
            .map_err(|e| CatalogError::Config(format!("invalid endpoint '{}': {e}", endpoint.path)))
    }

    /// Send a single request without any 401 recovery.
    async fn dispatch(
        &self,
        method: Method,
        endpoint: &Endpoint,
        body: Option<&Value>,
    ) -> Result<Response> {
        let url = self.url_for(endpoint)?;
        let mutating = is_mutating(&method);
        debug!(%method, path = %endpoint.path, "sending request");

        let mut request = self.http.request(method, url);
        if !endpoint.query.is_empty() {
            request = request.query(&endpoint.query);
        }
        if mutating && let Some(token) = self.csrf_token() {
            request = request.header(CSRF_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        debug!(status = response.status().as_u16(), path = %endpoint.path, "received response");
        Ok(response)
    }

    /// Send a request, refreshing the session once on 401.
    async fn send(
        &self,
        method: Method,
        endpoint: &Endpoint,
        body: Option<&Value>,
    ) -> Result<Response> {
        let observed = self.refresh.lock().await.generation;
        let response = self.dispatch(method.clone(), endpoint, body).await?;
        if response.status() != StatusCode::UNAUTHORIZED || is_auth_endpoint(&endpoint.path) {
            return ensure_success(response).await;
        }

        debug!(path = %endpoint.path, "request unauthorized, refreshing session");
        self.refresh_after(observed).await?;

        let retry = self.dispatch(method, endpoint, body).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %endpoint.path, "request still unauthorized after refresh");
            self.session.expire();
            return Err(CatalogError::SessionExpired);
        }
        ensure_success(retry).await
    }

    /// Refresh the session unless another request already did so after
    /// `observed` was read.
    async fn refresh_after(&self, observed: u64) -> Result<()> {
        let mut state = self.refresh.lock().await;
        if state.generation != observed {
            debug!("session already refreshed by a concurrent request");
            return if state.last_failed {
                Err(CatalogError::SessionExpired)
            } else {
                Ok(())
            };
        }

        let outcome = self.refresh_tokens().await;
        state.generation += 1;
        state.last_failed = outcome.is_err();

        match outcome {
            Ok(()) => {
                info!("session refreshed");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "session refresh failed");
                self.session.expire();
                Err(CatalogError::SessionExpired)
            }
        }
    }

    async fn refresh_tokens(&self) -> Result<()> {
        let response = self
            .dispatch(Method::POST, &Endpoint::new(REFRESH_PATH), None)
            .await?;
        let payload: RefreshResponse =
            serde_json::from_value(read_json(ensure_success(response).await?).await?)?;
        if payload.success == Some(false) {
            return Err(ApiError::from_status(StatusCode::UNAUTHORIZED, "refresh rejected").into());
        }
        if let Some(token) = payload.csrf_token {
            self.set_csrf(token);
        }
        Ok(())
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session.state())
            .finish_non_exhaustive()
    }
}

impl CatalogApi for ApiClient {
    async fn get(&self, endpoint: &Endpoint) -> Result<Value> {
        let response = self.send(Method::GET, endpoint, None).await?;
        read_json(response).await
    }

    async fn post(&self, endpoint: &Endpoint, body: &Value) -> Result<Value> {
        let response = self.send(Method::POST, endpoint, Some(body)).await?;
        read_json(response).await
    }

    async fn put(&self, endpoint: &Endpoint, body: &Value) -> Result<Value> {
        let response = self.send(Method::PUT, endpoint, Some(body)).await?;
        read_json(response).await
    }

    async fn delete(&self, endpoint: &Endpoint) -> Result<()> {
        self.send(Method::DELETE, endpoint, None).await?;
        Ok(())
    }
}

fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn is_auth_endpoint(path: &str) -> bool {
    path == LOGIN_PATH || path == REFRESH_PATH
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_status(status, body).into())
}

/// Decode a response body as JSON. An empty body reads as `null`.
async fn read_json(response: Response) -> Result<Value> {
    let text = response.text().await.map_err(ApiError::from)?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}
