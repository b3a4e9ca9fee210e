use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::common::{Identity, LoginResult};
use crate::config::AppConfig;
use crate::error::{ChatError, Result};

/// Cookie the server sets on login and reads on the chat handshake.
pub const AUTH_COOKIE: &str = "X-Authorization";

const LOGIN_PATH: &str = "/api/login";
const REGISTER_PATH: &str = "/api/register";
const LOGOUT_PATH: &str = "/api/logout";
const CURRENT_USER_PATH: &str = "/api/current_user";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    status: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP side of the client: login, register, logout and "who am I".
///
/// Clones share one cookie jar, which is also where the chat handshake takes
/// its credential from.
#[derive(Clone)]
pub struct AuthGateway {
    http: reqwest::Client,
    cookies: Arc<Jar>,
    config: AppConfig,
}

impl AuthGateway {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let cookies = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            // Logout answers with a redirect whose Set-Cookie must be kept.
            .redirect(Policy::none())
            .build()?;

        let gateway = Self {
            http,
            cookies,
            config: config.clone(),
        };
        if let Some(token) = config.auth_token.as_deref() {
            gateway.set_auth_cookie(token)?;
        }
        Ok(gateway)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult> {
        if username.is_empty() {
            return Err(ChatError::EmptyUsername);
        }
        log::info!("Logging in as {username}");

        let response: LoginResponse = self
            .http
            .post(self.config.api_url(LOGIN_PATH)?)
            .json(&LoginRequest { username, password })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match response.status {
            Some(true) => Ok(LoginResult::Success(Identity::from_username(username))),
            Some(false) => {
                let reason = response.message.unwrap_or_default();
                log::info!("Login rejected for {username}: {reason}");
                Ok(LoginResult::Rejected(reason))
            }
            None => Err(ChatError::UnexpectedResponse(
                "login response has no `status`".to_string(),
            )),
        }
    }

    /// Registers `username`; the server answers with the auth cookie, so a
    /// successful call leaves the client logged in.
    pub async fn register(&self, username: &str) -> Result<Identity> {
        if username.is_empty() {
            return Err(ChatError::EmptyUsername);
        }
        log::info!("Registering {username}");

        self.http
            .post(self.config.api_url(REGISTER_PATH)?)
            .json(&RegisterRequest { username })
            .send()
            .await?
            .error_for_status()?;
        Ok(Identity::from_username(username))
    }

    pub async fn logout(&self) -> Result<()> {
        let result = self
            .http
            .get(self.config.api_url(LOGOUT_PATH)?)
            .send()
            .await
            .and_then(|response| response.error_for_status());
        // The local credential goes away even if the server was unreachable.
        self.clear_auth_cookie();
        result?;
        log::info!("Logged out");
        Ok(())
    }

    /// Fetches the identity behind the current cookie. `None` means the
    /// server does not know who we are.
    pub async fn current_user(&self) -> Result<Option<Identity>> {
        let payload: Value = self
            .http
            .get(self.config.api_url(CURRENT_USER_PATH)?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(identity_from_payload(&payload))
    }

    /// `Cookie` header value for the chat handshake, if the jar holds any
    /// cookie for the server.
    pub fn cookie_header(&self) -> Option<String> {
        let url = self.cookie_url()?;
        let header = self.cookies.cookies(&url)?;
        header.to_str().ok().map(str::to_string)
    }

    /// Current non-empty `X-Authorization` value.
    pub fn auth_token(&self) -> Option<String> {
        let header = self.cookie_header()?;
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == AUTH_COOKIE)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn set_auth_cookie(&self, token: &str) -> Result<()> {
        let url = self.config.base_url()?;
        self.cookies
            .add_cookie_str(&format!("{AUTH_COOKIE}={token}; Path=/"), &url);
        Ok(())
    }

    /// Overwrites the auth cookie with an empty value. Called after every
    /// chat send; the credential is single use per message.
    pub fn clear_auth_cookie(&self) {
        if let Some(url) = self.cookie_url() {
            self.cookies.add_cookie_str(&format!("{AUTH_COOKIE}=; Path=/"), &url);
            log::debug!("Cleared {AUTH_COOKIE} cookie");
        }
    }

    fn cookie_url(&self) -> Option<Url> {
        match self.config.base_url() {
            Ok(url) => Some(url),
            Err(err) => {
                log::warn!("Cannot resolve cookie scope: {err}");
                None
            }
        }
    }
}

/// Accepts the shapes `/api/current_user` is known to return: the bare
/// cookie value as a JSON string, `null`, or an object with an `id` and a
/// `name`/`username`.
fn identity_from_payload(payload: &Value) -> Option<Identity> {
    match payload {
        Value::String(username) if !username.is_empty() => {
            Some(Identity::from_username(username.as_str()))
        }
        Value::Object(fields) => {
            let id = match fields.get("id")? {
                Value::String(id) if !id.is_empty() => id.clone(),
                Value::Number(id) => id.to_string(),
                _ => return None,
            };
            let name = fields
                .get("name")
                .or_else(|| fields.get("username"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| id.clone());
            Some(Identity { id, name })
        }
        _ => None,
    }
}
