use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;
use url::Url;

use super::config::{AuthMethod, ConnectionConfig};
use super::error::{ProxmoxError, Result};
use super::types::{Envelope, NodeInfo, VersionInfo};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq, Eq)]
struct AuthTicket {
    ticket: String,
    csrf_token: String,
}

#[derive(Deserialize, Debug)]
struct TicketResponse {
    data: TicketData,
}

#[derive(Deserialize, Debug)]
struct TicketData {
    ticket: String,
    #[serde(rename = "CSRFPreventionToken")]
    csrf_token: String,
}

/// Authenticated session against one Proxmox endpoint.
///
/// Cloning is cheap and clones share the ticket state, so a single login
/// is reused across every handle in the process.
#[derive(Clone)]
pub struct ProxmoxClient {
    client: Client,
    base_url: Url,
    config: Arc<ConnectionConfig>,
    // Whole-value replacement only: a (re-)login swaps the entire ticket,
    // never one half of the pair.
    ticket: Arc<RwLock<Option<AuthTicket>>>,
}

impl ProxmoxClient {
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let scheme = if config.host.starts_with("http://") {
            "http"
        } else {
            "https"
        };

        let host_cleaned = if let Some(stripped) = config.host.strip_prefix("http://") {
            stripped
        } else if let Some(stripped) = config.host.strip_prefix("https://") {
            stripped
        } else {
            &config.host
        };
        let host_cleaned = host_cleaned.trim_end_matches('/');

        // A host given as "1.2.3.4:8006" already carries its port.
        let url_str = if host_cleaned.contains(':') {
            format!("{}://{}/api2/json/", scheme, host_cleaned)
        } else {
            format!("{}://{}:{}/api2/json/", scheme, host_cleaned, config.port)
        };

        let base_url = Url::parse(&url_str)?;

        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProxmoxError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            config: Arc::new(config),
            ticket: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Proactively log in. A no-op under token auth; under password auth
    /// a success replaces the stored ticket, a failure leaves it as-is so
    /// a still-valid prior ticket keeps working.
    pub async fn authenticate(&self) -> Result<()> {
        if self.config.auth_method == AuthMethod::Token {
            return Ok(());
        }
        let mut slot = self.ticket.write().await;
        self.login(&mut slot).await.map(|_| ())
    }

    async fn login(&self, slot: &mut Option<AuthTicket>) -> Result<AuthTicket> {
        let username = self.config.username.as_deref().ok_or_else(|| {
            ProxmoxError::Config("username and password required for password auth".into())
        })?;
        let password = self.config.password.as_deref().ok_or_else(|| {
            ProxmoxError::Config("username and password required for password auth".into())
        })?;

        let url = self.base_url.join("access/ticket")?;
        let params = [("username", username), ("password", password)];

        let resp = self
            .client
            .post(url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProxmoxError::Auth(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProxmoxError::Auth(format!("{} - {}", status, text)));
        }

        let body: TicketResponse = resp
            .json()
            .await
            .map_err(|e| ProxmoxError::Auth(format!("bad ticket response: {}", e)))?;

        let fresh = AuthTicket {
            ticket: body.data.ticket,
            csrf_token: body.data.csrf_token,
        };
        *slot = Some(fresh.clone());

        info!("Successfully logged in as {}", username);
        Ok(fresh)
    }

    // Lazy bootstrap: first authenticated call under password auth logs in.
    // Callers racing here serialize on the write lock; the losers find the
    // winner's ticket already installed and skip the redundant login.
    async fn ensure_ticket(&self) -> Result<AuthTicket> {
        {
            let guard = self.ticket.read().await;
            if let Some(t) = guard.as_ref() {
                return Ok(t.clone());
            }
        }
        let mut slot = self.ticket.write().await;
        if let Some(t) = slot.as_ref() {
            return Ok(t.clone());
        }
        self.login(&mut slot).await
    }

    // 401 recovery: log in again unless a concurrent caller already
    // replaced the rejected ticket.
    async fn refresh_ticket(&self, rejected: &AuthTicket) -> Result<AuthTicket> {
        let mut slot = self.ticket.write().await;
        if let Some(current) = slot.as_ref() {
            if current != rejected {
                return Ok(current.clone());
            }
        }
        self.login(&mut slot).await
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        ticket: Option<&AuthTicket>,
    ) -> Result<reqwest::Response> {
        let url = self.base_url.join(path)?;
        let mut req = self.client.request(method, url);

        match self.config.auth_method {
            AuthMethod::Token => {
                if let Some(token) = &self.config.token {
                    req = req.header("Authorization", format!("PVEAPIToken={}", token));
                }
            }
            AuthMethod::Password => {
                if let Some(t) = ticket {
                    req = req.header("Cookie", format!("PVEAuthCookie={}", t.ticket));
                    // PVE only demands this on mutating calls but tolerates
                    // it everywhere, so it rides along unconditionally.
                    req = req.header("CSRFPreventionToken", &t.csrf_token);
                }
            }
        }

        if let Some(b) = body {
            req = req.json(b);
        }

        req.send()
            .await
            .map_err(|e| ProxmoxError::Connection(e.to_string()))
    }

    /// Issue one API call and unwrap the `{ data }` envelope.
    ///
    /// Under password auth a 401 triggers exactly one re-login followed by
    /// exactly one replay of the original request; whatever the replay
    /// returns is what the caller sees. There is no further retry loop.
    pub async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Envelope<T>> {
        let ticket = match self.config.auth_method {
            AuthMethod::Token => None,
            AuthMethod::Password => Some(self.ensure_ticket().await?),
        };

        let resp = self
            .dispatch(method.clone(), path, body, ticket.as_ref())
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            if let Some(stale) = ticket {
                debug!("Got 401 for {} {}, re-authenticating once", method, path);
                let fresh = self.refresh_ticket(&stale).await?;
                let retry = self.dispatch(method, path, body, Some(&fresh)).await?;
                return unwrap_envelope(retry).await;
            }
        }

        unwrap_envelope(resp).await
    }

    pub async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Envelope<T>> {
        self.request(Method::POST, path, body).await
    }

    pub async fn put<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Envelope<T>> {
        self.request(Method::PUT, path, body).await
    }

    pub async fn delete<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>> {
        self.request(Method::DELETE, path, None).await
    }

    /// Cheap liveness probe. Always resolves to a bool; the cause of a
    /// failed probe goes to the debug log instead of the caller.
    pub async fn test_connection(&self) -> bool {
        match self.get::<VersionInfo>("version").await {
            Ok(_) => true,
            Err(e) => {
                debug!("Connectivity probe failed: {}", e);
                false
            }
        }
    }

    pub async fn get_version(&self) -> Result<VersionInfo> {
        Ok(self.get::<VersionInfo>("version").await?.data)
    }

    pub async fn get_nodes(&self) -> Result<Vec<NodeInfo>> {
        Ok(self.get::<Vec<NodeInfo>>("nodes").await?.data)
    }
}

async fn unwrap_envelope<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<Envelope<T>> {
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| ProxmoxError::Connection(e.to_string()))?;

    if !status.is_success() {
        return Err(ProxmoxError::Api(status, error_detail(status, &text)));
    }

    Ok(serde_json::from_str(&text)?)
}

// Prefer the structured "errors" payload PVE attaches to failures, fall
// back to the raw body, then to the status reason.
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        if let Some(errors) = v.get("errors") {
            if !errors.is_null() {
                return errors.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").into()
    } else {
        trimmed.to_string()
    }
}
