// HTTP client for the inventory server.
//
// Wraps `reqwest::Client` with base-URL joining and error-body parsing.
// Endpoint groups (barcode slot, inventory, transaction log) are
// implemented as inherent methods in sibling modules to keep this file
// focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

/// The server answers failures with `{ error }`, `{ errors }` (bulk
/// validation) or occasionally `{ message }`.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the inventory REST API.
///
/// All endpoints live under `{base_url}/api/`. The client is cheap to
/// clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct InventoryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl InventoryClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with `/api/` so relative joins land in the
    /// right place whether or not the profile already included it.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }

        Ok(url)
    }

    /// The normalized API root (always ends with `/api/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let fallback = || {
            status
                .canonical_reason()
                .map_or_else(|| status.to_string(), str::to_owned)
        };

        let message = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(ErrorResponse {
                errors: Some(errors),
                ..
            }) => errors.to_string(),
            Ok(ErrorResponse {
                error: Some(error), ..
            }) => error,
            Ok(ErrorResponse {
                message: Some(message),
                ..
            }) => message,
            Ok(_) => fallback(),
            Err(_) if raw.trim().is_empty() => fallback(),
            Err(_) => raw,
        };

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_api_suffix() {
        let client =
            InventoryClient::from_reqwest("http://10.0.0.5:5000", reqwest::Client::new()).unwrap();
        assert_eq!(client.base_url().as_str(), "http://10.0.0.5:5000/api/");
    }

    #[test]
    fn base_url_with_api_is_kept() {
        let client =
            InventoryClient::from_reqwest("http://10.0.0.5:5000/api/", reqwest::Client::new())
                .unwrap();
        assert_eq!(client.base_url().as_str(), "http://10.0.0.5:5000/api/");
        assert_eq!(
            client.url("inventory").unwrap().as_str(),
            "http://10.0.0.5:5000/api/inventory"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = InventoryClient::from_reqwest("not a url", reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
