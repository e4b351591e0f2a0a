//! Remote preference store over `fetch`.
use async_trait::async_trait;
use clarion_core::{A11yError, FetchResponse, RemoteStore, SaveRequest, SaveResponse};
use wasm_bindgen::JsValue;
use web_sys::{Headers, Request, RequestCredentials, RequestInit};

use crate::dom::{self, WebError};
use crate::paths::{Endpoints, SESSION_HEADER};

fn unavailable(err: &WebError) -> A11yError {
    A11yError::StoreUnavailable(err.to_string())
}

/// Only JSON bodies are trusted; hosts answer expired sessions with an HTML login page.
#[must_use]
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|value| value.to_ascii_lowercase().contains("application/json"))
}

/// Talks to the host's preference endpoints with same-origin credentials.
#[derive(Debug, Clone)]
pub struct FetchRemoteStore {
    endpoints: Endpoints,
}

impl FetchRemoteStore {
    #[must_use]
    pub const fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    fn headers(&self, json_body: bool) -> Result<Headers, WebError> {
        let headers = Headers::new().map_err(|err| WebError::js(&err))?;
        if json_body {
            headers
                .set("Content-Type", "application/json")
                .map_err(|err| WebError::js(&err))?;
        }
        if let Some(key) = self.endpoints.session_key() {
            headers
                .set(SESSION_HEADER, key)
                .map_err(|err| WebError::js(&err))?;
        }
        Ok(headers)
    }

    #[allow(clippy::future_not_send)]
    async fn send(&self, method: &str, url: &str, body: Option<&str>) -> Result<String, A11yError> {
        let init = RequestInit::new();
        init.set_method(method);
        init.set_credentials(RequestCredentials::SameOrigin);
        init.set_headers(&self.headers(body.is_some()).map_err(|err| unavailable(&err))?.into());
        if let Some(body) = body {
            init.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(url, &init)
            .map_err(|err| unavailable(&WebError::js(&err)))?;
        let response = dom::fetch_request(&request)
            .await
            .map_err(|err| unavailable(&err))?;
        if !response.ok() {
            return Err(A11yError::StoreUnavailable(format!(
                "{method} {url} returned HTTP {}",
                response.status()
            )));
        }
        let content_type = response.headers().get("content-type").ok().flatten();
        if !is_json_content_type(content_type.as_deref()) {
            return Err(A11yError::StoreUnavailable(format!(
                "{method} {url} returned {}",
                content_type.as_deref().unwrap_or("no content type")
            )));
        }
        dom::response_text(&response)
            .await
            .map_err(|err| unavailable(&err))
    }
}

#[async_trait(?Send)]
impl RemoteStore for FetchRemoteStore {
    async fn fetch_preferences(&self) -> Result<FetchResponse, A11yError> {
        let body = self.send("GET", &self.endpoints.fetch_url(), None).await?;
        FetchResponse::from_body(&body)
    }

    async fn save_preference(&self, request: SaveRequest) -> Result<SaveResponse, A11yError> {
        let payload = serde_json::to_string(&request)?;
        let body = self
            .send("POST", &self.endpoints.save_url(), Some(&payload))
            .await?;
        SaveResponse::from_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::is_json_content_type;

    #[test]
    fn accepts_json_content_types_only() {
        assert!(is_json_content_type(Some("application/json")));
        assert!(is_json_content_type(Some("Application/JSON; charset=utf-8")));
        assert!(!is_json_content_type(Some("text/html; charset=utf-8")));
        assert!(!is_json_content_type(None));
    }
}
