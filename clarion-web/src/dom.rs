use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Request, Response, Storage, Window};

/// Browser access failures.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("`window` is unavailable outside a browser context")]
    NoWindow,
    #[error("`document` is unavailable")]
    NoDocument,
    #[error("localStorage unavailable")]
    NoStorage,
    #[error("{0}")]
    Js(String),
}

impl WebError {
    #[must_use]
    pub fn js(value: &JsValue) -> Self {
        Self::Js(js_error_message(value))
    }
}

/// Retrieve the global `window` object, if running in a browser.
#[must_use]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Retrieve the document object for DOM interactions.
///
/// # Errors
/// Returns an error when no browser window or document is available.
pub fn document() -> Result<Document, WebError> {
    window()
        .ok_or(WebError::NoWindow)?
        .document()
        .ok_or(WebError::NoDocument)
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Log an error message to the browser console.
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from(message));
}

/// Perform a prepared fetch request and return the browser `Response`.
///
/// # Errors
/// Returns an error if the fetch rejects or the result is not a `Response`.
#[allow(clippy::future_not_send)] // Wasm futures rely on `JsFuture`, which is not `Send`.
pub async fn fetch_request(request: &Request) -> Result<Response, WebError> {
    let win = window().ok_or(WebError::NoWindow)?;
    let resp_value = JsFuture::from(win.fetch_with_request(request))
        .await
        .map_err(|err| WebError::js(&err))?;
    resp_value
        .dyn_into::<Response>()
        .map_err(|err| WebError::js(&err))
}

/// Read a response body as text.
///
/// # Errors
/// Returns an error if the body cannot be read or is not a string.
#[allow(clippy::future_not_send)]
pub async fn response_text(response: &Response) -> Result<String, WebError> {
    let promise = response.text().map_err(|err| WebError::js(&err))?;
    let text = JsFuture::from(promise)
        .await
        .map_err(|err| WebError::js(&err))?;
    text.as_string()
        .ok_or_else(|| WebError::Js("response body is not text".to_string()))
}

/// Access the browser `localStorage` handle.
///
/// # Errors
/// Returns an error if the browser window cannot be accessed or `localStorage` is unavailable.
pub fn local_storage() -> Result<Storage, WebError> {
    window()
        .ok_or(WebError::NoWindow)?
        .local_storage()
        .map_err(|err| WebError::js(&err))?
        .ok_or(WebError::NoStorage)
}
