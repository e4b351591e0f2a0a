//! Endpoint URLs for the host's preference service, respecting the deployment base path.
//!
//! When `PUBLIC_URL` is set at compile time (e.g., `/lms` when the host lives under a
//! subdirectory), endpoints are prefixed accordingly. A configured base overrides it.

pub const FETCH_PATH: &str = "preferences/get";
pub const SAVE_PATH: &str = "preferences/save";
/// Query parameter and header carrying the host session key.
pub const SESSION_PARAM: &str = "sesskey";
pub const SESSION_HEADER: &str = "X-Session-Key";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
    session_key: Option<String>,
}

impl Endpoints {
    /// Endpoints under `configured`, or the build-time `PUBLIC_URL` when unset.
    #[must_use]
    pub fn new(configured: Option<&str>, session_key: Option<String>) -> Self {
        let base = configured.unwrap_or(option_env!("PUBLIC_URL").unwrap_or(""));
        Self {
            base: base.trim().trim_end_matches('/').to_string(),
            session_key: session_key.filter(|key| !key.is_empty()),
        }
    }

    #[must_use]
    pub fn session_key(&self) -> Option<&str> {
        self.session_key.as_deref()
    }

    #[must_use]
    pub fn fetch_url(&self) -> String {
        let url = path_with_base(FETCH_PATH, &self.base);
        match &self.session_key {
            Some(key) => format!("{url}?{SESSION_PARAM}={}", urlencoding::encode(key)),
            None => url,
        }
    }

    #[must_use]
    pub fn save_url(&self) -> String {
        path_with_base(SAVE_PATH, &self.base)
    }
}

fn path_with_base(relative: &str, base: &str) -> String {
    let base = base.trim_end_matches('/');
    let rel = relative.trim_start_matches('/');

    if base.is_empty() {
        format!("/{rel}")
    } else {
        format!("{base}/{rel}")
    }
}
