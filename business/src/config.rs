use stashbox_utils::wire::UPLOAD_PATH;

/// Service the uploader talks to when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessConfig {
    pub api_base_url: String,
}

impl BusinessConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Absolute URL of the ingest endpoint.
    pub fn upload_url(&self) -> String {
        format!("{}{}", self.api_base_url, UPLOAD_PATH)
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}
