//! Configuration for the sync engine

use std::path::PathBuf;
use std::time::Duration;

/// HTTP Basic credentials shared by content and asset fetches.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub user: String,
    pub pass: String,
}

/// Configuration for the sync engine
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Local cache directory (snapshot file + asset subdirectory)
    pub cache_dir: PathBuf,

    /// Remote content base URL (e.g., "https://cms.example/api/bornes")
    pub api_base_url: String,

    /// Site code appended to the content URL ({base}/{lang}/{site})
    pub site: String,

    /// Languages to fetch and keep in the shared cache
    pub languages: Vec<String>,

    /// HTTP Basic credentials, if the endpoint requires them
    pub auth: Option<BasicAuth>,

    /// API key sent as the `x-api-key` header
    pub api_key: Option<String>,

    /// Interval between automatic refresh cycles
    pub refresh_interval: Duration,

    /// HTTP timeout per request
    pub timeout: Duration,

    /// Serve built-in mock content instead of hitting the network
    pub use_mock_data: bool,

    /// Enable the local snapshot/asset cache
    pub enable_cache: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("."),
            api_base_url: "http://localhost:3000/api".to_string(),
            site: String::new(),
            languages: vec!["fr".to_string(), "en".to_string()],
            auth: None,
            api_key: None,
            refresh_interval: Duration::from_secs(300), // 5 minutes
            timeout: Duration::from_secs(30),
            use_mock_data: false,
            enable_cache: true,
        }
    }
}

impl SyncConfig {
    /// Configure the local cache directory
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Configure the remote endpoint
    pub fn with_endpoint(mut self, base_url: impl Into<String>, site: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self.site = site.into();
        self
    }

    /// Configure HTTP Basic credentials
    pub fn with_basic_auth(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.auth = Some(BasicAuth {
            user: user.into(),
            pass: pass.into(),
        });
        self
    }

    /// Configure the API key header
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Configure the set of languages to sync
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Serve built-in mock content only (dev without an API)
    pub fn with_mock_data(mut self) -> Self {
        self.use_mock_data = true;
        self
    }

    /// Disable the local cache (browser/dev mode)
    pub fn without_cache(mut self) -> Self {
        self.enable_cache = false;
        self
    }
}
