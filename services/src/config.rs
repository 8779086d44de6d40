use serde::Deserialize;
use stashbox_utils::version_info::RuntimeEnv;
use std::env::vars;
use std::fmt::Display;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Env {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "test")]
    Test,
    #[serde(rename = "prod")]
    Prod,
}

impl From<&Env> for RuntimeEnv {
    fn from(env: &Env) -> Self {
        match env {
            Env::Local => RuntimeEnv::Local,
            Env::Test => RuntimeEnv::Test,
            Env::Prod => RuntimeEnv::Prod,
        }
    }
}

impl Display for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Env::Local => write!(f, "local"),
            Env::Test => write!(f, "test"),
            Env::Prod => write!(f, "prod"),
        }
    }
}

/// Connection settings for the S3-compatible bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    /// Custom endpoint for S3-compatible providers; AWS when unset.
    pub endpoint: Option<String>,
}

// The final, validated configuration struct.
#[derive(Debug, Clone)]
pub struct Config {
    env: Env,
    server_addr: String,
    port: u16,
    s3: Option<S3Settings>,
    public_base_url: String,
}

// An intermediate struct for deserializing environment variables
// where most fields are optional.
#[derive(Deserialize)]
struct RawConfig {
    env: Env,
    server_addr: Option<String>,
    port: Option<u16>,
    aws_region: Option<String>,
    s3_access_key: Option<String>,
    s3_secret_access_key: Option<String>,
    bucket_name: Option<String>,
    s3_endpoint: Option<String>,
    public_base_url: Option<String>,
}

impl Config {
    /// Create a test configuration with default values.
    ///
    /// This function is available for both unit tests and integration tests.
    /// It should not be used in production code.
    pub fn new_for_test() -> Self {
        Self {
            env: Env::Test,
            server_addr: "127.0.0.1".to_owned(),
            port: 8080,
            s3: None,
            public_base_url: "https://cdn.example.com".to_owned(),
        }
    }

    /// Create a test configuration with a specific environment.
    pub fn new_for_test_with_env(env: Env) -> Self {
        Self {
            env,
            ..Self::new_for_test()
        }
    }

    pub fn environment(&self) -> &Env {
        &self.env
    }

    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_local(&self) -> bool {
        matches!(self.env, Env::Local)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self.env, Env::Prod)
    }

    /// Whether error responses may carry diagnostic details.
    pub fn exposes_error_details(&self) -> bool {
        self.is_local()
    }

    pub fn s3(&self) -> Option<&S3Settings> {
        self.s3.as_ref()
    }

    /// Base URL under which stored objects are publicly reachable.
    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    /// Public URL of a stored object.
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }

    /// Initializes configuration by reading from environment variables
    /// and applying environment-aware defaults.
    pub fn init() -> anyhow::Result<Self> {
        info!("Loading configuration from environment variables");

        let raw_config: RawConfig = serde_env::from_iter(vars())?;
        Self::from_raw(raw_config)
    }

    fn from_raw(raw_config: RawConfig) -> anyhow::Result<Self> {
        let RawConfig {
            env,
            server_addr,
            port,
            aws_region,
            s3_access_key,
            s3_secret_access_key,
            bucket_name,
            s3_endpoint,
            public_base_url,
        } = raw_config;

        let server_addr = match server_addr {
            Some(addr) => {
                info!("Using provided SERVER_ADDR: {}", addr);
                addr
            }
            None => {
                let default_addr = match env {
                    Env::Local => "127.0.0.1",
                    _ => "0.0.0.0",
                };
                info!(
                    "SERVER_ADDR not set, defaulting to {} for {} environment",
                    default_addr, env
                );
                default_addr.to_owned()
            }
        };

        let port = match port {
            Some(port) => port,
            None if matches!(env, Env::Local | Env::Test) => {
                info!("PORT not set, defaulting to 8080 for {} environment", env);
                8080
            }
            None => anyhow::bail!("PORT must be set for {} environment", env),
        };

        let s3 = match (aws_region, s3_access_key, s3_secret_access_key, bucket_name) {
            (Some(region), Some(access_key_id), Some(secret_access_key), Some(bucket)) => {
                info!("S3 storage configured for bucket {}", bucket);
                Some(S3Settings {
                    region,
                    access_key_id,
                    secret_access_key,
                    bucket,
                    endpoint: s3_endpoint,
                })
            }
            (region, access_key, secret, bucket) => {
                if matches!(env, Env::Prod) {
                    let missing: Vec<&str> = [
                        ("AWS_REGION", region.is_none()),
                        ("S3_ACCESS_KEY", access_key.is_none()),
                        ("S3_SECRET_ACCESS_KEY", secret.is_none()),
                        ("BUCKET_NAME", bucket.is_none()),
                    ]
                    .into_iter()
                    .filter_map(|(name, missing)| missing.then_some(name))
                    .collect();
                    anyhow::bail!(
                        "Missing required environment variable(s) for {} environment: {}",
                        env,
                        missing.join(", ")
                    );
                }
                info!("S3 storage not configured, using in-memory storage for {} environment", env);
                None
            }
        };

        let public_base_url = match public_base_url {
            Some(url) => url,
            None if matches!(env, Env::Local | Env::Test) => {
                let default_url = format!("http://localhost:{port}");
                info!("PUBLIC_BASE_URL not set, defaulting to {}", default_url);
                default_url
            }
            None => anyhow::bail!("PUBLIC_BASE_URL must be set for {} environment", env),
        };

        Ok(Config {
            env,
            server_addr,
            port,
            s3,
            public_base_url,
        })
    }
}
