use tracing::warn;

/// Where cart records live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Redis(String), // normalized redis:// url
    Memory,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlagdEndpoint {
    pub host: String,
    pub port: u16,
}

impl FlagdEndpoint {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub flagd: Option<FlagdEndpoint>,
    pub simulate_latency: bool,
    pub allowed_origins: Vec<String>,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 3003;
    const DEFAULT_REDIS_URL: &str = "localhost:6379";
    const DEFAULT_REDIS_PORT: &str = "6379";
    const DEFAULT_FLAGD_HOST: &str = "localhost";
    const DEFAULT_FLAGD_PORT: u16 = 8013;

    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = var("PORT")
            .map(|raw| {
                raw.parse::<u16>().unwrap_or_else(|_| {
                    warn!("PORT '{}' is not a valid port, using {}", raw, Self::DEFAULT_PORT);
                    Self::DEFAULT_PORT
                })
            })
            .unwrap_or(Self::DEFAULT_PORT);

        let store = match var("CART_STORE").as_deref().map(str::trim) {
            Some(backend) if backend.eq_ignore_ascii_case("memory") => StoreBackend::Memory,
            Some(backend) if !backend.is_empty() && !backend.eq_ignore_ascii_case("redis") => {
                warn!("Unknown CART_STORE '{}', falling back to redis", backend);
                StoreBackend::Redis(Self::redis_url(&var))
            }
            _ => StoreBackend::Redis(Self::redis_url(&var)),
        };

        let flagd = if var("FLAGD_DISABLED").is_some_and(|v| is_truthy(&v)) {
            None
        } else {
            Some(FlagdEndpoint {
                host: var("FLAGD_HOST").unwrap_or_else(|| Self::DEFAULT_FLAGD_HOST.to_string()),
                port: var("FLAGD_PORT")
                    .and_then(|raw| raw.parse::<u16>().ok())
                    .unwrap_or(Self::DEFAULT_FLAGD_PORT),
            })
        };

        Self {
            host: var("CART_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            port,
            store,
            flagd,
            simulate_latency: var("CART_SIMULATE_LATENCY").is_none_or(|v| is_truthy(&v)),
            allowed_origins: var("CART_ALLOWED_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn redis_url<F>(var: &F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        normalize_redis_url(&var("REDIS_URL").unwrap_or_else(|| Self::DEFAULT_REDIS_URL.to_string()))
    }
}

/// Accepts `host`, `host:port` or a full `redis://` / `rediss://` url.
pub fn normalize_redis_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("rediss://") {
        return raw.to_string();
    }

    let address = raw.strip_prefix("redis://").unwrap_or(raw);
    if address.contains(':') {
        format!("redis://{address}")
    } else {
        format!("redis://{}:{}", address, Config::DEFAULT_REDIS_PORT)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
