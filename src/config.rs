use serde::Deserialize;

/// Runtime configuration, loaded once from the environment at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// API key for the hosted email-finder service. Absent disables
    /// that lookup entirely.
    pub hunter_api_key: Option<String>,
    /// Base URL of the email-finder API. Overridable so tests can
    /// point it at a mock server.
    pub hunter_base_url: String,
    /// Worker pool width for bulk enrichment.
    pub max_concurrency: usize,
    /// Timeout for each page fetch, in seconds.
    pub http_timeout_secs: u64,
    /// Timeout for each SMTP connection, in seconds.
    pub smtp_timeout_secs: u64,
    /// Politeness delay bounds between page fetches, in milliseconds.
    pub scrape_delay_min_ms: u64,
    pub scrape_delay_max_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            hunter_api_key: None,
            hunter_base_url: "https://api.hunter.io".to_string(),
            max_concurrency: 3,
            http_timeout_secs: 15,
            smtp_timeout_secs: 10,
            scrape_delay_min_ms: 300,
            scrape_delay_max_ms: 800,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();
        let config = Self {
            port: std::env::var("PORT")
                .map(|v| v.parse())
                .unwrap_or(Ok(defaults.port))
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            hunter_api_key: std::env::var("HUNTER_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            hunter_base_url: std::env::var("HUNTER_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("HUNTER_BASE_URL must start with http:// or https://");
                    }
                    Ok(url.trim_end_matches('/').to_string())
                })
                .transpose()?
                .unwrap_or(defaults.hunter_base_url),
            max_concurrency: std::env::var("MAX_CONCURRENCY")
                .map(|v| v.parse())
                .unwrap_or(Ok(defaults.max_concurrency))
                .map_err(|_| anyhow::anyhow!("MAX_CONCURRENCY must be a positive number"))
                .and_then(|n| {
                    if n == 0 {
                        anyhow::bail!("MAX_CONCURRENCY must be at least 1");
                    }
                    Ok(n)
                })?,
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .map(|v| v.parse())
                .unwrap_or(Ok(defaults.http_timeout_secs))
                .map_err(|_| anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a number"))?,
            smtp_timeout_secs: std::env::var("SMTP_TIMEOUT_SECS")
                .map(|v| v.parse())
                .unwrap_or(Ok(defaults.smtp_timeout_secs))
                .map_err(|_| anyhow::anyhow!("SMTP_TIMEOUT_SECS must be a number"))?,
            scrape_delay_min_ms: std::env::var("SCRAPE_DELAY_MIN_MS")
                .map(|v| v.parse())
                .unwrap_or(Ok(defaults.scrape_delay_min_ms))
                .map_err(|_| anyhow::anyhow!("SCRAPE_DELAY_MIN_MS must be a number"))?,
            scrape_delay_max_ms: std::env::var("SCRAPE_DELAY_MAX_MS")
                .map(|v| v.parse())
                .unwrap_or(Ok(defaults.scrape_delay_max_ms))
                .map_err(|_| anyhow::anyhow!("SCRAPE_DELAY_MAX_MS must be a number"))?,
        };

        if config.scrape_delay_min_ms > config.scrape_delay_max_ms {
            anyhow::bail!("SCRAPE_DELAY_MIN_MS must not exceed SCRAPE_DELAY_MAX_MS");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("Bulk concurrency: {}", config.max_concurrency);
        if config.hunter_api_key.is_some() {
            tracing::info!("Email-finder API key configured");
        } else {
            tracing::info!("No email-finder API key; third-party lookup disabled");
        }

        Ok(config)
    }
}
