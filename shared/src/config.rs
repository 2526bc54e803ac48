pub struct ClientConfig {
    pub api_base_url: &'static str,
    pub uploads_path: &'static str,
    pub poll_interval_ms: u32,
    pub alert_timeout_ms: u32,
    pub log_filter: &'static str,
}

const fn env_or(value: Option<&'static str>, default: &'static str) -> &'static str {
    match value {
        Some(v) => v,
        None => default,
    }
}

impl ClientConfig {
    pub const fn new() -> Self {
        Self {
            api_base_url: env_or(option_env!("BALLOT_API_BASE_URL"), ""),
            uploads_path: env_or(option_env!("BALLOT_UPLOADS_PATH"), "/static/uploads"),
            poll_interval_ms: 30_000,
            alert_timeout_ms: 5_000,
            log_filter: env_or(option_env!("BALLOT_LOG_FILTER"), "info"),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub const CONFIG: ClientConfig = ClientConfig::new();
