use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub token_secret: String,
    pub token_ttl_secs: i64,
    pub payment_secret: String,
    pub scan_quota_per_day: u32,
    pub quota_utc_offset_minutes: i32,
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "5001".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/linkguard.db".to_string());

        let token_secret =
            env::var("TOKEN_SECRET").map_err(|_| "TOKEN_SECRET must be set for session tokens")?;

        let token_ttl_secs = env::var("TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "604800".to_string()) // 7 days
            .parse()
            .map_err(|_| "Invalid TOKEN_TTL_SECS")?;

        let payment_secret = env::var("PAYMENT_KEY_SECRET")
            .map_err(|_| "PAYMENT_KEY_SECRET must be set for payment signature verification")?;

        let scan_quota_per_day = env::var("SCAN_QUOTA_PER_DAY")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| "Invalid SCAN_QUOTA_PER_DAY")?;

        // Day boundary for the free-tier quota. Defaults to the server's local
        // offset at startup so "today" matches the machine's wall clock.
        let quota_utc_offset_minutes = match env::var("QUOTA_UTC_OFFSET_MINUTES") {
            Ok(v) => v.parse().map_err(|_| "Invalid QUOTA_UTC_OFFSET_MINUTES")?,
            Err(_) => chrono::Local::now().offset().local_minus_utc() / 60,
        };
        if !(-1439..=1439).contains(&quota_utc_offset_minutes) {
            return Err("QUOTA_UTC_OFFSET_MINUTES out of range".to_string());
        }

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            server_host,
            server_port,
            database_path,
            token_secret,
            token_ttl_secs,
            payment_secret,
            scan_quota_per_day,
            quota_utc_offset_minutes,
            environment,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Build the scan policy for the decision engine
    pub fn scan_policy(&self) -> crate::scan::ScanPolicy {
        crate::scan::ScanPolicy::new(self.scan_quota_per_day, self.quota_utc_offset_minutes)
    }
}
