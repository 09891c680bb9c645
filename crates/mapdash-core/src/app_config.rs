use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub log_level: String,
    pub territory_boundaries_path: PathBuf,
    pub county_boundaries_path: PathBuf,
    pub aliases_path: Option<PathBuf>,
    pub report_base_url: String,
    pub generation_base_url: String,
    pub http_user_agent: String,
    pub generation_timeout_secs: u64,
    pub generation_max_attempts: u32,
    pub generation_backoff_base_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("territory_boundaries_path", &self.territory_boundaries_path)
            .field("county_boundaries_path", &self.county_boundaries_path)
            .field("aliases_path", &self.aliases_path)
            .field("report_base_url", &self.report_base_url)
            .field("generation_base_url", &self.generation_base_url)
            .field("http_user_agent", &self.http_user_agent)
            .field("generation_timeout_secs", &self.generation_timeout_secs)
            .field("generation_max_attempts", &self.generation_max_attempts)
            .field(
                "generation_backoff_base_secs",
                &self.generation_backoff_base_secs,
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
