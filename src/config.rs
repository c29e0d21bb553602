use crate::{cli::Cli, error::TrackerResult};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;
use tracing::Level;

const TRACE_LEVELS: [&'static str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
const LOCAL_SETTINGS_YAML_FILE: &'static str = ".env.local.yaml";

// All settings may be configured via environment variables. Example:
// ATCODER_SESSION_COOKIE="xxx" would set atcoder_session_cookie to the xxx value.
// The roster accepts either a list (ROSTER="[a, b]") or a comma separated string.
#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    #[serde(default = "default_trace_level")]
    trace_level: String,
    #[serde(default = "default_atcoder_base_url")]
    pub atcoder_base_url: String,
    #[serde(default = "default_atcoder_api_timeout_sec")]
    pub atcoder_api_timeout_sec: u64,
    // Value of the REVEL_SESSION cookie, required by the standings feed.
    pub atcoder_session_cookie: String,
    #[serde(deserialize_with = "list_or_comma_separated")]
    pub roster: Vec<String>,
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_browser_timeout_sec")]
    pub browser_timeout_sec: u64,
    #[serde(default = "default_contests_refresh_schedule")]
    pub contests_refresh_schedule: String,
    #[serde(default = "default_ratings_refresh_schedule")]
    pub ratings_refresh_schedule: String,
    // Pause between two consecutive profile requests of a refresh cycle.
    #[serde(default = "default_profile_request_interval_ms")]
    pub profile_request_interval_ms: u64,
}

impl Settings {
    pub fn new(cli: &Cli) -> TrackerResult<Self> {
        let settings = Settings::figment(cli).extract()?;
        Ok(settings)
    }

    pub fn figment(cli: &Cli) -> Figment {
        let mut figment = Figment::new();
        if Path::new(LOCAL_SETTINGS_YAML_FILE).exists() {
            // Logging is not installed yet at this point.
            println!("Found '{LOCAL_SETTINGS_YAML_FILE}' file, loading local configuration.");
            figment = figment.merge(Yaml::file(LOCAL_SETTINGS_YAML_FILE));
        }
        figment.merge(Env::raw()).merge(Serialized::defaults(cli))
    }

    pub fn get_trace_level(&self) -> Level {
        get_trace_level(&self.trace_level)
    }

    pub fn atcoder_api_timeout(&self) -> Duration {
        Duration::from_secs(self.atcoder_api_timeout_sec)
    }

    pub fn browser_timeout(&self) -> Duration {
        Duration::from_secs(self.browser_timeout_sec)
    }

    pub fn profile_request_interval(&self) -> Duration {
        Duration::from_millis(self.profile_request_interval_ms)
    }
}

fn get_trace_level(level_str: &str) -> Level {
    match level_str.to_uppercase() {
        level if level == TRACE_LEVELS[0] => Level::TRACE,
        level if level == TRACE_LEVELS[1] => Level::DEBUG,
        level if level == TRACE_LEVELS[2] => Level::INFO,
        level if level == TRACE_LEVELS[3] => Level::WARN,
        level if level == TRACE_LEVELS[4] => Level::ERROR,
        // Default trace level
        _ => Level::INFO,
    }
}

fn list_or_comma_separated<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrString {
        List(Vec<String>),
        String(String),
    }

    let values = match ListOrString::deserialize(deserializer)? {
        ListOrString::List(list) => list,
        ListOrString::String(s) => s.split(',').map(|id| id.to_string()).collect(),
    };
    Ok(values
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect())
}

fn default_trace_level() -> String {
    "INFO".to_string()
}

fn default_atcoder_base_url() -> String {
    "https://atcoder.jp".to_string()
}

fn default_atcoder_api_timeout_sec() -> u64 {
    10
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_browser_timeout_sec() -> u64 {
    30
}

// Every hour, on the hour.
fn default_contests_refresh_schedule() -> String {
    "0 0 * * * *".to_string()
}

// Every two hours.
fn default_ratings_refresh_schedule() -> String {
    "0 0 */2 * * *".to_string()
}

fn default_profile_request_interval_ms() -> u64 {
    1000
}
