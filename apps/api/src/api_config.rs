use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ipnet::IpNet;
use smartsales_core::AppError;
use tracing_subscriber::EnvFilter;

/// Generative-text settings; present only when an API key is configured.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

/// Speech-to-text endpoint settings.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub media_root: PathBuf,
    pub trusted_proxies: Vec<IpNet>,
    pub gemini: Option<GeminiConfig>,
    pub ai_timeout: Duration,
    pub speech: Option<SpeechConfig>,
    pub stripe_secret_key: Option<String>,
    pub bootstrap_admin_token: Option<String>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let media_root =
            PathBuf::from(env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".to_owned()));
        let trusted_proxies =
            parse_trusted_proxies(&env::var("TRUSTED_PROXIES").unwrap_or_default())?;

        let gemini = optional_env("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key,
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_owned()),
        });
        let ai_timeout = Duration::from_millis(
            env::var("AI_TIMEOUT_MS")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(5_000),
        );
        let speech = optional_env("SPEECH_TO_TEXT_URL").map(|endpoint| SpeechConfig {
            endpoint,
            api_key: optional_env("SPEECH_TO_TEXT_API_KEY"),
        });

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            media_root,
            trusted_proxies,
            gemini,
            ai_timeout,
            speech,
            stripe_secret_key: optional_env("STRIPE_SECRET_KEY"),
            bootstrap_admin_token: optional_env("BOOTSTRAP_ADMIN_TOKEN"),
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Parses a comma separated list of CIDRs or bare addresses.
fn parse_trusted_proxies(value: &str) -> Result<Vec<IpNet>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            if let Ok(network) = entry.parse::<IpNet>() {
                return Ok(network);
            }
            entry.parse::<IpAddr>().map(IpNet::from).map_err(|error| {
                AppError::Validation(format!("invalid TRUSTED_PROXIES entry '{entry}': {error}"))
            })
        })
        .collect()
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::parse_trusted_proxies;

    #[test]
    fn trusted_proxies_accept_cidrs_and_addresses() {
        let Ok(proxies) = parse_trusted_proxies(" 10.0.0.0/8, 127.0.0.1 ,,::1") else {
            panic!("entries should parse");
        };

        assert_eq!(proxies.len(), 3);
        assert_eq!(proxies[1].to_string(), "127.0.0.1/32");
    }

    #[test]
    fn trusted_proxies_reject_garbage() {
        assert!(parse_trusted_proxies("not-an-ip").is_err());
        assert!(matches!(parse_trusted_proxies(""), Ok(list) if list.is_empty()));
    }
}
