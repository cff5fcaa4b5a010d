use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub registration: RegistrationMode,
    pub max_body_size: usize,
    pub upload_dir: PathBuf,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationMode {
    Open,
    Closed,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("PORTAL_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid PORTAL_HOST: {e}"))?;

        let port: u16 = env_or("PORTAL_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid PORTAL_PORT: {e}"))?;

        let base_url = env_or("PORTAL_BASE_URL", &format!("http://{host}:{port}"));

        let registration = parse_registration(&env_or("PORTAL_REGISTRATION", "closed"));

        // Large enough for research log attachments.
        let max_body_size: usize = env_or("PORTAL_MAX_BODY_SIZE", "10485760")
            .parse()
            .map_err(|e| format!("Invalid PORTAL_MAX_BODY_SIZE: {e}"))?;

        let upload_dir = PathBuf::from(env_or("PORTAL_UPLOAD_DIR", "public/uploads"));

        let log_level = env_or("PORTAL_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            base_url,
            registration,
            max_body_size,
            upload_dir,
            log_level,
        })
    }
}

fn parse_registration(value: &str) -> RegistrationMode {
    match value.trim().to_ascii_lowercase().as_str() {
        "open" => RegistrationMode::Open,
        _ => RegistrationMode::Closed,
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_defaults_to_closed() {
        assert_eq!(parse_registration("open"), RegistrationMode::Open);
        assert_eq!(parse_registration(" OPEN "), RegistrationMode::Open);
        assert_eq!(parse_registration("closed"), RegistrationMode::Closed);
        assert_eq!(parse_registration("anything"), RegistrationMode::Closed);
    }
}
