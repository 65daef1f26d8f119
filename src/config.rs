// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub request_timeout_secs: u64,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");

        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8000);
        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(20);
        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(30);

        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|value| parse_origins(&value))
            .unwrap_or_else(|_| vec!["http://localhost:5173".to_string()]);

        Config {
            database_url,
            jwt_secret,
            port,
            db_max_connections,
            request_timeout_secs,
            cors_origins,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_origins;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        let origins = parse_origins(" https://app.example.com, ,http://localhost:5173 ");
        assert_eq!(
            origins,
            vec!["https://app.example.com", "http://localhost:5173"]
        );
    }
}
