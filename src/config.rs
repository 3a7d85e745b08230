use crate::errors::{EngineError, EngineResult};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();

        let server_port = env_var_or("SERVER_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| EngineError::Config(format!("SERVER_PORT: {e}")))?;

        Ok(Self {
            server_host: env_var_or("SERVER_HOST", "0.0.0.0"),
            server_port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr() {
        let cfg = AppConfig {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
        };
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8080");
    }
}
