use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Which browser origins may open a websocket or call the HTTP endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

/// Server configuration.
///
/// | Env Var                        | Default                                          |
/// |--------------------------------|--------------------------------------------------|
/// | `WHITEBOARD_BIND`              | `127.0.0.1:<PORT>`                               |
/// | `PORT`                         | `3001`                                           |
/// | `WHITEBOARD_ALLOWED_ORIGINS`   | `http://localhost:5173,http://localhost:3000`   |
/// | `WHITEBOARD_CONNECTION_BUFFER` | `256`                                            |
///
/// `WHITEBOARD_ALLOWED_ORIGINS=*` allows any origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub allowed_origins: AllowedOrigins,
    /// Capacity of each connection's outbound queue.
    pub connection_buffer: usize,
}

const DEFAULT_PORT: u16 = 3001;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            allowed_origins: AllowedOrigins::List(vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ]),
            connection_buffer: 256,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(port) = vars.get("PORT") {
            let port: u16 = parse("PORT", "port number", port)?;
            config.bind_addr = format!("127.0.0.1:{}", port);
        }
        if let Some(bind_addr) = vars.get("WHITEBOARD_BIND") {
            config.bind_addr = bind_addr.trim().to_string();
        }
        if let Some(origins) = vars.get("WHITEBOARD_ALLOWED_ORIGINS") {
            config.allowed_origins = parse_origins(origins);
        }
        if let Some(buffer) = vars.get("WHITEBOARD_CONNECTION_BUFFER") {
            let buffer: usize = parse("WHITEBOARD_CONNECTION_BUFFER", "positive integer", buffer)?;
            if buffer == 0 {
                return Err(ConfigError::Invalid {
                    name: "WHITEBOARD_CONNECTION_BUFFER",
                    expected: "positive integer",
                    value: buffer.to_string(),
                });
            }
            config.connection_buffer = buffer;
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
    value: &str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value: value.to_string(),
    })
}

fn parse_origins(value: &str) -> AllowedOrigins {
    let origins = value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();
    if origins.iter().any(|origin| origin == "*") {
        AllowedOrigins::Any
    } else {
        AllowedOrigins::List(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn it_should_use_defaults_without_env() {
        assert_eq!(
            ServerConfig::from_vars(HashMap::new()),
            Ok(ServerConfig::default())
        );
    }

    #[test]
    fn it_should_prefer_explicit_bind_over_port() {
        let config = ServerConfig::from_vars(vars(&[("PORT", "4000")])).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:4000");

        let config = ServerConfig::from_vars(vars(&[
            ("PORT", "4000"),
            ("WHITEBOARD_BIND", "0.0.0.0:8080"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn it_should_parse_origin_list() {
        let config = ServerConfig::from_vars(vars(&[(
            "WHITEBOARD_ALLOWED_ORIGINS",
            "https://a.example, ,https://b.example",
        )]))
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            AllowedOrigins::List(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );

        let config =
            ServerConfig::from_vars(vars(&[("WHITEBOARD_ALLOWED_ORIGINS", "*")])).unwrap();
        assert_eq!(config.allowed_origins, AllowedOrigins::Any);
    }

    #[test]
    fn it_should_reject_invalid_numbers() {
        assert!(ServerConfig::from_vars(vars(&[("PORT", "http")])).is_err());
        assert!(
            ServerConfig::from_vars(vars(&[("WHITEBOARD_CONNECTION_BUFFER", "0")])).is_err()
        );
        assert!(
            ServerConfig::from_vars(vars(&[("WHITEBOARD_CONNECTION_BUFFER", "-3")])).is_err()
        );
    }
}
