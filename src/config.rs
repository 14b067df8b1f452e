use std::{env, net::SocketAddr, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub port: u16,
}

#[derive(Debug, thiserror::Error)]
#[error("PORT must be a number between 0 and 65535, got {0:?}")]
pub struct InvalidPort(String);

impl Config {
    pub fn from_env() -> Result<Self, InvalidPort> {
        let data_dir = env::var("APP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
        let port = parse_port(env::var("PORT").ok())?;

        Ok(Self { data_dir, port })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn parse_port(raw: Option<String>) -> Result<u16, InvalidPort> {
    match raw {
        None => Ok(DEFAULT_PORT),
        Some(value) => value.trim().parse().map_err(|_| InvalidPort(value)),
    }
}
