use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Listener ports shared by every service binary.
///
/// Read from an optional `configuration` file and `APP__*` environment
/// variables (for example `APP__GRPC_PORT=44044`).
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,
    #[serde(default = "default_gateway_port")]
    pub gateway_port: u16,
}

fn default_grpc_port() -> u16 {
    44044
}

fn default_gateway_port() -> u16 {
    8081
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grpc_port: default_grpc_port(),
            gateway_port: default_gateway_port(),
        }
    }
}
