//! Server configuration, read from `STREAMLET_*` environment variables.

use crate::error::{Result, StreamletError};
use crate::protocol::DEFAULT_MAX_FRAME_LEN;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9092;
/// Matches the broker default `connections.max.idle.ms` of ten minutes.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    pub addr: String,
    /// Largest accepted request payload; larger length prefixes drop the connection.
    pub max_frame_len: usize,
    /// Deadline for reading one frame or writing one response.
    pub io_timeout: Duration,
    /// Answer unknown api keys with an error frame instead of closing the connection.
    pub unsupported_reply: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            io_timeout: DEFAULT_IO_TIMEOUT,
            unsupported_reply: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = ServerConfig::default();

        cfg.addr = match get("STREAMLET_ADDR") {
            Some(addr) => addr,
            None => {
                let host = get("STREAMLET_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
                let port = match get("STREAMLET_PORT") {
                    Some(raw) => parse_number::<u16>("STREAMLET_PORT", &raw)?,
                    None => DEFAULT_PORT,
                };
                format!("{}:{}", host, port)
            }
        };
        if let Some(raw) = get("STREAMLET_MAX_FRAME_BYTES") {
            cfg.max_frame_len = parse_number("STREAMLET_MAX_FRAME_BYTES", &raw)?;
        }
        if let Some(raw) = get("STREAMLET_IO_TIMEOUT_SECS") {
            cfg.io_timeout = Duration::from_secs(parse_number("STREAMLET_IO_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = get("STREAMLET_REPLY_UNSUPPORTED") {
            cfg.unsupported_reply = parse_flag("STREAMLET_REPLY_UNSUPPORTED", &raw)?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_frame_len == 0 {
            return Err(StreamletError::Config("max frame length must be positive".into()));
        }
        if self.io_timeout.is_zero() {
            return Err(StreamletError::Config("io timeout must be positive".into()));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| StreamletError::Config(format!("{}: invalid number {:?}", key, raw)))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw {
        "1" | "true" | "TRUE" | "yes" | "YES" => Ok(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Ok(false),
        _ => Err(StreamletError::Config(format!("{}: invalid flag {:?}", key, raw))),
    }
}
