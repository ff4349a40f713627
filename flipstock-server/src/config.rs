//! Command line and environment configuration

use clap::{Arg, ArgMatches, Command};
use flipstock_core::{AuthConfig, FlipstockError, Result};
use secrecy::SecretString;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Everything the server needs to start
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub bind: SocketAddr,
    pub log_format: LogFormat,
    pub auth: AuthConfig,
}

pub fn cli() -> Command {
    Command::new("flipstock-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Multi-tenant inventory and resale tracker")
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .env("FLIPSTOCK_DATA_DIR")
                .value_name("PATH")
                .help("Data directory path")
                .default_value("./data"),
        )
        .arg(
            Arg::new("bind")
                .long("bind")
                .env("FLIPSTOCK_BIND")
                .value_name("ADDR")
                .help("Bind address")
                .default_value("127.0.0.1:8080"),
        )
        .arg(
            Arg::new("jwt-secret")
                .long("jwt-secret")
                .env("JWT_SECRET_KEY")
                .value_name("SECRET")
                .help("Secret used to sign session tokens")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new("password-secret")
                .long("password-secret")
                .env("PASSWORDS_SALT_SECRET_KEY")
                .value_name("SECRET")
                .help("Process-wide secret mixed into credential hashes")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new("token-ttl-secs")
                .long("token-ttl-secs")
                .env("FLIPSTOCK_TOKEN_TTL_SECS")
                .value_name("SECONDS")
                .help("Session token lifetime")
                .value_parser(clap::value_parser!(u64))
                .default_value("86400"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("Log output format")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
}

impl ServerConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let data_dir = PathBuf::from(required(matches, "data-dir")?);

        let bind = required(matches, "bind")?;
        let bind: SocketAddr = bind
            .parse()
            .map_err(|_| FlipstockError::Config(format!("invalid bind address: {}", bind)))?;

        let log_format = match matches.get_one::<String>("log-format").map(String::as_str) {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let ttl = matches
            .get_one::<u64>("token-ttl-secs")
            .copied()
            .ok_or_else(|| FlipstockError::Config("missing token-ttl-secs".to_string()))?;

        let auth = AuthConfig::new(
            SecretString::from(required(matches, "jwt-secret")?.to_string()),
            SecretString::from(required(matches, "password-secret")?.to_string()),
        )
        .with_token_ttl(Duration::from_secs(ttl));
        auth.validate()?;

        Ok(ServerConfig {
            data_dir,
            bind,
            log_format,
            auth,
        })
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| FlipstockError::Config(format!("missing {}", name)))
}
