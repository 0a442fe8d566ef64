//! Environment-driven application configuration.

use std::env;

use anyhow::Context;

/// Default HTTP port when `PORT` is not set.
const DEFAULT_PORT: u16 = 8080;
/// Default frontend base URL used in activation links.
const DEFAULT_FRONT_URL: &str = "http://localhost:5173";

/// Immutable runtime configuration loaded once at startup.
#[derive(Clone)]
pub struct AppConfig {
    /// Port the HTTP listener binds to.
    pub port: u16,
    /// Secret signing the short-lived access tokens.
    pub access_secret: String,
    /// Secret signing the long-lived refresh tokens.
    pub refresh_secret: String,
    /// Frontend base URL embedded in activation links.
    pub front_url: String,
}

impl AppConfig {
    /// Load the configuration from the environment.
    ///
    /// The two token secrets are mandatory; the process must not come up
    /// without them.
    pub fn from_env() -> anyhow::Result<Self> {
        let access_secret = env::var("ACCESS_SECRET").context("ACCESS_SECRET must be set")?;
        let refresh_secret = env::var("REFRESH_SECRET").context("REFRESH_SECRET must be set")?;

        let front_url = env::var("FRONT_URL").unwrap_or_else(|_| DEFAULT_FRONT_URL.to_owned());
        let port = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            port,
            access_secret,
            refresh_secret,
            front_url,
        })
    }
}
