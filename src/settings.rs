//! Process-level settings.
//!
//! Everything is overridable through the environment; `.env` files are
//! honored for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use cw_app::WizardConfig;
use cw_infra::http::zip_lookup::DEFAULT_ZIP_LOOKUP_URL;

const DATA_DIR_NAME: &str = "checkout-wizard";

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Base URL of the checkout service.
    pub checkout_base_url: String,
    /// Base URL of the phone verification service.
    pub verification_base_url: String,
    /// Base URL of the zip lookup service.
    pub zip_lookup_base_url: String,
    /// Directory holding the persisted session file.
    pub data_dir: PathBuf,
    pub wizard: WizardConfig,
}

impl EngineSettings {
    /// Load settings from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine; real env vars still apply.
        dotenvy::dotenv().ok();

        let mut wizard = WizardConfig::default();
        if let Some(secs) = env_u64("CHECKOUT_REDIRECT_DELAY_SECS")? {
            wizard.redirect_delay = Duration::from_secs(secs);
        }
        if let Ok(url) = env::var("CHECKOUT_REDIRECT_URL") {
            wizard.redirect_url = url;
        }
        if let Ok(url) = env::var("CHECKOUT_PLANS_URL") {
            wizard.plans_url = url;
        }

        Ok(Self {
            checkout_base_url: env::var("CHECKOUT_API_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            verification_base_url: env::var("CHECKOUT_VERIFICATION_API_URL")
                .unwrap_or_else(|_| "http://localhost:3002".to_string()),
            zip_lookup_base_url: env::var("CHECKOUT_ZIP_LOOKUP_URL")
                .unwrap_or_else(|_| DEFAULT_ZIP_LOOKUP_URL.to_string()),
            data_dir: data_dir()?,
            wizard,
        })
    }
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match env::var(key) {
        Ok(value) => {
            let parsed = value
                .parse::<u64>()
                .with_context(|| format!("{key} must be an integer, got {value:?}"))?;
            Ok(Some(parsed))
        }
        Err(_) => Ok(None),
    }
}

fn data_dir() -> Result<PathBuf> {
    if let Ok(path) = env::var("CHECKOUT_DATA_DIR") {
        return Ok(PathBuf::from(path));
    }
    let base_dir = dirs::data_dir().context("could not find a data directory")?;
    Ok(base_dir.join(DATA_DIR_NAME))
}
