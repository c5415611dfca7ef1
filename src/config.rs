//! Service configuration.
//!
//! Values come from the environment (a `.env` file is loaded first by `main`).
//! Missing credentials for the selected provider are reported as errors so
//! `main` can refuse to start; nothing here exits the process.

use anyhow::{bail, Context, Result};
use std::time::Duration;

use crate::ocr::azapi::{self, AzapiProvider};
use crate::ocr::formx::FormXProvider;
use crate::ocr::nanonets::NanonetsProvider;
use crate::ocr::tesseract::TesseractProvider;
use crate::ocr::{OcrProvider, OcrProviderKind};
use crate::predictions::DEFAULT_MIN_SCORE;
use crate::structured::FallbackScan;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Credentials and endpoint for the selected provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderSettings {
    Azapi { api_key: String, endpoint: String },
    FormX { api_key: String, extractor_id: String },
    Nanonets { api_key: String, model_id: String },
    Tesseract { binary: String },
}

impl ProviderSettings {
    pub fn kind(&self) -> OcrProviderKind {
        match self {
            Self::Azapi { .. } => OcrProviderKind::Azapi,
            Self::FormX { .. } => OcrProviderKind::FormX,
            Self::Nanonets { .. } => OcrProviderKind::Nanonets,
            Self::Tesseract { .. } => OcrProviderKind::Tesseract,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub port: u16,
    pub provider: ProviderSettings,
    pub upstream_timeout: Duration,
    pub max_upload_bytes: usize,
    /// Predictions below this confidence are ignored by the picker.
    pub min_score: f64,
    pub fallback_scan: FallbackScan,
}

impl ServiceConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).with_context(|| format!("{} not set", key));

        let port = match get("PORT") {
            Some(v) => v.parse().with_context(|| format!("Invalid PORT: {}", v))?,
            None => DEFAULT_PORT,
        };

        let kind_name = get("ID_PROVIDER").unwrap_or_else(|| "azapi".to_string());
        let Some(kind) = OcrProviderKind::parse(&kind_name) else {
            bail!(
                "Unknown ID_PROVIDER: {}. Available: azapi, formx, nanonets, tesseract",
                kind_name
            );
        };

        let provider = match kind {
            OcrProviderKind::Azapi => ProviderSettings::Azapi {
                api_key: require("AZAPI_API_KEY")?,
                endpoint: get("AZAPI_ENDPOINT").unwrap_or_else(|| azapi::DEFAULT_ENDPOINT.to_string()),
            },
            OcrProviderKind::FormX => ProviderSettings::FormX {
                api_key: require("FORMX_API_KEY")?,
                extractor_id: require("FORMX_EXTRACTOR_ID")?,
            },
            OcrProviderKind::Nanonets => ProviderSettings::Nanonets {
                api_key: require("NANONETS_API_KEY")?,
                model_id: require("NANONETS_MODEL_ID")?,
            },
            OcrProviderKind::Tesseract => ProviderSettings::Tesseract {
                binary: get("TESSERACT_BIN").unwrap_or_else(|| "tesseract".to_string()),
            },
        };

        let timeout_secs = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("Invalid UPSTREAM_TIMEOUT_SECS: {}", v))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(v) => v
                .parse()
                .with_context(|| format!("Invalid MAX_UPLOAD_BYTES: {}", v))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let min_score = match get("PREDICTION_MIN_SCORE") {
            Some(v) => v
                .parse::<f64>()
                .with_context(|| format!("Invalid PREDICTION_MIN_SCORE: {}", v))?,
            None => DEFAULT_MIN_SCORE,
        };
        if !(0.0..=1.0).contains(&min_score) {
            bail!("PREDICTION_MIN_SCORE must be within [0, 1], got {}", min_score);
        }

        let fallback_scan = match get("FALLBACK_SCAN").as_deref().map(str::to_ascii_lowercase) {
            None => FallbackScan::Enabled,
            Some(v) => match v.as_str() {
                "1" | "true" | "on" => FallbackScan::Enabled,
                "0" | "false" | "off" => FallbackScan::Disabled,
                _ => bail!("Invalid FALLBACK_SCAN: {} (expected on/off)", v),
            },
        };

        Ok(Self {
            port,
            provider,
            upstream_timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes,
            min_score,
            fallback_scan,
        })
    }

    /// Build the configured provider.
    pub fn build_provider(&self) -> Result<Box<dyn OcrProvider>> {
        let client = reqwest::Client::builder()
            .timeout(self.upstream_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let provider: Box<dyn OcrProvider> = match &self.provider {
            ProviderSettings::Azapi { api_key, endpoint } => {
                Box::new(AzapiProvider::new(client, api_key.clone(), endpoint.clone()))
            }
            ProviderSettings::FormX {
                api_key,
                extractor_id,
            } => Box::new(FormXProvider::new(
                client,
                api_key.clone(),
                extractor_id.clone(),
            )),
            ProviderSettings::Nanonets { api_key, model_id } => Box::new(NanonetsProvider::new(
                client,
                api_key.clone(),
                model_id.clone(),
            )),
            ProviderSettings::Tesseract { binary } => Box::new(TesseractProvider::new(binary.clone())),
        };
        Ok(provider)
    }
}
