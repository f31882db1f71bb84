use std::path::PathBuf;

use axum::http::HeaderValue;
use claims_engine::validate::Thresholds;

use crate::error::AppError;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration, read once at startup and never changed afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
    /// Allowed CORS origins. `None` allows any origin.
    pub cors_origins: Option<Vec<HeaderValue>>,
    pub thresholds: Thresholds,
    /// JSON table of incompatible procedure/diagnosis pairs.
    pub compat_table_path: Option<PathBuf>,
}

impl Config {
    /// All variables are optional:
    /// - `CLAIMS_BIND_ADDR` (default "0.0.0.0:5000")
    /// - `CLAIMS_MAX_UPLOAD_BYTES` (default 10 MiB)
    /// - `CLAIMS_CORS_ORIGINS`: comma-separated origins (default: any)
    /// - `CLAIMS_CPT_MIN_LEN`, `CLAIMS_CPT_MAX_LEN`, `CLAIMS_NPI_LEN`, `CLAIMS_ICD10_MIN_LEN`
    /// - `CLAIMS_COMPAT_TABLE`: path to the compatibility table
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let bind_addr = lookup("CLAIMS_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let max_upload_bytes =
            parse_var(&lookup, "CLAIMS_MAX_UPLOAD_BYTES")?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        if max_upload_bytes == 0 {
            return Err(AppError::Config(
                "CLAIMS_MAX_UPLOAD_BYTES must be greater than zero".to_string(),
            ));
        }

        let cors_origins = lookup("CLAIMS_CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .transpose()?;

        let defaults = Thresholds::default();
        let thresholds = Thresholds {
            cpt_min_len: parse_var(&lookup, "CLAIMS_CPT_MIN_LEN")?.unwrap_or(defaults.cpt_min_len),
            cpt_max_len: parse_var(&lookup, "CLAIMS_CPT_MAX_LEN")?.unwrap_or(defaults.cpt_max_len),
            npi_len: parse_var(&lookup, "CLAIMS_NPI_LEN")?.unwrap_or(defaults.npi_len),
            icd10_min_len: parse_var(&lookup, "CLAIMS_ICD10_MIN_LEN")?
                .unwrap_or(defaults.icd10_min_len),
        };

        let compat_table_path = lookup("CLAIMS_COMPAT_TABLE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind_addr,
            max_upload_bytes,
            cors_origins,
            thresholds,
            compat_table_path,
        })
    }
}

fn parse_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<usize>, AppError> {
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<usize>()
                .map_err(|_| AppError::Config(format!("{key} must be a non-negative integer, got {raw:?}")))
        })
        .transpose()
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, AppError> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| AppError::Config(format!("invalid CORS origin: {origin:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if origins.is_empty() {
        return Err(AppError::Config(
            "CLAIMS_CORS_ORIGINS is set but lists no origins".to_string(),
        ));
    }
    Ok(origins)
}
