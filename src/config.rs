use worker::Env;

use crate::models::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PREVIEW_TTL_SECONDS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub max_upload_bytes: usize,
    pub preview_ttl_seconds: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            preview_ttl_seconds: DEFAULT_PREVIEW_TTL_SECONDS,
        }
    }
}

impl AppConfig {
    /// Reads `MAX_UPLOAD_BYTES` and `PREVIEW_TTL_SECONDS`, keeping the default
    /// for anything missing, unparsable or zero.
    pub fn from_env(env: &Env) -> Self {
        let var = |name: &str| env.var(name).ok().map(|value| value.to_string());
        Self::from_vars(
            var("MAX_UPLOAD_BYTES").as_deref(),
            var("PREVIEW_TTL_SECONDS").as_deref(),
        )
    }

    pub fn from_vars(max_upload_bytes: Option<&str>, preview_ttl_seconds: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            max_upload_bytes: parse_positive(max_upload_bytes).unwrap_or(defaults.max_upload_bytes),
            preview_ttl_seconds: parse_positive(preview_ttl_seconds)
                .unwrap_or(defaults.preview_ttl_seconds),
        }
    }
}

fn parse_positive<T>(raw: Option<&str>) -> Option<T>
where
    T: std::str::FromStr + Default + PartialEq,
{
    raw.and_then(|value| value.trim().parse::<T>().ok())
        .filter(|value| *value != T::default())
}
