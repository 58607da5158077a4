//! Runtime settings: expiry policy, storage tariff, log output.
//!
//! Every field has a default, so an empty JSON object (or no environment at
//! all) yields a usable configuration.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult, ensure_non_negative};

/// Environment variable overriding [`ExpiryPolicy::critical_within_days`].
pub const ENV_CRITICAL_DAYS: &str = "SCWOS_CRITICAL_DAYS";
/// Environment variable toggling JSON log output (`true` / `false`).
pub const ENV_LOG_JSON: &str = "SCWOS_LOG_JSON";
/// Standard tracing filter variable.
pub const ENV_LOG_FILTER: &str = "RUST_LOG";

/// When a perishable item stops being FRESH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiryPolicy {
    /// Items expiring within this many days (inclusive) are CRITICAL.
    pub critical_within_days: i64,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            critical_within_days: 3,
        }
    }
}

/// Daily storage rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageTariff {
    /// Cost per cubic metre per day for cold storage.
    pub perishable_volume_rate: f64,
    /// Cooling energy per kilogram per day, before the temperature factor.
    pub perishable_energy_per_kg: f64,
    /// Energy factor for items kept above 0 C.
    pub chilled_energy_factor: f64,
    /// Energy factor for items kept at or below 0 C.
    pub frozen_energy_factor: f64,
    /// Cost per cubic metre per day for dry storage.
    pub durable_volume_rate: f64,
    /// Multiplier applied to fragile durable goods.
    pub fragile_surcharge: f64,
}

impl Default for StorageTariff {
    fn default() -> Self {
        Self {
            perishable_volume_rate: 5.0,
            perishable_energy_per_kg: 0.1,
            chilled_energy_factor: 1.5,
            frozen_energy_factor: 3.0,
            durable_volume_rate: 2.0,
            fragile_surcharge: 1.20,
        }
    }
}

/// Log output settings consumed by `scwos-observability`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub expiry: ExpiryPolicy,
    pub tariff: StorageTariff,
    pub log: LogSettings,
}

impl Settings {
    /// Parse a (possibly partial) JSON document; missing fields keep their defaults.
    pub fn from_json(raw: &str) -> DomainResult<Self> {
        let settings: Settings = serde_json::from_str(raw)
            .map_err(|e| DomainError::validation(format!("invalid settings document: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults overridden by `SCWOS_CRITICAL_DAYS`, `SCWOS_LOG_JSON` and `RUST_LOG`.
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(raw) = lookup(ENV_CRITICAL_DAYS) {
            settings.expiry.critical_within_days = raw.trim().parse().map_err(|_| {
                DomainError::validation(format!("{ENV_CRITICAL_DAYS} must be an integer, got {raw:?}"))
            })?;
        }

        if let Some(raw) = lookup(ENV_LOG_JSON) {
            settings.log.json = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(DomainError::validation(format!(
                        "{ENV_LOG_JSON} must be a boolean, got {raw:?}"
                    )));
                }
            };
        }

        if let Some(filter) = lookup(ENV_LOG_FILTER) {
            if !filter.trim().is_empty() {
                settings.log.filter = filter;
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.expiry.critical_within_days < 0 {
            return Err(DomainError::validation("critical_within_days cannot be negative"));
        }

        let t = &self.tariff;
        ensure_non_negative("perishable_volume_rate", t.perishable_volume_rate)?;
        ensure_non_negative("perishable_energy_per_kg", t.perishable_energy_per_kg)?;
        ensure_non_negative("chilled_energy_factor", t.chilled_energy_factor)?;
        ensure_non_negative("frozen_energy_factor", t.frozen_energy_factor)?;
        ensure_non_negative("durable_volume_rate", t.durable_volume_rate)?;
        ensure_non_negative("fragile_surcharge", t.fragile_surcharge)?;
        if t.fragile_surcharge < 1.0 {
            return Err(DomainError::validation("fragile_surcharge cannot be below 1.0"));
        }

        Ok(())
    }
}
