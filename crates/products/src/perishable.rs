use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use scwos_core::{DomainError, DomainResult, ExpiryPolicy, StorageTariff};

use crate::product::{NewProduct, ProductCore, ProductDetails, ProductInfo, ProductType, Storable};

/// Freshness of a perishable item relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FreshnessStatus {
    Fresh,
    Critical,
    Expired,
}

impl FreshnessStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            FreshnessStatus::Fresh => "FRESH",
            FreshnessStatus::Critical => "CRITICAL",
            FreshnessStatus::Expired => "EXPIRED",
        }
    }

    /// CRITICAL and EXPIRED items need attention.
    pub fn needs_attention(self) -> bool {
        !matches!(self, FreshnessStatus::Fresh)
    }
}

impl core::fmt::Display for FreshnessStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item with an expiry date and a required storage temperature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerishableProduct {
    core: ProductCore,
    expiry_date: NaiveDate,
    req_temperature_c: f64,
}

impl PerishableProduct {
    pub fn new(base: NewProduct, expiry_date: NaiveDate, req_temperature_c: f64) -> DomainResult<Self> {
        let core = ProductCore::new(base)?;
        if !req_temperature_c.is_finite() {
            return Err(DomainError::validation("req_temperature_c must be a finite number"));
        }

        Ok(Self {
            core,
            expiry_date,
            req_temperature_c,
        })
    }

    /// Parse an expiry date written as `YYYY-MM-DD`.
    pub fn parse_expiry(raw: &str) -> DomainResult<NaiveDate> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| DomainError::validation("date must be in YYYY-MM-DD format"))
    }

    pub fn expiry_date(&self) -> NaiveDate {
        self.expiry_date
    }

    pub fn req_temperature_c(&self) -> f64 {
        self.req_temperature_c
    }

    /// Whole days from `today` until expiry; negative once expired.
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }

    /// Freshness under the default three-day window.
    pub fn check_status(&self, today: NaiveDate) -> FreshnessStatus {
        self.status_with(today, &ExpiryPolicy::default())
    }

    pub fn status_with(&self, today: NaiveDate, policy: &ExpiryPolicy) -> FreshnessStatus {
        let days_left = self.days_until_expiry(today);
        if days_left < 0 {
            FreshnessStatus::Expired
        } else if days_left <= policy.critical_within_days {
            FreshnessStatus::Critical
        } else {
            FreshnessStatus::Fresh
        }
    }

    /// Items kept at or below 0 C pay the frozen energy factor.
    pub fn is_frozen(&self) -> bool {
        self.req_temperature_c <= 0.0
    }

    pub(crate) fn core_mut(&mut self) -> &mut ProductCore {
        &mut self.core
    }
}

impl Storable for PerishableProduct {
    fn core(&self) -> &ProductCore {
        &self.core
    }

    fn product_type(&self) -> ProductType {
        ProductType::Perishable
    }

    fn daily_storage_rate(&self, tariff: &StorageTariff) -> f64 {
        let energy_factor = if self.is_frozen() {
            tariff.frozen_energy_factor
        } else {
            tariff.chilled_energy_factor
        };
        let volume_cost = self.core.volume_m3() * tariff.perishable_volume_rate;
        let cooling_cost = self.core.weight_kg() * tariff.perishable_energy_per_kg * energy_factor;
        volume_cost + cooling_cost
    }

    fn get_product_info_with(&self, today: NaiveDate, policy: &ExpiryPolicy) -> ProductInfo {
        ProductInfo::from_core(
            &self.core,
            ProductType::Perishable,
            ProductDetails::Perishable {
                expiry_date: self.expiry_date,
                req_temperature_c: self.req_temperature_c,
                status: self.status_with(today, policy),
            },
        )
    }
}
