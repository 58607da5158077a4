use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use scwos_core::{
    DomainError, DomainResult, Entity, ExpiryPolicy, ProductId, StorageTariff, ensure_non_negative,
};

use crate::durable::DurableProduct;
use crate::perishable::{FreshnessStatus, PerishableProduct};

/// Product category. Closed set: every product is exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    Perishable,
    Durable,
}

impl ProductType {
    pub const fn as_str(self) -> &'static str {
        match self {
            ProductType::Perishable => "Perishable",
            ProductType::Durable => "Durable",
        }
    }
}

impl core::fmt::Display for ProductType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for the fields every product shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub product_id: ProductId,
    pub name: String,
    pub base_price: f64,
    pub volume_m3: f64,
    pub weight_kg: f64,
}

/// Identity, pricing and physical size shared by all product categories.
///
/// Only the name and the price can change after construction, and only
/// through setters that re-validate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCore {
    product_id: ProductId,
    name: String,
    base_price: f64,
    volume_m3: f64,
    weight_kg: f64,
}

impl ProductCore {
    pub fn new(input: NewProduct) -> DomainResult<Self> {
        let name = validate_name(&input.name)?;
        let base_price = ensure_non_negative("base_price", input.base_price)?;
        let volume_m3 = ensure_non_negative("volume_m3", input.volume_m3)?;
        let weight_kg = ensure_non_negative("weight_kg", input.weight_kg)?;

        Ok(Self {
            product_id: input.product_id,
            name,
            base_price,
            volume_m3,
            weight_kg,
        })
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    pub fn volume_m3(&self) -> f64 {
        self.volume_m3
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn set_name(&mut self, name: &str) -> DomainResult<()> {
        self.name = validate_name(name)?;
        Ok(())
    }

    pub fn set_base_price(&mut self, base_price: f64) -> DomainResult<()> {
        self.base_price = ensure_non_negative("base_price", base_price)?;
        Ok(())
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("product name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Round a money amount to cents.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Capability shared by every product category.
///
/// Consumers (inventory totals, storage suitability) program against this
/// trait and never need to know the concrete type.
pub trait Storable {
    fn core(&self) -> &ProductCore;

    fn product_type(&self) -> ProductType;

    /// Cost of keeping the item for one day under `tariff`, unrounded.
    fn daily_storage_rate(&self, tariff: &StorageTariff) -> f64;

    /// Read-only snapshot for rendering. Freshness is judged against
    /// `today` under `policy`.
    fn get_product_info_with(&self, today: NaiveDate, policy: &ExpiryPolicy) -> ProductInfo;

    /// Snapshot under the default expiry window.
    fn get_product_info(&self, today: NaiveDate) -> ProductInfo {
        self.get_product_info_with(today, &ExpiryPolicy::default())
    }

    fn product_id(&self) -> &ProductId {
        self.core().product_id()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn base_price(&self) -> f64 {
        self.core().base_price()
    }

    fn volume_m3(&self) -> f64 {
        self.core().volume_m3()
    }

    fn weight_kg(&self) -> f64 {
        self.core().weight_kg()
    }

    /// Storage cost for `days` days under an explicit tariff, rounded to cents.
    fn calculate_storage_cost_with(&self, days: i64, tariff: &StorageTariff) -> DomainResult<f64> {
        if days < 0 {
            return Err(DomainError::validation("days cannot be negative"));
        }
        Ok(round_currency(self.daily_storage_rate(tariff) * days as f64))
    }

    /// Storage cost for `days` days under the default tariff.
    fn calculate_storage_cost(&self, days: i64) -> DomainResult<f64> {
        self.calculate_storage_cost_with(days, &StorageTariff::default())
    }
}

/// Any registered product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "product_type")]
pub enum Product {
    Perishable(PerishableProduct),
    Durable(DurableProduct),
}

impl Product {
    pub fn as_perishable(&self) -> Option<&PerishableProduct> {
        match self {
            Product::Perishable(p) => Some(p),
            Product::Durable(_) => None,
        }
    }

    pub fn as_durable(&self) -> Option<&DurableProduct> {
        match self {
            Product::Durable(d) => Some(d),
            Product::Perishable(_) => None,
        }
    }

    /// Freshness for perishables; `None` for durable goods.
    pub fn freshness(&self, today: NaiveDate) -> Option<FreshnessStatus> {
        self.as_perishable().map(|p| p.check_status(today))
    }

    fn core_mut(&mut self) -> &mut ProductCore {
        match self {
            Product::Perishable(p) => p.core_mut(),
            Product::Durable(d) => d.core_mut(),
        }
    }

    pub fn set_name(&mut self, name: &str) -> DomainResult<()> {
        self.core_mut().set_name(name)
    }

    pub fn set_base_price(&mut self, base_price: f64) -> DomainResult<()> {
        self.core_mut().set_base_price(base_price)
    }
}

impl Storable for Product {
    fn core(&self) -> &ProductCore {
        match self {
            Product::Perishable(p) => p.core(),
            Product::Durable(d) => d.core(),
        }
    }

    fn product_type(&self) -> ProductType {
        match self {
            Product::Perishable(p) => p.product_type(),
            Product::Durable(d) => d.product_type(),
        }
    }

    fn daily_storage_rate(&self, tariff: &StorageTariff) -> f64 {
        match self {
            Product::Perishable(p) => p.daily_storage_rate(tariff),
            Product::Durable(d) => d.daily_storage_rate(tariff),
        }
    }

    fn get_product_info_with(&self, today: NaiveDate, policy: &ExpiryPolicy) -> ProductInfo {
        match self {
            Product::Perishable(p) => p.get_product_info_with(today, policy),
            Product::Durable(d) => d.get_product_info_with(today, policy),
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        self.product_id()
    }
}

impl From<PerishableProduct> for Product {
    fn from(value: PerishableProduct) -> Self {
        Product::Perishable(value)
    }
}

impl From<DurableProduct> for Product {
    fn from(value: DurableProduct) -> Self {
        Product::Durable(value)
    }
}

/// Category-specific part of a [`ProductInfo`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductDetails {
    Perishable {
        expiry_date: NaiveDate,
        req_temperature_c: f64,
        status: FreshnessStatus,
    },
    Durable {
        material_type: String,
        is_fragile: bool,
        height_m: f64,
    },
}

/// Read-only product snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInfo {
    pub product_id: ProductId,
    pub name: String,
    pub product_type: ProductType,
    pub base_price: f64,
    pub volume_m3: f64,
    pub weight_kg: f64,
    pub details: ProductDetails,
}

impl ProductInfo {
    pub(crate) fn from_core(core: &ProductCore, product_type: ProductType, details: ProductDetails) -> Self {
        Self {
            product_id: core.product_id().clone(),
            name: core.name().to_string(),
            product_type,
            base_price: core.base_price(),
            volume_m3: core.volume_m3(),
            weight_kg: core.weight_kg(),
            details,
        }
    }
}

impl core::fmt::Display for ProductInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}] ID: {} | Name: {} | ", self.product_type, self.product_id, self.name)?;
        match &self.details {
            ProductDetails::Perishable {
                expiry_date,
                req_temperature_c,
                status,
            } => write!(
                f,
                "Expiry: {} | Temp: {}C | Status: {}",
                expiry_date.format("%Y-%m-%d"),
                req_temperature_c,
                status
            ),
            ProductDetails::Durable {
                material_type,
                is_fragile,
                ..
            } => {
                let fragility = if *is_fragile { "Fragile" } else { "Robust" };
                write!(f, "Material: {} | Type: {}", material_type, fragility)
            }
        }
    }
}
