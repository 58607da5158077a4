use chrono::NaiveDate;
use serde::Serialize;

use scwos_core::{DomainResult, ExpiryPolicy, StorageTariff, ensure_non_negative};

use crate::product::{NewProduct, ProductCore, ProductDetails, ProductInfo, ProductType, Storable};

/// Long-life item; may be fragile. Stored on shelves, so its height matters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurableProduct {
    core: ProductCore,
    material_type: String,
    is_fragile: bool,
    height_m: f64,
}

impl DurableProduct {
    pub fn new(
        base: NewProduct,
        material_type: impl Into<String>,
        is_fragile: bool,
        height_m: f64,
    ) -> DomainResult<Self> {
        let core = ProductCore::new(base)?;
        let height_m = ensure_non_negative("height_m", height_m)?;

        Ok(Self {
            core,
            material_type: material_type.into(),
            is_fragile,
            height_m,
        })
    }

    pub fn material_type(&self) -> &str {
        &self.material_type
    }

    pub fn is_fragile(&self) -> bool {
        self.is_fragile
    }

    pub fn height_m(&self) -> f64 {
        self.height_m
    }

    pub(crate) fn core_mut(&mut self) -> &mut ProductCore {
        &mut self.core
    }
}

impl Storable for DurableProduct {
    fn core(&self) -> &ProductCore {
        &self.core
    }

    fn product_type(&self) -> ProductType {
        ProductType::Durable
    }

    fn daily_storage_rate(&self, tariff: &StorageTariff) -> f64 {
        let daily = self.core.volume_m3() * tariff.durable_volume_rate;
        if self.is_fragile {
            daily * tariff.fragile_surcharge
        } else {
            daily
        }
    }

    fn get_product_info_with(&self, _today: NaiveDate, _policy: &ExpiryPolicy) -> ProductInfo {
        ProductInfo::from_core(
            &self.core,
            ProductType::Durable,
            ProductDetails::Durable {
                material_type: self.material_type.clone(),
                is_fragile: self.is_fragile,
                height_m: self.height_m,
            },
        )
    }
}
