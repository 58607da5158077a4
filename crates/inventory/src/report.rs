use chrono::NaiveDate;
use serde::Serialize;

use scwos_products::{ProductInfo, ProductType};

/// Registered products per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub perishable: usize,
    pub durable: usize,
}

impl CategoryCounts {
    pub fn get(&self, product_type: ProductType) -> usize {
        match product_type {
            ProductType::Perishable => self.perishable,
            ProductType::Durable => self.durable,
        }
    }

    pub fn total(&self) -> usize {
        self.perishable + self.durable
    }

    pub(crate) fn increment(&mut self, product_type: ProductType) {
        *self.slot(product_type) += 1;
    }

    pub(crate) fn decrement(&mut self, product_type: ProductType) {
        let slot = self.slot(product_type);
        *slot = slot.saturating_sub(1);
    }

    fn slot(&mut self, product_type: ProductType) -> &mut usize {
        match product_type {
            ProductType::Perishable => &mut self.perishable,
            ProductType::Durable => &mut self.durable,
        }
    }
}

/// Point-in-time inventory summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryReport {
    pub generated_on: NaiveDate,
    pub total_items: usize,
    pub counts: CategoryCounts,
    pub total_value: f64,
    pub total_weight_kg: f64,
    pub total_volume_m3: f64,
    pub expiring_count: usize,
    /// One entry per product, registration order.
    pub products: Vec<ProductInfo>,
}

const RULE: &str = "==================================================";
const THIN_RULE: &str = "--------------------------------------------------";

impl core::fmt::Display for InventoryReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "SCWOS INVENTORY REPORT - {}", self.generated_on.format("%Y-%m-%d"))?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Total Items: {}", self.total_items)?;
        writeln!(f, "Perishables: {}", self.counts.perishable)?;
        writeln!(f, "Durables:    {}", self.counts.durable)?;
        writeln!(f, "Total Value: {:.2}", self.total_value)?;
        writeln!(f, "Weight:      {:.2} kg", self.total_weight_kg)?;
        writeln!(f, "Volume:      {:.3} m3", self.total_volume_m3)?;
        writeln!(f, "Expiring:    {}", self.expiring_count)?;
        writeln!(f, "{THIN_RULE}")?;
        for info in &self.products {
            writeln!(f, "{info}")?;
        }
        write!(f, "{RULE}")
    }
}
