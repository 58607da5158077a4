use std::collections::HashMap;

use chrono::NaiveDate;

use scwos_core::{
    DomainError, DomainResult, ExpiryPolicy, OrderId, ProductId, Settings, StorageTariff,
};
use scwos_events::{SharedSink, null_sink};
use scwos_products::{FreshnessStatus, Product, ProductType, Storable, round_currency};

use crate::report::{CategoryCounts, InventoryReport};

/// Registry of every product in the warehouse.
///
/// Each registered product is one unique stock unit: there is no quantity on
/// hand. Orders claim units through [`InventoryManager::reserve`], and a unit
/// claimed by one order is unavailable to every other order.
#[derive(Debug)]
pub struct InventoryManager {
    products: HashMap<ProductId, Product>,
    /// Registration order; every id here is a key of `products`.
    order: Vec<ProductId>,
    counts: CategoryCounts,
    reservations: HashMap<ProductId, OrderId>,
    expiry: ExpiryPolicy,
    tariff: StorageTariff,
    sink: SharedSink,
}

impl Default for InventoryManager {
    fn default() -> Self {
        Self::new(null_sink())
    }
}

impl InventoryManager {
    pub fn new(sink: SharedSink) -> Self {
        Self::with_settings(sink, &Settings::default())
    }

    pub fn with_settings(sink: SharedSink, settings: &Settings) -> Self {
        Self {
            products: HashMap::new(),
            order: Vec::new(),
            counts: CategoryCounts::default(),
            reservations: HashMap::new(),
            expiry: settings.expiry,
            tariff: settings.tariff,
            sink,
        }
    }

    pub fn add_product(&mut self, product: Product) -> DomainResult<()> {
        let id = product.product_id().clone();
        if self.products.contains_key(&id) {
            tracing::warn!(product_id = %id, "rejected duplicate product");
            return Err(DomainError::duplicate_id(format!("product {id} already exists")));
        }

        self.counts.increment(product.product_type());
        self.sink
            .record(&format!("Product Added: {} (ID: {})", product.name(), id));
        tracing::debug!(product_id = %id, product_type = %product.product_type(), "product registered");

        self.order.push(id.clone());
        self.products.insert(id, product);
        Ok(())
    }

    /// Deregister a product and hand it back. Any reservation on it is dropped.
    pub fn remove_product(&mut self, product_id: &ProductId) -> DomainResult<Product> {
        let Some(product) = self.products.remove(product_id) else {
            tracing::warn!(product_id = %product_id, "remove failed: unknown product");
            return Err(DomainError::not_found(format!("product {product_id}")));
        };

        self.order.retain(|id| id != product_id);
        self.reservations.remove(product_id);
        self.counts.decrement(product.product_type());
        self.sink
            .record(&format!("Product Removed: {} (ID: {})", product.name(), product_id));

        Ok(product)
    }

    pub fn get_product(&self, product_id: &ProductId) -> DomainResult<&Product> {
        self.products
            .get(product_id)
            .ok_or_else(|| DomainError::not_found(format!("product {product_id}")))
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.products.contains_key(product_id)
    }

    pub fn update_product_price(&mut self, product_id: &ProductId, new_price: f64) -> DomainResult<()> {
        let product = self
            .products
            .get_mut(product_id)
            .ok_or_else(|| DomainError::not_found(format!("product {product_id}")))?;

        let old_price = product.base_price();
        product.set_base_price(new_price)?;
        self.sink.record(&format!(
            "Price updated for {product_id}: {old_price:.2} -> {new_price:.2}"
        ));
        Ok(())
    }

    pub fn rename_product(&mut self, product_id: &ProductId, new_name: &str) -> DomainResult<()> {
        let product = self
            .products
            .get_mut(product_id)
            .ok_or_else(|| DomainError::not_found(format!("product {product_id}")))?;

        let old_name = product.name().to_string();
        product.set_name(new_name)?;
        self.sink.record(&format!(
            "Product renamed: {old_name} -> {} (ID: {product_id})",
            product.name()
        ));
        Ok(())
    }

    /// Products in registration order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.order.iter().filter_map(|id| self.products.get(id))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn category_counts(&self) -> CategoryCounts {
        self.counts
    }

    pub fn count_of(&self, product_type: ProductType) -> usize {
        self.counts.get(product_type)
    }

    pub fn get_total_inventory_value(&self) -> f64 {
        round_currency(self.products().map(Storable::base_price).sum())
    }

    /// Perishables that are CRITICAL or EXPIRED on `today`, registration order.
    pub fn check_expiring_products(&self, today: NaiveDate) -> Vec<&Product> {
        self.products()
            .filter(|p| {
                p.as_perishable()
                    .is_some_and(|perishable| perishable.status_with(today, &self.expiry).needs_attention())
            })
            .collect()
    }

    /// `"WARNING: <name> is <STATUS>"` for every expiring product.
    pub fn expiry_warnings(&self, today: NaiveDate) -> Vec<String> {
        self.check_expiring_products(today)
            .into_iter()
            .filter_map(|p| {
                let status: FreshnessStatus = p.as_perishable()?.status_with(today, &self.expiry);
                Some(format!("WARNING: {} is {}", p.name(), status))
            })
            .collect()
    }

    /// Sum of every product's own storage cost for `days` days.
    pub fn calculate_total_projected_storage_cost(&self, days: i64) -> DomainResult<f64> {
        if days < 0 {
            return Err(DomainError::validation("days cannot be negative"));
        }

        let mut total = 0.0;
        for product in self.products() {
            total += product.calculate_storage_cost_with(days, &self.tariff)?;
        }

        tracing::debug!(days, total, "projected storage cost");
        Ok(total)
    }

    pub fn generate_report(&self, today: NaiveDate) -> InventoryReport {
        InventoryReport {
            generated_on: today,
            total_items: self.len(),
            counts: self.counts,
            total_value: self.get_total_inventory_value(),
            total_weight_kg: self.products().map(Storable::weight_kg).sum(),
            total_volume_m3: self.products().map(Storable::volume_m3).sum(),
            expiring_count: self.check_expiring_products(today).len(),
            products: self
                .products()
                .map(|p| p.get_product_info_with(today, &self.expiry))
                .collect(),
        }
    }

    /// The order currently holding `product_id`, if any.
    pub fn reserved_by(&self, product_id: &ProductId) -> Option<&OrderId> {
        self.reservations.get(product_id)
    }

    /// Can `order_id` take every requested unit?
    ///
    /// A product is available when it is registered and not reserved by a
    /// different order. Since each product is a single unit, asking for more
    /// than one of the same id (across all lines) fails.
    pub fn check_availability<'a, I>(&self, order_id: &OrderId, requested: I) -> DomainResult<()>
    where
        I: IntoIterator<Item = (&'a ProductId, u32)>,
    {
        let mut totals: Vec<(&ProductId, u64)> = Vec::new();

        for (product_id, quantity) in requested {
            if !self.contains(product_id) {
                return Err(DomainError::stock(format!("product {product_id} is not in inventory")));
            }
            if let Some(holder) = self.reserved_by(product_id) {
                if holder != order_id {
                    return Err(DomainError::stock(format!(
                        "product {product_id} is already picked for order {holder}"
                    )));
                }
            }

            match totals.iter_mut().find(|(id, _)| *id == product_id) {
                Some((_, total)) => *total += u64::from(quantity),
                None => totals.push((product_id, u64::from(quantity))),
            }
        }

        if let Some((product_id, total)) = totals.iter().find(|(_, total)| *total > 1) {
            return Err(DomainError::stock(format!(
                "requested {total} units of {product_id}, but only 1 is tracked"
            )));
        }

        Ok(())
    }

    /// Claim every product for `order_id`. All-or-nothing.
    pub fn reserve(&mut self, order_id: &OrderId, product_ids: &[ProductId]) -> DomainResult<()> {
        self.check_availability(order_id, product_ids.iter().map(|id| (id, 1)))?;

        for product_id in product_ids {
            self.reservations.insert(product_id.clone(), order_id.clone());
        }
        tracing::debug!(order_id = %order_id, units = product_ids.len(), "products reserved");
        Ok(())
    }
}
