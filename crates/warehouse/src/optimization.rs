//! Placement decisions.
//!
//! The engine is a feasibility filter: it walks locations in registration
//! order and the first suitable one wins. No scoring, no best fit.

use scwos_core::{DomainResult, ProductId};
use scwos_inventory::InventoryManager;
use scwos_products::{Product, Storable};

use crate::location::StorageLocation;
use crate::warehouse::Warehouse;

/// Read-only view over the inventory and the warehouse.
#[derive(Debug, Clone, Copy)]
pub struct OptimizationEngine<'a> {
    inventory: &'a InventoryManager,
    warehouse: &'a Warehouse,
}

impl<'a> OptimizationEngine<'a> {
    pub fn new(inventory: &'a InventoryManager, warehouse: &'a Warehouse) -> Self {
        Self { inventory, warehouse }
    }

    /// First location that can take `product`, or `None`.
    pub fn find_best_location(&self, product: &Product) -> Option<&'a StorageLocation> {
        let locations = self.warehouse.list_locations();
        Self::first_suitable(locations, product).map(|index| &locations[index])
    }

    /// Same as [`Self::find_best_location`] for a registered product.
    pub fn find_location_for_id(&self, product_id: &ProductId) -> DomainResult<Option<&'a StorageLocation>> {
        let product = self.inventory.get_product(product_id)?;
        Ok(self.find_best_location(product))
    }

    /// Candidate location for every registered product, inventory order.
    ///
    /// Each pick is made against current loads only; products are not
    /// assumed to be placed one after another.
    pub fn suggest_placements(&self) -> Vec<(&'a ProductId, Option<&'a StorageLocation>)> {
        self.inventory
            .products()
            .map(|product| (product.product_id(), self.find_best_location(product)))
            .collect()
    }

    pub(crate) fn first_suitable(locations: &[StorageLocation], product: &Product) -> Option<usize> {
        locations.iter().position(|location| location.is_suitable(product))
    }
}
