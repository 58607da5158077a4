use scwos_core::{DomainError, DomainResult, LocationId};
use scwos_events::{SharedSink, null_sink};
use scwos_products::{Product, Storable};

use crate::location::{LocationSnapshot, StorageLocation};
use crate::optimization::OptimizationEngine;

/// A named facility owning an ordered set of storage locations.
///
/// Locations keep registration order; placement depends on it.
#[derive(Debug)]
pub struct Warehouse {
    name: String,
    locations: Vec<StorageLocation>,
    sink: SharedSink,
}

impl Warehouse {
    pub fn new(name: impl Into<String>, sink: SharedSink) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("warehouse name cannot be empty"));
        }
        Ok(Self {
            name,
            locations: Vec::new(),
            sink,
        })
    }

    /// Warehouse that discards its log lines.
    pub fn unlogged(name: impl Into<String>) -> DomainResult<Self> {
        Self::new(name, null_sink())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a location. It logs through this warehouse's sink from now on.
    pub fn add_location(&mut self, mut location: StorageLocation) -> DomainResult<()> {
        if self.position(location.location_id()).is_some() {
            tracing::warn!(location_id = %location.location_id(), "rejected duplicate location");
            return Err(DomainError::duplicate_id(format!(
                "location {} already exists",
                location.location_id()
            )));
        }

        location.set_sink(self.sink.clone());
        self.sink.record(&format!(
            "Location Added: {} {} ({} kg)",
            location.location_type(),
            location.location_id(),
            location.capacity()
        ));
        self.locations.push(location);
        Ok(())
    }

    pub fn get_free_capacity(&self) -> f64 {
        self.locations.iter().map(StorageLocation::get_remaining_capacity).sum()
    }

    pub fn total_capacity(&self) -> f64 {
        self.locations.iter().map(StorageLocation::capacity).sum()
    }

    pub fn total_load(&self) -> f64 {
        self.locations.iter().map(StorageLocation::current_load).sum()
    }

    /// Every location, registration order.
    pub fn list_locations(&self) -> &[StorageLocation] {
        &self.locations
    }

    pub fn location_ids(&self) -> Vec<&LocationId> {
        self.locations.iter().map(StorageLocation::location_id).collect()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn find_location_by_id(&self, location_id: &LocationId) -> DomainResult<&StorageLocation> {
        let index = self.require(location_id)?;
        Ok(&self.locations[index])
    }

    pub fn find_location_by_id_mut(&mut self, location_id: &LocationId) -> DomainResult<&mut StorageLocation> {
        let index = self.require(location_id)?;
        Ok(&mut self.locations[index])
    }

    /// Put `product` into a specific location.
    pub fn add_item(&mut self, location_id: &LocationId, product: &Product) -> DomainResult<()> {
        self.find_location_by_id_mut(location_id)?.add_item(product)
    }

    pub fn remove_item(&mut self, location_id: &LocationId, product: &Product) -> DomainResult<()> {
        self.find_location_by_id_mut(location_id)?.remove_item(product)
    }

    /// Store `product` in the first suitable location.
    ///
    /// `Ok(None)` means no location can take it; nothing changed.
    pub fn place(&mut self, product: &Product) -> DomainResult<Option<LocationId>> {
        let Some(index) = OptimizationEngine::first_suitable(&self.locations, product) else {
            tracing::debug!(product_id = %product.product_id(), "no suitable location");
            return Ok(None);
        };

        let location = &mut self.locations[index];
        location.add_item(product)?;
        Ok(Some(location.location_id().clone()))
    }

    pub fn capacity_report(&self) -> Vec<LocationSnapshot> {
        self.locations.iter().map(StorageLocation::snapshot).collect()
    }

    fn position(&self, location_id: &LocationId) -> Option<usize> {
        self.locations.iter().position(|l| l.location_id() == location_id)
    }

    fn require(&self, location_id: &LocationId) -> DomainResult<usize> {
        self.position(location_id)
            .ok_or_else(|| DomainError::not_found(format!("location {location_id}")))
    }
}
