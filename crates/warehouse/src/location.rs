use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use scwos_core::{DomainError, DomainResult, Entity, LocationId, ProductId, ensure_positive};
use scwos_events::{SharedSink, null_sink};
use scwos_products::{Product, Storable};

/// Category-specific constraints of a storage location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationKind {
    /// Dry storage for durable goods up to a given height.
    Shelf { max_height_m: f64 },
    /// Cold storage for perishables whose required temperature lies in range.
    RefrigeratedUnit { min_temp_c: f64, max_temp_c: f64 },
}

impl LocationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LocationKind::Shelf { .. } => "Shelf",
            LocationKind::RefrigeratedUnit { .. } => "RefrigeratedUnit",
        }
    }

    /// Category and height/temperature check, ignoring weight.
    pub fn accepts(&self, product: &Product) -> bool {
        match (self, product) {
            (LocationKind::Shelf { max_height_m }, Product::Durable(d)) => d.height_m() <= *max_height_m,
            (LocationKind::RefrigeratedUnit { min_temp_c, max_temp_c }, Product::Perishable(p)) => {
                (*min_temp_c..=*max_temp_c).contains(&p.req_temperature_c())
            }
            _ => false,
        }
    }
}

/// Units of one product currently held, one weight per unit as it was on
/// entry.
#[derive(Debug, Clone, Default, PartialEq)]
struct PlacedUnits {
    weights_kg: Vec<f64>,
}

impl PlacedUnits {
    fn count(&self) -> u32 {
        u32::try_from(self.weights_kg.len()).unwrap_or(u32::MAX)
    }

    /// Drop the unit matching `weight_kg`, or the latest one if none does.
    fn take(&mut self, weight_kg: f64) -> Option<f64> {
        match self.weights_kg.iter().rposition(|w| *w == weight_kg) {
            Some(i) => Some(self.weights_kg.remove(i)),
            None => self.weights_kg.pop(),
        }
    }
}

/// A physical storage unit with a weight capacity.
///
/// Invariants:
/// - `0 <= current_load <= capacity`
/// - `current_load` is the summed weight of the units in `placed`
/// - `items_count` is the size of the `placed` multiset
#[derive(Debug, Clone)]
pub struct StorageLocation {
    location_id: LocationId,
    kind: LocationKind,
    capacity_kg: f64,
    current_load_kg: f64,
    items_count: u32,
    placed: HashMap<ProductId, PlacedUnits>,
    last_updated: Option<DateTime<Utc>>,
    sink: SharedSink,
}

impl StorageLocation {
    pub fn shelf(location_id: LocationId, capacity_kg: f64, max_height_m: f64) -> DomainResult<Self> {
        let max_height_m = ensure_positive("max_height", max_height_m)?;
        Self::build(location_id, capacity_kg, LocationKind::Shelf { max_height_m })
    }

    pub fn refrigerated_unit(
        location_id: LocationId,
        capacity_kg: f64,
        min_temp_c: f64,
        max_temp_c: f64,
    ) -> DomainResult<Self> {
        if !min_temp_c.is_finite() || !max_temp_c.is_finite() {
            return Err(DomainError::validation("temperature range must be finite"));
        }
        if min_temp_c > max_temp_c {
            return Err(DomainError::validation(format!(
                "min_temp ({min_temp_c}) cannot exceed max_temp ({max_temp_c})"
            )));
        }
        Self::build(
            location_id,
            capacity_kg,
            LocationKind::RefrigeratedUnit {
                min_temp_c,
                max_temp_c,
            },
        )
    }

    fn build(location_id: LocationId, capacity_kg: f64, kind: LocationKind) -> DomainResult<Self> {
        let capacity_kg = ensure_positive("capacity", capacity_kg)?;
        Ok(Self {
            location_id,
            kind,
            capacity_kg,
            current_load_kg: 0.0,
            items_count: 0,
            placed: HashMap::new(),
            last_updated: None,
            sink: null_sink(),
        })
    }

    /// Route this location's log lines to `sink`.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    pub(crate) fn set_sink(&mut self, sink: SharedSink) {
        self.sink = sink;
    }

    pub fn location_id(&self) -> &LocationId {
        &self.location_id
    }

    pub fn kind(&self) -> &LocationKind {
        &self.kind
    }

    pub fn location_type(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn capacity(&self) -> f64 {
        self.capacity_kg
    }

    pub fn current_load(&self) -> f64 {
        self.current_load_kg
    }

    pub fn items_count(&self) -> u32 {
        self.items_count
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn get_remaining_capacity(&self) -> f64 {
        (self.capacity_kg - self.current_load_kg).max(0.0)
    }

    /// Can `product` be added right now? Pure.
    pub fn is_suitable(&self, product: &Product) -> bool {
        self.kind.accepts(product) && self.get_remaining_capacity() >= product.weight_kg()
    }

    pub fn holds(&self, product_id: &ProductId) -> bool {
        self.placed.contains_key(product_id)
    }

    pub fn placed_count(&self, product_id: &ProductId) -> u32 {
        self.placed.get(product_id).map_or(0, PlacedUnits::count)
    }

    pub fn add_item(&mut self, product: &Product) -> DomainResult<()> {
        if !self.kind.accepts(product) {
            tracing::warn!(location_id = %self.location_id, product_id = %product.product_id(), "unsuitable placement rejected");
            return Err(DomainError::capacity(format!(
                "{} {} cannot store {} product {}",
                self.location_type(),
                self.location_id,
                product.product_type(),
                product.product_id()
            )));
        }
        if self.get_remaining_capacity() < product.weight_kg() {
            tracing::warn!(location_id = %self.location_id, product_id = %product.product_id(), "placement over capacity rejected");
            return Err(DomainError::capacity(format!(
                "{} needs {} kg but {} has {} kg left",
                product.product_id(),
                product.weight_kg(),
                self.location_id,
                self.get_remaining_capacity()
            )));
        }

        let weight_kg = product.weight_kg();
        self.placed
            .entry(product.product_id().clone())
            .or_default()
            .weights_kg
            .push(weight_kg);
        self.current_load_kg = (self.current_load_kg + weight_kg).min(self.capacity_kg);
        self.items_count += 1;
        self.last_updated = Some(Utc::now());

        self.sink.record(&format!(
            "Stored {} (ID: {}) at {}",
            product.name(),
            product.product_id(),
            self.location_id
        ));
        Ok(())
    }

    /// Take one unit of `product` out. Fails if it was never added here.
    pub fn remove_item(&mut self, product: &Product) -> DomainResult<()> {
        let product_id = product.product_id();
        let Some(units) = self.placed.get_mut(product_id) else {
            return Err(DomainError::not_found(format!(
                "product {product_id} is not stored at {}",
                self.location_id
            )));
        };

        let weight_kg = units.take(product.weight_kg()).unwrap_or_default();
        if units.weights_kg.is_empty() {
            self.placed.remove(product_id);
        }

        self.items_count = self.items_count.saturating_sub(1);
        self.current_load_kg = if self.placed.is_empty() {
            0.0
        } else {
            (self.current_load_kg - weight_kg).max(0.0)
        };
        self.last_updated = Some(Utc::now());

        self.sink.record(&format!(
            "Removed {} (ID: {}) from {}",
            product.name(),
            product_id,
            self.location_id
        ));
        Ok(())
    }

    pub fn snapshot(&self) -> LocationSnapshot {
        let utilization_pct = if self.capacity_kg > 0.0 {
            (self.current_load_kg / self.capacity_kg * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        LocationSnapshot {
            location_id: self.location_id.clone(),
            location_type: self.location_type(),
            kind: self.kind,
            capacity_kg: self.capacity_kg,
            current_load_kg: self.current_load_kg,
            remaining_kg: self.get_remaining_capacity(),
            items_count: self.items_count,
            utilization_pct,
            last_updated: self.last_updated,
        }
    }
}

impl Entity for StorageLocation {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.location_id
    }
}

/// Read-only view of a location, e.g. for a capacity bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSnapshot {
    pub location_id: LocationId,
    pub location_type: &'static str,
    pub kind: LocationKind,
    pub capacity_kg: f64,
    pub current_load_kg: f64,
    pub remaining_kg: f64,
    pub items_count: u32,
    /// 0 to 100.
    pub utilization_pct: f64,
    pub last_updated: Option<DateTime<Utc>>,
}
