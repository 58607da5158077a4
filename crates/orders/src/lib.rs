//! Orders domain module.
//!
//! A customer order moves PENDING -> PICKED -> SHIPPED -> DELIVERED, one
//! externally triggered step at a time. Picking reserves the ordered products
//! in the inventory; shipping opens a [`Shipment`] with a carrier and a tracking number.

pub mod order;
pub mod shipment;

pub use order::{
    DeliverOrder, Order, OrderCommand, OrderDelivered, OrderEvent, OrderLine, OrderPicked,
    OrderShipped, OrderStatus, OrderSummary, PickOrder, ShipOrder,
};
pub use shipment::{
    DEFAULT_CARRIER, DeliveryEstimate, ETA_BUSINESS_DAYS, Shipment, ShipmentEntry, TrackingNumber,
};
