use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scwos_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, Entity, OrderId, ProductId, ShipmentId,
    execute,
};
use scwos_events::{Event, LogKind, SharedSink, null_sink};
use scwos_inventory::InventoryManager;

use crate::shipment::{DEFAULT_CARRIER, Shipment, TrackingNumber};

/// Order lifecycle. Advances one step at a time, never backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Picked,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Picked => "PICKED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
        }
    }

    /// The only state this one may move to.
    pub const fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Picked),
            OrderStatus::Picked => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order line: a registered product and how many units are wanted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(product_id: ProductId, quantity: u32) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation(format!(
                "quantity for {product_id} must be at least 1"
            )));
        }
        Ok(Self { product_id, quantity })
    }

    /// A single unit of `product_id`.
    pub fn single(product_id: ProductId) -> Self {
        Self {
            product_id,
            quantity: 1,
        }
    }
}

/// Command: PickOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickOrder {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ShipOrder. The shipment id, carrier and tracking number travel
/// in the command so deciding stays deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipOrder {
    pub order_id: OrderId,
    pub shipment_id: ShipmentId,
    pub carrier: String,
    pub tracking_number: TrackingNumber,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeliverOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverOrder {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    Pick(PickOrder),
    Ship(ShipOrder),
    Deliver(DeliverOrder),
}

impl OrderCommand {
    /// State a command moves the order into.
    pub const fn target(&self) -> OrderStatus {
        match self {
            OrderCommand::Pick(_) => OrderStatus::Picked,
            OrderCommand::Ship(_) => OrderStatus::Shipped,
            OrderCommand::Deliver(_) => OrderStatus::Delivered,
        }
    }

    fn order_id(&self) -> &OrderId {
        match self {
            OrderCommand::Pick(c) => &c.order_id,
            OrderCommand::Ship(c) => &c.order_id,
            OrderCommand::Deliver(c) => &c.order_id,
        }
    }
}

/// Event: OrderPicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPicked {
    pub order_id: OrderId,
    pub product_ids: Vec<ProductId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderShipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderShipped {
    pub order_id: OrderId,
    pub shipment_id: ShipmentId,
    pub carrier: String,
    pub tracking_number: TrackingNumber,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderDelivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDelivered {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderPicked(OrderPicked),
    OrderShipped(OrderShipped),
    OrderDelivered(OrderDelivered),
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPicked(_) => "orders.order.picked",
            OrderEvent::OrderShipped(_) => "orders.order.shipped",
            OrderEvent::OrderDelivered(_) => "orders.order.delivered",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderPicked(e) => e.occurred_at,
            OrderEvent::OrderShipped(e) => e.occurred_at,
            OrderEvent::OrderDelivered(e) => e.occurred_at,
        }
    }
}

/// Read-only order overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub customer: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items_count: u64,
    pub tracking_number: Option<TrackingNumber>,
}

impl core::fmt::Display for OrderSummary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Order {} | Customer: {} | Status: {} | Items: {}",
            self.order_id, self.customer, self.status, self.items_count
        )?;
        if let Some(tracking) = &self.tracking_number {
            write!(f, " | Tracking: {tracking}")?;
        }
        Ok(())
    }
}

/// Aggregate root: a customer order.
///
/// Transitions go through `handle` (pure decision) and `apply` (state
/// change); `pick`, `ship` and `deliver` wrap that and add the side effects:
/// inventory reservation on pick, one log line per transition plus one per
/// shipment event.
#[derive(Debug, Clone)]
pub struct Order {
    order_id: OrderId,
    customer_name: String,
    lines: Vec<OrderLine>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    picked_at: Option<DateTime<Utc>>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    shipment: Option<Shipment>,
    version: u64,
    sink: SharedSink,
}

impl Order {
    pub fn new(
        order_id: OrderId,
        customer_name: &str,
        lines: Vec<OrderLine>,
        sink: SharedSink,
    ) -> DomainResult<Self> {
        Self::new_at(order_id, customer_name, lines, sink, Utc::now())
    }

    /// Same as [`Order::new`] with an explicit creation time.
    pub fn new_at(
        order_id: OrderId,
        customer_name: &str,
        lines: Vec<OrderLine>,
        sink: SharedSink,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let customer_name = customer_name.trim();
        if customer_name.is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }
        if lines.is_empty() {
            return Err(DomainError::validation("an order needs at least one line"));
        }
        if let Some(line) = lines.iter().find(|l| l.quantity == 0) {
            return Err(DomainError::validation(format!(
                "quantity for {} must be at least 1",
                line.product_id
            )));
        }

        sink.record_as(
            LogKind::OrderStatus,
            &format!("Order {order_id} created for {customer_name} with {} line(s)", lines.len()),
        );

        Ok(Self {
            order_id,
            customer_name: customer_name.to_string(),
            lines,
            status: OrderStatus::Pending,
            created_at,
            picked_at: None,
            shipped_at: None,
            delivered_at: None,
            shipment: None,
            version: 0,
            sink,
        })
    }

    /// Order with a generated id and no log output.
    pub fn unlogged(customer_name: &str, lines: Vec<OrderLine>) -> DomainResult<Self> {
        Self::new(OrderId::generate(), customer_name, lines, null_sink())
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn picked_at(&self) -> Option<DateTime<Utc>> {
        self.picked_at
    }

    pub fn shipped_at(&self) -> Option<DateTime<Utc>> {
        self.shipped_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn shipment(&self) -> Option<&Shipment> {
        self.shipment.as_ref()
    }

    pub fn tracking_number(&self) -> Option<&TrackingNumber> {
        self.shipment.as_ref().map(Shipment::tracking_number)
    }

    /// Total units across all lines. Widened so any accepted order fits.
    pub fn items_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn can_pick(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn can_ship(&self) -> bool {
        self.status == OrderStatus::Picked
    }

    pub fn can_deliver(&self) -> bool {
        self.status == OrderStatus::Shipped
    }

    pub fn is_terminal(&self) -> bool {
        self.status.next().is_none()
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            order_id: self.order_id.clone(),
            customer: self.customer_name.clone(),
            status: self.status,
            created_at: self.created_at,
            items_count: self.items_count(),
            tracking_number: self.tracking_number().cloned(),
        }
    }

    /// PENDING -> PICKED: claim every line in `inventory` for this order.
    pub fn pick(&mut self, inventory: &mut InventoryManager) -> DomainResult<OrderStatus> {
        self.pick_at(inventory, Utc::now())
    }

    pub fn pick_at(&mut self, inventory: &mut InventoryManager, at: DateTime<Utc>) -> DomainResult<OrderStatus> {
        let command = OrderCommand::Pick(PickOrder {
            order_id: self.order_id.clone(),
            occurred_at: at,
        });
        // Decide first: a wrong state is reported before any stock problem.
        self.handle(&command).inspect_err(|e| self.reject(&command, e))?;

        let requested = self.lines.iter().map(|l| (&l.product_id, l.quantity));
        if let Err(e) = inventory.check_availability(&self.order_id, requested) {
            self.reject(&command, &e);
            return Err(e);
        }
        inventory.reserve(&self.order_id, &self.product_ids())?;

        self.transition(&command)
    }

    /// PICKED -> SHIPPED with the default carrier and a freshly generated
    /// tracking number.
    pub fn ship(&mut self) -> DomainResult<OrderStatus> {
        self.ship_with(DEFAULT_CARRIER, TrackingNumber::random(), Utc::now())
    }

    pub fn ship_with(
        &mut self,
        carrier: &str,
        tracking_number: TrackingNumber,
        at: DateTime<Utc>,
    ) -> DomainResult<OrderStatus> {
        let command = OrderCommand::Ship(ShipOrder {
            order_id: self.order_id.clone(),
            shipment_id: ShipmentId::generate(),
            carrier: carrier.trim().to_string(),
            tracking_number,
            occurred_at: at,
        });
        self.transition(&command)
    }

    /// SHIPPED -> DELIVERED. Terminal.
    pub fn deliver(&mut self) -> DomainResult<OrderStatus> {
        self.deliver_at(Utc::now())
    }

    pub fn deliver_at(&mut self, at: DateTime<Utc>) -> DomainResult<OrderStatus> {
        let command = OrderCommand::Deliver(DeliverOrder {
            order_id: self.order_id.clone(),
            occurred_at: at,
        });
        self.transition(&command)
    }

    fn product_ids(&self) -> Vec<ProductId> {
        self.lines.iter().map(|l| l.product_id.clone()).collect()
    }

    fn transition(&mut self, command: &OrderCommand) -> DomainResult<OrderStatus> {
        let from = self.status;
        let seen = self.shipment.as_ref().map_or(0, |s| s.history().len());
        execute(self, command).inspect_err(|e| self.reject(command, e))?;

        self.sink.record_as(
            LogKind::OrderStatus,
            &format!("Order {} transitioned {} -> {}", self.order_id, from, self.status),
        );
        if let Some(shipment) = &self.shipment {
            for entry in shipment.history().iter().skip(seen) {
                self.sink.record_as(
                    LogKind::ShipmentEvent,
                    &format!("Shipment {}: {}", shipment.shipment_id(), entry.note),
                );
            }
        }
        tracing::debug!(order_id = %self.order_id, from = %from, to = %self.status, version = self.version, "order transitioned");
        Ok(self.status)
    }

    fn reject(&self, command: &OrderCommand, error: &DomainError) {
        self.sink.record_as(
            LogKind::Warning,
            &format!(
                "Order {} {} -> {} rejected: {}",
                self.order_id,
                self.status,
                command.target(),
                error
            ),
        );
        tracing::warn!(
            order_id = %self.order_id,
            status = %self.status,
            target = %command.target(),
            error = %error,
            "order transition rejected"
        );
    }

    fn ensure_step(&self, command: &OrderCommand) -> DomainResult<()> {
        if command.order_id() != &self.order_id {
            return Err(DomainError::validation(format!(
                "command for order {} sent to order {}",
                command.order_id(),
                self.order_id
            )));
        }

        let target = command.target();
        if self.status.next() != Some(target) {
            return Err(DomainError::invalid_transition(format!(
                "order {} cannot move {} -> {}",
                self.order_id, self.status, target
            )));
        }
        Ok(())
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.order_id
    }
}

impl AggregateRoot for Order {
    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::OrderPicked(e) => {
                self.status = OrderStatus::Picked;
                self.picked_at = Some(e.occurred_at);
            }
            OrderEvent::OrderShipped(e) => {
                self.status = OrderStatus::Shipped;
                self.shipped_at = Some(e.occurred_at);
                self.shipment = Some(Shipment::open(
                    e.shipment_id.clone(),
                    e.order_id.clone(),
                    e.carrier.clone(),
                    e.tracking_number.clone(),
                    e.occurred_at,
                ));
            }
            OrderEvent::OrderDelivered(e) => {
                self.status = OrderStatus::Delivered;
                self.delivered_at = Some(e.occurred_at);
                if let Some(shipment) = self.shipment.as_mut() {
                    shipment.mark_delivered(e.occurred_at);
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        self.ensure_step(command)?;

        let event = match command {
            OrderCommand::Pick(cmd) => OrderEvent::OrderPicked(OrderPicked {
                order_id: cmd.order_id.clone(),
                product_ids: self.product_ids(),
                occurred_at: cmd.occurred_at,
            }),
            OrderCommand::Ship(cmd) if cmd.carrier.trim().is_empty() => {
                return Err(DomainError::validation("carrier cannot be empty"));
            }
            OrderCommand::Ship(cmd) => OrderEvent::OrderShipped(OrderShipped {
                order_id: cmd.order_id.clone(),
                shipment_id: cmd.shipment_id.clone(),
                carrier: cmd.carrier.clone(),
                tracking_number: cmd.tracking_number.clone(),
                occurred_at: cmd.occurred_at,
            }),
            OrderCommand::Deliver(cmd) => OrderEvent::OrderDelivered(OrderDelivered {
                order_id: cmd.order_id.clone(),
                occurred_at: cmd.occurred_at,
            }),
        };
        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scwos_events::TransactionLog;
    use scwos_products::{DurableProduct, NewProduct, Product};
    use std::sync::Arc;

    fn pid(raw: &str) -> ProductId {
        ProductId::new(raw).unwrap()
    }

    fn oid(raw: &str) -> OrderId {
        OrderId::new(raw).unwrap()
    }

    fn desk(id: &str) -> Product {
        let base = NewProduct {
            product_id: pid(id),
            name: format!("Desk {id}"),
            base_price: 120.0,
            volume_m3: 0.8,
            weight_kg: 25.0,
        };
        DurableProduct::new(base, "Oak", false, 0.9).unwrap().into()
    }

    fn inventory_with(ids: &[&str]) -> InventoryManager {
        let mut inventory = InventoryManager::default();
        for id in ids {
            inventory.add_product(desk(id)).unwrap();
        }
        inventory
    }

    fn order(id: &str, products: &[&str]) -> Order {
        let lines = products.iter().map(|p| OrderLine::single(pid(p))).collect();
        Order::new(oid(id), "Ada", lines, null_sink()).unwrap()
    }

    #[test]
    fn new_order_is_pending() {
        let order = order("ORD-1", &["D1", "D2"]);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.status().to_string(), "PENDING");
        assert_eq!(order.items_count(), 2);
        assert_eq!(order.version(), 0);
        assert!(order.can_pick());
        assert!(!order.can_ship());
        assert!(order.tracking_number().is_none());
    }

    #[test]
    fn creation_validates_lines_and_customer() {
        assert!(matches!(
            Order::new(oid("ORD-1"), "Ada", Vec::new(), null_sink()),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            Order::new(oid("ORD-1"), " ", vec![OrderLine::single(pid("D1"))], null_sink()),
            Err(DomainError::Validation(_))
        ));
        let zero = OrderLine {
            product_id: pid("D1"),
            quantity: 0,
        };
        assert!(matches!(
            Order::new(oid("ORD-1"), "Ada", vec![zero], null_sink()),
            Err(DomainError::Validation(_))
        ));
        assert!(OrderLine::new(pid("D1"), 0).is_err());
        assert_eq!(OrderLine::new(pid("D1"), 1).unwrap(), OrderLine::single(pid("D1")));
    }

    #[test]
    fn full_lifecycle_logs_every_transition() {
        let log = Arc::new(TransactionLog::new());
        let mut inventory = inventory_with(&["D1"]);
        let mut order = Order::new(oid("O-1"), "Ada", vec![OrderLine::single(pid("D1"))], log.clone()).unwrap();

        assert_eq!(order.pick(&mut inventory).unwrap(), OrderStatus::Picked);
        assert!(order.picked_at().is_some());
        assert_eq!(inventory.reserved_by(&pid("D1")), Some(&oid("O-1")));

        assert_eq!(order.ship().unwrap(), OrderStatus::Shipped);
        let tracking = order.tracking_number().cloned().unwrap();
        assert!(TrackingNumber::parse(tracking.as_str()).is_ok());

        assert_eq!(order.deliver().unwrap(), OrderStatus::Delivered);
        assert!(order.is_terminal());
        assert!(order.shipment().unwrap().is_delivered());
        assert_eq!(order.version(), 3);

        let shipment_id = order.shipment().unwrap().shipment_id().clone();
        assert_eq!(
            log.lines(),
            vec![
                "Order O-1 created for Ada with 1 line(s)".to_string(),
                "Order O-1 transitioned PENDING -> PICKED".to_string(),
                "Order O-1 transitioned PICKED -> SHIPPED".to_string(),
                format!("Shipment {shipment_id}: Shipment created"),
                format!("Shipment {shipment_id}: Tracking generated: {tracking}"),
                "Order O-1 transitioned SHIPPED -> DELIVERED".to_string(),
                format!("Shipment {shipment_id}: Shipment delivered"),
            ]
        );
        assert_eq!(log.lines_of(LogKind::OrderStatus).len(), 4);
        assert_eq!(log.lines_of(LogKind::ShipmentEvent).len(), 3);
    }

    #[test]
    fn rejected_transitions_are_logged_as_warnings() {
        let log = Arc::new(TransactionLog::new());
        let mut order = Order::new(oid("O-2"), "Ada", vec![OrderLine::single(pid("D1"))], log.clone()).unwrap();

        assert!(order.deliver().is_err());
        assert_eq!(order.status(), OrderStatus::Pending);
        let warnings = log.lines_of(LogKind::Warning);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Order O-2 PENDING -> DELIVERED rejected: "));
        assert_eq!(log.lines_of(LogKind::OrderStatus).len(), 1);
    }

    #[test]
    fn shipment_keeps_the_named_carrier() {
        let mut inventory = inventory_with(&["D1"]);
        let mut order = order("ORD-1", &["D1"]);
        order.pick(&mut inventory).unwrap();
        order
            .ship_with(" FastTrack ", TrackingNumber::parse("FTK-00000001").unwrap(), Utc::now())
            .unwrap();

        let shipment = order.shipment().unwrap();
        assert_eq!(shipment.carrier(), "FastTrack");
        assert!(shipment.eta().earliest < shipment.eta().latest);
    }

    #[test]
    fn default_ship_uses_default_carrier() {
        let mut inventory = inventory_with(&["D1"]);
        let mut order = order("ORD-1", &["D1"]);
        order.pick(&mut inventory).unwrap();
        order.ship().unwrap();
        assert_eq!(order.shipment().unwrap().carrier(), DEFAULT_CARRIER);
    }

    #[test]
    fn blank_carrier_is_rejected_without_shipping() {
        let mut inventory = inventory_with(&["D1"]);
        let mut order = order("ORD-1", &["D1"]);
        order.pick(&mut inventory).unwrap();

        let err = order
            .ship_with("  ", TrackingNumber::parse("ABC-12345678").unwrap(), Utc::now())
            .unwrap_err();
        assert_eq!(err, DomainError::validation("carrier cannot be empty"));
        assert_eq!(order.status(), OrderStatus::Picked);
        assert!(order.shipment().is_none());
    }

    #[test]
    fn items_count_does_not_overflow() {
        let lines = vec![
            OrderLine::new(pid("D1"), u32::MAX).unwrap(),
            OrderLine::new(pid("D2"), 1).unwrap(),
        ];
        let order = Order::new(oid("ORD-1"), "Ada", lines, null_sink()).unwrap();

        let summary = order.summary();
        assert_eq!(summary.items_count, u64::from(u32::MAX) + 1);
        assert!(summary.to_string().ends_with("| Items: 4294967296"));
    }

    #[test]
    fn ship_on_pending_fails_and_keeps_state() {
        let mut order = order("ORD-1", &["D1"]);
        let err = order.ship().unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(order.shipment().is_none());
        assert_eq!(order.version(), 0);
    }

    #[test]
    fn deliver_on_delivered_fails_and_keeps_state() {
        let mut inventory = inventory_with(&["D1"]);
        let mut order = order("ORD-1", &["D1"]);
        order.pick(&mut inventory).unwrap();
        order.ship().unwrap();
        order.deliver().unwrap();
        let delivered_at = order.delivered_at();

        let err = order.deliver().unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert_eq!(order.delivered_at(), delivered_at);

        assert!(order.pick(&mut inventory).is_err());
        assert!(order.ship().is_err());
    }

    #[test]
    fn skipping_a_step_fails() {
        let mut order = order("ORD-1", &["D1"]);
        assert!(matches!(order.deliver(), Err(DomainError::InvalidTransition(_))));
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn pick_fails_for_unregistered_product_without_side_effects() {
        let mut inventory = inventory_with(&["D1"]);
        let mut order = order("ORD-1", &["D1", "D9"]);

        let err = order.pick(&mut inventory).unwrap_err();
        assert_eq!(err, DomainError::stock("product D9 is not in inventory"));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(inventory.reserved_by(&pid("D1")), None);
    }

    #[test]
    fn product_picked_for_one_order_is_unavailable_to_another() {
        let mut inventory = inventory_with(&["D1", "D2"]);
        let mut first = order("ORD-1", &["D1"]);
        let mut second = order("ORD-2", &["D2", "D1"]);

        first.pick(&mut inventory).unwrap();
        let err = second.pick(&mut inventory).unwrap_err();
        assert!(matches!(err, DomainError::Stock(_)));
        assert_eq!(second.status(), OrderStatus::Pending);
        assert_eq!(inventory.reserved_by(&pid("D2")), None);
    }

    #[test]
    fn more_than_one_unit_of_a_product_is_a_stock_error() {
        let mut inventory = inventory_with(&["D1"]);
        let lines = vec![OrderLine::new(pid("D1"), 2).unwrap()];
        let mut order = Order::new(oid("ORD-1"), "Ada", lines, null_sink()).unwrap();

        assert!(matches!(order.pick(&mut inventory), Err(DomainError::Stock(_))));
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn state_is_checked_before_stock() {
        let mut inventory = inventory_with(&["D1"]);
        let mut order = order("ORD-1", &["D1"]);
        order.pick(&mut inventory).unwrap();
        inventory.remove_product(&pid("D1")).unwrap();

        assert!(matches!(
            order.pick(&mut inventory),
            Err(DomainError::InvalidTransition(_))
        ));
    }

    #[test]
    fn handle_is_pure_and_emits_one_event() {
        let order = order("ORD-1", &["D1"]);
        let at = Utc::now();
        let command = OrderCommand::Pick(PickOrder {
            order_id: oid("ORD-1"),
            occurred_at: at,
        });

        let events = order.handle(&command).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "orders.order.picked");
        assert_eq!(events[0].occurred_at(), at);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.version(), 0);
    }

    #[test]
    fn commands_for_another_order_are_rejected() {
        let order = order("ORD-1", &["D1"]);
        let command = OrderCommand::Deliver(DeliverOrder {
            order_id: oid("ORD-2"),
            occurred_at: Utc::now(),
        });
        assert!(matches!(order.handle(&command), Err(DomainError::Validation(_))));
    }

    #[test]
    fn explicit_times_are_stamped() {
        let created = Utc::now();
        let picked = created + chrono::Duration::minutes(5);
        let shipped = picked + chrono::Duration::hours(2);
        let delivered = shipped + chrono::Duration::days(2);

        let mut inventory = inventory_with(&["D1"]);
        let mut order = Order::new_at(oid("ORD-1"), "Ada", vec![OrderLine::single(pid("D1"))], null_sink(), created).unwrap();
        order.pick_at(&mut inventory, picked).unwrap();
        order
            .ship_with("FedEx", TrackingNumber::parse("ZZZ-00000001").unwrap(), shipped)
            .unwrap();
        order.deliver_at(delivered).unwrap();

        assert_eq!(order.created_at(), created);
        assert_eq!(order.picked_at(), Some(picked));
        assert_eq!(order.shipped_at(), Some(shipped));
        assert_eq!(order.delivered_at(), Some(delivered));
        assert_eq!(order.shipment().unwrap().delivered_at(), Some(delivered));
    }

    #[test]
    fn summary_reflects_current_state() {
        let mut inventory = inventory_with(&["D1", "D2"]);
        let mut order = order("ORD-7", &["D1", "D2"]);
        order.pick(&mut inventory).unwrap();
        order
            .ship_with("FedEx", TrackingNumber::parse("ABC-12345678").unwrap(), Utc::now())
            .unwrap();

        let summary = order.summary();
        assert_eq!(summary.status, OrderStatus::Shipped);
        assert_eq!(summary.items_count, 2);
        assert_eq!(summary.customer, "Ada");
        assert_eq!(
            summary.to_string(),
            "Order ORD-7 | Customer: Ada | Status: SHIPPED | Items: 2 | Tracking: ABC-12345678"
        );

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["status"], "SHIPPED");
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 200,
                ..ProptestConfig::default()
            })]

            /// Property: whatever sequence of triggers arrives, each success moves
            /// exactly one step forward and each failure leaves the state alone.
            #[test]
            fn status_only_moves_forward(steps in prop::collection::vec(0u8..3, 0..20)) {
                let mut inventory = inventory_with(&["D1"]);
                let mut order = order("ORD-1", &["D1"]);

                for step in steps {
                    let before = order.status();
                    let result = match step {
                        0 => order.pick(&mut inventory),
                        1 => order.ship(),
                        _ => order.deliver(),
                    };
                    match result {
                        Ok(after) => prop_assert_eq!(before.next(), Some(after)),
                        Err(_) => prop_assert_eq!(order.status(), before),
                    }
                }
            }
        }
    }
}
