use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use rand::Rng;
use serde::{Deserialize, Serialize};

use scwos_core::{DomainError, DomainResult, OrderId, ShipmentId};

const LETTERS: usize = 3;
const DIGITS: usize = 8;

/// Carrier used when the caller does not name one.
pub const DEFAULT_CARRIER: &str = "FedEx";

/// Business days between shipping and the earliest / latest delivery.
pub const ETA_BUSINESS_DAYS: (u32, u32) = (3, 5);

/// Carrier tracking code: three uppercase letters, a dash, eight digits
/// (`"QXZ-04718236"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingNumber(String);

impl TrackingNumber {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut code = String::with_capacity(LETTERS + 1 + DIGITS);
        for _ in 0..LETTERS {
            code.push(rng.gen_range(b'A'..=b'Z') as char);
        }
        code.push('-');
        for _ in 0..DIGITS {
            code.push(rng.gen_range(b'0'..=b'9') as char);
        }
        Self(code)
    }

    /// Generate from the thread-local RNG.
    pub fn random() -> Self {
        Self::generate(&mut rand::thread_rng())
    }

    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        let valid = raw.len() == LETTERS + 1 + DIGITS
            && raw.bytes().enumerate().all(|(i, b)| match i {
                i if i < LETTERS => b.is_ascii_uppercase(),
                i if i == LETTERS => b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !valid {
            return Err(DomainError::validation(format!(
                "tracking number {raw:?} must look like AAA-99999999"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry in a shipment's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShipmentEntry {
    pub at: DateTime<Utc>,
    pub note: String,
}

/// Delivery window promised to the customer, in calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeliveryEstimate {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl core::fmt::Display for DeliveryEstimate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Estimated delivery: {} to {}",
            self.earliest.format("%Y-%m-%d"),
            self.latest.format("%Y-%m-%d")
        )
    }
}

/// `days` working days after `from`, skipping weekends.
fn add_business_days(from: NaiveDate, days: u32) -> NaiveDate {
    let mut date = from;
    let mut left = days;
    while left > 0 {
        let Some(next) = date.succ_opt() else { break };
        date = next;
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            left -= 1;
        }
    }
    date
}

/// The physical delivery of a shipped order.
///
/// Opened when the order ships, closed when it is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shipment {
    shipment_id: ShipmentId,
    order_id: OrderId,
    carrier: String,
    tracking_number: TrackingNumber,
    shipped_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
    history: Vec<ShipmentEntry>,
}

impl Shipment {
    pub fn open(
        shipment_id: ShipmentId,
        order_id: OrderId,
        carrier: String,
        tracking_number: TrackingNumber,
        shipped_at: DateTime<Utc>,
    ) -> Self {
        let history = vec![
            ShipmentEntry {
                at: shipped_at,
                note: "Shipment created".to_string(),
            },
            ShipmentEntry {
                at: shipped_at,
                note: format!("Tracking generated: {tracking_number}"),
            },
        ];
        Self {
            shipment_id,
            order_id,
            carrier,
            tracking_number,
            shipped_at,
            delivered_at: None,
            history,
        }
    }

    /// Close the shipment. Later calls keep the first delivery time.
    pub fn mark_delivered(&mut self, at: DateTime<Utc>) {
        if self.delivered_at.is_some() {
            return;
        }
        self.delivered_at = Some(at);
        self.history.push(ShipmentEntry {
            at,
            note: "Shipment delivered".to_string(),
        });
    }

    pub fn shipment_id(&self) -> &ShipmentId {
        &self.shipment_id
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    pub fn tracking_number(&self) -> &TrackingNumber {
        &self.tracking_number
    }

    /// Delivery window counted in business days from the ship date.
    pub fn eta(&self) -> DeliveryEstimate {
        let shipped_on = self.shipped_at.date_naive();
        let (earliest, latest) = ETA_BUSINESS_DAYS;
        DeliveryEstimate {
            earliest: add_business_days(shipped_on, earliest),
            latest: add_business_days(shipped_on, latest),
        }
    }

    pub fn shipped_at(&self) -> DateTime<Utc> {
        self.shipped_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn is_delivered(&self) -> bool {
        self.delivered_at.is_some()
    }

    pub fn history(&self) -> &[ShipmentEntry] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn shipment_at(shipped_at: DateTime<Utc>) -> Shipment {
        Shipment::open(
            ShipmentId::new("SHP-1").unwrap(),
            OrderId::new("ORD-1").unwrap(),
            "FastTrack".to_string(),
            TrackingNumber::parse("ABC-12345678").unwrap(),
            shipped_at,
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn generated_numbers_have_the_carrier_format() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let tn = TrackingNumber::generate(&mut rng);
            assert_eq!(TrackingNumber::parse(tn.as_str()).unwrap(), tn);
        }
        assert!(TrackingNumber::parse(TrackingNumber::random().as_str()).is_ok());
    }

    #[test]
    fn same_seed_same_number() {
        let a = TrackingNumber::generate(&mut StdRng::seed_from_u64(42));
        let b = TrackingNumber::generate(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn parse_rejects_malformed_codes() {
        for raw in ["", "AB-12345678", "abc-12345678", "ABC12345678", "ABC-1234567X", "ABC-123456789"] {
            assert!(TrackingNumber::parse(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn delivery_closes_the_shipment_once() {
        let shipped_at = Utc::now();
        let mut shipment = shipment_at(shipped_at);
        assert!(!shipment.is_delivered());
        assert_eq!(shipment.carrier(), "FastTrack");
        assert_eq!(shipment.history().len(), 2);
        assert_eq!(shipment.history()[1].note, "Tracking generated: ABC-12345678");

        let delivered_at = shipped_at + chrono::Duration::hours(30);
        shipment.mark_delivered(delivered_at);
        shipment.mark_delivered(delivered_at + chrono::Duration::hours(1));

        assert_eq!(shipment.delivered_at(), Some(delivered_at));
        assert_eq!(shipment.history().len(), 3);
    }

    #[test]
    fn eta_skips_the_weekend() {
        // Friday afternoon.
        let shipment = shipment_at(Utc.with_ymd_and_hms(2025, 3, 7, 15, 0, 0).unwrap());
        let eta = shipment.eta();
        assert_eq!(eta.earliest, date(2025, 3, 12));
        assert_eq!(eta.latest, date(2025, 3, 14));
        assert_eq!(eta.to_string(), "Estimated delivery: 2025-03-12 to 2025-03-14");
    }

    #[test]
    fn eta_midweek_spans_a_weekend() {
        let shipment = shipment_at(Utc.with_ymd_and_hms(2025, 3, 11, 9, 0, 0).unwrap());
        let eta = shipment.eta();
        assert_eq!(eta.earliest, date(2025, 3, 14));
        assert_eq!(eta.latest, date(2025, 3, 18));
    }
}
