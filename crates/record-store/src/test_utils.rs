//! Fixtures shared by unit and integration tests.

use crate::domain::entities::{PurchaseDetail, Transaction};
use crate::domain::keys::CompositeIndex;

pub const DOWNTOWN: &str = "40.6935385, -73.8555598";
pub const UPSTATE: &str = "45.6935385, -69.8555598";

pub fn make_purchase(name: &str, cost: f64) -> PurchaseDetail {
    PurchaseDetail {
        amount_in_grams: 3.5,
        amount_in_milligrams_of_thc: 700.0,
        category: "Flower".to_string(),
        cost,
        fed_tax: cost / 10.0,
        name: name.to_string(),
        state_tax: cost / 8.0,
        thc_percent: 0.2,
        we_fee: 1.0,
    }
}

pub fn make_transaction(id: &str, location: &str) -> Transaction {
    Transaction {
        amount: 42.0,
        location: location.to_string(),
        receiver: format!("Dispensary {}", id),
        sender: "Test Sender".to_string(),
        status: "Pending".to_string(),
        timestamp: "2023-10-01 12:00:00".to_string(),
        transaction_id: id.to_string(),
        purchase: make_purchase("Blue Dream", 40.0),
        type_of_transaction: "PUREPU".to_string(),
    }
}

/// Raw composite key of a `location~name` index entry.
pub fn location_key(location: &str, id: &str) -> String {
    format!(
        "\u{0}{}\u{0}{}\u{0}{}\u{0}",
        CompositeIndex::LocationName.namespace(),
        location,
        id
    )
}
