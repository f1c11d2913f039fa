//! # Seed Records
//!
//! The bootstrap set written by `init_ledger` when no other seed is configured.

use crate::domain::entities::{PurchaseDetail, Transaction};

fn flower(name: &str, cost: f64, fed_tax: f64, state_tax: f64) -> PurchaseDetail {
    PurchaseDetail {
        amount_in_grams: 14.0,
        amount_in_milligrams_of_thc: 2800.0,
        category: "Flower".to_string(),
        cost,
        fed_tax,
        name: name.to_string(),
        state_tax,
        thc_percent: 0.20,
        we_fee: 1.0,
    }
}

fn pending_purchase(
    id: &str,
    amount: f64,
    location: &str,
    receiver: &str,
    sender: &str,
    timestamp: &str,
    purchase: PurchaseDetail,
) -> Transaction {
    Transaction {
        amount,
        location: location.to_string(),
        receiver: receiver.to_string(),
        sender: sender.to_string(),
        status: "Pending".to_string(),
        timestamp: timestamp.to_string(),
        transaction_id: id.to_string(),
        purchase,
        type_of_transaction: "PUREPU".to_string(),
    }
}

/// The four records with ids "1" to "4".
pub fn default_seed() -> Vec<Transaction> {
    vec![
        pending_purchase(
            "1",
            100.0,
            "40.6935385, -73.8555598",
            "New York Dispensary 1",
            "Mary Anne Kate",
            "2023-09-14 18:00:23",
            flower("Green Crack", 100.0, 10.0, 14.0),
        ),
        pending_purchase(
            "2",
            50.0,
            "40.6935385, -73.8555598",
            "New York Dispensary 2",
            "John Jones",
            "2023-09-14 19:00:23",
            flower("Sour Diesel", 50.0, 5.0, 10.0),
        ),
        pending_purchase(
            "3",
            75.0,
            "45.6935385, -69.8555598",
            "New York Dispensary 3",
            "Jimmy Nixon",
            "2023-09-17 20:00:23",
            flower("Blue Dream", 75.0, 7.0, 9.0),
        ),
        pending_purchase(
            "4",
            100.0,
            "40.6935385, -73.8555598",
            "New York Dispensary 4",
            "Jimmy Cricket",
            "2023-09-19 18:00:23",
            flower("Northern Lights", 100.0, 10.0, 14.0),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_ids_are_unique_and_ordered() {
        let ids: Vec<String> = default_seed()
            .into_iter()
            .map(|tx| tx.transaction_id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }
}
