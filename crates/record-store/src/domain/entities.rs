//! # Record Entities
//!
//! The `Transaction` aggregate and its embedded `PurchaseDetail`.
//!
//! ## Persisted Schema (version 1)
//!
//! Records are stored as JSON objects. Fields are declared in canonical order
//! (alphabetical by persisted key), so `serde_json` writes them in that order
//! and the encoding of a given record is byte-stable.
//!
//! Persisted keys keep the spelling of the deployed chaincode (`Reciever`,
//! `AmountInMiligramsOfTotalTHC`, `TransactionPurchase`). The corrected
//! spellings are accepted as aliases when decoding.
//!
//! Unknown or missing fields are rejected on decode.

use serde::{Deserialize, Serialize};

/// Version of the persisted field schema described by this module.
pub const SCHEMA_VERSION: u16 = 1;

/// Purchase details embedded in a transaction.
///
/// Value type with no identity of its own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct PurchaseDetail {
    /// Weight of product in grams.
    pub amount_in_grams: f64,
    /// Total THC content in milligrams.
    #[serde(rename = "AmountInMiligramsOfTotalTHC", alias = "AmountInMilligramsOfTHC")]
    pub amount_in_milligrams_of_thc: f64,
    /// Product category, e.g. "Flower".
    pub category: String,
    /// Cost before taxes and fees.
    pub cost: f64,
    /// Federal tax.
    pub fed_tax: f64,
    /// Product name.
    pub name: String,
    /// State tax.
    pub state_tax: f64,
    /// THC fraction, expected within 0..=1.
    #[serde(rename = "THCPercent")]
    pub thc_percent: f64,
    /// Platform fee.
    pub we_fee: f64,
}

impl PurchaseDetail {
    /// Persisted keys in canonical order.
    pub const CANONICAL_FIELDS: [&'static str; 9] = [
        "AmountInGrams",
        "AmountInMiligramsOfTotalTHC",
        "Category",
        "Cost",
        "FedTax",
        "Name",
        "StateTax",
        "THCPercent",
        "WeFee",
    ];
}

/// A purchase or transfer event, keyed by `transaction_id`.
///
/// Every field is replaced on update; the store never merges a stored record
/// with the caller's value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Transaction {
    pub amount: f64,
    /// Free-form "lat, long" or place name.
    pub location: String,
    #[serde(rename = "Reciever", alias = "Receiver")]
    pub receiver: String,
    pub sender: String,
    /// Open vocabulary ("Pending", "Complete", ...). Not interpreted by the store.
    pub status: String,
    /// Caller-supplied, never generated or validated.
    pub timestamp: String,
    /// Primary key in the world state. Immutable once created.
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,
    #[serde(rename = "TransactionPurchase", alias = "PurchaseDetail")]
    pub purchase: PurchaseDetail,
    /// Open vocabulary (purchase, withdrawal, exchange, deposit codes).
    pub type_of_transaction: String,
}

impl Transaction {
    /// Persisted keys in canonical order.
    pub const CANONICAL_FIELDS: [&'static str; 9] = [
        "Amount",
        "Location",
        "Reciever",
        "Sender",
        "Status",
        "Timestamp",
        "TransactionID",
        "TransactionPurchase",
        "TypeOfTransaction",
    ];

    /// The world state key of this record.
    pub fn id(&self) -> &str {
        &self.transaction_id
    }
}
