use crate::domain::entities::Transaction;
use crate::domain::errors::SerializationError;
use crate::ports::outbound::TransactionSerializer;

/// JSON codec writing fields in canonical schema order.
///
/// JSON has no NaN or infinity, and `serde_json` would write them as `null`,
/// which then fails to decode. Such records are refused on encode instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonTransactionSerializer;

fn non_finite_field(tx: &Transaction) -> Option<&'static str> {
    let p = &tx.purchase;
    [
        ("Amount", tx.amount),
        ("AmountInGrams", p.amount_in_grams),
        ("AmountInMiligramsOfTotalTHC", p.amount_in_milligrams_of_thc),
        ("Cost", p.cost),
        ("FedTax", p.fed_tax),
        ("StateTax", p.state_tax),
        ("THCPercent", p.thc_percent),
        ("WeFee", p.we_fee),
    ]
    .into_iter()
    .find(|(_, value)| !value.is_finite())
    .map(|(name, _)| name)
}

impl TransactionSerializer for JsonTransactionSerializer {
    fn serialize(&self, tx: &Transaction) -> Result<Vec<u8>, SerializationError> {
        if let Some(field) = non_finite_field(tx) {
            return Err(SerializationError {
                message: format!("{} of transaction {} is not a finite number", field, tx.id()),
            });
        }
        serde_json::to_vec(tx).map_err(|e| SerializationError {
            message: e.to_string(),
        })
    }

    fn deserialize(&self, data: &[u8]) -> Result<Transaction, SerializationError> {
        serde_json::from_slice(data).map_err(|e| SerializationError {
            message: e.to_string(),
        })
    }
}
