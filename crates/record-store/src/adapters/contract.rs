//! # Contract Invocation Handler
//!
//! Maps function-name invocations with positional string arguments onto the
//! store API, the way ledger clients call chaincode.
//!
//! | Function | Arguments |
//! |----------|-----------|
//! | `InitLedger` | none |
//! | `CreateTransaction` | id, amount, location, receiver, sender, status, timestamp, purchase JSON, type |
//! | `ReadTransaction` | id |
//! | `ReadTransactionByLocation` | location |
//! | `UpdateTransaction` | same as `CreateTransaction` |
//! | `DeleteTransaction` | id |
//! | `TransactionExists` | id |
//! | `GetAllTransactions` | none |
//!
//! Responses are `{"result": ...}` or `{"error": {"kind": ..., "message": ...}}`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::entities::{PurchaseDetail, Transaction};
use crate::domain::errors::StoreError;
use crate::ports::inbound::TransactionStoreApi;

/// One contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(function: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            function: function.into(),
            args,
        }
    }
}

/// Errors raised while dispatching an invocation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractError {
    #[error("function {name} not found in contract")]
    UnknownFunction { name: String },

    #[error("{function} expects {expected} arguments, got {actual}")]
    WrongArity {
        function: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid {name} argument: {message}")]
    InvalidArgument { name: &'static str, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ContractError {
    /// Error category reported in responses.
    pub fn kind(&self) -> &'static str {
        match self {
            ContractError::UnknownFunction { .. } => "UnknownFunction",
            ContractError::WrongArity { .. } => "WrongArity",
            ContractError::InvalidArgument { .. } => "InvalidArgument",
            ContractError::Store(e) => e.kind().as_str(),
        }
    }
}

/// Build an error response body.
pub fn error_response(kind: &str, message: &str) -> Value {
    json!({
        "error": {
            "kind": kind,
            "message": message
        }
    })
}

/// Dispatches invocations to a `TransactionStoreApi`.
pub struct ContractHandler<S: TransactionStoreApi> {
    store: S,
}

impl<S: TransactionStoreApi> ContractHandler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one invocation and wrap the outcome in a response body.
    pub fn handle(&mut self, invocation: &Invocation) -> Value {
        match self.invoke(&invocation.function, &invocation.args) {
            Ok(result) => json!({ "result": result }),
            Err(e) => {
                #[cfg(feature = "tracing-log")]
                tracing::debug!("[txl-store] {} failed: {}", invocation.function, e);
                error_response(e.kind(), &e.to_string())
            }
        }
    }

    /// Run one invocation.
    pub fn invoke(&mut self, function: &str, args: &[String]) -> Result<Value, ContractError> {
        match function {
            "InitLedger" => {
                expect_arity("InitLedger", args, 0)?;
                self.store.init_ledger()?;
                Ok(Value::Null)
            }
            "CreateTransaction" => {
                let tx = parse_transaction("CreateTransaction", args)?;
                self.store.create(&tx)?;
                Ok(Value::Null)
            }
            "ReadTransaction" => {
                expect_arity("ReadTransaction", args, 1)?;
                to_json(&self.store.read(&args[0])?)
            }
            "ReadTransactionByLocation" => {
                expect_arity("ReadTransactionByLocation", args, 1)?;
                to_json(&self.store.list_by_location(&args[0])?)
            }
            "UpdateTransaction" => {
                let tx = parse_transaction("UpdateTransaction", args)?;
                self.store.update(&tx)?;
                Ok(Value::Null)
            }
            "DeleteTransaction" => {
                expect_arity("DeleteTransaction", args, 1)?;
                self.store.delete(&args[0])?;
                Ok(Value::Null)
            }
            "TransactionExists" => {
                expect_arity("TransactionExists", args, 1)?;
                Ok(Value::Bool(self.store.exists(&args[0])?))
            }
            "GetAllTransactions" => {
                expect_arity("GetAllTransactions", args, 0)?;
                to_json(&self.store.list_all()?)
            }
            other => Err(ContractError::UnknownFunction {
                name: other.to_string(),
            }),
        }
    }
}

fn expect_arity(function: &'static str, args: &[String], expected: usize) -> Result<(), ContractError> {
    if args.len() != expected {
        return Err(ContractError::WrongArity {
            function,
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

fn parse_number(name: &'static str, raw: &str) -> Result<f64, ContractError> {
    let value: f64 = raw.trim().parse().map_err(|_| ContractError::InvalidArgument {
        name,
        message: format!("{:?} is not a number", raw),
    })?;
    if !value.is_finite() {
        return Err(ContractError::InvalidArgument {
            name,
            message: format!("{:?} is not finite", raw),
        });
    }
    Ok(value)
}

/// Positional arguments of create/update, in the chaincode's order.
fn parse_transaction(function: &'static str, args: &[String]) -> Result<Transaction, ContractError> {
    expect_arity(function, args, 9)?;

    let purchase: PurchaseDetail =
        serde_json::from_str(&args[7]).map_err(|e| ContractError::InvalidArgument {
            name: "transactionPurchase",
            message: e.to_string(),
        })?;

    Ok(Transaction {
        transaction_id: args[0].clone(),
        amount: parse_number("amount", &args[1])?,
        location: args[2].clone(),
        receiver: args[3].clone(),
        sender: args[4].clone(),
        status: args[5].clone(),
        timestamp: args[6].clone(),
        purchase,
        type_of_transaction: args[8].clone(),
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ContractError> {
    serde_json::to_value(value).map_err(|e| {
        ContractError::Store(StoreError::Serialization {
            message: e.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::StoreConfig;
    use crate::service::{InMemoryTransactionStore, TransactionStore};

    fn make_handler() -> ContractHandler<InMemoryTransactionStore> {
        ContractHandler::new(TransactionStore::new_in_memory(StoreConfig::default()))
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    const PURCHASE: &str = r#"{"AmountInGrams":3.5,"AmountInMiligramsOfTotalTHC":700,"Category":"Flower","Cost":40,"FedTax":4,"Name":"OG Kush","StateTax":5,"THCPercent":0.2,"WeFee":1}"#;

    fn create_args(id: &str, status: &str) -> Vec<String> {
        args(&[
            id,
            "45.5",
            "Brooklyn",
            "Dispensary 9",
            "Ann Lee",
            status,
            "2023-10-01 10:00:00",
            PURCHASE,
            "PUREPU",
        ])
    }

    #[test]
    fn test_create_then_read() {
        let mut handler = make_handler();

        let created = handler.invoke("CreateTransaction", &create_args("10", "Pending"));
        assert_eq!(created, Ok(Value::Null));

        let read = handler.invoke("ReadTransaction", &args(&["10"])).unwrap();
        assert_eq!(read["Amount"], json!(45.5));
        assert_eq!(read["Reciever"], json!("Dispensary 9"));
        assert_eq!(read["TransactionPurchase"]["Name"], json!("OG Kush"));
    }

    #[test]
    fn test_update_and_exists() {
        let mut handler = make_handler();
        handler.invoke("CreateTransaction", &create_args("10", "Pending")).unwrap();
        handler.invoke("UpdateTransaction", &create_args("10", "Complete")).unwrap();

        let read = handler.invoke("ReadTransaction", &args(&["10"])).unwrap();
        assert_eq!(read["Status"], json!("Complete"));

        handler.invoke("DeleteTransaction", &args(&["10"])).unwrap();
        let exists = handler.invoke("TransactionExists", &args(&["10"])).unwrap();
        assert_eq!(exists, Value::Bool(false));
    }

    #[test]
    fn test_queries_return_arrays() {
        let mut handler = make_handler();
        handler.invoke("InitLedger", &[]).unwrap();

        let all = handler.invoke("GetAllTransactions", &[]).unwrap();
        assert_eq!(all.as_array().unwrap().len(), 4);

        let here = handler
            .invoke("ReadTransactionByLocation", &args(&["45.6935385, -69.8555598"]))
            .unwrap();
        let here = here.as_array().unwrap();
        assert_eq!(here.len(), 1);
        assert_eq!(here[0]["TransactionID"], json!("3"));
    }

    #[test]
    fn test_argument_errors() {
        let mut handler = make_handler();

        let err = handler.invoke("ReadTransaction", &[]).unwrap_err();
        assert!(matches!(err, ContractError::WrongArity { expected: 1, actual: 0, .. }));

        let mut bad_amount = create_args("10", "Pending");
        bad_amount[1] = "lots".to_string();
        let err = handler.invoke("CreateTransaction", &bad_amount).unwrap_err();
        assert!(matches!(err, ContractError::InvalidArgument { name: "amount", .. }));

        let mut nan_amount = create_args("10", "Pending");
        nan_amount[1] = "NaN".to_string();
        assert!(handler.invoke("CreateTransaction", &nan_amount).is_err());

        let mut bad_purchase = create_args("10", "Pending");
        bad_purchase[7] = "{}".to_string();
        let err = handler.invoke("CreateTransaction", &bad_purchase).unwrap_err();
        assert_eq!(err.kind(), "InvalidArgument");

        let err = handler.invoke("Transfer", &[]).unwrap_err();
        assert_eq!(err.kind(), "UnknownFunction");
    }

    #[test]
    fn test_handle_wraps_store_errors() {
        let mut handler = make_handler();

        let response = handler.handle(&Invocation::new("ReadTransaction", args(&["404"])));
        assert_eq!(response["error"]["kind"], json!("NotFound"));
        assert_eq!(
            response["error"]["message"],
            json!("the transaction 404 does not exist")
        );

        handler.handle(&Invocation::new("CreateTransaction", create_args("10", "Pending")));
        let response = handler.handle(&Invocation::new("CreateTransaction", create_args("10", "Pending")));
        assert_eq!(response["error"]["kind"], json!("AlreadyExists"));

        let response = handler.handle(&Invocation::new("TransactionExists", args(&["10"])));
        assert_eq!(response, json!({ "result": true }));
    }

    #[test]
    fn test_invocation_args_default_to_empty() {
        let invocation: Invocation = serde_json::from_str(r#"{"function":"GetAllTransactions"}"#).unwrap();
        assert!(invocation.args.is_empty());
    }
}
