//! Notification payload models pushed by the broker

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Envelope for a broker push notification with a typed body
#[derive(Debug, Clone, Deserialize)]
pub struct Notification<T> {
    pub kind: String,
    pub body: T,
}

/// Currency amount attached to transfer values and fees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketCurrency {
    #[serde(deserialize_with = "deserialize_decimal_flexible")]
    pub amount: Decimal,
    pub currency: String,
}

/// Body of a transaction or transfer notification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEventBody {
    pub block_hash: String,
    pub block_number: u64,
    pub transaction_id: String,
    pub from: String,
    pub to: String,
    pub value: SocketCurrency,
    pub data: String,
    pub fee: SocketCurrency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_contract_address: Option<String>,
    pub timestamp: u64,
}

/// Body of a smart-contract event notification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractEventBody {
    pub block_number: u64,
    pub block_hash: String,
    pub transaction_id: String,
    pub event_name: String,
    pub return_values: Vec<String>,
    pub fee: SocketCurrency,
    pub timestamp: u64,
}

/// Deserialize a decimal from either a string or a number
pub(crate) fn deserialize_decimal_flexible<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{Error, Visitor};
    use std::fmt;

    struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = Decimal;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a decimal number as string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            value
                .parse::<Decimal>()
                .map_err(|_| E::custom(format!("Invalid decimal string: {}", value)))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Decimal::try_from(value)
                .map_err(|_| E::custom(format!("Invalid decimal number: {}", value)))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(Decimal::from(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(Decimal::from(value))
        }
    }

    deserializer.deserialize_any(DecimalVisitor)
}
