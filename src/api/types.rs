//! Response models for the adapter and wallet hub REST services

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::deserialize_decimal_flexible;

/// Result header present on every service response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResult {
    pub code: u16,
    pub description: String,
}

/// Response carrying nothing but the result header
#[derive(Debug, Clone, Deserialize)]
pub struct GenericResponse {
    pub result: ApiResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    pub result: ApiResult,
    pub data: BalanceData,
}

/// Balances travel as strings; wei amounts overflow JSON numbers
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceData {
    pub balance: String,
}

/// Transaction submission outcome
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTxResponse {
    pub success: bool,
    #[serde(default)]
    pub tx_receipt: Option<TxReceipt>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: String,
    pub transaction_index: u32,
    pub block_hash: String,
    pub block_number: u64,
    pub gas_used: u64,
    pub cumulative_gas_used: u64,
    pub contract_address: Option<String>,
    pub status: bool,
}

/// Payload for protocol encode requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolPayload {
    pub action: String,
    pub body: ProtocolPayloadBody,
    pub dlt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolPayloadBody {
    pub value: String,
    pub to: String,
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolEncodeResponse {
    pub result: ApiResult,
    pub data: QrData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrData {
    pub qr_encode: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolDecodeResponse {
    pub result: ApiResult,
    pub data: ProtocolPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenMetadataResponse {
    pub result: ApiResult,
    pub data: TokenMetadata,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    pub total_supply: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenBalanceResponse {
    pub result: ApiResult,
    pub data: TokenBalance,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenBalance {
    #[serde(deserialize_with = "deserialize_decimal_flexible")]
    pub balance: Decimal,
    pub decimals: u32,
}

/// Raw transaction as produced by the adapter; shape is chain-specific
pub type RawTransaction = Value;
