//! REST client implementation for the adapter and wallet hub services

use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::api::types::*;
use crate::config::ClientConfig;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Service error {code}: {description}")]
    Api { code: u16, description: String },
    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid decimal in response: {0}")]
    Number(#[from] rust_decimal::Error),
}

/// REST client for the adapter and wallet hub services
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self { client, config })
    }

    /// Fetch the balance of an address, in wei
    pub async fn balance(&self, address: &str) -> Result<Decimal, ApiError> {
        let url = format!(
            "{}/ethereum/balance/{}",
            self.config.wallet.http_url(),
            address
        );
        debug!(%url, "Requesting balance");

        let body = self.get(&url).await?;
        let response: BalanceResponse = serde_json::from_str(&body)?;
        Ok(response.data.balance.parse::<Decimal>()?)
    }

    /// Submit a raw transaction for the adapter to sign and relay
    pub async fn send_tx(&self, tx: &RawTransaction) -> Result<SendTxResponse, ApiError> {
        let url = format!("{}/ethereum/transaction", self.config.adapter.http_url());
        debug!(%url, "Sending raw transaction");

        let body = self.post(&url, &json!({ "tx": tx })).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Submit an already-signed transaction
    pub async fn send_signed_tx(&self, tx: &str) -> Result<SendTxResponse, ApiError> {
        let url = format!(
            "{}/ethereum/transaction/signed",
            self.config.adapter.http_url()
        );
        debug!(%url, "Sending signed transaction");

        let body = self.post(&url, &json!({ "tx": tx })).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Encode a transfer intent into the QR payload format
    pub async fn encode_protocol(
        &self,
        action: &str,
        value: &str,
        to: &str,
        data: &str,
        dlt: &str,
    ) -> Result<ProtocolEncodeResponse, ApiError> {
        let url = format!(
            "{}/ethereum/protocol/encode",
            self.config.adapter.http_url()
        );
        let payload = ProtocolPayload {
            action: action.to_string(),
            body: ProtocolPayloadBody {
                value: value.to_string(),
                to: to.to_string(),
                data: data.to_string(),
            },
            dlt: dlt.to_string(),
        };
        debug!(%url, action, "Encoding protocol payload");

        let body = self.post(&url, &payload).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Decode a QR payload back into a transfer intent
    pub async fn decode_protocol(&self, code: &str) -> Result<ProtocolDecodeResponse, ApiError> {
        let url = format!(
            "{}/ethereum/protocol/decode",
            self.config.adapter.http_url()
        );
        debug!(%url, "Decoding protocol payload");

        let body = self.post(&url, &json!({ "code": code })).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch metadata of a registered token, by address or alias
    pub async fn token_metadata(
        &self,
        address_or_alias: &str,
    ) -> Result<TokenMetadata, ApiError> {
        let url = format!(
            "{}/ethereum/token/{}/metadata",
            self.config.adapter.http_url(),
            address_or_alias
        );
        debug!(%url, "Requesting token metadata");

        let body = self.get(&url).await?;
        let response: TokenMetadataResponse = serde_json::from_str(&body)?;
        Ok(response.data)
    }

    /// Fetch the token balance of an address
    pub async fn token_balance(
        &self,
        address_or_alias: &str,
        address: &str,
    ) -> Result<TokenBalance, ApiError> {
        let url = format!(
            "{}/ethereum/token/{}/balance/{}",
            self.config.adapter.http_url(),
            address_or_alias,
            address
        );
        debug!(%url, "Requesting token balance");

        let body = self.get(&url).await?;
        let response: TokenBalanceResponse = serde_json::from_str(&body)?;
        Ok(response.data)
    }

    async fn get(&self, url: &str) -> Result<String, ApiError> {
        let response = self.client.get(url).send().await?;
        Self::check_status(response).await
    }

    async fn post<B: Serialize>(&self, url: &str, body: &B) -> Result<String, ApiError> {
        let response = self.client.post(url).json(body).send().await?;
        Self::check_status(response).await
    }

    /// Map non-2xx responses to `ApiError::Api`, using the service's result
    /// envelope for the description when one is present
    async fn check_status(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let description = match serde_json::from_str::<GenericResponse>(&body) {
                Ok(envelope) => envelope.result.description,
                Err(_) => body,
            };
            return Err(ApiError::Api {
                code: status.as_u16(),
                description,
            });
        }

        Ok(body)
    }
}
