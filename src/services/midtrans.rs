use crate::config::MidtransConfig;
use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const CORE_API_SANDBOX: &str = "https://api.sandbox.midtrans.com";
const CORE_API_PRODUCTION: &str = "https://api.midtrans.com";
const SNAP_SANDBOX: &str = "https://app.sandbox.midtrans.com";
const SNAP_PRODUCTION: &str = "https://app.midtrans.com";

/// Thin HTTP client over the Midtrans Core and Snap APIs. Authenticates with
/// the server key via HTTP basic auth; responses carrying a 4xx/5xx
/// `status_code` body field surface as `ServiceError::PaymentGateway`.
#[derive(Debug, Clone)]
pub struct MidtransClient {
    http: reqwest::Client,
    server_key: String,
    core_base: String,
    snap_base: String,
}

impl MidtransClient {
    /// Builds a client from configuration, or None when no server key is
    /// set (offline mode is handled by the caller).
    pub fn from_config(cfg: &MidtransConfig) -> Option<Self> {
        if !cfg.is_configured() {
            return None;
        }
        let (core, snap) = if cfg.is_production {
            (CORE_API_PRODUCTION, SNAP_PRODUCTION)
        } else {
            (CORE_API_SANDBOX, SNAP_SANDBOX)
        };
        Some(Self::with_base_urls(&cfg.server_key, core, snap))
    }

    /// Client against explicit base URLs. Used by tests to point at a local
    /// mock server.
    pub fn with_base_urls(server_key: &str, core_base: &str, snap_base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            server_key: server_key.to_string(),
            core_base: core_base.trim_end_matches('/').to_string(),
            snap_base: snap_base.trim_end_matches('/').to_string(),
        }
    }

    /// Issues a Core API charge (qris, bank_transfer or echannel).
    #[instrument(skip(self, request), fields(order_id = %request.transaction_details.order_id))]
    pub async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse, ServiceError> {
        let url = format!("{}/v2/charge", self.core_base);
        debug!(payment_type = %request.payment_type, "issuing charge");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.server_key, Some(""))
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::PaymentGateway(e.to_string()))?;

        let body: ChargeResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::PaymentGateway(e.to_string()))?;
        reject_api_error(body.status_code.as_deref(), body.status_message.as_deref())?;
        Ok(body)
    }

    /// Creates a Snap checkout page and returns its token + redirect URL.
    #[instrument(skip(self, request), fields(order_id = %request.transaction_details.order_id))]
    pub async fn create_snap_transaction(
        &self,
        request: &SnapRequest,
    ) -> Result<SnapResponse, ServiceError> {
        let url = format!("{}/snap/v1/transactions", self.snap_base);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.server_key, Some(""))
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::PaymentGateway(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::PaymentGateway(format!(
                "snap transaction failed ({}): {}",
                status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::PaymentGateway(e.to_string()))
    }

    /// Queries the live transaction status for a gateway order reference.
    #[instrument(skip(self))]
    pub async fn transaction_status(
        &self,
        gateway_order_id: &str,
    ) -> Result<TransactionStatusResponse, ServiceError> {
        let url = format!("{}/v2/{}/status", self.core_base, gateway_order_id);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.server_key, Some(""))
            .send()
            .await
            .map_err(|e| ServiceError::PaymentGateway(e.to_string()))?;

        let body: TransactionStatusResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::PaymentGateway(e.to_string()))?;
        reject_api_error(body.status_code.as_deref(), body.status_message.as_deref())?;
        Ok(body)
    }
}

fn reject_api_error(code: Option<&str>, message: Option<&str>) -> Result<(), ServiceError> {
    if let Some(code) = code {
        if code.parse::<u16>().map_or(false, |c| c >= 400) {
            return Err(ServiceError::PaymentGateway(format!(
                "midtrans error {}: {}",
                code,
                message.unwrap_or("unknown")
            )));
        }
    }
    Ok(())
}

// Request shapes

#[derive(Debug, Serialize)]
pub struct ChargeRequest {
    pub payment_type: String,
    pub transaction_details: TransactionDetails,
    pub item_details: Vec<ItemDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qris: Option<QrisParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_transfer: Option<BankTransferParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echannel: Option<EchannelParams>,
}

impl ChargeRequest {
    pub fn qris(details: TransactionDetails, items: Vec<ItemDetail>) -> Self {
        Self {
            payment_type: "qris".into(),
            transaction_details: details,
            item_details: items,
            qris: Some(QrisParams {
                acquirer: "gopay".into(),
            }),
            bank_transfer: None,
            echannel: None,
        }
    }

    pub fn bank_transfer(details: TransactionDetails, items: Vec<ItemDetail>, bank: &str) -> Self {
        Self {
            payment_type: "bank_transfer".into(),
            transaction_details: details,
            item_details: items,
            qris: None,
            bank_transfer: Some(BankTransferParams { bank: bank.into() }),
            echannel: None,
        }
    }

    /// Mandiri bill-payment charge; Midtrans models it as a distinct
    /// "echannel" payment type rather than a bank_transfer variant.
    pub fn echannel(details: TransactionDetails, items: Vec<ItemDetail>) -> Self {
        Self {
            payment_type: "echannel".into(),
            transaction_details: details,
            item_details: items,
            qris: None,
            bank_transfer: None,
            echannel: Some(EchannelParams {
                bill_info1: "Payment".into(),
                bill_info2: "Online".into(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Serialize)]
pub struct ItemDetail {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub price: i64,
}

#[derive(Debug, Serialize)]
pub struct QrisParams {
    pub acquirer: String,
}

#[derive(Debug, Serialize)]
pub struct BankTransferParams {
    pub bank: String,
}

#[derive(Debug, Serialize)]
pub struct EchannelParams {
    pub bill_info1: String,
    pub bill_info2: String,
}

#[derive(Debug, Serialize)]
pub struct SnapRequest {
    pub transaction_details: TransactionDetails,
    pub item_details: Vec<ItemDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_payments: Option<Vec<String>>,
}

// Response shapes

#[derive(Debug, Default, Deserialize)]
pub struct ChargeResponse {
    pub status_code: Option<String>,
    pub status_message: Option<String>,
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
    pub qr_string: Option<String>,
    #[serde(default)]
    pub va_numbers: Vec<VaNumber>,
    pub permata_va_number: Option<String>,
    pub bca_va_number: Option<String>,
    pub bni_va_number: Option<String>,
    pub bri_va_number: Option<String>,
    pub expiry_time: Option<String>,
    pub biller_code: Option<String>,
    pub bill_key: Option<String>,
}

impl ChargeResponse {
    /// Extracts the (bank, va_number) pair from a bank-transfer charge.
    /// Prefers the list-shaped `va_numbers`; otherwise falls back through
    /// the per-bank single-value fields in permata, bca, bni, bri order.
    /// A bank code supplied by the list survives the fallback even when the
    /// list carried no number.
    pub fn virtual_account(&self) -> (Option<String>, Option<String>) {
        let list_bank = self.va_numbers.first().and_then(|v| v.bank.clone());
        if let Some(first) = self.va_numbers.first() {
            if first.va_number.is_some() {
                return (list_bank, first.va_number.clone());
            }
        }

        let fallbacks = [
            ("permata", &self.permata_va_number),
            ("bca", &self.bca_va_number),
            ("bni", &self.bni_va_number),
            ("bri", &self.bri_va_number),
        ];
        for (bank, va) in fallbacks {
            if let Some(va) = va {
                let bank = list_bank.unwrap_or_else(|| bank.to_string());
                return (Some(bank), Some(va.clone()));
            }
        }
        (list_bank, None)
    }

    /// URL of the first gateway action, used as the display/redirect link
    /// for QR charges.
    pub fn first_action_url(&self) -> Option<String> {
        self.actions.first().map(|a| a.url.clone())
    }
}

#[derive(Debug, Deserialize)]
pub struct Action {
    pub name: Option<String>,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct VaNumber {
    pub bank: Option<String>,
    pub va_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SnapResponse {
    pub token: String,
    pub redirect_url: String,
}

#[derive(Debug, Deserialize)]
pub struct TransactionStatusResponse {
    pub status_code: Option<String>,
    pub status_message: Option<String>,
    pub transaction_status: Option<String>,
}
