use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub(crate) enum PaymentStatus {
    #[display("verified")]
    Verified,
    #[display("failed")]
    Failed,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifyPaymentRequest {
    pub transaction_id: Option<String>,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyPaymentResponse {
    pub verified: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewPayment {
    pub transaction_id: String,
    pub amount: Decimal,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Payment {
    pub id: i64,
    pub transaction_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub status: String,
    pub verified_at: Option<String>,
    pub created_at: String,
}
