use actix_web::{get, post, web, Responder};
use log::{error, info};
use rust_decimal::Decimal;

use crate::server::controller::error::ApiError;
use crate::server::database::store::Store;
use crate::server::model::payment::{NewPayment, PaymentStatus, VerifyPaymentRequest, VerifyPaymentResponse};
use crate::server::model::CommonRequestParams;
use crate::server::state::AppState;
use crate::server::util::column::{fits_numeric, fits_varchar, NUMERIC_10_2_MAX};

const MAX_TRANSACTION_ID_LEN: usize = 100;

impl VerifyPaymentRequest {
    fn validate(self) -> Result<(String, Decimal), ApiError> {
        let transaction_id = self
            .transaction_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::Validation("Transaction ID is required".to_string()))?;
        if !fits_varchar(&transaction_id, MAX_TRANSACTION_ID_LEN) {
            return Err(ApiError::Validation(format!(
                "Transaction ID must be at most {MAX_TRANSACTION_ID_LEN} characters"
            )));
        }
        let amount = self
            .amount
            .filter(|amount| *amount > Decimal::ZERO)
            .ok_or_else(|| ApiError::Validation("Amount must be positive".to_string()))?;
        if !fits_numeric(amount, 2, NUMERIC_10_2_MAX) {
            return Err(ApiError::Validation("Amount is out of range".to_string()));
        }
        Ok((transaction_id, amount))
    }
}

#[post("/api/verify_payment")]
/// Simulated bank verification; every attempt is recorded
async fn verify_payment(
    body: web::Json<VerifyPaymentRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, ApiError> {
    let (transaction_id, amount) = body.into_inner().validate()?;
    let verified = data.fraud_check().approve();
    let payment = NewPayment {
        transaction_id,
        amount,
        status: if verified { PaymentStatus::Verified } else { PaymentStatus::Failed },
    };

    data.store().record_payment(&payment).await.map_err(|e| {
        error!("verify_payment failed to record {}, {}", payment.transaction_id, e);
        ApiError::from(e)
    })?;
    info!("payment={} amount={} status={}", payment.transaction_id, payment.amount, payment.status);

    Ok(web::Json(VerifyPaymentResponse {
        verified,
        message: if verified {
            "Payment verified successfully"
        } else {
            "Potential fraud detected"
        }
        .to_string(),
    }))
}

#[get("/api/payment_history")]
async fn payment_history(
    params: web::Query<CommonRequestParams>,
    data: web::Data<AppState>,
) -> Result<impl Responder, ApiError> {
    let (offset, limit) = params.window();
    match data.store().payment_history(offset, limit).await {
        Ok(payments) => Ok(web::Json(payments)),
        Err(e) => {
            error!("payment_history failed, {}", e);
            Err(e.into())
        }
    }
}
