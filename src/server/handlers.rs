//! Handlers for the reminder endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DELIVERY_FAILURE_MESSAGE;
use crate::reminder::ReminderRequest;
use crate::renewal::{classify, validator::is_valid_email};
use crate::server::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of `POST /api/send-email`. Every field is optional here so missing
/// values produce a validation message instead of a decode error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub to: Option<String>,
    pub payer: Option<String>,
    pub company: Option<String>,
    pub expiry_date: Option<String>,
    pub days_remaining: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn reply(status: StatusCode, message: &str) -> ApiResult {
    (
        status,
        Json(ApiResponse {
            success: status.is_success(),
            message: message.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn send_email(
    State(state): State<AppState>,
    body: Result<Json<SendEmailRequest>, JsonRejection>,
) -> ApiResult {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!("Rejected reminder request body: {}", rejection);
            return reply(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    let request = match parse_request(body) {
        Ok(request) => request,
        Err(message) => return reply(StatusCode::BAD_REQUEST, message),
    };

    let tier = classify(request.days_remaining);
    let payload = state.composer.compose(&request, tier, Utc::now());

    match state.composer.deliver(state.transport.as_ref(), &payload).await {
        Ok(()) => reply(StatusCode::OK, "Email sent successfully"),
        Err(e) => {
            warn!("Reminder endpoint delivery failed: {}", e);
            reply(StatusCode::INTERNAL_SERVER_ERROR, DELIVERY_FAILURE_MESSAGE)
        }
    }
}

/// Check required fields, then the email shape, then the day count.
fn parse_request(body: SendEmailRequest) -> Result<ReminderRequest, &'static str> {
    const MISSING: &str = "Missing required parameters";

    let present = |value: Option<String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let (Some(to), Some(payer), Some(company), Some(expiry_date), Some(days)) = (
        present(body.to),
        present(body.payer),
        present(body.company),
        present(body.expiry_date),
        body.days_remaining,
    ) else {
        return Err(MISSING);
    };

    if !is_valid_email(&to) {
        return Err("Invalid email format");
    }

    let days_remaining = days
        .as_i64()
        .or_else(|| days.as_f64().filter(|d| d.is_finite()).map(|d| d.ceil() as i64))
        .ok_or("daysRemaining must be a number")?;

    Ok(ReminderRequest {
        to,
        payer,
        company,
        expiry_date,
        days_remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> SendEmailRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accepts_a_complete_request() {
        let request = parse_request(body(json!({
            "to": "ops@acme.io",
            "payer": "Alice",
            "company": "Acme",
            "expiryDate": "2026-01-01",
            "daysRemaining": 12
        })))
        .unwrap();
        assert_eq!(request.days_remaining, 12);
        assert_eq!(request.expiry_date, "2026-01-01");
    }

    #[test]
    fn zero_days_is_present_not_missing() {
        let request = parse_request(body(json!({
            "to": "ops@acme.io",
            "payer": "Alice",
            "company": "Acme",
            "expiryDate": "2026-01-01",
            "daysRemaining": 0
        })))
        .unwrap();
        assert_eq!(request.days_remaining, 0);
    }

    #[test]
    fn blank_or_absent_fields_are_missing() {
        assert_eq!(
            parse_request(body(json!({
                "to": "ops@acme.io",
                "payer": "  ",
                "company": "Acme",
                "expiryDate": "2026-01-01",
                "daysRemaining": 3
            }))),
            Err("Missing required parameters")
        );
        assert_eq!(
            parse_request(body(json!({ "to": "ops@acme.io" }))),
            Err("Missing required parameters")
        );
    }

    #[test]
    fn rejects_bad_email_before_bad_days() {
        assert_eq!(
            parse_request(body(json!({
                "to": "not-an-email",
                "payer": "Alice",
                "company": "Acme",
                "expiryDate": "2026-01-01",
                "daysRemaining": "soon"
            }))),
            Err("Invalid email format")
        );
    }

    #[test]
    fn rejects_non_numeric_days() {
        assert_eq!(
            parse_request(body(json!({
                "to": "ops@acme.io",
                "payer": "Alice",
                "company": "Acme",
                "expiryDate": "2026-01-01",
                "daysRemaining": "5"
            }))),
            Err("daysRemaining must be a number")
        );
    }
}
