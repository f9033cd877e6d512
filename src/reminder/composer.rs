use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{RenewalError, Result, DELIVERY_FAILURE_MESSAGE};
use crate::reminder::transport::MailTransport;
use crate::renewal::UrgencyTier;
use crate::storage::RenewalRecord;

const SUBJECT: &str = "Service renewal payment reminder";

/// Escape text for inclusion in HTML: `& < > " '`.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// What a reminder is about, before escaping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRequest {
    pub to: String,
    pub payer: String,
    pub company: String,
    pub expiry_date: String,
    pub days_remaining: i64,
}

impl ReminderRequest {
    pub fn for_record(record: &RenewalRecord, now: DateTime<Utc>) -> Self {
        Self {
            to: record.email.clone(),
            payer: record.payer.clone(),
            company: record.company.clone(),
            expiry_date: record.expiry_string(),
            days_remaining: record.days_remaining(now),
        }
    }
}

/// User-supplied values, already HTML-escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyFields {
    pub payer: String,
    pub company: String,
    pub expiry_date: String,
    pub days_remaining: String,
}

/// A composed reminder, ready for a [`MailTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderPayload {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub tier: UrgencyTier,
    pub fields: BodyFields,
    pub sent_at: DateTime<Utc>,
}

impl ReminderPayload {
    /// Render the reminder body. Only escaped fields are interpolated.
    pub fn render_html(&self) -> String {
        let f = &self.fields;
        let color = self.tier.color();
        let prefix = self.tier.subject_prefix();
        format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <div style="background-color: {color}; color: white; padding: 15px; border-radius: 5px; text-align: center;">
    <h2 style="margin: 0;">{prefix}Service renewal payment reminder</h2>
  </div>
  <p>Dear <strong>{payer}</strong>,</p>
  <p>Our records show that the service account for <strong>{company}</strong> is about to expire. Please complete the renewal payment as soon as possible.</p>
  <table style="width: 100%; border-left: 4px solid {color}; padding: 10px;">
    <tr><td><strong>Company:</strong></td><td>{company}</td></tr>
    <tr><td><strong>Expiry date:</strong></td><td style="color: #F44336; font-weight: bold;">{expiry}</td></tr>
    <tr><td><strong>Days remaining:</strong></td><td style="color: #F44336; font-weight: bold;">{days} days</td></tr>
  </table>
  <p>Letting the account lapse may interrupt the service and make its data unavailable.</p>
  <p>If you have already renewed, please ignore this message.</p>
  <hr>
  <p style="font-size: 12px; color: #999; text-align: center;">Sent automatically by the renewal reminder service at {sent}. Please do not reply.</p>
</div>"#,
            color = color,
            prefix = prefix,
            payer = f.payer,
            company = f.company,
            expiry = f.expiry_date,
            days = f.days_remaining,
            sent = self.sent_at.format("%Y-%m-%d %H:%M UTC"),
        )
    }
}

/// Builds reminder payloads and hands them to a transport.
#[derive(Debug, Clone)]
pub struct ReminderComposer {
    from: String,
}

impl ReminderComposer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }

    pub fn compose(
        &self,
        request: &ReminderRequest,
        tier: UrgencyTier,
        sent_at: DateTime<Utc>,
    ) -> ReminderPayload {
        ReminderPayload {
            to: request.to.clone(),
            from: self.from.clone(),
            subject: format!("{}{}", tier.subject_prefix(), SUBJECT),
            tier,
            fields: BodyFields {
                payer: escape_html(&request.payer),
                company: escape_html(&request.company),
                expiry_date: escape_html(&request.expiry_date),
                days_remaining: escape_html(&request.days_remaining.to_string()),
            },
            sent_at,
        }
    }

    /// Send `payload` through `transport`.
    ///
    /// A transport failure is logged with its full cause and returned as a
    /// [`RenewalError::DeliveryFailure`] carrying only a generic message.
    /// Nothing is retried.
    pub async fn deliver(
        &self,
        transport: &dyn MailTransport,
        payload: &ReminderPayload,
    ) -> Result<()> {
        match transport.send(payload).await {
            Ok(()) => {
                info!("Reminder sent to {} ({})", payload.to, payload.tier);
                Ok(())
            }
            Err(e) => {
                error!("Reminder delivery to {} failed: {}", payload.to, e);
                Err(RenewalError::DeliveryFailure(
                    DELIVERY_FAILURE_MESSAGE.to_string(),
                ))
            }
        }
    }
}
