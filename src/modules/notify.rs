//! Approval notifications
//!
//! Notifications are best-effort: [`dispatch`] runs the notifier in a detached
//! task after the approval change is committed and only logs failures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use minijinja::{context, Environment};
use serde::Serialize;
use uuid::Uuid;

use crate::core::config::NotifyConfig;
use crate::core::error::AppError;

const APPROVAL_TEMPLATE_NAME: &str = "approval";
const APPROVAL_TEMPLATE: &str = "Hello {{ name }}, your student profile is now {{ status }}.\
{% if status == 'rejected' and note %} Note from the reviewer: {{ note }}{% endif %}";

/// What the student is told after a review decision
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalNotice {
    pub account_id: Uuid,
    pub name: String,
    pub email: String,
    pub status: String,
    pub note: String,
    pub decided_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &ApprovalNotice) -> Result<(), AppError>;
}

/// Run the notifier in the background. Errors are logged, never returned.
pub fn dispatch(notifier: Arc<dyn Notifier>, notice: ApprovalNotice) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&notice).await {
            tracing::warn!(
                "Failed to notify {} about status {}: {}",
                notice.email,
                notice.status,
                e
            );
        }
    });
}

/// Render the human readable message for a notice
pub fn render_message(notice: &ApprovalNotice) -> Result<String, AppError> {
    let mut env = Environment::new();
    env.add_template(APPROVAL_TEMPLATE_NAME, APPROVAL_TEMPLATE)
        .map_err(|e| AppError::Internal(format!("Invalid notification template: {}", e)))?;

    env.get_template(APPROVAL_TEMPLATE_NAME)
        .and_then(|template| {
            template.render(context! {
                name => &notice.name,
                status => &notice.status,
                note => &notice.note,
            })
        })
        .map_err(|e| AppError::Internal(format!("Failed to render notification: {}", e)))
}

/// Records the notification in the log only
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: &ApprovalNotice) -> Result<(), AppError> {
        let message = render_message(notice)?;
        tracing::info!(
            email = %notice.email,
            status = %notice.status,
            "[notify] Would notify {}: {}",
            notice.email,
            message
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    #[serde(flatten)]
    notice: &'a ApprovalNotice,
    message: String,
}

/// POSTs the notice as JSON to a configured webhook
pub struct WebhookNotifier {
    url: String,
    http_client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout: Duration) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { url, http_client })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notice: &ApprovalNotice) -> Result<(), AppError> {
        let payload = WebhookPayload {
            notice,
            message: render_message(notice)?,
        };

        let response = self
            .http_client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to send notification: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalServiceError(format!(
                "Notification webhook returned HTTP {} - {}",
                status, body
            )));
        }

        tracing::debug!("Notification delivered to webhook for {}", notice.email);
        Ok(())
    }
}

/// Pick the notifier from configuration
pub fn from_config(config: &NotifyConfig) -> Result<Arc<dyn Notifier>, AppError> {
    match &config.webhook_url {
        Some(url) => {
            tracing::info!("Approval notifications sent to webhook {}", url);
            Ok(Arc::new(WebhookNotifier::new(url.clone(), config.timeout)?))
        }
        None => {
            tracing::info!("No notification webhook configured, notifications are logged only");
            Ok(Arc::new(LogNotifier))
        }
    }
}
