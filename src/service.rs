use std::sync::Arc;

use crate::{
    config::Settings,
    drafter::Drafter,
    dto::{DebugLog, EmailOrder, SendEmailRequest, SendEmailResponse},
    error::{ServiceError, ValidationError},
    mailer::Dispatcher,
};

pub const SUCCESS_MESSAGE: &str = "Email generated and sent successfully.";

pub struct EmailService {
    settings: Settings,
    drafter: Arc<dyn Drafter>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl EmailService {
    pub fn new(
        settings: Settings,
        drafter: Arc<dyn Drafter>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            settings,
            drafter,
            dispatcher,
        }
    }

    /// Validates configuration and payload, drafts the email, then sends it.
    ///
    /// `payload` is the already-decoded body, or the reason it could not be
    /// decoded. Configuration is checked first so a misconfigured process
    /// never reaches an external call.
    pub async fn send_email(
        &self,
        payload: Result<SendEmailRequest, ValidationError>,
    ) -> Result<SendEmailResponse, ServiceError> {
        let config = self.settings.validate()?;
        let order = EmailOrder::try_from(payload?)?;

        let draft = self
            .drafter
            .draft(
                &config.gemini,
                &order.email_topic,
                order.additional_context.as_deref(),
            )
            .await?;

        self.dispatcher
            .send(&config.smtp, &order.recipient_email, &draft)
            .await?;

        Ok(SendEmailResponse {
            message: SUCCESS_MESSAGE.to_string(),
            debug_log: DebugLog {
                recipient_email: order.recipient_email,
                subject: draft.subject,
                model: config.gemini.model,
            },
        })
    }
}
