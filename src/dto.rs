use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Body of `POST /api/send-email` as the browser sends it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub recipient_email: Option<String>,
    pub email_topic: Option<String>,
    pub additional_context: Option<String>,
}

/// A request whose required fields are known to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailOrder {
    pub recipient_email: String,
    pub email_topic: String,
    pub additional_context: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<SendEmailRequest> for EmailOrder {
    type Error = ValidationError;

    fn try_from(request: SendEmailRequest) -> Result<Self, Self::Error> {
        let (Some(recipient_email), Some(email_topic)) = (
            non_empty(request.recipient_email),
            non_empty(request.email_topic),
        ) else {
            return Err(ValidationError::MissingFields);
        };

        Ok(Self {
            recipient_email,
            email_topic,
            additional_context: request.additional_context,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub message: String,
    pub debug_log: DebugLog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugLog {
    pub recipient_email: String,
    pub subject: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_fields() {
        let request: SendEmailRequest = serde_json::from_str(
            r#"{"recipientEmail":"a@b.com","emailTopic":"thank the client"}"#,
        )
        .unwrap();
        let order = EmailOrder::try_from(request).unwrap();
        assert_eq!(order.recipient_email, "a@b.com");
        assert_eq!(order.email_topic, "thank the client");
        assert_eq!(order.additional_context, None);
    }

    #[test]
    fn missing_or_empty_required_fields_are_rejected() {
        let cases = [
            r#"{"emailTopic":"hi"}"#,
            r#"{"recipientEmail":"a@b.com"}"#,
            r#"{"recipientEmail":"","emailTopic":"hi"}"#,
            r#"{"recipientEmail":"a@b.com","emailTopic":""}"#,
            r"{}",
        ];
        for case in cases {
            let request: SendEmailRequest = serde_json::from_str(case).unwrap();
            assert!(
                matches!(
                    EmailOrder::try_from(request),
                    Err(ValidationError::MissingFields)
                ),
                "{case} should be rejected"
            );
        }
    }

    #[test]
    fn recipient_format_is_not_checked() {
        let request = SendEmailRequest {
            recipient_email: Some("not-an-address".into()),
            email_topic: Some("hello".into()),
            additional_context: Some(String::new()),
        };
        let order = EmailOrder::try_from(request).unwrap();
        assert_eq!(order.recipient_email, "not-an-address");
        assert_eq!(order.additional_context.as_deref(), Some(""));
    }

    #[test]
    fn only_empty_strings_count_as_missing() {
        let request: SendEmailRequest = serde_json::from_str(
            r#"{"recipientEmail":"a@b.com","emailTopic":"  ","additionalContext":" "}"#,
        )
        .unwrap();
        let order = EmailOrder::try_from(request).unwrap();
        assert_eq!(order.email_topic, "  ");
        assert_eq!(order.additional_context.as_deref(), Some(" "));
    }

    #[test]
    fn response_serializes_debug_log() {
        let response = SendEmailResponse {
            message: "ok".into(),
            debug_log: DebugLog {
                recipient_email: "a@b.com".into(),
                subject: "Hi".into(),
                model: "gemini-1.5-flash".into(),
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["debugLog"]["recipientEmail"], "a@b.com");
        assert_eq!(value["debugLog"]["model"], "gemini-1.5-flash");
    }
}
