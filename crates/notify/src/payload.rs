//! Mattermost incoming-webhook payload.

use serde::{Deserialize, Serialize};

/// Markdown-enabled parts of an attachment.
const MRKDWN_IN: [&str; 3] = ["pretext", "text", "fields"];

/// Body posted to the incoming webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub text: String,
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub username: String,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub fallback: String,
    pub color: String,
    pub fields: Vec<AttachmentField>,
    pub mrkdwn_in: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentField {
    pub short: bool,
    pub value: String,
}

impl NotificationPayload {
    /// Build the payload for one destination.
    ///
    /// `message` becomes the single attachment field and its fallback, `text`
    /// is shown above the attachment. An empty `room` leaves `channel` out so
    /// the webhook's default channel is used.
    #[must_use]
    pub fn build(
        message: &str,
        text: &str,
        color: &str,
        room: &str,
        username: &str,
        icon: &str,
    ) -> Self {
        let attachment = Attachment {
            fallback: message.to_string(),
            color: color.to_string(),
            fields: vec![AttachmentField {
                short: false,
                value: message.to_string(),
            }],
            mrkdwn_in: MRKDWN_IN.iter().map(ToString::to_string).collect(),
        };

        Self {
            text: text.to_string(),
            attachments: vec![attachment],
            channel: (!room.is_empty()).then(|| room.to_string()),
            username: username.to_string(),
            icon_url: icon.to_string(),
        }
    }
}
