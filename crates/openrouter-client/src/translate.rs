//! Translation between the browser's message schema and the upstream one.
//!
//! Outbound, Gemini-style `{role, parts}` turns become OpenAI-style
//! `{role, content}` messages with a system prompt in front. Inbound, the
//! first choice's content is reduced to at most one text and one image.

use persona_core::{ChatMessage, InlineData, Part};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::api_types::{
    ContentPart, ImageUrl, MessageContent, ResponseContent, ResponsePart, UpstreamMessage,
};

/// Text and image pulled out of a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedReply {
    /// Response text as returned; may be blank.
    pub text: Option<String>,
    /// Image decoded from a `data:image/...` URI.
    pub image: Option<InlineData>,
}

impl ExtractedReply {
    /// Whether neither text nor image was found.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image.is_none()
    }
}

/// Map an inbound role to the upstream one.
pub fn upstream_role(role: &str) -> &str {
    match role {
        "model" => "assistant",
        other => other,
    }
}

/// Build the upstream message list: the system prompt, then every inbound
/// turn that still has content after translation.
pub fn to_upstream(system_prompt: &str, messages: &[ChatMessage]) -> Vec<UpstreamMessage> {
    let mut upstream = Vec::with_capacity(messages.len() + 1);
    upstream.push(UpstreamMessage::system(system_prompt));

    for (index, message) in messages.iter().enumerate() {
        match translate_message(message) {
            Some(translated) => upstream.push(translated),
            None => debug!(index, role = %message.role, "Omitting message with no usable parts"),
        }
    }

    upstream
}

fn translate_message(message: &ChatMessage) -> Option<UpstreamMessage> {
    let mut entries = Vec::with_capacity(message.parts.len());

    for part in &message.parts {
        match part {
            Part::Text { text } => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    entries.push(ContentPart::Text {
                        text: trimmed.to_string(),
                    });
                }
            }
            Part::InlineData { inline_data } => match InlineData::from_value(inline_data) {
                Some(inline) if inline.is_image() => entries.push(ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: inline.to_data_uri(),
                    },
                }),
                Some(inline) => {
                    warn!(mime_type = %inline.mime_type, "Skipping non-image inline data")
                }
                None => warn!("Skipping malformed inline data part"),
            },
            Part::Unknown(_) => debug!("Skipping unsupported message part"),
        }
    }

    let content = match entries.len() {
        0 => return None,
        1 => match entries.pop() {
            Some(ContentPart::Text { text }) => MessageContent::Text(text),
            Some(image) => MessageContent::Parts(vec![image]),
            None => return None,
        },
        _ => MessageContent::Parts(entries),
    };

    Some(UpstreamMessage {
        role: upstream_role(&message.role).to_string(),
        content,
    })
}

/// Reduce response content to a text and an image.
///
/// For list content, later parts overwrite earlier ones of the same kind and
/// elements that are not part objects are skipped. Text is returned as is;
/// only absent content leaves it `None`.
pub fn extract_reply(content: Option<&ResponseContent>) -> ExtractedReply {
    let mut text = None;
    let mut image = None;

    match content {
        None => {}
        Some(ResponseContent::Text(value)) => text = Some(value.clone()),
        Some(ResponseContent::Parts(parts)) => {
            for (index, raw) in parts.iter().enumerate() {
                let part = match ResponsePart::deserialize(raw) {
                    Ok(part) => part,
                    Err(err) => {
                        warn!(index, error = %err, "Skipping malformed response part");
                        continue;
                    }
                };

                match part.kind.as_deref() {
                    Some("text") => match part.text {
                        Some(value) => text = Some(value),
                        None => warn!(index, "Skipping text part without text"),
                    },
                    Some("image_url") => {
                        let url = part.image_url.as_ref().and_then(|i| i.url.as_deref());
                        match url.and_then(parse_image_data_uri) {
                            Some(decoded) => image = Some(decoded),
                            None => warn!(index, "Skipping image part without a valid data URI"),
                        }
                    }
                    other => debug!(index, kind = ?other, "Ignoring response part"),
                }
            }
        }
        Some(ResponseContent::Other(value)) if value.is_null() => {}
        Some(ResponseContent::Other(value)) => {
            warn!("Unexpected response content shape, coercing to text");
            text = Some(value.to_string());
        }
    }

    ExtractedReply { text, image }
}

/// Split a `data:image/<subtype>;base64,<payload>` URI.
pub fn parse_image_data_uri(uri: &str) -> Option<InlineData> {
    let rest = uri.strip_prefix("data:")?;
    let (mime_type, data) = rest.split_once(";base64,")?;
    let subtype = mime_type.strip_prefix("image/")?;

    if subtype.is_empty() || data.is_empty() {
        return None;
    }

    Some(InlineData {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    })
}
