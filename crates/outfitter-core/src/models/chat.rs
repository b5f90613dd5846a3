use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Images returned by the chat endpoint, keyed by garment type in the
/// order the server listed them
pub type ImagesByType = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One message of the conversation. Held in memory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}

/// Parsed reply of `/chat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// Plain text answer from the assistant
    Message(String),
    /// Outfit suggestions, base64 images grouped by garment type
    Outfits(ImagesByType),
    /// Body carried neither `images` nor `chatMessage`
    Unexpected,
}

impl ChatReply {
    /// Interpret a chat response body. An `images` object takes precedence
    /// over `chatMessage`; non-string entries inside an image list are skipped.
    pub fn from_body(body: &Value) -> Self {
        if let Some(images) = body.get("images").and_then(Value::as_object) {
            let grouped: ImagesByType = images
                .iter()
                .map(|(garment, list)| {
                    let encoded: Vec<String> = list
                        .as_array()
                        .map(|items| {
                            items
                                .iter()
                                .filter_map(|i| i.as_str().map(str::to_string))
                                .collect()
                        })
                        .unwrap_or_default();
                    (garment.clone(), encoded)
                })
                .collect();
            return ChatReply::Outfits(grouped);
        }

        match body.get("chatMessage").and_then(Value::as_str) {
            Some(message) => ChatReply::Message(message.to_string()),
            None => ChatReply::Unexpected,
        }
    }
}

/// Mime type of a base64 image coming from the backend.
///
/// Any `data:image/...;base64,` prefix is ignored. JPEG payloads are
/// recognised by their `/9j/` base64 signature; everything else is PNG.
pub fn image_mime_type(encoded: &str) -> &'static str {
    if strip_data_uri_prefix(encoded).trim().starts_with("/9j/") {
        "image/jpeg"
    } else {
        "image/png"
    }
}

/// Remove a leading `data:image/<subtype>;base64,` header if present
pub fn strip_data_uri_prefix(encoded: &str) -> &str {
    let Some(rest) = encoded.strip_prefix("data:image/") else {
        return encoded;
    };
    let Some((subtype, payload)) = rest.split_once(";base64,") else {
        return encoded;
    };
    let valid_subtype = !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'));
    if valid_subtype {
        payload
    } else {
        encoded
    }
}

/// Slide-show state over an outfit reply: one cursor per garment type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gallery {
    images: ImagesByType,
    indices: HashMap<String, usize>,
}

impl Gallery {
    pub fn new(images: ImagesByType) -> Self {
        Self {
            images,
            indices: HashMap::new(),
        }
    }

    /// Step the cursor for a garment type, wrapping at both ends.
    /// Unknown or empty garment types are left untouched.
    pub fn move_by(&mut self, garment: &str, delta: isize) {
        let total = match self.images.get(garment) {
            Some(list) if !list.is_empty() => list.len() as isize,
            _ => return,
        };
        let current = self.index(garment) as isize;
        let next = (current + delta).rem_euclid(total) as usize;
        self.indices.insert(garment.to_string(), next);
    }

    pub fn next(&mut self, garment: &str) {
        self.move_by(garment, 1);
    }

    pub fn prev(&mut self, garment: &str) {
        self.move_by(garment, -1);
    }

    pub fn index(&self, garment: &str) -> usize {
        self.indices.get(garment).copied().unwrap_or(0)
    }

    /// Base64 payload currently shown for a garment type
    pub fn current(&self, garment: &str) -> Option<&str> {
        self.images
            .get(garment)
            .and_then(|list| list.get(self.index(garment)))
            .map(String::as_str)
    }

    /// Counter text for a garment type, e.g. "2 / 5"
    pub fn counter(&self, garment: &str) -> Option<String> {
        let total = self.images.get(garment).map(Vec::len).filter(|n| *n > 0)?;
        Some(format!("{} / {}", self.index(garment) + 1, total))
    }

    /// Garment types with at least one image, in server order
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.images
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(garment, _)| garment.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.sections().next().is_none()
    }
}
