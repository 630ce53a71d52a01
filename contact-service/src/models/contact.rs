use crate::models::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactFormRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "Phone must not be empty"))]
    pub phone: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// A contact-form submission as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ContactSubmission {
    pub fn new(request: ContactFormRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            phone: request.phone,
            message: request.message,
            timestamp: Utc::now(),
        }
    }
}

/// Stored form of [`ContactSubmission`]; the timestamp is kept as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDocument {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub message: Option<String>,
    pub timestamp: String,
}

impl From<&ContactSubmission> for ContactDocument {
    fn from(contact: &ContactSubmission) -> Self {
        Self {
            id: contact.id.clone(),
            name: contact.name.clone(),
            phone: contact.phone.clone(),
            message: contact.message.clone(),
            timestamp: timestamp::to_text(&contact.timestamp),
        }
    }
}

impl TryFrom<ContactDocument> for ContactSubmission {
    type Error = chrono::ParseError;

    fn try_from(doc: ContactDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            timestamp: timestamp::parse_text(&doc.timestamp)?,
            id: doc.id,
            name: doc.name,
            phone: doc.phone,
            message: doc.message,
        })
    }
}
