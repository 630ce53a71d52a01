use crate::models::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct StatusCheckRequest {
    pub client_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCheck {
    pub id: String,
    pub client_name: String,
    pub timestamp: DateTime<Utc>,
}

impl StatusCheck {
    pub fn new(request: StatusCheckRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_name: request.client_name,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCheckDocument {
    pub id: String,
    pub client_name: String,
    pub timestamp: String,
}

impl From<&StatusCheck> for StatusCheckDocument {
    fn from(check: &StatusCheck) -> Self {
        Self {
            id: check.id.clone(),
            client_name: check.client_name.clone(),
            timestamp: timestamp::to_text(&check.timestamp),
        }
    }
}

impl TryFrom<StatusCheckDocument> for StatusCheck {
    type Error = chrono::ParseError;

    fn try_from(doc: StatusCheckDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            timestamp: timestamp::parse_text(&doc.timestamp)?,
            id: doc.id,
            client_name: doc.client_name,
        })
    }
}
