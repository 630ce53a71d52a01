//! Persistence gateway: append-only storage of contact submissions and
//! status checks.

use crate::models::{ContactDocument, ContactSubmission, StatusCheck, StatusCheckDocument};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc, options::ClientOptions, options::FindOptions, Client as MongoClient, Collection,
    Database,
};
use service_core::error::AppError;
use tokio::sync::Mutex;

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert_contact(&self, contact: &ContactSubmission) -> Result<(), AppError>;
    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), AppError>;
    /// Status checks in natural insertion order, at most `limit` of them.
    async fn list_status_checks(&self, limit: i64) -> Result<Vec<StatusCheck>, AppError>;
    async fn health_check(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        let mut options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        options.app_name = Some("contact-service".to_string());

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;

        let db = client.database(database);
        tracing::info!(database = %database, "Connected to MongoDB");

        Ok(Self { client, db })
    }

    pub fn contact_forms(&self) -> Collection<ContactDocument> {
        self.db.collection("contact_forms")
    }

    pub fn status_checks(&self) -> Collection<StatusCheckDocument> {
        self.db.collection("status_checks")
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Release the connection pool. Called once after the server stops.
    pub async fn close(self) {
        self.client.shutdown().await;
        tracing::info!("MongoDB client closed");
    }
}

#[async_trait]
impl SubmissionStore for MongoStore {
    async fn insert_contact(&self, contact: &ContactSubmission) -> Result<(), AppError> {
        self.contact_forms()
            .insert_one(ContactDocument::from(contact), None)
            .await
            .map_err(|e| {
                tracing::error!(contact_id = %contact.id, "Failed to insert contact form: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), AppError> {
        self.status_checks()
            .insert_one(StatusCheckDocument::from(check), None)
            .await
            .map_err(|e| {
                tracing::error!(status_check_id = %check.id, "Failed to insert status check: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    async fn list_status_checks(&self, limit: i64) -> Result<Vec<StatusCheck>, AppError> {
        let find_options = FindOptions::builder()
            .projection(doc! { "_id": 0 })
            .limit(limit)
            .build();

        let cursor = self
            .status_checks()
            .find(doc! {}, find_options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list status checks: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        let documents: Vec<StatusCheckDocument> = cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect status checks: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;

        documents
            .into_iter()
            .map(|doc| {
                StatusCheck::try_from(doc).map_err(|e| {
                    tracing::error!("Stored status check has an unreadable timestamp: {}", e);
                    AppError::DatabaseError(anyhow::anyhow!(e))
                })
            })
            .collect()
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }
}

/// In-memory store for tests and local runs without MongoDB.
///
/// Records go through the same text-timestamp documents as [`MongoStore`].
pub struct MockStore {
    fail_writes: bool,
    contacts: Mutex<Vec<ContactDocument>>,
    status_checks: Mutex<Vec<StatusCheckDocument>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            fail_writes: false,
            contacts: Mutex::new(Vec::new()),
            status_checks: Mutex::new(Vec::new()),
        }
    }

    /// A store whose inserts always fail.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }

    pub async fn contacts(&self) -> Vec<ContactDocument> {
        self.contacts.lock().await.clone()
    }

    pub async fn status_check_count(&self) -> usize {
        self.status_checks.lock().await.len()
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "mock store rejects writes"
            )));
        }
        Ok(())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionStore for MockStore {
    async fn insert_contact(&self, contact: &ContactSubmission) -> Result<(), AppError> {
        self.check_writable()?;
        self.contacts.lock().await.push(ContactDocument::from(contact));
        Ok(())
    }

    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), AppError> {
        self.check_writable()?;
        self.status_checks
            .lock()
            .await
            .push(StatusCheckDocument::from(check));
        Ok(())
    }

    async fn list_status_checks(&self, limit: i64) -> Result<Vec<StatusCheck>, AppError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        self.status_checks
            .lock()
            .await
            .iter()
            .take(limit)
            .cloned()
            .map(|doc| {
                StatusCheck::try_from(doc).map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
            })
            .collect()
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatusCheckRequest;

    fn check(name: &str) -> StatusCheck {
        StatusCheck::new(StatusCheckRequest {
            client_name: name.to_string(),
        })
    }

    #[tokio::test]
    async fn mock_store_lists_in_insertion_order() {
        let store = MockStore::new();
        for name in ["a", "b", "c"] {
            store.insert_status_check(&check(name)).await.unwrap();
        }

        let names: Vec<String> = store
            .list_status_checks(1000)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.client_name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn mock_store_honours_limit() {
        let store = MockStore::new();
        for i in 0..5 {
            store.insert_status_check(&check(&i.to_string())).await.unwrap();
        }
        assert_eq!(store.list_status_checks(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failing_store_rejects_inserts() {
        let store = MockStore::failing();
        assert!(store.insert_status_check(&check("x")).await.is_err());
        assert_eq!(store.status_check_count().await, 0);
    }
}
