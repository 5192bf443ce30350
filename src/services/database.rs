use crate::error::AppError;
use crate::models::{BoxRecord, Customer, User};
use mongodb::{
    bson::doc, options::IndexOptions, Client as MongoClient, Collection, Database, IndexModel,
};
use std::collections::HashSet;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Connected to MongoDB database");
        Ok(Self { client, db })
    }

    /// Create the indexes the service relies on. The unique index on
    /// `boxes.box_number` is the real authority for box ownership: the
    /// collision filter is advisory and race losers are rejected here.
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes");

        let box_number_index = IndexModel::builder()
            .keys(doc! { "box_number": 1 })
            .options(
                IndexOptions::builder()
                    .name("box_number_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.boxes()
            .create_index(box_number_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create unique index on boxes.box_number: {}", e);
                AppError::from(e)
            })?;

        let box_tenant_index = IndexModel::builder()
            .keys(doc! { "tenant_id": 1, "customer_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("box_tenant_lookup".to_string())
                    .build(),
            )
            .build();
        self.boxes()
            .create_index(box_tenant_index, None)
            .await
            .map_err(AppError::from)?;

        let customer_tenant_index = IndexModel::builder()
            .keys(doc! { "tenant_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("customer_tenant_lookup".to_string())
                    .build(),
            )
            .build();
        self.customers()
            .create_index(customer_tenant_index, None)
            .await
            .map_err(AppError::from)?;

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("email_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.users()
            .create_index(email_index, None)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    /// Batched existence check for the collision filter: one query for the
    /// whole incoming vocabulary, store-wide (deliberately not tenant-scoped).
    pub async fn existing_box_numbers(
        &self,
        vocabulary: &[String],
    ) -> Result<HashSet<String>, AppError> {
        if vocabulary.is_empty() {
            return Ok(HashSet::new());
        }
        let values = self
            .boxes()
            .distinct("box_number", doc! { "box_number": { "$in": vocabulary } }, None)
            .await
            .map_err(AppError::from)?;
        Ok(values
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    pub fn customers(&self) -> Collection<Customer> {
        self.db.collection("customers")
    }

    pub fn boxes(&self) -> Collection<BoxRecord> {
        self.db.collection("boxes")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
