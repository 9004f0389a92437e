//! MongoDB client, typed collection wrapper, and atomic write batches
//!
//! Every admin mutation goes through this module: single-document reads and
//! writes through `MongoCollection`, multi-document cascades and reorders
//! through `WriteBatch` (one transaction, one commit).

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::{options::IndexOptions, results::UpdateResult, Client, Collection, IndexModel};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};

use crate::db::schemas::Metadata;
use crate::types::AdminError;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// MongoDB client wrapper
///
/// Constructed once in `main` and handed down through `AppState`; services
/// receive a clone rather than reaching for any global handle.
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Create a new MongoDB client
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, AdminError> {
        info!("Connecting to MongoDB at {}", uri);

        // Use serverSelectionTimeoutMS to avoid hanging on unreachable MongoDB
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| AdminError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        // Verify connection with timeout
        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AdminError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Get a typed collection
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, AdminError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + Default + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }

    /// Start an empty write batch against this database
    pub fn batch(&self) -> WriteBatch {
        WriteBatch::new(self.clone())
    }

    /// Get the raw MongoDB client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + Default + IntoIndexes + MutMetadata,
{
    /// Create a new collection and apply indexes
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, AdminError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        // Apply indexes
        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<(), AdminError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| AdminError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    /// Insert a document, stamping server-side creation and update times
    pub async fn insert_one(&self, mut item: T) -> Result<ObjectId, AdminError> {
        let metadata = item.mut_metadata();
        metadata.created_at = Some(DateTime::now());
        metadata.updated_at = Some(DateTime::now());

        let result = self
            .inner
            .insert_one(item)
            .await
            .map_err(|e| AdminError::Database(format!("Insert failed: {}", e)))?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AdminError::Database("Failed to get inserted ID".into()))
    }

    /// Find one document by filter
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, AdminError> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| AdminError::Database(format!("Find failed: {}", e)))
    }

    /// Find many documents by filter
    pub async fn find_many(&self, filter: Document) -> Result<Vec<T>, AdminError> {
        use futures_util::StreamExt;

        let cursor = self
            .inner
            .find(filter)
            .await
            .map_err(|e| AdminError::Database(format!("Find failed: {}", e)))?;

        let results: Vec<T> = cursor
            .filter_map(|doc| async {
                match doc {
                    Ok(d) => Some(d),
                    Err(e) => {
                        error!("Error reading document: {}", e);
                        None
                    }
                }
            })
            .collect()
            .await;

        Ok(results)
    }

    /// Update one document
    pub async fn update_one(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, AdminError> {
        self.inner
            .update_one(filter, update)
            .await
            .map_err(|e| AdminError::Database(format!("Update failed: {}", e)))
    }

    /// Delete one document
    pub async fn delete_one(&self, filter: Document) -> Result<u64, AdminError> {
        let result = self
            .inner
            .delete_one(filter)
            .await
            .map_err(|e| AdminError::Database(format!("Delete failed: {}", e)))?;

        Ok(result.deleted_count)
    }

    /// Count documents matching a filter
    pub async fn count(&self, filter: Document) -> Result<u64, AdminError> {
        self.inner
            .count_documents(filter)
            .await
            .map_err(|e| AdminError::Database(format!("Count failed: {}", e)))
    }

    /// Get the underlying collection for advanced operations
    pub fn inner(&self) -> &Collection<T> {
        &self.inner
    }
}

/// One staged operation inside a [`WriteBatch`]
#[derive(Debug, Clone)]
pub enum BatchOp {
    Delete {
        collection: String,
        id: ObjectId,
    },
    Update {
        collection: String,
        id: ObjectId,
        update: Document,
    },
    Insert {
        collection: String,
        document: Document,
    },
}

/// A set of writes committed atomically in one transaction
///
/// Staging is pure bookkeeping; nothing touches the database until
/// [`WriteBatch::commit`]. All staged operations succeed or none do.
pub struct WriteBatch {
    client: MongoClient,
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    fn new(client: MongoClient) -> Self {
        Self {
            client,
            ops: Vec::new(),
        }
    }

    /// Stage an insert of a raw document
    pub fn insert(&mut self, collection: &str, document: Document) {
        self.ops.push(BatchOp::Insert {
            collection: collection.to_string(),
            document,
        });
    }

    /// Stage a sequence of pre-built operations
    pub fn extend(&mut self, ops: impl IntoIterator<Item = BatchOp>) {
        self.ops.extend(ops);
    }

    /// Number of staged operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the batch has no staged operations
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Commit all staged operations in one transaction
    pub async fn commit(self) -> Result<(), AdminError> {
        if self.ops.is_empty() {
            return Ok(());
        }

        let mut session = self
            .client
            .inner()
            .start_session()
            .await
            .map_err(|e| AdminError::Database(format!("Failed to start session: {}", e)))?;

        session
            .start_transaction()
            .await
            .map_err(|e| AdminError::Database(format!("Failed to start transaction: {}", e)))?;

        let db = self.client.inner().database(self.client.db_name());

        for op in &self.ops {
            let result = match op {
                BatchOp::Delete { collection, id } => db
                    .collection::<Document>(collection)
                    .delete_one(doc! { "_id": *id })
                    .session(&mut session)
                    .await
                    .map(|_| ()),
                BatchOp::Update {
                    collection,
                    id,
                    update,
                } => db
                    .collection::<Document>(collection)
                    .update_one(doc! { "_id": *id }, update.clone())
                    .session(&mut session)
                    .await
                    .map(|_| ()),
                BatchOp::Insert {
                    collection,
                    document,
                } => db
                    .collection::<Document>(collection)
                    .insert_one(document.clone())
                    .session(&mut session)
                    .await
                    .map(|_| ()),
            };

            if let Err(e) = result {
                let _ = session.abort_transaction().await;
                return Err(AdminError::Database(format!("Batch write failed: {}", e)));
            }
        }

        session
            .commit_transaction()
            .await
            .map_err(|e| AdminError::Database(format!("Batch commit failed: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // Batch staging is covered by the service tests; commit paths require a
    // running MongoDB replica set and are exercised in deployment smoke tests.
}
