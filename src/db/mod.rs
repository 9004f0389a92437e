//! Database layer: MongoDB client wrapper and document schemas

pub mod mongo;
pub mod schemas;

pub use mongo::{BatchOp, IntoIndexes, MongoClient, MongoCollection, MutMetadata, WriteBatch};
