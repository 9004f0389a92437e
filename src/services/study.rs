//! Study plan collection services
//!
//! One service per level of the hierarchy. Folders cascade over subfolders
//! and contents; subfolders cascade over contents; contents are leaves.
//! Cascades enumerate every descendant first and stage all deletions into a
//! single batch, committed once. Parent `total_items` counters are adjusted
//! by a separate write after the child insert or delete; the two writes are
//! not transactional with each other.

use bson::{doc, oid::ObjectId, DateTime, Document};
use tracing::info;

use crate::db::schemas::{
    ContentDifficulty, ContentKind, Metadata, StudyContentDoc, StudyFolderDoc, StudySubfolderDoc,
    STUDY_CONTENT_COLLECTION, STUDY_FOLDER_COLLECTION, STUDY_SUBFOLDER_COLLECTION,
};
use crate::db::{BatchOp, MongoClient, MongoCollection};
use crate::services::{adjusted_total, reorder_ops, OrderAssignment};
use crate::types::{AdminError, Result};

// =============================================================================
// Create / update DTOs
// =============================================================================

/// Fields accepted when creating a study folder
#[derive(Debug, Clone)]
pub struct NewStudyFolder {
    pub name: String,
    pub description: Option<String>,
    pub icon_name: String,
    pub color_hex: String,
    pub order: i64,
    pub is_premium: bool,
}

/// Fields an update may touch; identifier and timestamps are not among them
#[derive(Debug, Clone, Default)]
pub struct StudyFolderUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon_name: Option<String>,
    pub color_hex: Option<String>,
    pub order: Option<i64>,
    pub is_premium: Option<bool>,
    pub completed_items: Option<i64>,
}

impl StudyFolderUpdate {
    fn into_set_document(self) -> Document {
        let mut set = doc! { "metadata.updated_at": DateTime::now() };
        if let Some(name) = self.name {
            set.insert("name", name);
        }
        if let Some(description) = self.description {
            set.insert("description", description);
        }
        if let Some(icon_name) = self.icon_name {
            set.insert("icon_name", icon_name);
        }
        if let Some(color_hex) = self.color_hex {
            set.insert("color_hex", color_hex);
        }
        if let Some(order) = self.order {
            set.insert("order", order);
        }
        if let Some(is_premium) = self.is_premium {
            set.insert("is_premium", is_premium);
        }
        if let Some(completed_items) = self.completed_items {
            set.insert("completed_items", completed_items);
        }
        set
    }
}

/// Fields accepted when creating a subfolder
#[derive(Debug, Clone)]
pub struct NewStudySubfolder {
    pub parent_id: ObjectId,
    pub name: String,
    pub description: Option<String>,
    pub order: i64,
}

#[derive(Debug, Clone, Default)]
pub struct StudySubfolderUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub order: Option<i64>,
    pub completed_items: Option<i64>,
}

impl StudySubfolderUpdate {
    fn into_set_document(self) -> Document {
        let mut set = doc! { "metadata.updated_at": DateTime::now() };
        if let Some(name) = self.name {
            set.insert("name", name);
        }
        if let Some(description) = self.description {
            set.insert("description", description);
        }
        if let Some(order) = self.order {
            set.insert("order", order);
        }
        if let Some(completed_items) = self.completed_items {
            set.insert("completed_items", completed_items);
        }
        set
    }
}

/// Fields accepted when creating a study content
#[derive(Debug, Clone)]
pub struct NewStudyContent {
    pub subfolder_id: ObjectId,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub kind: ContentKind,
    pub external_link: String,
    pub image_url: Option<String>,
    pub duration_minutes: Option<i64>,
    pub difficulty: Option<ContentDifficulty>,
    pub order: i64,
}

#[derive(Debug, Clone, Default)]
pub struct StudyContentUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub kind: Option<ContentKind>,
    pub external_link: Option<String>,
    pub image_url: Option<String>,
    pub duration_minutes: Option<i64>,
    pub difficulty: Option<ContentDifficulty>,
    pub is_completed: Option<bool>,
    pub order: Option<i64>,
}

impl StudyContentUpdate {
    fn into_set_document(self) -> Result<Document> {
        let mut set = doc! { "metadata.updated_at": DateTime::now() };
        if let Some(title) = self.title {
            set.insert("title", title);
        }
        if let Some(subtitle) = self.subtitle {
            set.insert("subtitle", subtitle);
        }
        if let Some(description) = self.description {
            set.insert("description", description);
        }
        if let Some(kind) = self.kind {
            set.insert(
                "kind",
                bson::to_bson(&kind)
                    .map_err(|e| AdminError::Database(format!("Serialize failed: {}", e)))?,
            );
        }
        if let Some(external_link) = self.external_link {
            set.insert("external_link", external_link);
        }
        if let Some(image_url) = self.image_url {
            set.insert("image_url", image_url);
        }
        if let Some(duration_minutes) = self.duration_minutes {
            set.insert("duration_minutes", duration_minutes);
        }
        if let Some(difficulty) = self.difficulty {
            set.insert(
                "difficulty",
                bson::to_bson(&difficulty)
                    .map_err(|e| AdminError::Database(format!("Serialize failed: {}", e)))?,
            );
        }
        if let Some(is_completed) = self.is_completed {
            set.insert("is_completed", is_completed);
        }
        if let Some(order) = self.order {
            set.insert("order", order);
        }
        Ok(set)
    }
}

// =============================================================================
// Cascade staging
// =============================================================================

/// Stage the deletion of a folder plus every transitive descendant.
/// `subfolders` pairs each subfolder id with the ids of its contents;
/// enumeration must be complete before this is called.
pub fn folder_cascade_ops(
    folder_id: ObjectId,
    subfolders: &[(ObjectId, Vec<ObjectId>)],
) -> Vec<BatchOp> {
    let mut ops = vec![BatchOp::Delete {
        collection: STUDY_FOLDER_COLLECTION.to_string(),
        id: folder_id,
    }];
    for (subfolder_id, content_ids) in subfolders {
        ops.push(BatchOp::Delete {
            collection: STUDY_SUBFOLDER_COLLECTION.to_string(),
            id: *subfolder_id,
        });
        for content_id in content_ids {
            ops.push(BatchOp::Delete {
                collection: STUDY_CONTENT_COLLECTION.to_string(),
                id: *content_id,
            });
        }
    }
    ops
}

/// Stage the deletion of a subfolder plus all of its contents
pub fn subfolder_cascade_ops(subfolder_id: ObjectId, content_ids: &[ObjectId]) -> Vec<BatchOp> {
    let mut ops = vec![BatchOp::Delete {
        collection: STUDY_SUBFOLDER_COLLECTION.to_string(),
        id: subfolder_id,
    }];
    for content_id in content_ids {
        ops.push(BatchOp::Delete {
            collection: STUDY_CONTENT_COLLECTION.to_string(),
            id: *content_id,
        });
    }
    ops
}

// =============================================================================
// Folder service
// =============================================================================

/// Service for top-level study folders
#[derive(Clone)]
pub struct StudyFolderService {
    mongo: MongoClient,
}

impl StudyFolderService {
    pub fn new(mongo: MongoClient) -> Self {
        Self { mongo }
    }

    async fn folders(&self) -> Result<MongoCollection<StudyFolderDoc>> {
        self.mongo.collection(STUDY_FOLDER_COLLECTION).await
    }

    /// All folders, ascending by `order`
    pub async fn list(&self) -> Result<Vec<StudyFolderDoc>> {
        let mut folders = self.folders().await?.find_many(doc! {}).await?;
        folders.sort_by_key(|f| f.order);
        Ok(folders)
    }

    pub async fn get_by_id(&self, id: ObjectId) -> Result<Option<StudyFolderDoc>> {
        self.folders().await?.find_one(doc! { "_id": id }).await
    }

    pub async fn create(&self, data: NewStudyFolder) -> Result<ObjectId> {
        if data.name.trim().is_empty() {
            return Err(AdminError::Validation("name is required".into()));
        }

        let folder = StudyFolderDoc {
            _id: None,
            metadata: Metadata::new(),
            name: data.name,
            description: data.description,
            icon_name: data.icon_name,
            color_hex: data.color_hex,
            order: data.order,
            is_premium: data.is_premium,
            total_items: 0,
            completed_items: 0,
        };

        let id = self.folders().await?.insert_one(folder).await?;
        info!("Study folder {} created", id.to_hex());
        Ok(id)
    }

    pub async fn update(&self, id: ObjectId, update: StudyFolderUpdate) -> Result<()> {
        let result = self
            .folders()
            .await?
            .update_one(doc! { "_id": id }, doc! { "$set": update.into_set_document() })
            .await?;

        if result.matched_count == 0 {
            return Err(AdminError::NotFound("study folder"));
        }
        Ok(())
    }

    /// Delete a folder and every descendant subfolder and content.
    /// All deletions commit as one batch; enumeration completes before any
    /// write is issued.
    pub async fn delete(&self, id: ObjectId) -> Result<()> {
        let subfolders = self
            .mongo
            .collection::<StudySubfolderDoc>(STUDY_SUBFOLDER_COLLECTION)
            .await?
            .find_many(doc! { "parent_id": id })
            .await?;
        let contents = self
            .mongo
            .collection::<StudyContentDoc>(STUDY_CONTENT_COLLECTION)
            .await?;

        let mut tree: Vec<(ObjectId, Vec<ObjectId>)> = Vec::new();
        for subfolder in &subfolders {
            let Some(subfolder_id) = subfolder._id else {
                continue;
            };
            let children = contents
                .find_many(doc! { "subfolder_id": subfolder_id })
                .await?;
            tree.push((
                subfolder_id,
                children.iter().filter_map(|c| c._id).collect(),
            ));
        }

        let ops = folder_cascade_ops(id, &tree);
        let staged = ops.len();
        let mut batch = self.mongo.batch();
        batch.extend(ops);
        batch.commit().await?;

        info!(
            "Study folder {} deleted ({} documents removed)",
            id.to_hex(),
            staged
        );
        Ok(())
    }

    pub async fn reorder(&self, assignments: &[OrderAssignment]) -> Result<()> {
        let mut batch = self.mongo.batch();
        batch.extend(reorder_ops(STUDY_FOLDER_COLLECTION, assignments));
        batch.commit().await
    }
}

// =============================================================================
// Subfolder service
// =============================================================================

/// Service for mid-level subfolders
#[derive(Clone)]
pub struct StudySubfolderService {
    mongo: MongoClient,
}

impl StudySubfolderService {
    pub fn new(mongo: MongoClient) -> Self {
        Self { mongo }
    }

    async fn subfolders(&self) -> Result<MongoCollection<StudySubfolderDoc>> {
        self.mongo.collection(STUDY_SUBFOLDER_COLLECTION).await
    }

    async fn parent_folders(&self) -> Result<MongoCollection<StudyFolderDoc>> {
        self.mongo.collection(STUDY_FOLDER_COLLECTION).await
    }

    /// Subfolders of one folder, ascending by `order`.
    /// An empty result is valid; only a missing parent folder is an error.
    pub async fn list_by_parent(&self, parent_id: ObjectId) -> Result<Vec<StudySubfolderDoc>> {
        let parent = self
            .parent_folders()
            .await?
            .find_one(doc! { "_id": parent_id })
            .await?;
        if parent.is_none() {
            return Err(AdminError::NotFound("study folder"));
        }

        let mut subfolders = self
            .subfolders()
            .await?
            .find_many(doc! { "parent_id": parent_id })
            .await?;
        subfolders.sort_by_key(|s| s.order);
        Ok(subfolders)
    }

    pub async fn get_by_id(&self, id: ObjectId) -> Result<Option<StudySubfolderDoc>> {
        self.subfolders().await?.find_one(doc! { "_id": id }).await
    }

    /// Create a subfolder and bump the parent folder's `total_items`.
    /// The counter write is separate from the insert and not transactional
    /// with it; a failed adjustment leaves the counter stale.
    pub async fn create(&self, data: NewStudySubfolder) -> Result<ObjectId> {
        if data.name.trim().is_empty() {
            return Err(AdminError::Validation("name is required".into()));
        }

        let folders = self.parent_folders().await?;
        let parent = folders
            .find_one(doc! { "_id": data.parent_id })
            .await?
            .ok_or(AdminError::NotFound("study folder"))?;

        let subfolder = StudySubfolderDoc {
            _id: None,
            metadata: Metadata::new(),
            parent_id: data.parent_id,
            name: data.name,
            description: data.description,
            order: data.order,
            total_items: 0,
            completed_items: 0,
        };

        let id = self.subfolders().await?.insert_one(subfolder).await?;

        folders
            .update_one(
                doc! { "_id": data.parent_id },
                doc! {
                    "$set": {
                        "total_items": adjusted_total(parent.total_items, 1),
                        "metadata.updated_at": DateTime::now(),
                    }
                },
            )
            .await?;

        info!("Study subfolder {} created", id.to_hex());
        Ok(id)
    }

    pub async fn update(&self, id: ObjectId, update: StudySubfolderUpdate) -> Result<()> {
        let result = self
            .subfolders()
            .await?
            .update_one(doc! { "_id": id }, doc! { "$set": update.into_set_document() })
            .await?;

        if result.matched_count == 0 {
            return Err(AdminError::NotFound("study subfolder"));
        }
        Ok(())
    }

    /// Delete a subfolder and its contents in one batch, then decrement the
    /// parent folder's counter (floored at zero)
    pub async fn delete(&self, id: ObjectId) -> Result<()> {
        let subfolders = self.subfolders().await?;
        let Some(subfolder) = subfolders.find_one(doc! { "_id": id }).await? else {
            return Ok(());
        };

        let contents = self
            .mongo
            .collection::<StudyContentDoc>(STUDY_CONTENT_COLLECTION)
            .await?
            .find_many(doc! { "subfolder_id": id })
            .await?;
        let content_ids: Vec<ObjectId> = contents.iter().filter_map(|c| c._id).collect();

        let ops = subfolder_cascade_ops(id, &content_ids);
        let staged = ops.len();
        let mut batch = self.mongo.batch();
        batch.extend(ops);
        batch.commit().await?;

        let folders = self.parent_folders().await?;
        if let Some(parent) = folders
            .find_one(doc! { "_id": subfolder.parent_id })
            .await?
        {
            folders
                .update_one(
                    doc! { "_id": subfolder.parent_id },
                    doc! {
                        "$set": {
                            "total_items": adjusted_total(parent.total_items, -1),
                            "metadata.updated_at": DateTime::now(),
                        }
                    },
                )
                .await?;
        }

        info!(
            "Study subfolder {} deleted ({} documents removed)",
            id.to_hex(),
            staged
        );
        Ok(())
    }

    pub async fn reorder(&self, assignments: &[OrderAssignment]) -> Result<()> {
        let mut batch = self.mongo.batch();
        batch.extend(reorder_ops(STUDY_SUBFOLDER_COLLECTION, assignments));
        batch.commit().await
    }
}

// =============================================================================
// Content service
// =============================================================================

/// Service for leaf study contents
#[derive(Clone)]
pub struct StudyContentService {
    mongo: MongoClient,
}

impl StudyContentService {
    pub fn new(mongo: MongoClient) -> Self {
        Self { mongo }
    }

    async fn contents(&self) -> Result<MongoCollection<StudyContentDoc>> {
        self.mongo.collection(STUDY_CONTENT_COLLECTION).await
    }

    async fn parent_subfolders(&self) -> Result<MongoCollection<StudySubfolderDoc>> {
        self.mongo.collection(STUDY_SUBFOLDER_COLLECTION).await
    }

    /// Contents of one subfolder, ascending by `order`
    pub async fn list_by_subfolder(&self, subfolder_id: ObjectId) -> Result<Vec<StudyContentDoc>> {
        let parent = self
            .parent_subfolders()
            .await?
            .find_one(doc! { "_id": subfolder_id })
            .await?;
        if parent.is_none() {
            return Err(AdminError::NotFound("study subfolder"));
        }

        let mut contents = self
            .contents()
            .await?
            .find_many(doc! { "subfolder_id": subfolder_id })
            .await?;
        contents.sort_by_key(|c| c.order);
        Ok(contents)
    }

    pub async fn get_by_id(&self, id: ObjectId) -> Result<Option<StudyContentDoc>> {
        self.contents().await?.find_one(doc! { "_id": id }).await
    }

    /// Create a content and bump the parent subfolder's `total_items`.
    /// Same non-transactional counter pairing as subfolder creation.
    pub async fn create(&self, data: NewStudyContent) -> Result<ObjectId> {
        if data.title.trim().is_empty() {
            return Err(AdminError::Validation("title is required".into()));
        }
        if data.external_link.trim().is_empty() {
            return Err(AdminError::Validation("externalLink is required".into()));
        }

        let subfolders = self.parent_subfolders().await?;
        let parent = subfolders
            .find_one(doc! { "_id": data.subfolder_id })
            .await?
            .ok_or(AdminError::NotFound("study subfolder"))?;

        let content = StudyContentDoc {
            _id: None,
            metadata: Metadata::new(),
            subfolder_id: data.subfolder_id,
            title: data.title,
            subtitle: data.subtitle,
            description: data.description,
            kind: data.kind,
            external_link: data.external_link,
            image_url: data.image_url,
            duration_minutes: data.duration_minutes,
            difficulty: data.difficulty,
            is_completed: false,
            order: data.order,
        };

        let id = self.contents().await?.insert_one(content).await?;

        subfolders
            .update_one(
                doc! { "_id": data.subfolder_id },
                doc! {
                    "$set": {
                        "total_items": adjusted_total(parent.total_items, 1),
                        "metadata.updated_at": DateTime::now(),
                    }
                },
            )
            .await?;

        info!("Study content {} created", id.to_hex());
        Ok(id)
    }

    pub async fn update(&self, id: ObjectId, update: StudyContentUpdate) -> Result<()> {
        let result = self
            .contents()
            .await?
            .update_one(
                doc! { "_id": id },
                doc! { "$set": update.into_set_document()? },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AdminError::NotFound("study content"));
        }
        Ok(())
    }

    /// Delete a content and decrement the parent subfolder's counter
    /// (floored at zero)
    pub async fn delete(&self, id: ObjectId) -> Result<()> {
        let contents = self.contents().await?;
        let Some(content) = contents.find_one(doc! { "_id": id }).await? else {
            return Ok(());
        };

        contents.delete_one(doc! { "_id": id }).await?;

        let subfolders = self.parent_subfolders().await?;
        if let Some(parent) = subfolders
            .find_one(doc! { "_id": content.subfolder_id })
            .await?
        {
            subfolders
                .update_one(
                    doc! { "_id": content.subfolder_id },
                    doc! {
                        "$set": {
                            "total_items": adjusted_total(parent.total_items, -1),
                            "metadata.updated_at": DateTime::now(),
                        }
                    },
                )
                .await?;
        }

        info!("Study content {} deleted", id.to_hex());
        Ok(())
    }

    pub async fn reorder(&self, assignments: &[OrderAssignment]) -> Result<()> {
        let mut batch = self.mongo.batch();
        batch.extend(reorder_ops(STUDY_CONTENT_COLLECTION, assignments));
        batch.commit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delete_targets(ops: &[BatchOp]) -> Vec<(String, ObjectId)> {
        ops.iter()
            .map(|op| match op {
                BatchOp::Delete { collection, id } => (collection.clone(), *id),
                other => panic!("cascade staged a non-delete op: {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_folder_cascade_stages_every_descendant() {
        let folder = ObjectId::new();
        let sub_a = ObjectId::new();
        let sub_b = ObjectId::new();
        let content_1 = ObjectId::new();
        let content_2 = ObjectId::new();
        let content_3 = ObjectId::new();

        let ops = folder_cascade_ops(
            folder,
            &[
                (sub_a, vec![content_1, content_2]),
                (sub_b, vec![content_3]),
            ],
        );

        let targets = delete_targets(&ops);
        assert_eq!(targets.len(), 6);
        assert!(targets.contains(&(STUDY_FOLDER_COLLECTION.to_string(), folder)));
        assert!(targets.contains(&(STUDY_SUBFOLDER_COLLECTION.to_string(), sub_a)));
        assert!(targets.contains(&(STUDY_SUBFOLDER_COLLECTION.to_string(), sub_b)));
        assert!(targets.contains(&(STUDY_CONTENT_COLLECTION.to_string(), content_1)));
        assert!(targets.contains(&(STUDY_CONTENT_COLLECTION.to_string(), content_2)));
        assert!(targets.contains(&(STUDY_CONTENT_COLLECTION.to_string(), content_3)));
    }

    #[test]
    fn test_folder_cascade_with_no_children() {
        let folder = ObjectId::new();
        let ops = folder_cascade_ops(folder, &[]);

        let targets = delete_targets(&ops);
        assert_eq!(targets, vec![(STUDY_FOLDER_COLLECTION.to_string(), folder)]);
    }

    #[test]
    fn test_subfolder_cascade_stages_contents() {
        let subfolder = ObjectId::new();
        let contents = [ObjectId::new(), ObjectId::new()];

        let ops = subfolder_cascade_ops(subfolder, &contents);
        let targets = delete_targets(&ops);

        assert_eq!(targets.len(), 3);
        assert!(targets.contains(&(STUDY_SUBFOLDER_COLLECTION.to_string(), subfolder)));
        for content in contents {
            assert!(targets.contains(&(STUDY_CONTENT_COLLECTION.to_string(), content)));
        }
    }

    #[test]
    fn test_update_dto_never_touches_generated_fields() {
        let update = StudyFolderUpdate {
            name: Some("Listening".into()),
            order: Some(3),
            ..Default::default()
        };
        let set = update.into_set_document();

        assert!(!set.contains_key("_id"));
        assert!(!set.contains_key("metadata.created_at"));
        assert!(!set.contains_key("total_items"));
        assert_eq!(set.get_str("name").unwrap(), "Listening");
        assert_eq!(set.get_i64("order").unwrap(), 3);
        assert!(set.contains_key("metadata.updated_at"));
    }

    #[test]
    fn test_sibling_sort_follows_order_field() {
        let mut folders: Vec<StudyFolderDoc> = [3, 1, 2]
            .into_iter()
            .map(|order| StudyFolderDoc {
                name: format!("folder-{order}"),
                order,
                ..Default::default()
            })
            .collect();

        folders.sort_by_key(|f| f.order);

        let names: Vec<&str> = folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["folder-1", "folder-2", "folder-3"]);
    }
}
