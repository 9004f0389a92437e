//! Collection services
//!
//! One service per entity family. Each mediates every read and write for its
//! collections: list/get/create/update/delete plus reorder, the denormalized
//! parent counters, and the cascading deletes.

pub mod dashboard;
pub mod study;
pub mod users;
pub mod vocabulary;

pub use dashboard::{DashboardService, DashboardStats};
pub use study::{StudyContentService, StudyFolderService, StudySubfolderService};
pub use users::UserService;
pub use vocabulary::VocabularyService;

use bson::{doc, oid::ObjectId, DateTime};

use crate::db::BatchOp;

/// One order assignment inside a reorder call.
/// Callers compute the new values (typically a pairwise swap between two
/// adjacent siblings); the service only applies them atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAssignment {
    pub id: ObjectId,
    pub order: i64,
}

/// Stage order-value updates for one sibling set
pub(crate) fn reorder_ops(collection: &str, assignments: &[OrderAssignment]) -> Vec<BatchOp> {
    assignments
        .iter()
        .map(|a| BatchOp::Update {
            collection: collection.to_string(),
            id: a.id,
            update: doc! {
                "$set": {
                    "order": a.order,
                    "metadata.updated_at": DateTime::now(),
                }
            },
        })
        .collect()
}

/// Counter adjustment for parent `total_items`; floored at zero
pub(crate) fn adjusted_total(current: i64, delta: i64) -> i64 {
    (current + delta).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reorder_ops_stage_one_update_per_assignment() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        // A pairwise swap: each sibling takes the other's order value
        let assignments = [
            OrderAssignment { id: a, order: 2 },
            OrderAssignment { id: b, order: 1 },
        ];

        let ops = reorder_ops("studyFolders", &assignments);
        assert_eq!(ops.len(), 2);

        match &ops[0] {
            BatchOp::Update {
                collection,
                id,
                update,
            } => {
                assert_eq!(collection, "studyFolders");
                assert_eq!(*id, a);
                let set = update.get_document("$set").unwrap();
                assert_eq!(set.get_i64("order").unwrap(), 2);
                assert!(set.contains_key("metadata.updated_at"));
            }
            other => panic!("expected update op, got {:?}", other),
        }

        match &ops[1] {
            BatchOp::Update { id, update, .. } => {
                assert_eq!(*id, b);
                let set = update.get_document("$set").unwrap();
                assert_eq!(set.get_i64("order").unwrap(), 1);
            }
            other => panic!("expected update op, got {:?}", other),
        }
    }

    #[test]
    fn test_adjusted_total_increments_and_decrements() {
        assert_eq!(adjusted_total(0, 1), 1);
        assert_eq!(adjusted_total(3, 1), 4);
        assert_eq!(adjusted_total(3, -1), 2);
    }

    #[test]
    fn test_adjusted_total_floors_at_zero() {
        assert_eq!(adjusted_total(0, -1), 0);
        assert_eq!(adjusted_total(-5, -1), 0);
    }
}
