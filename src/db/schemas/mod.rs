//! Document schemas for the Parlo collections

pub mod metadata;
pub mod study;
pub mod user;
pub mod vocabulary;

pub use metadata::Metadata;
pub use study::{
    ContentDifficulty, ContentKind, StudyContentDoc, StudyFolderDoc, StudySubfolderDoc,
    STUDY_CONTENT_COLLECTION, STUDY_FOLDER_COLLECTION, STUDY_SUBFOLDER_COLLECTION,
};
pub use user::{
    level_for_xp, CompletedContentDoc, UserDoc, COMPLETED_CONTENT_COLLECTION, USER_COLLECTION,
};
pub use vocabulary::{
    VocabularyCategoryDoc, VocabularyQuestionDoc, VOCABULARY_CATEGORY_COLLECTION,
    VOCABULARY_QUESTION_COLLECTION,
};
