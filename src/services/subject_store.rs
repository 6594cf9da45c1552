use crate::error::ApiError;
use crate::models::{Subject, SubjectId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Trait for prepared subject storage
#[async_trait]
pub trait SubjectStore: Send + Sync {
    /// Store a subject, replacing one with the same id
    async fn insert(&self, subject: Subject) -> Result<(), ApiError>;

    /// Find a subject by id
    async fn get(&self, id: &SubjectId) -> Result<Option<Subject>, ApiError>;

    /// Remove a subject, returning it if it was present
    async fn remove(&self, id: &SubjectId) -> Result<Option<Subject>, ApiError>;
}

/// In-memory subject storage
pub struct InMemorySubjectStore {
    subjects: Arc<RwLock<HashMap<SubjectId, Subject>>>,
}

impl InMemorySubjectStore {
    pub fn new() -> Self {
        Self {
            subjects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.subjects.read().await.len()
    }
}

impl Default for InMemorySubjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubjectStore for InMemorySubjectStore {
    async fn insert(&self, subject: Subject) -> Result<(), ApiError> {
        let mut subjects = self.subjects.write().await;
        subjects.insert(subject.id.clone(), subject);
        Ok(())
    }

    async fn get(&self, id: &SubjectId) -> Result<Option<Subject>, ApiError> {
        let subjects = self.subjects.read().await;
        Ok(subjects.get(id).cloned())
    }

    async fn remove(&self, id: &SubjectId) -> Result<Option<Subject>, ApiError> {
        let mut subjects = self.subjects.write().await;
        Ok(subjects.remove(id))
    }
}
