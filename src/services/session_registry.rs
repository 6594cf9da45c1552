use crate::models::SubjectId;
use crate::services::PaintingSession;
use factory_tint::TargetColor;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Painting sessions keyed by subject
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SubjectId, Arc<PaintingSession>>>,
    delay: Duration,
}

impl SessionRegistry {
    pub fn new(delay: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn get(&self, id: &SubjectId) -> Option<Arc<PaintingSession>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// The subject's session, started on first use with nothing painted
    pub async fn get_or_create(&self, id: &SubjectId) -> Arc<PaintingSession> {
        if let Some(session) = self.get(id).await {
            return session;
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.clone())
            .or_insert_with(|| {
                Arc::new(PaintingSession::spawn(
                    id.clone(),
                    TargetColor::NoTint,
                    self.delay,
                ))
            })
            .clone()
    }

    /// Close and forget the subject's session; returns whether one existed
    pub async fn remove(&self, id: &SubjectId) -> bool {
        let removed = self.sessions.write().await.remove(id);
        match removed {
            Some(session) => {
                session.close();
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
