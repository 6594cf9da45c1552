pub mod painting_session;
pub mod recolor_service;
pub mod session_registry;
pub mod subject_store;

pub use painting_session::PaintingSession;
pub use recolor_service::RecolorService;
pub use session_registry::SessionRegistry;
pub use subject_store::{InMemorySubjectStore, SubjectStore};
