//! Collection services
//!
//! One service per collection, each wrapping the shared `ModelService` that
//! issues the query and hydrates the results.

pub mod body;
pub mod collections;
pub mod event;
pub mod file;
pub mod model_service;
pub mod session;
pub mod transcript;

pub use body::BodyService;
pub use collections::CollectionName;
pub use event::EventService;
pub use file::FileService;
pub use model_service::{ModelService, Populate, MAX_POPULATE_DEPTH};
pub use session::SessionService;
pub use transcript::TranscriptService;
