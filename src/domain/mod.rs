/// Domain layer - raw document values and the typed models built from them
///
/// These models are store-agnostic and represent the archive's entities.
pub mod hydrate;
pub mod models;
pub mod value;

pub use hydrate::{Model, Ref};
pub use models::{Body, Event, File, Session, Transcript};
pub use value::{Document, DocumentReference, Fields, Timestamp, Value};
