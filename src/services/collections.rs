//! Collection names and reference field names of the archive schema

use serde::{Deserialize, Serialize};

/// Collections queried by the services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionName {
    Body,
    Event,
    Session,
    File,
    Transcript,
}

impl CollectionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionName::Body => "body",
            CollectionName::Event => "event",
            CollectionName::Session => "session",
            CollectionName::File => "file",
            CollectionName::Transcript => "transcript",
        }
    }
}

impl std::fmt::Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Reference fields, named after the document that holds them
pub const EVENT_BODY_REF: &str = "body_ref";
pub const EVENT_STATIC_THUMBNAIL_REF: &str = "static_thumbnail_ref";
pub const EVENT_HOVER_THUMBNAIL_REF: &str = "hover_thumbnail_ref";
pub const SESSION_EVENT_REF: &str = "event_ref";
pub const TRANSCRIPT_FILE_REF: &str = "file_ref";
pub const TRANSCRIPT_SESSION_REF: &str = "session_ref";
