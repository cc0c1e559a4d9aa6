/// Domain models for cdp-admin
///
/// Each model is built from the raw fields of one document. Fields are
/// sparse: a field is `Some` only when the document carried it.
use crate::domain::hydrate::{
    bool_field, datetime_field, integer_field, number_field, reference_field, string_field,
    Model, Ref,
};
use crate::domain::value::Fields;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Collects the names of the fields that are set
macro_rules! defined {
    ($self:ident; $($field:ident => $name:literal),+ $(,)?) => {{
        let mut names = Vec::new();
        $(
            if $self.$field.is_some() {
                names.push($name);
            }
        )+
        names
    }};
}

/// A legislative body, e.g. a full council or one of its committees
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Body {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_datetime: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_datetime: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_source_id: Option<String>,
}

impl Model for Body {
    fn from_fields(fields: &Fields) -> Result<Self> {
        Ok(Self {
            id: string_field(fields, "id"),
            name: string_field(fields, "name"),
            description: string_field(fields, "description"),
            is_active: bool_field(fields, "is_active"),
            start_datetime: datetime_field(fields, "start_datetime")?,
            end_datetime: datetime_field(fields, "end_datetime")?,
            external_source_id: string_field(fields, "external_source_id"),
        })
    }

    fn defined_fields(&self) -> Vec<&'static str> {
        defined!(self;
            id => "id",
            name => "name",
            description => "description",
            is_active => "is_active",
            start_datetime => "start_datetime",
            end_datetime => "end_datetime",
            external_source_id => "external_source_id",
        )
    }
}

/// A stored file: recording, caption track, thumbnail, agenda...
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct File {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl Model for File {
    fn from_fields(fields: &Fields) -> Result<Self> {
        Ok(Self {
            id: string_field(fields, "id"),
            uri: string_field(fields, "uri"),
            name: string_field(fields, "name"),
            description: string_field(fields, "description"),
            media_type: string_field(fields, "media_type"),
        })
    }

    fn defined_fields(&self) -> Vec<&'static str> {
        defined!(self;
            id => "id",
            uri => "uri",
            name => "name",
            description => "description",
            media_type => "media_type",
        )
    }
}

/// A meeting of a body
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Event {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_ref: Option<Ref<Body>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_datetime: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_thumbnail_ref: Option<Ref<File>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover_thumbnail_ref: Option<Ref<File>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agenda_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_source_id: Option<String>,
}

impl Event {
    pub fn body(&self) -> Option<&Body> {
        self.body_ref.as_ref().and_then(Ref::model)
    }

    pub fn static_thumbnail(&self) -> Option<&File> {
        self.static_thumbnail_ref.as_ref().and_then(Ref::model)
    }

    pub fn hover_thumbnail(&self) -> Option<&File> {
        self.hover_thumbnail_ref.as_ref().and_then(Ref::model)
    }
}

impl Model for Event {
    fn from_fields(fields: &Fields) -> Result<Self> {
        Ok(Self {
            id: string_field(fields, "id"),
            body_ref: reference_field(fields, "body_ref")?,
            event_datetime: datetime_field(fields, "event_datetime")?,
            static_thumbnail_ref: reference_field(fields, "static_thumbnail_ref")?,
            hover_thumbnail_ref: reference_field(fields, "hover_thumbnail_ref")?,
            agenda_uri: string_field(fields, "agenda_uri"),
            minutes_uri: string_field(fields, "minutes_uri"),
            external_source_id: string_field(fields, "external_source_id"),
        })
    }

    fn defined_fields(&self) -> Vec<&'static str> {
        defined!(self;
            id => "id",
            body_ref => "body_ref",
            event_datetime => "event_datetime",
            static_thumbnail_ref => "static_thumbnail_ref",
            hover_thumbnail_ref => "hover_thumbnail_ref",
            agenda_uri => "agenda_uri",
            minutes_uri => "minutes_uri",
            external_source_id => "external_source_id",
        )
    }
}

/// One recorded sitting of an event; an event may span several sessions
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Session {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_ref: Option<Ref<Event>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_datetime: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_source_id: Option<String>,
}

impl Session {
    pub fn event(&self) -> Option<&Event> {
        self.event_ref.as_ref().and_then(Ref::model)
    }
}

impl Model for Session {
    fn from_fields(fields: &Fields) -> Result<Self> {
        Ok(Self {
            id: string_field(fields, "id"),
            event_ref: reference_field(fields, "event_ref")?,
            session_datetime: datetime_field(fields, "session_datetime")?,
            session_index: integer_field(fields, "session_index"),
            video_uri: string_field(fields, "video_uri"),
            caption_uri: string_field(fields, "caption_uri"),
            external_source_id: string_field(fields, "external_source_id"),
        })
    }

    fn defined_fields(&self) -> Vec<&'static str> {
        defined!(self;
            id => "id",
            event_ref => "event_ref",
            session_datetime => "session_datetime",
            session_index => "session_index",
            video_uri => "video_uri",
            caption_uri => "caption_uri",
            external_source_id => "external_source_id",
        )
    }
}

/// A speech-to-text transcript produced for a session
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Transcript {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>, // 0.0 to 1.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_ref: Option<Ref<File>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_ref: Option<Ref<Session>>,
}

impl Transcript {
    pub fn file(&self) -> Option<&File> {
        self.file_ref.as_ref().and_then(Ref::model)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session_ref.as_ref().and_then(Ref::model)
    }
}

impl Model for Transcript {
    fn from_fields(fields: &Fields) -> Result<Self> {
        Ok(Self {
            id: string_field(fields, "id"),
            confidence: number_field(fields, "confidence"),
            created: datetime_field(fields, "created")?,
            file_ref: reference_field(fields, "file_ref")?,
            session_ref: reference_field(fields, "session_ref")?,
        })
    }

    fn defined_fields(&self) -> Vec<&'static str> {
        defined!(self;
            id => "id",
            confidence => "confidence",
            created => "created",
            file_ref => "file_ref",
            session_ref => "session_ref",
        )
    }
}
