//! Read-time normalization of drifting document shapes
//!
//! The stored dataset has gone through several schema generations: fields were
//! renamed (`contact` / `contactPerson`, `name` / `company`), numbers are
//! sometimes stored as strings and `comments` is either a string or a list.
//! Everything in here is a pure, total function from a raw stored value to
//! one canonical shape, so it can be tested without a database.

pub mod coerce;
pub mod fields;
pub mod json;

pub use coerce::{
    coerce_awards, coerce_bool, coerce_comments, coerce_datetime, coerce_duration,
    coerce_object_id, format_session_date, SESSION_DATE_FORMAT,
};
pub use fields::{
    text_value, FieldChain, CONTACT_PERSON, MENTOR_DISPLAY_NAME, STARTUP_DISPLAY_NAME,
};
pub use json::{bson_to_json, document_to_json};
