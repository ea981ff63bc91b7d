//! Rows of the demo `some_table` fixture.

use serde::Serialize;

/// Name of the transient table used by the samples.
pub const MESSAGE_TABLE: &str = "some_table";

/// A single `(id, message)` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: i32,
    pub message: String,
}

impl Message {
    pub fn new(id: i32, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
        }
    }
}
