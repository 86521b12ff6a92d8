use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A single registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl Record {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Hands out time-derived record ids.
///
/// Ids are the current Unix time in milliseconds. When two ids are requested
/// within the same millisecond (or the clock steps backwards) the generator
/// returns the previous id plus one, so ids from one generator strictly increase.
#[derive(Debug, Default)]
pub struct RecordIdGenerator {
    last: Option<i64>,
}

impl RecordIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        self.next_id_at(Utc::now().timestamp_millis())
    }

    fn next_id_at(&mut self, now_millis: i64) -> String {
        let id = match self.last {
            Some(last) if now_millis <= last => last + 1,
            _ => now_millis,
        };
        self.last = Some(id);
        id.to_string()
    }
}
