//! Free-form per-student questionnaire.
//!
//! The form is stored as a serialized JSON object in `students.weekly_form_json`. Writes are
//! shallow merges restricted to keys starting with [`QUESTION_PREFIX`]; any other key is dropped.

use rusqlite::Connection;
use serde_json::{Map, Value};

use super::student::db as student_db;
use super::Storage;
use crate::error::{StoreError, StoreResult};

pub const QUESTION_PREFIX: &str = "additional_question_";

pub type WeeklyForm = Map<String, Value>;

/// Parses a stored form. Missing, malformed, or non-object data yields an empty form; the
/// failure is logged and never returned to the caller.
pub fn parse(student_id: i64, stored: Option<&str>) -> WeeklyForm {
    let raw = match stored {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return WeeklyForm::new(),
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(form)) => form,
        Ok(other) => {
            tracing::warn!(student = student_id, "stored weekly form is not an object: {}", other);
            WeeklyForm::new()
        }
        Err(e) => {
            tracing::warn!(student = student_id, "unable to decode stored weekly form: {}", e);
            WeeklyForm::new()
        }
    }
}

/// Copies the question keys of `update` into `form`, replacing existing values wholesale.
pub fn merge(mut form: WeeklyForm, update: WeeklyForm) -> WeeklyForm {
    for (key, value) in update {
        if key.starts_with(QUESTION_PREFIX) {
            form.insert(key, value);
        }
    }
    form
}

pub fn get(conn: &Connection, student_id: i64) -> StoreResult<WeeklyForm> {
    Ok(student_db::get(conn, student_id)?.weekly_form())
}

/// Merges `update` into the stored form and persists the whole result.
pub fn update(conn: &Connection, student_id: i64, update: WeeklyForm) -> StoreResult<WeeklyForm> {
    if update.is_empty() {
        return Err(StoreError::validation("weekly form data is required"));
    }

    let merged = merge(get(conn, student_id)?, update);
    let serialized = serde_json::to_string(&merged)?;
    student_db::set_weekly_form_json(conn, student_id, &serialized)?;

    Ok(merged)
}

impl Storage {
    pub async fn get_weekly_form(&self, student_id: i64) -> StoreResult<WeeklyForm> {
        self.read(move |conn| get(conn, student_id)).await
    }

    pub async fn update_weekly_form(
        &self,
        student_id: i64,
        data: WeeklyForm,
    ) -> StoreResult<WeeklyForm> {
        self.transaction(move |conn| update(conn, student_id, data))
            .await
    }
}
