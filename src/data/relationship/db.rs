use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Relationship, RelationshipUpsertData, ResetSummary, TYPE_MAX_CHARS};
use crate::data::student::db as student_db;
use crate::data::Storage;
use crate::error::{StoreError, StoreResult};
use crate::util::bounded_text;

const SELECT_RELATIONSHIP: &str =
    "SELECT r.id, r.student_id, r.friend_id, r.relationship_type FROM relationships r";

fn row_to_relationship(row: &Row) -> rusqlite::Result<Relationship> {
    Ok(Relationship {
        id: row.get(0)?,
        student_id: row.get(1)?,
        friend_id: row.get(2)?,
        relationship_type: row.get(3)?,
    })
}

fn query(conn: &Connection, sql: &str, id: i64) -> StoreResult<Vec<Relationship>> {
    let mut stmt = conn.prepare(sql)?;
    let relationships = stmt
        .query_map(params![id], row_to_relationship)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(relationships)
}

/// Relationships where the initiator or the target belongs to the class, each listed once.
pub fn list_by_class(conn: &Connection, class_id: i64) -> StoreResult<Vec<Relationship>> {
    query(
        conn,
        &format!(
            "{} WHERE EXISTS (
                SELECT 1 FROM students s
                WHERE s.class_id = ?1 AND (s.id = r.student_id OR s.id = r.friend_id)
            )
            ORDER BY r.id",
            SELECT_RELATIONSHIP
        ),
        class_id,
    )
}

/// Relationships where the student is initiator or target.
pub fn list_by_student(conn: &Connection, student_id: i64) -> StoreResult<Vec<Relationship>> {
    query(
        conn,
        &format!(
            "{} WHERE r.student_id = ?1 OR r.friend_id = ?1 ORDER BY r.id",
            SELECT_RELATIONSHIP
        ),
        student_id,
    )
}

pub fn find_by_pair(
    conn: &Connection,
    student_id: i64,
    friend_id: i64,
) -> StoreResult<Option<Relationship>> {
    let relationship = conn
        .query_row(
            &format!(
                "{} WHERE r.student_id = ?1 AND r.friend_id = ?2 ORDER BY r.id LIMIT 1",
                SELECT_RELATIONSHIP
            ),
            params![student_id, friend_id],
            row_to_relationship,
        )
        .optional()?;
    Ok(relationship)
}

/// Creates the relationship for the ordered pair, or overwrites the type of the existing one.
///
/// Must run inside a transaction so the lookup and the write see the same state.
pub fn upsert(
    conn: &Connection,
    student_id: i64,
    friend_id: i64,
    relationship_type: &str,
) -> StoreResult<Relationship> {
    let relationship_type = bounded_text(relationship_type, TYPE_MAX_CHARS)
        .map_err(|reason| StoreError::validation(format!("relationship type {}", reason)))?;

    for id in [student_id, friend_id] {
        if student_db::find(conn, id)?.is_none() {
            return Err(StoreError::validation(format!("student {} does not exist", id)));
        }
    }

    match find_by_pair(conn, student_id, friend_id)? {
        Some(mut existing) => {
            conn.execute(
                "UPDATE relationships SET relationship_type = ?1 WHERE id = ?2",
                params![relationship_type, existing.id],
            )?;
            existing.relationship_type = relationship_type;
            Ok(existing)
        }
        None => {
            conn.execute(
                "INSERT INTO relationships (student_id, friend_id, relationship_type)
                 VALUES (?1, ?2, ?3)",
                params![student_id, friend_id, relationship_type],
            )?;
            Ok(Relationship {
                id: conn.last_insert_rowid(),
                student_id,
                friend_id,
                relationship_type,
            })
        }
    }
}

pub fn delete_touching_student(conn: &Connection, student_id: i64) -> StoreResult<usize> {
    let removed = conn.execute(
        "DELETE FROM relationships WHERE student_id = ?1 OR friend_id = ?1",
        params![student_id],
    )?;
    Ok(removed)
}

pub fn delete_touching_class(conn: &Connection, class_id: i64) -> StoreResult<usize> {
    let removed = conn.execute(
        "DELETE FROM relationships
         WHERE student_id IN (SELECT id FROM students WHERE class_id = ?1)
            OR friend_id IN (SELECT id FROM students WHERE class_id = ?1)",
        params![class_id],
    )?;
    Ok(removed)
}

/// Removes every student of the class and every relationship touching them. The class stays.
/// An unknown class has no students, so resetting it removes nothing.
pub fn reset_class(conn: &Connection, class_id: i64) -> StoreResult<ResetSummary> {
    let (students, relationships) = student_db::delete_by_class(conn, class_id)?;
    Ok(ResetSummary {
        students,
        relationships,
    })
}

impl Storage {
    pub async fn list_class_relationships(&self, class_id: i64) -> StoreResult<Vec<Relationship>> {
        self.read(move |conn| list_by_class(conn, class_id)).await
    }

    pub async fn upsert_relationship(
        &self,
        data: RelationshipUpsertData,
    ) -> StoreResult<Relationship> {
        self.transaction(move |conn| {
            upsert(
                conn,
                data.student_id,
                data.friend_id,
                &data.relationship_type,
            )
        })
        .await
    }

    pub async fn reset_class(&self, class_id: i64) -> StoreResult<ResetSummary> {
        let summary = self
            .transaction(move |conn| reset_class(conn, class_id))
            .await?;
        tracing::info!(
            class = class_id,
            students = summary.students,
            relationships = summary.relationships,
            "class reset"
        );
        Ok(summary)
    }
}
