use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Student, StudentCreateData, StudentDetail, StudentUpdateData, NAME_MAX_CHARS};
use crate::data::class::db as class_db;
use crate::data::relationship::db as relationship_db;
use crate::data::Storage;
use crate::error::{StoreError, StoreResult};
use crate::util::bounded_text;

const SELECT_STUDENT: &str = "SELECT id, name, class_id, weekly_form_json FROM students";

fn row_to_student(row: &Row) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        class_id: row.get(2)?,
        weekly_form_json: row.get(3)?,
    })
}

fn valid_name(name: &str) -> StoreResult<String> {
    bounded_text(name, NAME_MAX_CHARS)
        .map_err(|reason| StoreError::validation(format!("student name {}", reason)))
}

pub fn list_by_class(conn: &Connection, class_id: i64) -> StoreResult<Vec<Student>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE class_id = ?1 ORDER BY id",
        SELECT_STUDENT
    ))?;
    let students = stmt
        .query_map(params![class_id], row_to_student)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(students)
}

/// Students of `class_id` other than `student_id`.
pub fn list_classmates(conn: &Connection, class_id: i64, student_id: i64) -> StoreResult<Vec<Student>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE class_id = ?1 AND id != ?2 ORDER BY id",
        SELECT_STUDENT
    ))?;
    let students = stmt
        .query_map(params![class_id, student_id], row_to_student)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(students)
}

pub fn find(conn: &Connection, id: i64) -> StoreResult<Option<Student>> {
    let student = conn
        .query_row(
            &format!("{} WHERE id = ?1", SELECT_STUDENT),
            params![id],
            row_to_student,
        )
        .optional()?;
    Ok(student)
}

pub fn get(conn: &Connection, id: i64) -> StoreResult<Student> {
    find(conn, id)?.ok_or_else(|| StoreError::not_found("student", id))
}

pub fn insert(conn: &Connection, data: &StudentCreateData) -> StoreResult<Student> {
    let name = valid_name(&data.name)?;
    if !class_db::exists(conn, data.class_id)? {
        return Err(StoreError::validation(format!(
            "class {} does not exist",
            data.class_id
        )));
    }

    conn.execute(
        "INSERT INTO students (name, class_id) VALUES (?1, ?2)",
        params![name, data.class_id],
    )?;
    get(conn, conn.last_insert_rowid())
}

/// Only the name is mutable.
pub fn update(conn: &Connection, id: i64, data: &StudentUpdateData) -> StoreResult<Student> {
    let student = get(conn, id)?;

    if let Some(name) = &data.name {
        conn.execute(
            "UPDATE students SET name = ?1 WHERE id = ?2",
            params![valid_name(name)?, student.id],
        )?;
    }

    get(conn, id)
}

pub fn set_weekly_form_json(conn: &Connection, id: i64, json: &str) -> StoreResult<()> {
    let changed = conn.execute(
        "UPDATE students SET weekly_form_json = ?1 WHERE id = ?2",
        params![json, id],
    )?;
    if changed == 0 {
        return Err(StoreError::not_found("student", id));
    }
    Ok(())
}

/// Deletes the student and every relationship where it is initiator or target.
pub fn delete(conn: &Connection, id: i64) -> StoreResult<usize> {
    let student = get(conn, id)?;

    let relationships = relationship_db::delete_touching_student(conn, student.id)?;
    conn.execute("DELETE FROM students WHERE id = ?1", params![student.id])?;
    Ok(relationships)
}

/// Deletes every student in the class and every relationship touching them.
/// Returns `(students, relationships)` removed.
pub fn delete_by_class(conn: &Connection, class_id: i64) -> StoreResult<(usize, usize)> {
    let relationships = relationship_db::delete_touching_class(conn, class_id)?;
    let students = conn.execute("DELETE FROM students WHERE class_id = ?1", params![class_id])?;
    Ok((students, relationships))
}

impl Storage {
    pub async fn list_students(&self, class_id: i64) -> StoreResult<Vec<Student>> {
        self.read(move |conn| list_by_class(conn, class_id)).await
    }

    pub async fn get_student(&self, id: i64) -> StoreResult<StudentDetail> {
        self.read(move |conn| get(conn, id))
            .await
            .map(Student::into_detail)
    }

    pub async fn create_student(&self, data: StudentCreateData) -> StoreResult<Student> {
        self.transaction(move |conn| insert(conn, &data)).await
    }

    pub async fn update_student(&self, id: i64, data: StudentUpdateData) -> StoreResult<Student> {
        self.transaction(move |conn| update(conn, id, &data)).await
    }

    pub async fn delete_student(&self, id: i64) -> StoreResult<()> {
        let relationships = self.transaction(move |conn| delete(conn, id)).await?;
        tracing::debug!(student = id, relationships, "student deleted");
        Ok(())
    }
}
