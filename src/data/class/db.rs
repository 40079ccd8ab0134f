use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Class, ClassCreateData, ClassUpdateData, NAME_MAX_CHARS};
use crate::data::student::db as student_db;
use crate::data::Storage;
use crate::error::{StoreError, StoreResult};
use crate::util::bounded_text;

const SELECT_CLASS: &str = "SELECT c.id, c.name, c.description,
        (SELECT COUNT(*) FROM students s WHERE s.class_id = c.id)
     FROM classes c";

fn row_to_class(row: &Row) -> rusqlite::Result<Class> {
    Ok(Class {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        student_count: row.get(3)?,
    })
}

fn valid_name(name: &str) -> StoreResult<String> {
    bounded_text(name, NAME_MAX_CHARS)
        .map_err(|reason| StoreError::validation(format!("class name {}", reason)))
}

pub fn list(conn: &Connection) -> StoreResult<Vec<Class>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY c.id", SELECT_CLASS))?;
    let classes = stmt
        .query_map([], row_to_class)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(classes)
}

pub fn find(conn: &Connection, id: i64) -> StoreResult<Option<Class>> {
    let class = conn
        .query_row(
            &format!("{} WHERE c.id = ?1", SELECT_CLASS),
            params![id],
            row_to_class,
        )
        .optional()?;
    Ok(class)
}

pub fn get(conn: &Connection, id: i64) -> StoreResult<Class> {
    find(conn, id)?.ok_or_else(|| StoreError::not_found("class", id))
}

pub fn exists(conn: &Connection, id: i64) -> StoreResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM classes WHERE id = ?1", params![id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

pub fn insert(conn: &Connection, data: &ClassCreateData) -> StoreResult<Class> {
    let name = valid_name(&data.name)?;
    let description = data.description.clone().unwrap_or_default();

    conn.execute(
        "INSERT INTO classes (name, description) VALUES (?1, ?2)",
        params![name, description],
    )?;
    get(conn, conn.last_insert_rowid())
}

pub fn update(conn: &Connection, id: i64, data: &ClassUpdateData) -> StoreResult<Class> {
    if !exists(conn, id)? {
        return Err(StoreError::not_found("class", id));
    }

    if let Some(name) = &data.name {
        conn.execute(
            "UPDATE classes SET name = ?1 WHERE id = ?2",
            params![valid_name(name)?, id],
        )?;
    }
    if let Some(description) = &data.description {
        conn.execute(
            "UPDATE classes SET description = ?1 WHERE id = ?2",
            params![description, id],
        )?;
    }

    get(conn, id)
}

/// Deletes the class together with its students and every relationship touching them.
pub fn delete(conn: &Connection, id: i64) -> StoreResult<()> {
    if !exists(conn, id)? {
        return Err(StoreError::not_found("class", id));
    }

    student_db::delete_by_class(conn, id)?;
    conn.execute("DELETE FROM classes WHERE id = ?1", params![id])?;
    Ok(())
}

impl Storage {
    pub async fn list_classes(&self) -> StoreResult<Vec<Class>> {
        self.read(list).await
    }

    pub async fn get_class(&self, id: i64) -> StoreResult<Class> {
        self.read(move |conn| get(conn, id)).await
    }

    pub async fn create_class(&self, data: ClassCreateData) -> StoreResult<Class> {
        self.transaction(move |conn| insert(conn, &data)).await
    }

    pub async fn update_class(&self, id: i64, data: ClassUpdateData) -> StoreResult<Class> {
        self.transaction(move |conn| update(conn, id, &data)).await
    }

    pub async fn delete_class(&self, id: i64) -> StoreResult<()> {
        self.transaction(move |conn| delete(conn, id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::test_connection;
    use crate::data::student::{db as students, StudentCreateData};

    fn create_data(name: &str) -> ClassCreateData {
        ClassCreateData {
            name: name.to_string(),
            description: None,
        }
    }

    #[test]
    fn insert_and_find() {
        let conn = test_connection();

        let created = insert(&conn, &create_data("3-A")).unwrap();
        let found = get(&conn, created.id).unwrap();

        assert_eq!(found.name, "3-A");
        assert_eq!(found.description.as_deref(), Some(""));
        assert_eq!(found.student_count, 0);
    }

    #[test]
    fn insert_rejects_blank_name() {
        let conn = test_connection();

        let err = insert(&conn, &create_data("   ")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(list(&conn).unwrap().is_empty());
    }

    #[test]
    fn insert_rejects_long_name() {
        let conn = test_connection();

        let err = insert(&conn, &create_data(&"x".repeat(NAME_MAX_CHARS + 1))).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn student_count_follows_students() {
        let conn = test_connection();
        let class = insert(&conn, &create_data("3-A")).unwrap();

        for name in ["Alice", "Bob"] {
            students::insert(
                &conn,
                &StudentCreateData {
                    name: name.to_string(),
                    class_id: class.id,
                },
            )
            .unwrap();
        }

        assert_eq!(get(&conn, class.id).unwrap().student_count, 2);
    }

    #[test]
    fn update_only_touches_given_fields() {
        let conn = test_connection();
        let class = insert(
            &conn,
            &ClassCreateData {
                name: "3-A".to_string(),
                description: Some("homeroom".to_string()),
            },
        )
        .unwrap();

        let updated = update(
            &conn,
            class.id,
            &ClassUpdateData {
                name: Some("3-B".to_string()),
                description: None,
            },
        )
        .unwrap();

        assert_eq!(updated.name, "3-B");
        assert_eq!(updated.description.as_deref(), Some("homeroom"));
    }

    #[test]
    fn update_missing_class_is_not_found() {
        let conn = test_connection();

        let err = update(&conn, 42, &ClassUpdateData::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "class", id: 42 }));
    }

    #[test]
    fn delete_cascades_to_students() {
        let conn = test_connection();
        let class = insert(&conn, &create_data("3-A")).unwrap();
        let student = students::insert(
            &conn,
            &StudentCreateData {
                name: "Alice".to_string(),
                class_id: class.id,
            },
        )
        .unwrap();

        delete(&conn, class.id).unwrap();

        assert!(find(&conn, class.id).unwrap().is_none());
        assert!(students::find(&conn, student.id).unwrap().is_none());
    }

    #[test]
    fn delete_missing_class_is_not_found() {
        let conn = test_connection();
        assert!(matches!(
            delete(&conn, 7).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }
}
