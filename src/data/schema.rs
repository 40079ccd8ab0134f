use rusqlite::Connection;

use crate::error::StoreResult;

/// Creates all tables if they don't exist and turns on foreign key enforcement.
pub fn initialize(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS classes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            class_id INTEGER NOT NULL REFERENCES classes(id),
            weekly_form_json TEXT
        );

        CREATE INDEX IF NOT EXISTS students_class_id ON students(class_id);

        CREATE TABLE IF NOT EXISTS relationships (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id INTEGER NOT NULL REFERENCES students(id),
            friend_id INTEGER NOT NULL REFERENCES students(id),
            relationship_type TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS relationships_pair ON relationships(student_id, friend_id);
        CREATE INDEX IF NOT EXISTS relationships_friend_id ON relationships(friend_id);
        ",
    )?;
    Ok(())
}

/// In-memory connection with the schema applied.
#[cfg(test)]
pub fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize(&conn).unwrap();
    conn
}
