use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::IN_MEMORY_DATABASE;
use crate::error::{StoreError, StoreResult};

pub mod class;
pub mod relationship;
pub mod schema;
pub mod student;
pub mod weekly_form;

/// Handle to the relational store, shared with request handlers through Rocket managed state.
///
/// A single connection is kept behind a mutex, so data-layer operations are serialized. SQLite
/// calls block, so every operation runs on tokio's blocking pool instead of the request executor.
/// Each mutation runs inside one SQLite transaction (see [`Storage::transaction`]).
pub struct Storage {
    path: String,
    conn: Arc<Mutex<Connection>>,
}

impl Storage {
    pub fn open(path: impl AsRef<str>) -> StoreResult<Storage> {
        let path = path.as_ref().to_string();
        let conn = if path == IN_MEMORY_DATABASE {
            Connection::open_in_memory()?
        } else {
            Connection::open(&path)?
        };
        schema::initialize(&conn)?;

        Ok(Storage {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs a read-only operation against the connection.
    pub async fn read<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.blocking(move |conn| op(conn)).await
    }

    /// Runs `op` inside a transaction. Commits if it returns `Ok`; any error rolls back every
    /// change made by `op`.
    pub async fn transaction<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            let out = op(&tx)?;
            tx.commit()?;
            Ok(out)
        })
        .await
    }

    async fn blocking<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| StoreError::Worker("connection lock poisoned".to_string()))?;
            op(&mut *conn)
        })
        .await
        .map_err(|e| StoreError::Worker(e.to_string()))?
    }
}

impl Debug for Storage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_transaction_rolls_back() {
        let storage = Storage::open(IN_MEMORY_DATABASE).unwrap();

        let result: StoreResult<()> = storage
            .transaction(|conn| {
                conn.execute("INSERT INTO classes (name, description) VALUES ('1-A', '')", [])?;
                Err(StoreError::validation("abort"))
            })
            .await;
        assert!(result.is_err());

        let count: i64 = storage
            .read(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM classes", [], |r| r.get(0))?))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn committed_transaction_is_visible() {
        let storage = Storage::open(IN_MEMORY_DATABASE).unwrap();

        storage
            .transaction(|conn| {
                conn.execute("INSERT INTO classes (name, description) VALUES ('1-A', '')", [])?;
                Ok(())
            })
            .await
            .unwrap();

        let count: i64 = storage
            .read(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM classes", [], |r| r.get(0))?))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_transactions_are_serialized() {
        let storage = Arc::new(Storage::open(IN_MEMORY_DATABASE).unwrap());

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let storage = Arc::clone(&storage);
                tokio::spawn(async move {
                    storage
                        .transaction(move |conn| {
                            conn.execute(
                                "INSERT INTO classes (name, description) VALUES (?1, '')",
                                [format!("class {}", i)],
                            )?;
                            Ok(())
                        })
                        .await
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let count: i64 = storage
            .read(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM classes", [], |r| r.get(0))?))
            .await
            .unwrap();
        assert_eq!(count, 8);
    }
}
