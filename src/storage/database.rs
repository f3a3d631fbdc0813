use log::info;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio_rusqlite::Connection;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] tokio_rusqlite::Error),
    #[error("Database connection error: {0}")]
    Connection(String),
}

/// Append-only audit store for generated suggestions and counselling
/// transcripts. Nothing downstream depends on it; callers log and move on
/// when a write fails.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Connection>,
}

impl Database {
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::Connection(e.to_string()))?;
            }
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let db = Self {
            conn: Arc::new(conn),
        };
        db.initialize().await?;
        Ok(db)
    }

    async fn initialize(&self) -> Result<(), StorageError> {
        self.conn
            .call(|conn| {
                Ok(conn.execute_batch(
                    "CREATE TABLE IF NOT EXISTS transcripts (
                        id INTEGER PRIMARY KEY,
                        timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                        session_id TEXT NOT NULL,
                        role TEXT NOT NULL,
                        text TEXT NOT NULL
                    );
                    CREATE TABLE IF NOT EXISTS insights (
                        id INTEGER PRIMARY KEY,
                        timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                        source TEXT NOT NULL,
                        kind TEXT NOT NULL,
                        text TEXT NOT NULL
                    );",
                )?)
            })
            .await?;

        info!("Database initialized successfully");
        Ok(())
    }

    pub async fn save_transcript(
        &self,
        session_id: String,
        role: String,
        text: String,
    ) -> Result<(), StorageError> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO transcripts (session_id, role, text) VALUES (?1, ?2, ?3)",
                    [&session_id, &role, &text],
                )?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    pub async fn save_insight(
        &self,
        source: String,
        kind: String,
        text: String,
    ) -> Result<(), StorageError> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO insights (source, kind, text) VALUES (?1, ?2, ?3)",
                    [&source, &kind, &text],
                )?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    pub async fn recent_transcripts(
        &self,
        session_id: String,
        limit: i64,
    ) -> Result<Vec<(String, String, String)>, StorageError> {
        let result = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT timestamp, role, text
                     FROM transcripts
                     WHERE session_id = ?1
                     ORDER BY id DESC
                     LIMIT ?2",
                )?;

                let rows = stmt.query_map((&session_id, limit), |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?;

                let mut transcripts = Vec::new();
                for row in rows {
                    transcripts.push(row?);
                }
                Ok(transcripts)
            })
            .await?;

        Ok(result)
    }

    pub async fn insights_for(
        &self,
        source: String,
    ) -> Result<Vec<(String, String, String)>, StorageError> {
        let result = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT timestamp, kind, text
                     FROM insights
                     WHERE source = ?1
                     ORDER BY id DESC",
                )?;

                let rows = stmt.query_map([&source], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?;

                let mut insights = Vec::new();
                for row in rows {
                    insights.push(row?);
                }
                Ok(insights)
            })
            .await?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transcripts_round_trip() {
        let dir = std::env::temp_dir().join(format!("classpilot-test-{}", uuid::Uuid::new_v4()));
        let db = Database::new(dir.join("audit.db")).await.unwrap();

        db.save_transcript("s1".to_string(), "user".to_string(), "hello".to_string())
            .await
            .unwrap();
        db.save_transcript("s1".to_string(), "assistant".to_string(), "hi".to_string())
            .await
            .unwrap();
        db.save_transcript("s2".to_string(), "user".to_string(), "other".to_string())
            .await
            .unwrap();

        let rows = db.recent_transcripts("s1".to_string(), 10).await.unwrap();
        assert_eq!(rows.len(), 2);
        // Newest first
        assert_eq!(rows[0].1, "assistant");
        assert_eq!(rows[1].2, "hello");

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn insights_are_scoped_by_source() {
        let dir = std::env::temp_dir().join(format!("classpilot-test-{}", uuid::Uuid::new_v4()));
        let db = Database::new(dir.join("audit.db")).await.unwrap();

        db.save_insight(
            "grades.csv".to_string(),
            "class".to_string(),
            "Maths is weak".to_string(),
        )
        .await
        .unwrap();
        db.save_insight(
            "lesson.pdf".to_string(),
            "summary".to_string(),
            "bullet points".to_string(),
        )
        .await
        .unwrap();

        let rows = db.insights_for("grades.csv".to_string()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, "class");

        std::fs::remove_dir_all(dir).ok();
    }
}
