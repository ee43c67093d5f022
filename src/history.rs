//! Analysis history persistence. Insert-only sink: one row per successful
//! analysis, never updated afterward.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

pub struct HistoryDb {
    conn: Mutex<Connection>,
}

#[derive(Debug, Clone)]
pub struct AnalysisRecord {
    pub id: String,
    pub url: String,
    pub strategy: String,
    pub user_id: Option<String>,
    pub composite_score: i64,
    pub urgency_score: i64,
    /// Nested results blob: derived breakdown plus the raw diagnostic
    /// summary, serialized as JSON.
    pub results_json: String,
    pub created_at: String,
}

impl HistoryDb {
    pub fn new(data_dir: &Path) -> anyhow::Result<Self> {
        let db_path = data_dir.join("analyses.db");
        let conn = Connection::open(&db_path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS analyses (
                id TEXT PRIMARY KEY,
                url TEXT NOT NULL,
                strategy TEXT NOT NULL,
                user_id TEXT,
                composite_score INTEGER NOT NULL,
                urgency_score INTEGER NOT NULL,
                results_json TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_analyses_url ON analyses(url);
            CREATE INDEX IF NOT EXISTS idx_analyses_created ON analyses(created_at);
        ",
        )?;
        Ok(())
    }

    pub fn insert(&self, record: &AnalysisRecord) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO analyses
                (id, url, strategy, user_id, composite_score, urgency_score, results_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                record.id,
                record.url,
                record.strategy,
                record.user_id,
                record.composite_score,
                record.urgency_score,
                record.results_json,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> anyhow::Result<Option<AnalysisRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, url, strategy, user_id, composite_score, urgency_score,
                    results_json, created_at
             FROM analyses WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map([id], |row| {
            Ok(AnalysisRecord {
                id: row.get(0)?,
                url: row.get(1)?,
                strategy: row.get(2)?,
                user_id: row.get(3)?,
                composite_score: row.get(4)?,
                urgency_score: row.get(5)?,
                results_json: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?;
        match rows.next() {
            Some(record) => Ok(Some(record?)),
            None => Ok(None),
        }
    }
}
