//! SQLite-backed download store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{
    DownloadJob, DownloadStore, JobFilter, JobStatus, JobUpdate, NewSearchResult, SearchResult,
    StoreError,
};

/// SQLite-backed store for search results and download jobs.
pub struct SqliteDownloadStore {
    conn: Mutex<Connection>,
}

impl SqliteDownloadStore {
    /// Create a new store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS search_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                query TEXT NOT NULL,
                title TEXT NOT NULL,
                author TEXT,
                narrator TEXT,
                size_bytes INTEGER NOT NULL DEFAULT 0,
                seeders INTEGER NOT NULL DEFAULT 0,
                leechers INTEGER NOT NULL DEFAULT 0,
                download_url TEXT,
                magnet_url TEXT,
                source TEXT NOT NULL DEFAULT '',
                quality TEXT,
                format TEXT,
                languages TEXT NOT NULL DEFAULT '[]',
                score REAL NOT NULL DEFAULT 0,
                age_days REAL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS download_jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                search_result_id INTEGER NOT NULL,
                transfer_id TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                progress REAL NOT NULL DEFAULT 0,
                download_path TEXT,
                created_at TEXT NOT NULL,
                completed_at TEXT,
                error_message TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_download_jobs_status ON download_jobs(status);
            CREATE INDEX IF NOT EXISTS idx_download_jobs_created_at ON download_jobs(created_at);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn build_where_clause(filter: &JobFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if !filter.statuses.is_empty() {
            let placeholders = vec!["?"; filter.statuses.len()].join(", ");
            conditions.push(format!("status IN ({})", placeholders));
            for status in &filter.statuses {
                params.push(Box::new(status.as_str().to_string()));
            }
        }

        if let Some(cutoff) = filter.created_before {
            conditions.push("created_at < ?".to_string());
            params.push(Box::new(cutoff.to_rfc3339()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_search_result(row: &rusqlite::Row) -> rusqlite::Result<SearchResult> {
        let languages_json: String = row.get(13)?;
        let created_at_str: String = row.get(16)?;

        Ok(SearchResult {
            id: row.get(0)?,
            query: row.get(1)?,
            title: row.get(2)?,
            author: row.get(3)?,
            narrator: row.get(4)?,
            size_bytes: row.get(5)?,
            seeders: row.get(6)?,
            leechers: row.get(7)?,
            download_url: row.get(8)?,
            magnet_url: row.get(9)?,
            source: row.get(10)?,
            quality: row.get(11)?,
            format: row.get(12)?,
            languages: serde_json::from_str(&languages_json).unwrap_or_default(),
            score: row.get(14)?,
            age_days: row.get(15)?,
            created_at: parse_timestamp(&created_at_str),
        })
    }

    fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<DownloadJob> {
        let status_str: String = row.get(3)?;
        let created_at_str: String = row.get(6)?;
        let completed_at_str: Option<String> = row.get(7)?;

        Ok(DownloadJob {
            id: row.get(0)?,
            search_result_id: row.get(1)?,
            transfer_id: row.get(2)?,
            status: JobStatus::parse(&status_str).unwrap_or(JobStatus::Failed),
            progress: row.get(4)?,
            download_path: row.get(5)?,
            created_at: parse_timestamp(&created_at_str),
            completed_at: completed_at_str.as_deref().map(parse_timestamp),
            error_message: row.get(8)?,
        })
    }

    fn get_job_locked(conn: &Connection, id: i64) -> Result<Option<DownloadJob>, StoreError> {
        let result = conn.query_row(
            "SELECT id, search_result_id, transfer_id, status, progress, download_path, created_at, completed_at, error_message FROM download_jobs WHERE id = ?",
            params![id],
            Self::row_to_job,
        );

        match result {
            Ok(job) => Ok(Some(job)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Database(e.to_string())),
        }
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl DownloadStore for SqliteDownloadStore {
    fn insert_search_result(&self, result: NewSearchResult) -> Result<SearchResult, StoreError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let languages_json = serde_json::to_string(&result.languages)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO search_results (query, title, author, narrator, size_bytes, seeders, leechers, download_url, magnet_url, source, quality, format, languages, score, age_days, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                result.query,
                result.title,
                result.author,
                result.narrator,
                result.size_bytes,
                result.seeders,
                result.leechers,
                result.download_url,
                result.magnet_url,
                result.source,
                result.quality,
                result.format,
                languages_json,
                result.score,
                result.age_days,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        let id = conn.last_insert_rowid();

        Ok(SearchResult {
            id,
            query: result.query,
            title: result.title,
            author: result.author,
            narrator: result.narrator,
            size_bytes: result.size_bytes,
            seeders: result.seeders,
            leechers: result.leechers,
            download_url: result.download_url,
            magnet_url: result.magnet_url,
            source: result.source,
            quality: result.quality,
            format: result.format,
            languages: result.languages,
            score: result.score,
            age_days: result.age_days,
            created_at: now,
        })
    }

    fn get_search_result(&self, id: i64) -> Result<Option<SearchResult>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT id, query, title, author, narrator, size_bytes, seeders, leechers, download_url, magnet_url, source, quality, format, languages, score, age_days, created_at FROM search_results WHERE id = ?",
            params![id],
            Self::row_to_search_result,
        );

        match result {
            Ok(sr) => Ok(Some(sr)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Database(e.to_string())),
        }
    }

    fn create_job(&self, search_result_id: i64) -> Result<DownloadJob, StoreError> {
        let conn = self.conn.lock().unwrap();

        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM search_results WHERE id = ?)",
                params![search_result_id],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        if !exists {
            return Err(StoreError::SearchResultNotFound(search_result_id));
        }

        let now = Utc::now();
        let status = JobStatus::Pending;

        conn.execute(
            "INSERT INTO download_jobs (search_result_id, status, progress, created_at) VALUES (?, ?, 0, ?)",
            params![search_result_id, status.as_str(), now.to_rfc3339()],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(DownloadJob {
            id: conn.last_insert_rowid(),
            search_result_id,
            transfer_id: None,
            status,
            progress: 0.0,
            download_path: None,
            created_at: now,
            completed_at: None,
            error_message: None,
        })
    }

    fn get_job(&self, id: i64) -> Result<Option<DownloadJob>, StoreError> {
        let conn = self.conn.lock().unwrap();
        Self::get_job_locked(&conn, id)
    }

    fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<DownloadJob>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!(
            "SELECT id, search_result_id, transfer_id, status, progress, download_path, created_at, completed_at, error_message FROM download_jobs {} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));

        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_job)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut jobs = Vec::new();
        for row_result in rows {
            let job = row_result.map_err(|e| StoreError::Database(e.to_string()))?;
            jobs.push(job);
        }

        Ok(jobs)
    }

    fn count_jobs(&self, filter: &JobFilter) -> Result<i64, StoreError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM download_jobs {}", where_clause);

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn update_job(&self, id: i64, update: JobUpdate) -> Result<DownloadJob, StoreError> {
        let conn = self.conn.lock().unwrap();

        let current = Self::get_job_locked(&conn, id)?.ok_or(StoreError::JobNotFound(id))?;

        let status = match update.status {
            Some(next) => {
                if !current.status.can_transition_to(next) {
                    return Err(StoreError::InvalidTransition {
                        job_id: id,
                        from: current.status,
                        to: next,
                    });
                }
                next
            }
            None => current.status,
        };

        // Write-once: the first bound transfer id sticks.
        let transfer_id = match current.transfer_id {
            Some(existing) => Some(existing),
            None => update.transfer_id,
        };

        // Progress never moves backwards.
        let progress = match update.progress {
            Some(p) => current.progress.max(p.clamp(0.0, 100.0)),
            None => current.progress,
        };

        let download_path = update.download_path.or(current.download_path);
        let completed_at = update.completed_at.or(current.completed_at);
        let error_message = update.error_message.or(current.error_message);

        conn.execute(
            "UPDATE download_jobs SET transfer_id = ?, status = ?, progress = ?, download_path = ?, completed_at = ?, error_message = ? WHERE id = ?",
            params![
                transfer_id,
                status.as_str(),
                progress,
                download_path,
                completed_at.map(|dt| dt.to_rfc3339()),
                error_message,
                id,
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(DownloadJob {
            id,
            search_result_id: current.search_result_id,
            transfer_id,
            status,
            progress,
            download_path,
            created_at: current.created_at,
            completed_at,
            error_message,
        })
    }

    fn delete_job(&self, id: i64) -> Result<DownloadJob, StoreError> {
        let conn = self.conn.lock().unwrap();

        let job = Self::get_job_locked(&conn, id)?.ok_or(StoreError::JobNotFound(id))?;

        conn.execute("DELETE FROM download_jobs WHERE id = ?", params![id])
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(job)
    }
}
