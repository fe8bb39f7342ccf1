//! SQLite storage implementation

use std::path::Path;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params, params_from_iter, OptionalExtension};
use crate::{Result, Error};
use crate::account::{Account, AccountFilter};
use crate::app_storage::{AppStorage, CombinedAppStorage};
use crate::object_id::ObjectId;
use crate::relationship::{Relationship, RelationshipFilter};
use super::{schema, Lookup, MigrationStore};

/// Upper bound on bound parameters per `IN (...)` query
const MAX_IN_PARAMS: usize = 500;

/// SQLite-backed document store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Account Operations ==========

    /// Insert or replace an account
    pub fn insert_account(&self, account: &Account) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO accounts (id, nickname) VALUES (?1, ?2)",
            params![account.id.to_hex(), account.nickname],
        )?;
        Ok(())
    }

    /// Get an account by id
    pub fn get_account(&self, id: ObjectId) -> Result<Option<Account>> {
        self.conn
            .query_row(
                "SELECT id, nickname FROM accounts WHERE id = ?1",
                [id.to_hex()],
                row_to_account,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn count_accounts(&self) -> Result<usize> {
        self.count("accounts")
    }

    // ========== Relationship Operations ==========

    /// Insert or replace a relationship
    pub fn insert_relationship(&self, rel: &Relationship) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO relationships (id, source_name, target_name, source_id, target_id, role)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                rel.id.to_hex(),
                rel.source_name,
                rel.target_name,
                rel.source_id.to_hex(),
                rel.target_id,
                rel.role,
            ],
        )?;
        Ok(())
    }

    pub fn count_relationships(&self) -> Result<usize> {
        self.count("relationships")
    }

    // ========== AppStorage Operations ==========

    /// Insert or replace a legacy app storage
    pub fn insert_app_storage(&self, storage: &AppStorage) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO app_storages (id, app_id, bucket) VALUES (?1, ?2, ?3)",
            params![
                storage.id.to_hex(),
                storage.app_id,
                serde_json::to_string(&storage.bucket)?,
            ],
        )?;
        Ok(())
    }

    pub fn count_app_storages(&self) -> Result<usize> {
        self.count("app_storages")
    }

    pub fn count_combined(&self) -> Result<usize> {
        self.count("combined_app_storages")
    }

    // ========== Bulk Operations ==========

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&self) -> Result<()> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            accounts: self.count_accounts()?,
            relationships: self.count_relationships()?,
            app_storages: self.count_app_storages()?,
            combined: self.count_combined()?,
        })
    }

    fn count(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl MigrationStore for SqliteStore {
    fn accounts_page(&self, filter: &AccountFilter, skip: usize, limit: usize) -> Result<Vec<Account>> {
        let mut values: Vec<SqlValue> = Vec::new();
        let sql = if filter.is_empty() {
            "SELECT id, nickname FROM accounts ORDER BY id LIMIT ? OFFSET ?".to_string()
        } else {
            values.extend(filter.ids.iter().map(|id| SqlValue::Text(id.to_hex())));
            format!(
                "SELECT id, nickname FROM accounts WHERE id IN ({}) ORDER BY id LIMIT ? OFFSET ?",
                placeholders(filter.ids.len())
            )
        };
        values.push(SqlValue::Integer(sql_int("limit", limit)?));
        values.push(SqlValue::Integer(sql_int("offset", skip)?));

        let mut stmt = self.conn.prepare(&sql)?;
        let accounts = stmt
            .query_map(params_from_iter(values.iter()), row_to_account)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(accounts)
    }

    fn find_relationships(&self, filter: &RelationshipFilter) -> Result<Vec<Relationship>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, source_name, target_name, source_id, target_id, role
            FROM relationships
            WHERE source_name = ?1 AND target_name = ?2 AND source_id = ?3 AND role = ?4
            ORDER BY rowid
            "#,
        )?;

        let rels = stmt
            .query_map(
                params![
                    filter.source_name,
                    filter.target_name,
                    filter.source_id.to_hex(),
                    filter.role,
                ],
                row_to_relationship,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rels)
    }

    fn app_storages_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<AppStorage>> {
        let mut unique: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            let hex = id.to_hex();
            if !unique.contains(&hex) {
                unique.push(hex);
            }
        }

        let mut found: Vec<(i64, AppStorage)> = Vec::new();
        for chunk in unique.chunks(MAX_IN_PARAMS) {
            let sql = format!(
                "SELECT rowid, id, app_id, bucket FROM app_storages WHERE id IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), |row| {
                    Ok((row.get::<_, i64>(0)?, row_to_app_storage(row)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            found.extend(rows);
        }

        // Insertion order across chunks
        found.sort_by_key(|(rowid, _)| *rowid);
        Ok(found.into_iter().map(|(_, storage)| storage).collect())
    }

    fn find_combined_by_account_id(&self, account_id: ObjectId) -> Result<Lookup<CombinedAppStorage>> {
        let doc = self
            .conn
            .query_row(
                "SELECT id, account_id, bucket FROM combined_app_storages WHERE account_id = ?1",
                [account_id.to_hex()],
                row_to_combined,
            )
            .optional()?;
        Ok(doc.into())
    }

    fn create_combined(&self, doc: &CombinedAppStorage) -> Result<()> {
        let bucket = serde_json::to_string(&doc.bucket)?;
        let result = self.conn.execute(
            "INSERT INTO combined_app_storages (id, account_id, bucket) VALUES (?1, ?2, ?3)",
            params![doc.id.to_hex(), doc.account_id.to_hex(), bucket],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::DuplicateDocument(format!(
                    "combined app storage {} for account {}",
                    doc.id, doc.account_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update_combined(&self, doc: &CombinedAppStorage) -> Result<()> {
        let bucket = serde_json::to_string(&doc.bucket)?;
        let changed = self.conn.execute(
            "UPDATE combined_app_storages SET account_id = ?2, bucket = ?3 WHERE id = ?1",
            params![doc.id.to_hex(), doc.account_id.to_hex(), bucket],
        )?;

        if changed == 0 {
            return Err(Error::DocumentNotFound(format!("combined app storage {}", doc.id)));
        }
        Ok(())
    }
}

/// SQLite reads a negative OFFSET as 0, so reject anything that would wrap
fn sql_int(name: &str, n: usize) -> Result<i64> {
    i64::try_from(n).map_err(|_| Error::Config(format!("{} {} is out of range", name, n)))
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn column_id(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<ObjectId> {
    let raw: String = row.get(idx)?;
    ObjectId::parse(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn column_json<T: serde::de::DeserializeOwned>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_account(row: &rusqlite::Row) -> rusqlite::Result<Account> {
    Ok(Account {
        id: column_id(row, 0)?,
        nickname: row.get(1)?,
    })
}

fn row_to_relationship(row: &rusqlite::Row) -> rusqlite::Result<Relationship> {
    Ok(Relationship {
        id: column_id(row, 0)?,
        source_name: row.get(1)?,
        target_name: row.get(2)?,
        source_id: column_id(row, 3)?,
        target_id: row.get(4)?,
        role: row.get(5)?,
    })
}

/// Expects `id, app_id, bucket` starting at column 1
fn row_to_app_storage(row: &rusqlite::Row) -> rusqlite::Result<AppStorage> {
    Ok(AppStorage {
        id: column_id(row, 1)?,
        app_id: row.get(2)?,
        bucket: column_json(row, 3)?,
    })
}

fn row_to_combined(row: &rusqlite::Row) -> rusqlite::Result<CombinedAppStorage> {
    Ok(CombinedAppStorage {
        id: column_id(row, 0)?,
        account_id: column_id(row, 1)?,
        bucket: column_json(row, 2)?,
    })
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub accounts: usize,
    pub relationships: usize,
    pub app_storages: usize,
    pub combined: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Accounts: {}", self.accounts)?;
        writeln!(f, "  Relationships: {}", self.relationships)?;
        writeln!(f, "  App storages: {}", self.app_storages)?;
        writeln!(f, "  Combined app storages: {}", self.combined)
    }
}
