//! Database schema definitions

/// SQL to create the accounts collection
pub const CREATE_ACCOUNTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY,
    nickname TEXT NOT NULL
)
"#;

/// SQL to create the relationships collection
/// `target_id` is free text: legacy edges may hold malformed ids
pub const CREATE_RELATIONSHIPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS relationships (
    id TEXT PRIMARY KEY,
    source_name TEXT NOT NULL,
    target_name TEXT NOT NULL,
    source_id TEXT NOT NULL,
    target_id TEXT NOT NULL,
    role TEXT NOT NULL
)
"#;

/// SQL to create the legacy app storage collection
pub const CREATE_APP_STORAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS app_storages (
    id TEXT PRIMARY KEY,
    app_id TEXT NOT NULL,
    bucket TEXT NOT NULL DEFAULT '{}'
)
"#;

/// SQL to create the combined app storage collection
pub const CREATE_COMBINED_APP_STORAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS combined_app_storages (
    id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL UNIQUE,
    bucket TEXT NOT NULL DEFAULT '{}'
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_relationships_source ON relationships(source_id, source_name, target_name, role)",
    "CREATE INDEX IF NOT EXISTS idx_app_storages_app ON app_storages(app_id)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_ACCOUNTS_TABLE,
        CREATE_RELATIONSHIPS_TABLE,
        CREATE_APP_STORAGES_TABLE,
        CREATE_COMBINED_APP_STORAGES_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
