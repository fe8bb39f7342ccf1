use crate::migrator::MigrationStats;
use crate::storage::DbStats;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: impl ToString) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn db_stats_table(stats: &DbStats) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("Accounts", stats.accounts);
    builder.add_row("Relationships", stats.relationships);
    builder.add_row("App storages", stats.app_storages);
    builder.add_row("Combined app storages", stats.combined);
    builder.build()
}

pub fn migration_stats_table(stats: &MigrationStats) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("Accounts visited", stats.visited);
    builder.add_row("Created", stats.created);
    builder.add_row("Updated", stats.updated);
    builder.add_row("No relationships", stats.no_relationships);
    builder.add_row("No valid ids", stats.no_valid_ids);
    builder.add_row("No app storages", stats.no_app_storages);
    builder.build()
}
