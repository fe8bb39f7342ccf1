pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{error, header, info, outcome, section, success, timing, warn};
pub use progress::RunProgress;
pub use table::{db_stats_table, migration_stats_table, TableBuilder};
pub use theme::{theme, Theme};
