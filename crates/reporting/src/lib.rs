//! Reward reporting: export rows for CSV/JSON and tier summaries for display.

pub mod export;
pub mod summary;

pub use export::{result_rows, tier_point_rows, to_csv_string, to_json, write_csv, ExportRow};
pub use summary::{render_table, tier_summaries, TierSummary};
