pub mod sheet_sync;

pub use sheet_sync::{append_sync_row, read_rows, rows_to_objects};
