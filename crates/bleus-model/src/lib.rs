pub mod columns;
pub mod table;

pub use columns::MATCH_COLUMNS;
pub use table::*;
