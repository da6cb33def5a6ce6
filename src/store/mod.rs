pub mod spec_store;
pub mod sqlite;

pub use spec_store::{SpecSearchResult, SpecStore};
pub use sqlite::SqliteSpecStore;
