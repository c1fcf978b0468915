pub mod in_memory_store;
pub mod migrations;
pub mod retry;
pub mod sqlite_store;
