pub mod db;
pub mod memory;

pub use db::PgStore;
pub use memory::InMemoryStore;
