//! SQLite Persistence - 连接池与存活探针

mod database;
mod probe;

pub use database::*;
pub use probe::DatabaseProbe;
