pub mod database;
pub mod keyed_lock;
pub mod progress_manager;
