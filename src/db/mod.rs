//! Persistence layer for player score records.

mod error;
mod memory;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only
mod store;

pub use error::StorageError;
pub use memory::MemoryScoreStore;
pub use models::{NewScoreRecord, ScoreRecord, ScoreUpdate};
pub use repository::ScoreRepository;
pub use store::ScoreStore;
