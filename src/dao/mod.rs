/// Tournament slot state persistence.
pub mod assignment_store;
/// Tournaments, races and ring layouts consulted by the engine.
pub mod catalog;
/// Storage abstraction layer for database operations.
pub mod storage;
