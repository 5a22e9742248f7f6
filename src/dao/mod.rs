/// Wire compatibility helpers for persisted guess lists.
pub mod guess_list;
/// Persisted record definitions.
pub mod models;
/// Typed session persistence on top of a raw store.
pub mod session;
/// Raw key-value stores holding session records.
pub mod session_store;
/// Storage error types shared by every store.
pub mod storage;
