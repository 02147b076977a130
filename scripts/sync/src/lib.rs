pub mod aggregate;
pub mod config;
pub mod error;
pub mod firestore;
pub mod models;
pub mod orchestrator;
pub mod paginate;
pub mod spotify;

#[cfg(test)]
pub mod testing;
