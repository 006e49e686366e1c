pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod normalize;
pub mod server;
pub mod store;
pub mod sync;
pub mod types;
