pub mod config;
pub mod engine;
pub mod feed;
pub mod pipeline;
pub mod scheduler;
pub mod store;
pub mod stream;
