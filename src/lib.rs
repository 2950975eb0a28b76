// Public API exports
pub mod client;
pub mod config;
pub mod domain;
pub mod shared;
pub mod stream;

// Server-side modules (operator serverless functions)
pub mod handlers;
