pub mod app;
pub mod backend;
pub mod chat;
pub mod config;
pub mod errors;
pub mod escalation;
pub mod flow;
pub mod handlers;
pub mod matrix;
pub mod models;
pub mod progress;
pub mod runtime;
pub mod session;
pub mod state;
pub mod stats;
pub mod storage;
pub mod stress_check;
pub mod tools;
pub mod triage;
pub mod ui;

#[cfg(test)]
mod testing;

pub use app::router;
pub use config::Config;
pub use state::AppState;
