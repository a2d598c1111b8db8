pub mod app;
pub mod client;
pub mod config;
pub mod controller;
pub mod errors;
pub mod formatter;
pub mod handlers;
pub mod models;
pub mod state;
pub mod ui;
pub mod view;

pub use app::router;
pub use client::{DataClient, HttpDataClient};
pub use config::Config;
pub use controller::Controller;
pub use state::AppState;
