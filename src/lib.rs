pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod hal;
pub mod handlers;
pub mod pacticipants;
pub mod pacts;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod webhooks;

pub use routes::app;
