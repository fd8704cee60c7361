pub mod errors;
pub mod openapi;
pub mod realtime;
pub mod routes;
pub mod startup;
pub mod state;
pub mod views;

pub use startup::run_with;
