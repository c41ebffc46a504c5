pub mod engine;
pub mod errors;
pub mod hooks;
pub mod models;
pub mod ports;
pub mod request;
pub mod schemes;
