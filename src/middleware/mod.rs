// Middleware for request logging

pub mod request_logger;

pub use request_logger::*;
