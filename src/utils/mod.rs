// Utility functions

pub mod html;
pub mod logger;

pub use html::*;
pub use logger::*;
