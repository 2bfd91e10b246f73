pub mod connection;
pub mod endpoints;
pub mod generator;

pub use connection::ApiConnectionError;
pub use endpoints::{ChatMessage, Provider};
pub use generator::TextGenerator;
