pub mod channel;
pub mod client;
pub mod config;
pub mod connection;
pub mod constants;
pub mod errors;
pub mod message;
pub mod framer;
pub mod replies;
pub mod server;
