pub mod client;
pub mod http;
pub mod poll;

pub use client::SorobanClient;
pub use http::SorobanHttpClient;
pub use poll::{confirm_transaction, wait_for_transaction};
