pub mod client;
pub mod http;
pub mod records;

pub use client::HorizonClient;
pub use http::HorizonHttpClient;
pub use records::{AccountRecord, BalanceLine, SubmitResponse};
