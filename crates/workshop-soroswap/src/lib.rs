pub mod client;
pub mod http;
pub mod types;

pub use client::SoroswapClient;
pub use http::SoroswapHttpClient;
pub use types::{
    AddLiquidityRequest, BuildRequest, BuildResponse, Protocol, Quote, QuoteRequest, SendResponse,
    TradeType,
};
