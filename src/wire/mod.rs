// vertex_core/src/wire/mod.rs

pub mod messages;

pub use messages::{ClientRequest, ClientResponse, MarketUpdate};
