// vertex_core/src/lib.rs
//
// Vertex Core — limit order book and matching engine primitives for a
// low-latency exchange.

pub mod book;
pub mod engine;
pub mod error;
pub mod logging;
pub mod pool;
pub mod queue;
pub mod threading;
pub mod types;
pub mod wire;

pub use book::{BookConfig, OrderBook};
pub use engine::{EngineConfig, EngineHandle, MatchingEngine};
pub use error::{PoolError, PoolResult, VertexError, VertexResult};
pub use logging::{AsyncLogger, LogEvent};
pub use pool::Pool;
pub use queue::Spsc;
pub use types::{ClientId, OrderId, Price, Priority, Qty, Side, TickerId};
pub use wire::{ClientRequest, ClientResponse, MarketUpdate};
