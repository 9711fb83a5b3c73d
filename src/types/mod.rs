// vertex_core/src/types/mod.rs
//
// Re-export all core scalar types from a single module.

pub mod ids;
pub mod limits;
pub mod side;

pub use ids::{
    client_id_to_str, order_id_to_str, price_to_str, priority_to_str, qty_to_str,
    ticker_id_to_str, ClientId, OrderId, Price, Priority, Qty, TickerId, CLIENT_ID_INVALID,
    ORDER_ID_INVALID, PRICE_INVALID, PRIORITY_INVALID, QTY_INVALID, TICKER_ID_INVALID,
};
pub use limits::{
    MAX_CLIENTS, MAX_CLIENT_UPDATES, MAX_MARKET_UPDATES, MAX_ORDER_IDS, MAX_PRICE_LEVELS,
    MAX_TICKERS,
};
pub use side::Side;
