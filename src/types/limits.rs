// vertex_core/src/types/limits.rs
//
// Compile-time capacity constants. Every pool and queue in the engine is
// sized from these; changing one means rebuilding both ends of whatever
// queue or table it bounds.

/// Number of instruments tradeable at once.
pub const MAX_TICKERS: usize = 8;
/// Number of distinct participants.
pub const MAX_CLIENTS: usize = 256;
/// Number of distinct order ids a single client may have live at once, and
/// the capacity of each book's order pool.
pub const MAX_ORDER_IDS: usize = 1024 * 1024;
/// Number of distinct price levels live at once per side per book, and the
/// capacity of each book's price-level pool.
pub const MAX_PRICE_LEVELS: usize = 256;
/// Capacity of each matching engine's client-response queue.
pub const MAX_CLIENT_UPDATES: usize = 256 * 1024;
/// Capacity of each matching engine's market-update queue.
pub const MAX_MARKET_UPDATES: usize = 256 * 1024;
