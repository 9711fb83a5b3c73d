// vertex_core/src/wire/messages.rs
//
// Fixed binary wire records. `#[repr(C, packed)]` lays out fields in
// declaration order with zero padding, so a record can be cast directly
// from/to a byte slice with no parsing step. Grounded on
// `NewOrder`/`OrderCancel`/`TradeUpdate` (the teacher's wire/messages.rs)
// for the packed-layout/constructor/`Display`-via-locals shape, and on
// `original_source/source/nitek/exchange/data/ome_market_update.h` (plus
// its `ome_client_request.h`/`ome_client_response.h` siblings referenced
// from `ome_order_book.h`) for the field sets and type discriminants.

use std::fmt;

use crate::types::{
    order_id_to_str, price_to_str, priority_to_str, qty_to_str, ClientId, OrderId, Price,
    Priority, Qty, Side, TickerId, CLIENT_ID_INVALID, ORDER_ID_INVALID, PRICE_INVALID,
    PRIORITY_INVALID, QTY_INVALID, TICKER_ID_INVALID,
};

// ---------------------------------------------------------------------------
// ClientRequest — Gateway => MatchingEngine
// ---------------------------------------------------------------------------

pub mod client_request_type {
    pub const INVALID: u8 = 0;
    pub const NEW: u8 = 1;
    pub const CANCEL: u8 = 2;
}

/// An order-entry request inbound to the matching engine.
#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct ClientRequest {
    pub request_type: u8,
    pub client_id: ClientId,
    pub ticker_id: TickerId,
    pub client_order_id: OrderId,
    pub side: i8,
    pub price: Price,
    pub qty: Qty,
}

impl Default for ClientRequest {
    fn default() -> Self {
        Self {
            request_type: client_request_type::INVALID,
            client_id: CLIENT_ID_INVALID,
            ticker_id: TICKER_ID_INVALID,
            client_order_id: ORDER_ID_INVALID,
            side: Side::Invalid.as_i8(),
            price: PRICE_INVALID,
            qty: QTY_INVALID,
        }
    }
}

impl ClientRequest {
    pub fn new_order(
        client_id: ClientId,
        ticker_id: TickerId,
        client_order_id: OrderId,
        side: Side,
        price: Price,
        qty: Qty,
    ) -> Self {
        Self {
            request_type: client_request_type::NEW,
            client_id,
            ticker_id,
            client_order_id,
            side: side.as_i8(),
            price,
            qty,
        }
    }

    pub fn cancel_order(client_id: ClientId, ticker_id: TickerId, client_order_id: OrderId) -> Self {
        Self {
            request_type: client_request_type::CANCEL,
            client_id,
            ticker_id,
            client_order_id,
            side: Side::Invalid.as_i8(),
            price: PRICE_INVALID,
            qty: QTY_INVALID,
        }
    }

    pub fn side(&self) -> Side {
        Side::from_i8(self.side)
    }
}

impl fmt::Display for ClientRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let request_type = self.request_type;
        let client_id = self.client_id;
        let ticker_id = self.ticker_id;
        let client_order_id = self.client_order_id;
        let side = self.side();
        let price = self.price;
        let qty = self.qty;
        write!(
            f,
            "ClientRequest[type={request_type}, client={client_id}, ticker={ticker_id}, \
             coid={}, side={side}, price={}, qty={}]",
            order_id_to_str(client_order_id),
            price_to_str(price),
            qty_to_str(qty),
        )
    }
}

// ---------------------------------------------------------------------------
// ClientResponse — MatchingEngine => Gateway
// ---------------------------------------------------------------------------

pub mod client_response_type {
    pub const INVALID: u8 = 0;
    pub const ACCEPTED: u8 = 1;
    pub const CANCELLED: u8 = 2;
    pub const FILLED: u8 = 3;
    pub const CANCEL_REJECTED: u8 = 4;
    pub const INVALID_REQUEST: u8 = 5;
}

/// An acknowledgement, fill, or rejection emitted by the matching engine
/// back toward a single client.
#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct ClientResponse {
    pub response_type: u8,
    pub client_id: ClientId,
    pub ticker_id: TickerId,
    pub client_order_id: OrderId,
    pub market_order_id: OrderId,
    pub side: i8,
    pub price: Price,
    pub qty_executed: Qty,
    pub qty_remaining: Qty,
}

impl Default for ClientResponse {
    fn default() -> Self {
        Self {
            response_type: client_response_type::INVALID,
            client_id: CLIENT_ID_INVALID,
            ticker_id: TICKER_ID_INVALID,
            client_order_id: ORDER_ID_INVALID,
            market_order_id: ORDER_ID_INVALID,
            side: Side::Invalid.as_i8(),
            price: PRICE_INVALID,
            qty_executed: QTY_INVALID,
            qty_remaining: QTY_INVALID,
        }
    }
}

#[allow(clippy::too_many_arguments)]
impl ClientResponse {
    pub fn new(
        response_type: u8,
        client_id: ClientId,
        ticker_id: TickerId,
        client_order_id: OrderId,
        market_order_id: OrderId,
        side: Side,
        price: Price,
        qty_executed: Qty,
        qty_remaining: Qty,
    ) -> Self {
        Self {
            response_type,
            client_id,
            ticker_id,
            client_order_id,
            market_order_id,
            side: side.as_i8(),
            price,
            qty_executed,
            qty_remaining,
        }
    }

    pub fn side(&self) -> Side {
        Side::from_i8(self.side)
    }
}

impl fmt::Display for ClientResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response_type = self.response_type;
        let client_id = self.client_id;
        let ticker_id = self.ticker_id;
        let client_order_id = self.client_order_id;
        let market_order_id = self.market_order_id;
        let side = self.side();
        let price = self.price;
        let qty_executed = self.qty_executed;
        let qty_remaining = self.qty_remaining;
        write!(
            f,
            "ClientResponse[type={response_type}, client={client_id}, ticker={ticker_id}, \
             coid={}, moid={}, side={side}, price={}, exec={}, remain={}]",
            order_id_to_str(client_order_id),
            order_id_to_str(market_order_id),
            price_to_str(price),
            qty_to_str(qty_executed),
            qty_to_str(qty_remaining),
        )
    }
}

// ---------------------------------------------------------------------------
// MarketUpdate — MatchingEngine => Market Data Publisher
// ---------------------------------------------------------------------------

pub mod market_update_type {
    pub const INVALID: u8 = 0;
    pub const ADD: u8 = 1;
    pub const MODIFY: u8 = 2;
    pub const CANCEL: u8 = 3;
    pub const TRADE: u8 = 4;
}

/// A book-state change broadcast to the market-data publisher.
#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct MarketUpdate {
    pub update_type: u8,
    pub market_order_id: OrderId,
    pub ticker_id: TickerId,
    pub side: i8,
    pub price: Price,
    pub qty: Qty,
    pub priority: Priority,
}

impl Default for MarketUpdate {
    fn default() -> Self {
        Self {
            update_type: market_update_type::INVALID,
            market_order_id: ORDER_ID_INVALID,
            ticker_id: TICKER_ID_INVALID,
            side: Side::Invalid.as_i8(),
            price: PRICE_INVALID,
            qty: QTY_INVALID,
            priority: PRIORITY_INVALID,
        }
    }
}

impl MarketUpdate {
    pub fn new(
        update_type: u8,
        market_order_id: OrderId,
        ticker_id: TickerId,
        side: Side,
        price: Price,
        qty: Qty,
        priority: Priority,
    ) -> Self {
        Self {
            update_type,
            market_order_id,
            ticker_id,
            side: side.as_i8(),
            price,
            qty,
            priority,
        }
    }

    pub fn side(&self) -> Side {
        Side::from_i8(self.side)
    }
}

impl fmt::Display for MarketUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let update_type = self.update_type;
        let market_order_id = self.market_order_id;
        let ticker_id = self.ticker_id;
        let side = self.side();
        let price = self.price;
        let qty = self.qty;
        let priority = self.priority;
        write!(
            f,
            "MarketUpdate[type={update_type}, ticker={ticker_id}, moid={}, side={side}, \
             price={}, qty={}, priority={}]",
            order_id_to_str(market_order_id),
            price_to_str(price),
            qty_to_str(qty),
            priority_to_str(priority),
        )
    }
}

// ---------------------------------------------------------------------------
// Compile-time size assertions: any accidental field drift fails the build.
// ---------------------------------------------------------------------------

const _: () = assert!(std::mem::size_of::<ClientRequest>() == 30);
const _: () = assert!(std::mem::size_of::<ClientResponse>() == 42);
const _: () = assert!(std::mem::size_of::<MarketUpdate>() == 34);
