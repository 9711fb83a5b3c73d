// vertex_core/src/types/ids.rs
//
// Scalar identifiers. Each reserves its type's maximum value as its
// `_INVALID` sentinel, mirroring the exchange's own `ID_INVALID` template.

pub type OrderId = u64;
pub const ORDER_ID_INVALID: OrderId = OrderId::MAX;

pub type TickerId = u32;
pub const TICKER_ID_INVALID: TickerId = TickerId::MAX;

pub type ClientId = u32;
pub const CLIENT_ID_INVALID: ClientId = ClientId::MAX;

pub type Price = i64;
pub const PRICE_INVALID: Price = Price::MAX;

pub type Qty = u32;
pub const QTY_INVALID: Qty = Qty::MAX;

pub type Priority = u64;
pub const PRIORITY_INVALID: Priority = Priority::MAX;

pub fn order_id_to_str(id: OrderId) -> String {
    if id == ORDER_ID_INVALID {
        "INVALID".to_string()
    } else {
        id.to_string()
    }
}

pub fn ticker_id_to_str(id: TickerId) -> String {
    if id == TICKER_ID_INVALID {
        "INVALID".to_string()
    } else {
        id.to_string()
    }
}

pub fn client_id_to_str(id: ClientId) -> String {
    if id == CLIENT_ID_INVALID {
        "INVALID".to_string()
    } else {
        id.to_string()
    }
}

pub fn price_to_str(price: Price) -> String {
    if price == PRICE_INVALID {
        "INVALID".to_string()
    } else {
        price.to_string()
    }
}

pub fn qty_to_str(qty: Qty) -> String {
    if qty == QTY_INVALID {
        "INVALID".to_string()
    } else {
        qty.to_string()
    }
}

pub fn priority_to_str(priority: Priority) -> String {
    if priority == PRIORITY_INVALID {
        "INVALID".to_string()
    } else {
        priority.to_string()
    }
}
