// vertex_core/src/book.rs
//
// Per-ticker limit order book: price levels as a circular doubly linked
// list per side, orders within a level as a circular doubly linked FIFO.
// Links are `Pool` indices rather than raw pointers (see DESIGN.md, open
// question (a), and the spec's own design note on intrusive lists).
// Grounded on `original_source/source/nitek/exchange/orders/ome_order_book.h`
// (struct fields, `price_to_index`, `next_market_oid`) and on this crate's
// own distilled matching algorithm (4.4.a-d).

use crate::pool::{Pool, NIL};
use crate::types::{
    ClientId, OrderId, Price, Priority, Qty, Side, TickerId, ORDER_ID_INVALID, PRICE_INVALID,
    PRIORITY_INVALID, QTY_INVALID,
};
use crate::wire::messages::{client_response_type, market_update_type};
use crate::wire::{ClientResponse, MarketUpdate};

/// Sizing for a single book. Defaults match the spec's capacity constants;
/// tests construct a `BookConfig` with smaller values so pools stay cheap.
#[derive(Debug, Clone, Copy)]
pub struct BookConfig {
    pub max_clients: usize,
    pub max_order_ids: usize,
    pub max_price_levels: usize,
}

impl Default for BookConfig {
    fn default() -> Self {
        BookConfig {
            max_clients: crate::types::MAX_CLIENTS,
            max_order_ids: crate::types::MAX_ORDER_IDS,
            max_price_levels: crate::types::MAX_PRICE_LEVELS,
        }
    }
}

/// An order resting in the book. `prev`/`next` are `order_pool` indices
/// forming a circular FIFO within `level`; a lone order in a level points
/// to itself.
#[derive(Debug, Clone, Copy)]
struct Order {
    client_id: ClientId,
    client_order_id: OrderId,
    market_order_id: OrderId,
    side: Side,
    price: Price,
    qty: Qty,
    priority: Priority,
    level: usize,
    prev: usize,
    next: usize,
}

/// All live orders at one price, on one side. `prev`/`next` are
/// `level_pool` indices forming a circular list per side, ordered most- to
/// least-aggressive.
#[derive(Debug, Clone, Copy)]
struct PriceLevel {
    side: Side,
    price: Price,
    head_order: usize,
    prev: usize,
    next: usize,
}

pub struct OrderBook {
    ticker_id: TickerId,
    max_price_levels: usize,
    order_pool: Pool<Order>,
    level_pool: Pool<PriceLevel>,
    bids_head: usize,
    asks_head: usize,
    /// direct-mapped `price mod max_price_levels` -> level_pool index
    price_index: Vec<usize>,
    /// `[client_id][client_order_id mod max_order_ids]` -> order_pool index
    client_order_table: Vec<Vec<usize>>,
    next_market_oid: OrderId,
}

impl OrderBook {
    pub fn new(ticker_id: TickerId, config: BookConfig) -> Self {
        OrderBook {
            ticker_id,
            max_price_levels: config.max_price_levels,
            order_pool: Pool::new(config.max_order_ids).expect("max_order_ids must be non-zero"),
            level_pool: Pool::new(config.max_price_levels)
                .expect("max_price_levels must be non-zero"),
            bids_head: NIL,
            asks_head: NIL,
            price_index: vec![NIL; config.max_price_levels],
            client_order_table: vec![vec![NIL; config.max_order_ids]; config.max_clients],
            next_market_oid: 1,
        }
    }

    pub fn ticker_id(&self) -> TickerId {
        self.ticker_id
    }

    pub fn best_bid(&self) -> Option<Price> {
        (self.bids_head != NIL).then(|| self.level_pool.get(self.bids_head).price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        (self.asks_head != NIL).then(|| self.level_pool.get(self.asks_head).price)
    }

    fn price_to_index(&self, price: Price) -> usize {
        price.rem_euclid(self.max_price_levels as i64) as usize
    }

    fn order_table_index(&self, client_order_id: OrderId) -> usize {
        (client_order_id as usize) % self.client_order_table[0].len()
    }

    fn new_market_order_id(&mut self) -> OrderId {
        let id = self.next_market_oid;
        self.next_market_oid += 1;
        id
    }

    fn level_at_price(&self, price: Price) -> Option<usize> {
        let idx = self.price_to_index(price);
        let level_idx = self.price_index[idx];
        if level_idx == NIL {
            return None;
        }
        let level = self.level_pool.get(level_idx);
        assert!(
            level.price == price,
            "price index collision at slot {idx}: existing price {} vs requested {price}",
            level.price
        );
        Some(level_idx)
    }

    // ------------------------------------------------------------------
    // Public operations
    // ------------------------------------------------------------------

    /// Enter a new order. Emits an ACCEPTED response, attempts to match it
    /// (4.4.a), and rests whatever quantity remains.
    #[allow(clippy::too_many_arguments)]
    pub fn add(
        &mut self,
        client_id: ClientId,
        client_order_id: OrderId,
        side: Side,
        price: Price,
        qty: Qty,
        responses: &crate::queue::Spsc<ClientResponse>,
        updates: &crate::queue::Spsc<MarketUpdate>,
    ) {
        if side == Side::Invalid {
            // A malformed wire record (§7.2: "any bit pattern is accepted")
            // decodes its side byte to `Invalid`. Reject before touching
            // any book state — `insert_level`/`set_head` only know how to
            // place a Buy or a Sell.
            send_response(
                responses,
                ClientResponse::new(
                    client_response_type::INVALID_REQUEST,
                    client_id,
                    self.ticker_id,
                    client_order_id,
                    ORDER_ID_INVALID,
                    side,
                    price,
                    QTY_INVALID,
                    QTY_INVALID,
                ),
            );
            return;
        }

        let market_order_id = self.new_market_order_id();

        send_response(
            responses,
            ClientResponse::new(
                client_response_type::ACCEPTED,
                client_id,
                self.ticker_id,
                client_order_id,
                market_order_id,
                side,
                price,
                0,
                qty,
            ),
        );

        let remaining = self.match_incoming(
            client_id,
            client_order_id,
            market_order_id,
            side,
            price,
            qty,
            responses,
            updates,
        );

        if remaining > 0 {
            let priority = self.next_priority_at(price);
            let order_idx = self.order_pool.allocate(Order {
                client_id,
                client_order_id,
                market_order_id,
                side,
                price,
                qty: remaining,
                priority,
                level: NIL,
                prev: NIL,
                next: NIL,
            });
            self.insert_order(order_idx, side, price);

            let table_idx = self.order_table_index(client_order_id);
            self.client_order_table[client_id as usize][table_idx] = order_idx;

            send_update(
                updates,
                MarketUpdate::new(
                    market_update_type::ADD,
                    market_order_id,
                    self.ticker_id,
                    side,
                    price,
                    remaining,
                    priority,
                ),
            );
        }
    }

    /// Cancel a resting order by the client's own order id.
    pub fn cancel(
        &mut self,
        client_id: ClientId,
        client_order_id: OrderId,
        responses: &crate::queue::Spsc<ClientResponse>,
        updates: &crate::queue::Spsc<MarketUpdate>,
    ) {
        let table_idx = self.order_table_index(client_order_id);
        let order_idx = self
            .client_order_table
            .get(client_id as usize)
            .map(|row| row[table_idx])
            .unwrap_or(NIL);

        if order_idx == NIL {
            send_response(
                responses,
                ClientResponse::new(
                    client_response_type::CANCEL_REJECTED,
                    client_id,
                    self.ticker_id,
                    client_order_id,
                    ORDER_ID_INVALID,
                    Side::Invalid,
                    PRICE_INVALID,
                    QTY_INVALID,
                    QTY_INVALID,
                ),
            );
            return;
        }

        let order = *self.order_pool.get(order_idx);
        send_response(
            responses,
            ClientResponse::new(
                client_response_type::CANCELLED,
                client_id,
                self.ticker_id,
                client_order_id,
                order.market_order_id,
                order.side,
                order.price,
                QTY_INVALID,
                order.qty,
            ),
        );
        send_update(
            updates,
            MarketUpdate::new(
                market_update_type::CANCEL,
                order.market_order_id,
                self.ticker_id,
                order.side,
                order.price,
                // §4.4: an explicit client cancel's CANCEL update carries
                // qty=0, distinct from the match-driven CANCEL in §4.4.a
                // step 6, which carries the filled quantity.
                0,
                order.priority,
            ),
        );

        self.client_order_table[client_id as usize][table_idx] = NIL;
        self.remove_order(order_idx);
    }

    // ------------------------------------------------------------------
    // Matching (4.4.a)
    // ------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn match_incoming(
        &mut self,
        client_id: ClientId,
        client_order_id: OrderId,
        market_order_id: OrderId,
        side: Side,
        price: Price,
        qty: Qty,
        responses: &crate::queue::Spsc<ClientResponse>,
        updates: &crate::queue::Spsc<MarketUpdate>,
    ) -> Qty {
        let mut remaining = qty;

        while remaining > 0 {
            let opposing_head = match side {
                Side::Buy => self.asks_head,
                Side::Sell => self.bids_head,
                Side::Invalid => NIL,
            };
            let Some(level_idx) = (opposing_head != NIL).then_some(opposing_head) else {
                break;
            };
            let level_price = self.level_pool.get(level_idx).price;
            let crosses = match side {
                Side::Buy => level_price <= price,
                Side::Sell => level_price >= price,
                Side::Invalid => false,
            };
            if !crosses {
                break;
            }

            let order_idx = self.level_pool.get(level_idx).head_order;
            let resting = *self.order_pool.get(order_idx);

            let fill = resting.qty.min(remaining);
            remaining -= fill;
            let resting_remaining = resting.qty - fill;
            self.order_pool.get_mut(order_idx).qty = resting_remaining;

            send_response(
                responses,
                ClientResponse::new(
                    client_response_type::FILLED,
                    client_id,
                    self.ticker_id,
                    client_order_id,
                    market_order_id,
                    side,
                    level_price,
                    fill,
                    remaining,
                ),
            );
            send_response(
                responses,
                ClientResponse::new(
                    client_response_type::FILLED,
                    resting.client_id,
                    self.ticker_id,
                    resting.client_order_id,
                    resting.market_order_id,
                    resting.side,
                    level_price,
                    fill,
                    resting_remaining,
                ),
            );

            send_update(
                updates,
                MarketUpdate::new(
                    market_update_type::TRADE,
                    ORDER_ID_INVALID,
                    self.ticker_id,
                    side,
                    level_price,
                    fill,
                    PRIORITY_INVALID,
                ),
            );

            if resting_remaining == 0 {
                send_update(
                    updates,
                    MarketUpdate::new(
                        market_update_type::CANCEL,
                        resting.market_order_id,
                        self.ticker_id,
                        resting.side,
                        level_price,
                        fill,
                        PRIORITY_INVALID,
                    ),
                );
                let table_idx = self.order_table_index(resting.client_order_id);
                self.client_order_table[resting.client_id as usize][table_idx] = NIL;
                self.remove_order(order_idx);
            } else {
                send_update(
                    updates,
                    MarketUpdate::new(
                        market_update_type::MODIFY,
                        resting.market_order_id,
                        self.ticker_id,
                        resting.side,
                        level_price,
                        resting_remaining,
                        resting.priority,
                    ),
                );
            }
        }

        remaining
    }

    fn next_priority_at(&self, price: Price) -> Priority {
        match self.level_at_price(price) {
            None => 1,
            Some(level_idx) => {
                let tail = self.order_pool.get(self.level_pool.get(level_idx).head_order).prev;
                self.order_pool.get(tail).priority + 1
            }
        }
    }

    // ------------------------------------------------------------------
    // Intrusive list maintenance (4.4.b, 4.4.c)
    // ------------------------------------------------------------------

    /// Insert `order_idx` at the tail of the FIFO for `price`, creating the
    /// price level (and splicing it into the side's sorted list) if this
    /// is the first order at that price.
    fn insert_order(&mut self, order_idx: usize, side: Side, price: Price) {
        if let Some(level_idx) = self.level_at_price(price) {
            let head = self.level_pool.get(level_idx).head_order;
            let tail = self.order_pool.get(head).prev;
            self.order_pool.get_mut(order_idx).level = level_idx;
            self.order_pool.get_mut(order_idx).next = head;
            self.order_pool.get_mut(order_idx).prev = tail;
            self.order_pool.get_mut(tail).next = order_idx;
            self.order_pool.get_mut(head).prev = order_idx;
            return;
        }

        self.order_pool.get_mut(order_idx).prev = order_idx;
        self.order_pool.get_mut(order_idx).next = order_idx;

        let level_idx = self.level_pool.allocate(PriceLevel {
            side,
            price,
            head_order: order_idx,
            prev: NIL,
            next: NIL,
        });
        self.order_pool.get_mut(order_idx).level = level_idx;
        self.price_index[self.price_to_index(price)] = level_idx;
        self.insert_level(level_idx, side, price);
    }

    /// Splice a freshly allocated, still-unlinked level into its side's
    /// circular list, keeping bids strictly descending and asks strictly
    /// ascending by price (4.4.b).
    fn insert_level(&mut self, level_idx: usize, side: Side, price: Price) {
        let head = match side {
            Side::Buy => self.bids_head,
            Side::Sell => self.asks_head,
            Side::Invalid => unreachable!("cannot insert a level for an invalid side"),
        };

        if head == NIL {
            self.level_pool.get_mut(level_idx).prev = level_idx;
            self.level_pool.get_mut(level_idx).next = level_idx;
            self.set_head(side, level_idx);
            return;
        }

        let more_aggressive = |a: Price, b: Price| match side {
            Side::Buy => a > b,
            Side::Sell => a < b,
            Side::Invalid => false,
        };

        if more_aggressive(price, self.level_pool.get(head).price) {
            let tail = self.level_pool.get(head).prev;
            self.splice_before(level_idx, head, tail);
            self.set_head(side, level_idx);
            return;
        }

        let mut cursor = head;
        loop {
            let next = self.level_pool.get(cursor).next;
            if next == head || more_aggressive(self.level_pool.get(cursor).price, price)
                && !more_aggressive(self.level_pool.get(next).price, price)
            {
                self.splice_before(level_idx, next, cursor);
                return;
            }
            cursor = next;
        }
    }

    fn splice_before(&mut self, new_idx: usize, before: usize, after: usize) {
        self.level_pool.get_mut(new_idx).prev = after;
        self.level_pool.get_mut(new_idx).next = before;
        self.level_pool.get_mut(after).next = new_idx;
        self.level_pool.get_mut(before).prev = new_idx;
    }

    fn set_head(&mut self, side: Side, level_idx: usize) {
        match side {
            Side::Buy => self.bids_head = level_idx,
            Side::Sell => self.asks_head = level_idx,
            Side::Invalid => unreachable!("cannot set head for an invalid side"),
        }
    }

    /// Remove `order_idx` from its level's FIFO, removing the level itself
    /// if this was its last order (4.4.c), then free the order's slot.
    fn remove_order(&mut self, order_idx: usize) {
        let order = *self.order_pool.get(order_idx);
        let level_idx = order.level;
        let level = *self.level_pool.get(level_idx);

        if order.next == order_idx {
            // sole order at this level: remove the level too.
            self.remove_level(level_idx, level.side, level.price);
        } else {
            self.order_pool.get_mut(order.prev).next = order.next;
            self.order_pool.get_mut(order.next).prev = order.prev;
            if level.head_order == order_idx {
                self.level_pool.get_mut(level_idx).head_order = order.next;
            }
        }

        self.order_pool.deallocate(order_idx);
    }

    fn remove_level(&mut self, level_idx: usize, side: Side, price: Price) {
        let level = *self.level_pool.get(level_idx);
        let head = match side {
            Side::Buy => self.bids_head,
            Side::Sell => self.asks_head,
            Side::Invalid => unreachable!("cannot remove a level for an invalid side"),
        };

        if level.next == level_idx {
            self.set_head(side, NIL);
        } else {
            self.level_pool.get_mut(level.prev).next = level.next;
            self.level_pool.get_mut(level.next).prev = level.prev;
            if head == level_idx {
                self.set_head(side, level.next);
            }
        }

        self.price_index[self.price_to_index(price)] = NIL;
        self.level_pool.deallocate(level_idx);
    }

    /// Snapshot of aggregate quantity at each live price level, best first.
    /// Intended for diagnostics and tests, not the matching hot path.
    pub fn l2_snapshot(&self, side: Side) -> Vec<(Price, Qty)> {
        let head = match side {
            Side::Buy => self.bids_head,
            Side::Sell => self.asks_head,
            Side::Invalid => NIL,
        };
        let mut out = Vec::new();
        if head == NIL {
            return out;
        }
        let mut cursor = head;
        loop {
            let level = self.level_pool.get(cursor);
            let mut qty_total = 0u32;
            let mut order_cursor = level.head_order;
            loop {
                let o = self.order_pool.get(order_cursor);
                qty_total += o.qty;
                order_cursor = o.next;
                if order_cursor == level.head_order {
                    break;
                }
            }
            out.push((level.price, qty_total));
            cursor = level.next;
            if cursor == head {
                break;
            }
        }
        out
    }
}

pub(crate) fn send_response(queue: &crate::queue::Spsc<ClientResponse>, response: ClientResponse) {
    unsafe {
        *queue.next_to_write() = response;
    }
    queue.commit_write();
}

pub(crate) fn send_update(queue: &crate::queue::Spsc<MarketUpdate>, update: MarketUpdate) {
    unsafe {
        *queue.next_to_write() = update;
    }
    queue.commit_write();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::Spsc;

    fn test_book() -> OrderBook {
        OrderBook::new(
            1,
            BookConfig {
                max_clients: 16,
                max_order_ids: 1024,
                max_price_levels: 32,
            },
        )
    }

    fn queues() -> (Spsc<ClientResponse>, Spsc<MarketUpdate>) {
        (Spsc::new(64).unwrap(), Spsc::new(64).unwrap())
    }

    fn drain_responses(q: &Spsc<ClientResponse>) -> Vec<ClientResponse> {
        let mut out = Vec::new();
        while let Some(p) = q.next_to_read() {
            out.push(unsafe { *p });
            q.commit_read();
        }
        out
    }

    fn drain_updates(q: &Spsc<MarketUpdate>) -> Vec<MarketUpdate> {
        let mut out = Vec::new();
        while let Some(p) = q.next_to_read() {
            out.push(unsafe { *p });
            q.commit_read();
        }
        out
    }

    // Scenario 1: resting add into an empty book.
    #[test]
    fn resting_add() {
        let mut book = test_book();
        let (responses, updates) = queues();
        book.add(7, 100, Side::Buy, 50, 10, &responses, &updates);

        let resp = drain_responses(&responses);
        assert_eq!(resp.len(), 1);
        assert_eq!(resp[0].response_type, client_response_type::ACCEPTED);
        let market_oid = resp[0].market_order_id;
        assert_eq!(market_oid, 1);

        let upd = drain_updates(&updates);
        assert_eq!(upd.len(), 1);
        assert_eq!(upd[0].update_type, market_update_type::ADD);
        let priority = upd[0].priority;
        assert_eq!(priority, 1);

        assert_eq!(book.best_bid(), Some(50));
    }

    // Scenario 2: full cross, no residual on either side.
    #[test]
    fn full_cross_leaves_nothing_resting() {
        let mut book = test_book();
        let (responses, updates) = queues();
        book.add(7, 100, Side::Buy, 50, 10, &responses, &updates);
        drain_responses(&responses);
        drain_updates(&updates);

        book.add(9, 200, Side::Sell, 50, 10, &responses, &updates);
        let resp = drain_responses(&responses);
        assert_eq!(resp.len(), 3);
        assert_eq!(resp[0].response_type, client_response_type::ACCEPTED);
        assert_eq!(resp[1].response_type, client_response_type::FILLED);
        assert_eq!(resp[2].response_type, client_response_type::FILLED);

        let upd = drain_updates(&updates);
        assert_eq!(upd.len(), 2);
        assert_eq!(upd[0].update_type, market_update_type::TRADE);
        assert_eq!(upd[1].update_type, market_update_type::CANCEL);

        assert_eq!(book.best_bid(), None);
        assert_eq!(book.best_ask(), None);
    }

    // Scenario 3: partial fill with residual resting on the aggressor side.
    #[test]
    fn partial_fill_rests_residual() {
        let mut book = test_book();
        let (responses, updates) = queues();
        book.add(7, 100, Side::Buy, 50, 10, &responses, &updates);
        drain_responses(&responses);
        drain_updates(&updates);

        book.add(9, 200, Side::Sell, 48, 15, &responses, &updates);
        let resp = drain_responses(&responses);
        assert!(resp
            .iter()
            .any(|r| r.response_type == client_response_type::FILLED && r.qty_executed == 10));

        assert_eq!(book.best_bid(), None);
        assert_eq!(book.best_ask(), Some(48));
        let snapshot = book.l2_snapshot(Side::Sell);
        assert_eq!(snapshot, vec![(48, 5)]);
    }

    // Scenario 4: price-time priority within a level.
    #[test]
    fn price_time_priority_fifo() {
        let mut book = test_book();
        let (responses, updates) = queues();
        book.add(1, 1, Side::Buy, 50, 5, &responses, &updates);
        drain_responses(&responses);
        drain_updates(&updates);
        book.add(2, 2, Side::Buy, 50, 5, &responses, &updates);
        drain_responses(&responses);
        drain_updates(&updates);

        book.add(9, 900, Side::Sell, 50, 3, &responses, &updates);
        let resp = drain_responses(&responses);
        let filled: Vec<_> = resp
            .iter()
            .filter(|r| r.response_type == client_response_type::FILLED)
            .collect();
        // incoming + the first resting order (client 1), client 2 untouched.
        assert_eq!(filled.len(), 2);
        assert!(filled.iter().any(|r| r.client_id == 1));
        assert!(!filled.iter().any(|r| r.client_id == 2));
    }

    // Scenario 5: cancel of a live order.
    #[test]
    fn cancel_accepted_removes_order() {
        let mut book = test_book();
        let (responses, updates) = queues();
        book.add(7, 100, Side::Buy, 50, 10, &responses, &updates);
        drain_responses(&responses);
        drain_updates(&updates);

        book.cancel(7, 100, &responses, &updates);
        let resp = drain_responses(&responses);
        assert_eq!(resp.len(), 1);
        assert_eq!(resp[0].response_type, client_response_type::CANCELLED);
        let upd = drain_updates(&updates);
        assert_eq!(upd[0].update_type, market_update_type::CANCEL);
        assert_eq!(book.best_bid(), None);

        // cancelling again is now a rejection: the slot was freed.
        book.cancel(7, 100, &responses, &updates);
        let resp = drain_responses(&responses);
        assert_eq!(resp[0].response_type, client_response_type::CANCEL_REJECTED);
    }

    // Scenario 6: cancel of an order that never existed.
    #[test]
    fn cancel_rejected_for_unknown_order() {
        let mut book = test_book();
        let (responses, updates) = queues();
        book.cancel(7, 999, &responses, &updates);
        let resp = drain_responses(&responses);
        assert_eq!(resp.len(), 1);
        assert_eq!(resp[0].response_type, client_response_type::CANCEL_REJECTED);
        assert!(updates.next_to_read().is_none());
    }

    // A malformed `side` byte must be rejected as a protocol-boundary error
    // (§7.2), not reach the matching/resting logic that only knows Buy/Sell.
    #[test]
    fn new_order_with_invalid_side_is_rejected() {
        let mut book = test_book();
        let (responses, updates) = queues();
        book.add(7, 100, Side::Invalid, 50, 10, &responses, &updates);

        let resp = drain_responses(&responses);
        assert_eq!(resp.len(), 1);
        assert_eq!(resp[0].response_type, client_response_type::INVALID_REQUEST);

        assert!(updates.next_to_read().is_none());
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn price_levels_stay_strictly_ordered() {
        let mut book = test_book();
        let (responses, updates) = queues();
        for (price, qty) in [(48, 1), (52, 1), (50, 1), (49, 1)] {
            book.add(1, price as u64, Side::Buy, price, qty, &responses, &updates);
            drain_responses(&responses);
            drain_updates(&updates);
        }
        let snapshot = book.l2_snapshot(Side::Buy);
        let prices: Vec<Price> = snapshot.iter().map(|(p, _)| *p).collect();
        assert_eq!(prices, vec![52, 50, 49, 48]);
    }

    #[test]
    #[should_panic(expected = "price index collision")]
    fn price_index_collision_is_fatal() {
        let mut book = OrderBook::new(
            1,
            BookConfig {
                max_clients: 4,
                max_order_ids: 16,
                max_price_levels: 4,
            },
        );
        let (responses, updates) = queues();
        book.add(1, 1, Side::Buy, 10, 1, &responses, &updates);
        drain_responses(&responses);
        drain_updates(&updates);
        // price 14 collides with price 10 under mod-4 indexing but is a
        // genuinely different price: this must be treated as fatal.
        book.add(1, 2, Side::Buy, 14, 1, &responses, &updates);
    }

    // ------------------------------------------------------------------
    // Property tests (§8, P3-P7). A small xorshift PRNG drives a mixed
    // add/cancel sequence against one book; no external crate needed for
    // a deterministic, seedable generator over this small a state space.
    // ------------------------------------------------------------------

    struct Xorshift64(u64);

    impl Xorshift64 {
        fn next(&mut self) -> u64 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            self.0
        }

        fn below(&mut self, bound: u64) -> u64 {
            self.next() % bound
        }
    }

    /// Every order reachable by walking both sides' circular lists,
    /// collected as pool indices.
    fn reachable_order_indices(book: &OrderBook) -> std::collections::HashSet<usize> {
        let mut seen = std::collections::HashSet::new();
        for head in [book.bids_head, book.asks_head] {
            if head == NIL {
                continue;
            }
            let mut level_cursor = head;
            loop {
                let level = book.level_pool.get(level_cursor);
                let start = level.head_order;
                let mut order_cursor = start;
                loop {
                    seen.insert(order_cursor);
                    order_cursor = book.order_pool.get(order_cursor).next;
                    if order_cursor == start {
                        break;
                    }
                }
                level_cursor = level.next;
                if level_cursor == head {
                    break;
                }
            }
        }
        seen
    }

    /// Every non-NIL slot in the client-order table.
    fn table_order_indices(book: &OrderBook) -> std::collections::HashSet<usize> {
        book.client_order_table
            .iter()
            .flat_map(|row| row.iter())
            .copied()
            .filter(|&idx| idx != NIL)
            .collect()
    }

    // P3: an order is reachable via `table[client_id][client_oid]` iff it
    // is reachable from a side head.
    #[test]
    fn property_p3_table_matches_side_reachability() {
        let mut book = test_book();
        let (responses, updates) = queues();
        let mut rng = Xorshift64(0xC0FFEE);
        let mut live: Vec<(ClientId, OrderId)> = Vec::new();
        let mut next_coid = 1u64;

        for _ in 0..500 {
            if live.is_empty() || rng.below(3) != 0 {
                let client = rng.below(8) as ClientId;
                let side = if rng.below(2) == 0 { Side::Buy } else { Side::Sell };
                let price = 40 + rng.below(20) as Price;
                let qty = 1 + rng.below(10) as Qty;
                let coid = next_coid;
                next_coid += 1;
                book.add(client, coid, side, price, qty, &responses, &updates);
                live.push((client, coid));
            } else {
                let pick = rng.below(live.len() as u64) as usize;
                let (client, coid) = live.remove(pick);
                book.cancel(client, coid, &responses, &updates);
            }
            drain_responses(&responses);
            drain_updates(&updates);

            assert_eq!(
                reachable_order_indices(&book),
                table_order_indices(&book),
                "table contents and side-list reachability diverged"
            );
        }
    }

    // P4: every live order has qty > 0.
    #[test]
    fn property_p4_live_orders_have_positive_qty() {
        let mut book = test_book();
        let (responses, updates) = queues();
        let mut rng = Xorshift64(0xFACADE);
        let mut live: Vec<(ClientId, OrderId)> = Vec::new();
        let mut next_coid = 1u64;

        for _ in 0..500 {
            if live.is_empty() || rng.below(3) != 0 {
                let client = rng.below(8) as ClientId;
                let side = if rng.below(2) == 0 { Side::Buy } else { Side::Sell };
                let price = 40 + rng.below(20) as Price;
                let qty = 1 + rng.below(10) as Qty;
                let coid = next_coid;
                next_coid += 1;
                book.add(client, coid, side, price, qty, &responses, &updates);
                live.push((client, coid));
            } else {
                let pick = rng.below(live.len() as u64) as usize;
                let (client, coid) = live.remove(pick);
                book.cancel(client, coid, &responses, &updates);
            }
            drain_responses(&responses);
            drain_updates(&updates);

            for idx in reachable_order_indices(&book) {
                assert!(book.order_pool.get(idx).qty > 0, "live order with qty == 0");
            }
        }
    }

    // P5: sum of qty resting in the book equals total submitted qty minus
    // total matched qty (summed over both FILLED legs of every match, per
    // §4.4.a step 4) minus total qty returned on an explicit cancel.
    #[test]
    fn property_p5_qty_conservation() {
        let mut book = test_book();
        let (responses, updates) = queues();
        let mut rng = Xorshift64(0x5EED_5EED);
        let mut live: Vec<(ClientId, OrderId)> = Vec::new();
        let mut next_coid = 1u64;

        let mut submitted: i64 = 0;
        let mut matched: i64 = 0;
        let mut cancelled: i64 = 0;

        for _ in 0..500 {
            if live.is_empty() || rng.below(3) != 0 {
                let client = rng.below(8) as ClientId;
                let side = if rng.below(2) == 0 { Side::Buy } else { Side::Sell };
                let price = 40 + rng.below(20) as Price;
                let qty = 1 + rng.below(10) as Qty;
                let coid = next_coid;
                next_coid += 1;
                submitted += qty as i64;
                book.add(client, coid, side, price, qty, &responses, &updates);
                live.push((client, coid));
            } else {
                let pick = rng.below(live.len() as u64) as usize;
                let (client, coid) = live.remove(pick);
                book.cancel(client, coid, &responses, &updates);
            }

            for r in drain_responses(&responses) {
                if r.response_type == client_response_type::FILLED {
                    matched += { r.qty_executed } as i64;
                } else if r.response_type == client_response_type::CANCELLED {
                    cancelled += { r.qty_remaining } as i64;
                }
            }
            drain_updates(&updates);

            // an order fully matched away by someone else's incoming order
            // (not by our own cancel) silently loses its table entry;
            // drop it from `live` so a later cancel attempt isn't wasted.
            live.retain(|&(client, coid)| {
                let idx = book.order_table_index(coid);
                book.client_order_table[client as usize][idx] != NIL
            });

            let resting: i64 = book
                .l2_snapshot(Side::Buy)
                .iter()
                .chain(book.l2_snapshot(Side::Sell).iter())
                .map(|&(_, qty)| qty as i64)
                .sum();
            assert_eq!(resting, submitted - matched - cancelled);
        }
    }

    // P6: for any BUY match, trade_price <= incoming price; for any SELL,
    // trade_price >= incoming price.
    #[test]
    fn property_p6_trade_price_respects_incoming_price() {
        let mut book = test_book();
        let (responses, updates) = queues();
        let mut rng = Xorshift64(0xBADA_55);
        let mut live: Vec<(ClientId, OrderId)> = Vec::new();
        let mut next_coid = 1u64;

        for _ in 0..500 {
            if live.is_empty() || rng.below(3) != 0 {
                let client = rng.below(8) as ClientId;
                let side = if rng.below(2) == 0 { Side::Buy } else { Side::Sell };
                let price = 40 + rng.below(20) as Price;
                let qty = 1 + rng.below(10) as Qty;
                let coid = next_coid;
                next_coid += 1;
                book.add(client, coid, side, price, qty, &responses, &updates);

                let resp = drain_responses(&responses);
                for r in &resp {
                    if r.response_type == client_response_type::FILLED
                        && r.client_id == client
                        && r.client_order_id == coid
                    {
                        let trade_price = r.price;
                        match side {
                            Side::Buy => assert!(trade_price <= price),
                            Side::Sell => assert!(trade_price >= price),
                            Side::Invalid => unreachable!(),
                        }
                    }
                }
                live.push((client, coid));
            } else {
                let pick = rng.below(live.len() as u64) as usize;
                let (client, coid) = live.remove(pick);
                book.cancel(client, coid, &responses, &updates);
                drain_responses(&responses);
            }
            drain_updates(&updates);
        }
    }

    // P1: after any sequence of add/cancel, the bid list is strictly
    // decreasing by price and the ask list is strictly increasing by price.
    #[test]
    fn property_p1_side_lists_stay_strictly_ordered() {
        let mut book = test_book();
        let (responses, updates) = queues();
        let mut rng = Xorshift64(0x0B5E_55ED);
        let mut live: Vec<(ClientId, OrderId)> = Vec::new();
        let mut next_coid = 1u64;

        fn strictly_ordered(prices: &[Price], ascending: bool) -> bool {
            prices.windows(2).all(|w| {
                if ascending {
                    w[0] < w[1]
                } else {
                    w[0] > w[1]
                }
            })
        }

        for _ in 0..500 {
            if live.is_empty() || rng.below(3) != 0 {
                let client = rng.below(8) as ClientId;
                let side = if rng.below(2) == 0 { Side::Buy } else { Side::Sell };
                let price = 40 + rng.below(20) as Price;
                let qty = 1 + rng.below(10) as Qty;
                let coid = next_coid;
                next_coid += 1;
                book.add(client, coid, side, price, qty, &responses, &updates);
                live.push((client, coid));
            } else {
                let pick = rng.below(live.len() as u64) as usize;
                let (client, coid) = live.remove(pick);
                book.cancel(client, coid, &responses, &updates);
            }
            drain_responses(&responses);
            drain_updates(&updates);

            let bids: Vec<Price> = book.l2_snapshot(Side::Buy).iter().map(|&(p, _)| p).collect();
            let asks: Vec<Price> = book.l2_snapshot(Side::Sell).iter().map(|&(p, _)| p).collect();
            assert!(strictly_ordered(&bids, false), "bids not strictly descending: {bids:?}");
            assert!(strictly_ordered(&asks, true), "asks not strictly ascending: {asks:?}");
        }
    }

    // P2: within every price level, order priorities are strictly
    // increasing from head to tail.
    #[test]
    fn property_p2_level_priorities_strictly_increase() {
        let mut book = test_book();
        let (responses, updates) = queues();
        let mut rng = Xorshift64(0xCAFE_F00D);
        let mut live: Vec<(ClientId, OrderId)> = Vec::new();
        let mut next_coid = 1u64;

        for _ in 0..500 {
            if live.is_empty() || rng.below(3) != 0 {
                let client = rng.below(8) as ClientId;
                let side = if rng.below(2) == 0 { Side::Buy } else { Side::Sell };
                let price = 40 + rng.below(20) as Price;
                let qty = 1 + rng.below(10) as Qty;
                let coid = next_coid;
                next_coid += 1;
                book.add(client, coid, side, price, qty, &responses, &updates);
                live.push((client, coid));
            } else {
                let pick = rng.below(live.len() as u64) as usize;
                let (client, coid) = live.remove(pick);
                book.cancel(client, coid, &responses, &updates);
            }
            drain_responses(&responses);
            drain_updates(&updates);

            for head in [book.bids_head, book.asks_head] {
                if head == NIL {
                    continue;
                }
                let mut level_cursor = head;
                loop {
                    let level = book.level_pool.get(level_cursor);
                    let start = level.head_order;
                    let mut order_cursor = start;
                    let mut last_priority: Option<Priority> = None;
                    loop {
                        let priority = book.order_pool.get(order_cursor).priority;
                        if let Some(last) = last_priority {
                            assert!(
                                priority > last,
                                "priorities not strictly increasing within a level"
                            );
                        }
                        last_priority = Some(priority);
                        order_cursor = book.order_pool.get(order_cursor).next;
                        if order_cursor == start {
                            break;
                        }
                    }
                    level_cursor = level.next;
                    if level_cursor == head {
                        break;
                    }
                }
            }
        }
    }

    // P7: market OIDs emitted on ADD updates are strictly increasing
    // within this book.
    #[test]
    fn property_p7_market_oids_strictly_increasing() {
        let mut book = test_book();
        let (responses, updates) = queues();
        let mut rng = Xorshift64(0x1234_5678);
        let mut live: Vec<(ClientId, OrderId)> = Vec::new();
        let mut next_coid = 1u64;
        let mut last_market_oid = 0u64;

        for _ in 0..500 {
            if live.is_empty() || rng.below(3) != 0 {
                let client = rng.below(8) as ClientId;
                let side = if rng.below(2) == 0 { Side::Buy } else { Side::Sell };
                let price = 40 + rng.below(20) as Price;
                let qty = 1 + rng.below(10) as Qty;
                let coid = next_coid;
                next_coid += 1;
                book.add(client, coid, side, price, qty, &responses, &updates);
                live.push((client, coid));
            } else {
                let pick = rng.below(live.len() as u64) as usize;
                let (client, coid) = live.remove(pick);
                book.cancel(client, coid, &responses, &updates);
            }
            drain_responses(&responses);

            for u in drain_updates(&updates) {
                if u.update_type == market_update_type::ADD {
                    let market_oid = u.market_order_id;
                    assert!(market_oid > last_market_oid, "market OIDs must strictly increase");
                    last_market_oid = market_oid;
                }
            }
        }
    }
}
