// vertex_core/src/engine.rs
//
// The matching engine: owns one OrderBook per ticker, runs a single
// worker thread that busy-spins on its inbound request queue, and
// dispatches each request to the right book. Grounded on
// `original_source/source/nitek/exchange/orders/order_matching_engine.cpp`
// (`start`/`stop` lifecycle, the `while (is_running) { read; process;
// advance }` loop with no sleep) and on the teacher's `MatchingEngine`
// wrapper-struct shape in `matching/mod.rs`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::book::{send_response, BookConfig, OrderBook};
use crate::error::VertexResult;
use crate::logging::AsyncLogger;
use crate::queue::Spsc;
use crate::types::TickerId;
use crate::wire::messages::{client_request_type, client_response_type};
use crate::wire::{ClientRequest, ClientResponse, MarketUpdate};

/// Engine-wide sizing. `max_requests` has no named constant in the
/// capacity table (only the two outbound queues are given one); it
/// defaults to the same figure as the client-response queue.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub book: BookConfig,
    pub max_tickers: usize,
    pub max_requests: usize,
    pub max_client_updates: usize,
    pub max_market_updates: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            book: BookConfig::default(),
            max_tickers: crate::types::MAX_TICKERS,
            max_requests: crate::types::MAX_CLIENT_UPDATES,
            max_client_updates: crate::types::MAX_CLIENT_UPDATES,
            max_market_updates: crate::types::MAX_MARKET_UPDATES,
        }
    }
}

/// A matching engine ready to be started. Not yet running any thread.
pub struct MatchingEngine {
    books: Vec<OrderBook>,
    logger: AsyncLogger,
    config: EngineConfig,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig, log_path: impl Into<String>) -> VertexResult<Self> {
        let books = (0..config.max_tickers as TickerId)
            .map(|ticker| OrderBook::new(ticker, config.book))
            .collect();
        let logger = AsyncLogger::new(log_path)?;
        Ok(MatchingEngine {
            books,
            logger,
            config,
        })
    }

    /// Spawn the engine's worker thread, optionally pinned to `core_id`.
    /// Consumes `self`: once running, the book state is owned exclusively
    /// by the worker thread and is reached only through the queues on the
    /// returned handle.
    pub fn start(self, core_id: Option<usize>) -> VertexResult<EngineHandle> {
        let request_queue = Arc::new(Spsc::new(self.config.max_requests)?);
        let response_queue = Arc::new(Spsc::new(self.config.max_client_updates)?);
        let market_queue = Arc::new(Spsc::new(self.config.max_market_updates)?);
        let running = Arc::new(AtomicBool::new(true));

        let worker_requests = Arc::clone(&request_queue);
        let worker_responses = Arc::clone(&response_queue);
        let worker_market = Arc::clone(&market_queue);
        let worker_running = Arc::clone(&running);
        let mut books = self.books;
        let logger = self.logger;

        let worker = crate::threading::spawn_named(core_id, "vertex-engine", move || {
            logger.log_str("matching engine accepting requests\n");
            while worker_running.load(Ordering::Acquire) {
                if let Some(ptr) = worker_requests.next_to_read() {
                    // SAFETY: the consumer side owns this slot until
                    // `commit_read`.
                    let request = unsafe { *ptr };
                    dispatch(
                        &mut books,
                        &request,
                        &worker_responses,
                        &worker_market,
                    );
                    worker_requests.commit_read();
                }
                // no yield/sleep: latency over CPU, matching the engine's
                // busy-spin contract.
            }
        });

        Ok(EngineHandle {
            request_queue,
            response_queue,
            market_queue,
            running,
            worker: Some(worker),
        })
    }
}

fn dispatch(
    books: &mut [OrderBook],
    request: &ClientRequest,
    responses: &Spsc<ClientResponse>,
    updates: &Spsc<MarketUpdate>,
) {
    let ticker = request.ticker_id as usize;
    let Some(book) = books.get_mut(ticker) else {
        send_response(
            responses,
            ClientResponse::new(
                client_response_type::INVALID_REQUEST,
                request.client_id,
                request.ticker_id,
                request.client_order_id,
                crate::types::ORDER_ID_INVALID,
                request.side(),
                request.price,
                crate::types::QTY_INVALID,
                crate::types::QTY_INVALID,
            ),
        );
        return;
    };

    match request.request_type {
        client_request_type::NEW => book.add(
            request.client_id,
            request.client_order_id,
            request.side(),
            request.price,
            request.qty,
            responses,
            updates,
        ),
        client_request_type::CANCEL => {
            book.cancel(request.client_id, request.client_order_id, responses, updates)
        }
        _ => send_response(
            responses,
            ClientResponse::new(
                client_response_type::INVALID_REQUEST,
                request.client_id,
                request.ticker_id,
                request.client_order_id,
                crate::types::ORDER_ID_INVALID,
                request.side(),
                request.price,
                crate::types::QTY_INVALID,
                crate::types::QTY_INVALID,
            ),
        ),
    }
}

/// A running matching engine. Interact with it only through the three
/// queues; `stop` halts the worker and joins it.
pub struct EngineHandle {
    request_queue: Arc<Spsc<ClientRequest>>,
    response_queue: Arc<Spsc<ClientResponse>>,
    market_queue: Arc<Spsc<MarketUpdate>>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn request_queue(&self) -> &Spsc<ClientRequest> {
        &self.request_queue
    }

    pub fn response_queue(&self) -> &Spsc<ClientResponse> {
        &self.response_queue
    }

    pub fn market_queue(&self) -> &Spsc<MarketUpdate> {
        &self.market_queue
    }

    /// Submit a request, copying it into the next writable slot.
    pub fn submit(&self, request: ClientRequest) {
        unsafe {
            *self.request_queue.next_to_write() = request;
        }
        self.request_queue.commit_write();
    }

    pub fn stop(mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}
