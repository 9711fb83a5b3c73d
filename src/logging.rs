// vertex_core/src/logging.rs
//
// Asynchronous logger. Producers enqueue tagged primitive values without
// blocking; a background thread drains the queue into a file every 10ms
// and on shutdown waits for the queue to empty before closing. Grounded on
// `original_source/source/utils/logging.h` (`Logger`, `LogElement`,
// `flush_queue`).

use std::fmt::Write as _;
use std::fs::File;
use std::io::Write as IoWrite;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::{VertexError, VertexResult};
use crate::queue::Spsc;

const LOG_QUEUE_SIZE: usize = 8 * 1024 * 1024;
const FLUSH_INTERVAL: Duration = Duration::from_millis(10);

/// A single queued log value. `Text` carries ownership of a formatted
/// fragment so the producer never blocks on an allocation-free path only
/// for the common case of logging a string; the original's `LogElement`
/// union is modelled here as an enum over the primitive kinds it names
/// plus `Text` for anything that doesn't fit an 8-byte scalar.
#[derive(Debug, Clone)]
pub enum LogEvent {
    Char(char),
    Int(i32),
    Long(i64),
    UInt(u32),
    ULong(u64),
    Float(f32),
    Double(f64),
    Text(String),
}

impl Default for LogEvent {
    fn default() -> Self {
        LogEvent::Char('\0')
    }
}

impl LogEvent {
    fn render(&self, out: &mut String) {
        match self {
            LogEvent::Char(c) => out.push(*c),
            LogEvent::Int(v) => {
                let _ = write!(out, "{v}");
            }
            LogEvent::Long(v) => {
                let _ = write!(out, "{v}");
            }
            LogEvent::UInt(v) => {
                let _ = write!(out, "{v}");
            }
            LogEvent::ULong(v) => {
                let _ = write!(out, "{v}");
            }
            LogEvent::Float(v) => {
                let _ = write!(out, "{v}");
            }
            LogEvent::Double(v) => {
                let _ = write!(out, "{v}");
            }
            LogEvent::Text(s) => out.push_str(s),
        }
    }
}

/// A background-flushed log file. One instance per component, matching
/// the exchange's one-`Logger`-per-component convention (its own
/// `exchange_order_matching_engine.log` and so on).
pub struct AsyncLogger {
    queue: Arc<Spsc<LogEvent>>,
    is_running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    path: String,
}

impl AsyncLogger {
    pub fn new(path: impl Into<String>) -> VertexResult<Self> {
        let path = path.into();
        let mut file = File::create(&path).map_err(|source| VertexError::LogFileOpen {
            path: path.clone(),
            source,
        })?;
        let queue = Arc::new(Spsc::new(LOG_QUEUE_SIZE).expect("LOG_QUEUE_SIZE is non-zero"));
        let is_running = Arc::new(AtomicBool::new(true));

        let worker_queue = Arc::clone(&queue);
        let worker_running = Arc::clone(&is_running);
        let worker = crate::threading::spawn_named(None, "vertex-logger", move || {
            let mut line = String::new();
            while worker_running.load(Ordering::Acquire) {
                while let Some(slot) = worker_queue.next_to_read() {
                    line.clear();
                    // SAFETY: the consumer side owns this slot until
                    // `commit_read`.
                    unsafe { &*slot }.render(&mut line);
                    let _ = file.write_all(line.as_bytes());
                    worker_queue.commit_read();
                }
                let _ = file.flush();
                std::thread::sleep(FLUSH_INTERVAL);
            }
            // final drain after the stop flag flips, mirroring the
            // original's destructor waiting for `queue.size() == 0`.
            while let Some(slot) = worker_queue.next_to_read() {
                line.clear();
                unsafe { &*slot }.render(&mut line);
                let _ = file.write_all(line.as_bytes());
                worker_queue.commit_read();
            }
            let _ = file.flush();
        });

        Ok(AsyncLogger {
            queue,
            is_running,
            worker: Some(worker),
            path,
        })
    }

    /// Non-blocking enqueue; safe to call from a trading hot path.
    pub fn log(&self, event: LogEvent) {
        unsafe {
            *self.queue.next_to_write() = event;
        }
        self.queue.commit_write();
    }

    pub fn log_str(&self, s: impl Into<String>) {
        self.log(LogEvent::Text(s.into()));
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Drop for AsyncLogger {
    fn drop(&mut self) {
        tracing::info!(path = %self.path, "flushing and closing logfile");
        while self.queue.size() != 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
        self.is_running.store(false, Ordering::Release);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_drain_to_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("vertex-logger-test-{}.log", std::process::id()));
        {
            let logger = AsyncLogger::new(path.to_string_lossy().into_owned()).unwrap();
            logger.log_str("hello ");
            logger.log(LogEvent::Int(42));
        } // Drop joins the worker after a final drain.

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "hello 42");
        let _ = std::fs::remove_file(&path);
    }
}
