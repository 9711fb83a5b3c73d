// vertex_core/src/threading.rs
//
// Named worker threads with best-effort CPU pinning. Grounds the
// spawn-and-name shape on `original_source`'s
// `create_and_start_thread(core_id, name, fn)` (called from
// `order_matching_engine.cpp`, `logging.h`, `test_threads.cpp`); pinning
// itself uses `core_affinity`, the crate `cooprefr-bettersys` reaches for
// to pin its own hot-path threads.

use std::thread::{Builder, JoinHandle};

/// Spawn a named thread, optionally pinned to a CPU core by index.
/// Pinning failure (bad index, platform without affinity support) is
/// logged and otherwise ignored — the thread still runs, just unpinned.
pub fn spawn_named<F>(core_id: Option<usize>, name: &str, f: F) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    let name = name.to_string();
    let thread_name = name.clone();
    Builder::new()
        .name(name)
        .spawn(move || {
            if let Some(core_id) = core_id {
                pin_current_thread(core_id, &thread_name);
            }
            f();
        })
        .expect("failed to spawn OS thread")
}

fn pin_current_thread(core_id: usize, thread_name: &str) {
    let core_ids = match core_affinity::get_core_ids() {
        Some(ids) => ids,
        None => {
            tracing::warn!(thread_name, "could not enumerate CPU cores; running unpinned");
            return;
        }
    };
    match core_ids.into_iter().find(|c| c.id == core_id) {
        Some(core) => {
            if !core_affinity::set_for_current(core) {
                tracing::warn!(thread_name, core_id, "failed to pin thread; running unpinned");
            }
        }
        None => {
            tracing::warn!(thread_name, core_id, "requested core id does not exist; running unpinned");
        }
    }
}
