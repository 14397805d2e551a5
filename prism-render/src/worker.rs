// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The render worker pool.
//!
//! Each worker owns one task slot guarded by a small lock with two
//! condition variables: one signals "work available" to the worker, the
//! other signals "idle" back to the main thread. Workers run
//! Idle → Busy → Idle until the run flag drops at shutdown.
//!
//! The task carries a raw pointer to the frame's shared state. The main
//! thread keeps that state alive and untouched from `execute` until
//! `wait` returns, and every worker's band is disjoint, which is the
//! entire synchronization story: no global locks, no per-triangle locks.

use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};

use prism_common::Rect;

use crate::context::ContextState;
use crate::raster;

/// Sendable wrapper for the shared frame state pointer.
#[derive(Clone, Copy)]
struct ContextRef(*const ContextState);

// SAFETY: the pointee is immutable for the duration of the task except
// for the band-disjoint buffer writes described in the module docs.
unsafe impl Send for ContextRef {}

#[derive(Clone, Copy)]
struct Task {
    context: ContextRef,
    rect: Rect,
}

struct SlotState {
    run: bool,
    busy: bool,
    task: Option<Task>,
}

struct Slot {
    state: Mutex<SlotState>,
    task_cv: Condvar,
    idle_cv: Condvar,
}

/// One pooled render thread.
pub struct RenderWorker {
    slot: std::sync::Arc<Slot>,
    handle: Option<JoinHandle<()>>,
}

impl RenderWorker {
    /// Spawn a worker thread; it parks immediately as Idle.
    pub fn spawn(index: usize) -> Self {
        let slot = std::sync::Arc::new(Slot {
            state: Mutex::new(SlotState {
                run: true,
                busy: false,
                task: None,
            }),
            task_cv: Condvar::new(),
            idle_cv: Condvar::new(),
        });

        let thread_slot = slot.clone();
        let handle = std::thread::Builder::new()
            .name(format!("prism-worker-{index}"))
            .spawn(move || worker_loop(&thread_slot))
            .expect("failed to spawn render worker");

        log::trace!("spawned render worker {index}");

        Self {
            slot,
            handle: Some(handle),
        }
    }

    /// Hand a band to the worker. Dropped silently if it is still Busy —
    /// the scheduler never legitimately does that.
    pub(crate) fn execute(&self, context: *const ContextState, rect: Rect) {
        let mut state = self.slot.state.lock();
        if state.busy {
            return;
        }
        state.busy = true;
        state.task = Some(Task {
            context: ContextRef(context),
            rect,
        });
        self.slot.task_cv.notify_one();
    }

    /// Block until the worker goes Idle.
    pub fn wait(&self) {
        let mut state = self.slot.state.lock();
        while state.busy {
            self.slot.idle_cv.wait(&mut state);
        }
    }

    pub fn is_busy(&self) -> bool {
        self.slot.state.lock().busy
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        {
            let mut state = self.slot.state.lock();
            state.run = false;
        }
        self.slot.task_cv.notify_one();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(slot: &Slot) {
    loop {
        let task = {
            let mut state = slot.state.lock();
            loop {
                if !state.run {
                    return;
                }
                if let Some(task) = state.task.take() {
                    break task;
                }
                state.busy = false;
                slot.idle_cv.notify_one();
                slot.task_cv.wait(&mut state);
            }
        };

        if !task.rect.is_empty() {
            // SAFETY: the main thread keeps the context alive and blocks
            // in wait() until this worker flips back to Idle; our band is
            // disjoint from every other worker's.
            let context = unsafe { &*task.context.0 };
            raster::render_band(context, task.rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_starts_idle() {
        let worker = RenderWorker::spawn(0);
        worker.wait();
        assert!(!worker.is_busy());
    }

    #[test]
    fn test_execute_empty_band_returns_to_idle() {
        let worker = RenderWorker::spawn(0);
        worker.wait();
        // An empty rect never dereferences the context.
        worker.execute(std::ptr::null(), Rect::new(0, 0, 0, 0));
        worker.wait();
        assert!(!worker.is_busy());
    }

    #[test]
    fn test_shutdown_joins_cleanly() {
        let worker = RenderWorker::spawn(7);
        worker.wait();
        drop(worker); // must not hang
    }
}
