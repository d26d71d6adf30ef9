//! Cooperative runtime: a UI task queue and a frame clock.
//!
//! The embedder owns the loop. It advances the clock with
//! [`Runtime::advance_frame`], which fires due frame callbacks and then
//! drains queued tasks. Nothing here spawns threads; callbacks scheduled
//! while a frame is being dispatched run on the next frame.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::mem;
use std::rc::Rc;

pub type FrameCallbackId = u64;

type FrameCallback = Box<dyn FnOnce(u64)>;
type Task = Box<dyn FnOnce()>;

#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RefCell<RuntimeInner>>,
}

struct RuntimeInner {
    now_nanos: u64,
    next_callback_id: FrameCallbackId,
    frame_callbacks: Vec<(FrameCallbackId, FrameCallback)>,
    tasks: VecDeque<Task>,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(RuntimeInner {
                now_nanos: 0,
                next_callback_id: 0,
                frame_callbacks: Vec::new(),
                tasks: VecDeque::new(),
            })),
        }
    }

    /// Current frame-clock time. Advances only via [`Runtime::advance_frame`].
    pub fn now_nanos(&self) -> u64 {
        self.inner.borrow().now_nanos
    }

    pub fn now_millis(&self) -> u64 {
        self.now_nanos() / 1_000_000
    }

    /// Queues work to run after the current dispatch finishes.
    pub fn enqueue(&self, task: impl FnOnce() + 'static) {
        self.inner.borrow_mut().tasks.push_back(Box::new(task));
    }

    /// Registers a one-shot callback for the next frame. Dropping the
    /// returned registration cancels it.
    pub fn with_frame_nanos(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> FrameCallbackRegistration {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_callback_id;
        inner.next_callback_id += 1;
        inner.frame_callbacks.push((id, Box::new(callback)));
        FrameCallbackRegistration {
            runtime: self.clone(),
            id: Some(id),
        }
    }

    fn cancel_frame_callback(&self, id: FrameCallbackId) {
        let mut inner = self.inner.borrow_mut();
        if let Some(index) = inner.frame_callbacks.iter().position(|(cb, _)| *cb == id) {
            let _ = inner.frame_callbacks.remove(index);
        }
    }

    /// Advances the clock to `frame_time_nanos`, fires the frame callbacks
    /// registered before this call, then drains the task queue. Callbacks
    /// registered during dispatch wait for the next frame.
    pub fn advance_frame(&self, frame_time_nanos: u64) {
        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            inner.now_nanos = frame_time_nanos;
            mem::take(&mut inner.frame_callbacks)
        };
        for (_, callback) in callbacks {
            callback(frame_time_nanos);
        }
        self.drain_tasks();
    }

    /// Runs queued tasks until the queue is empty. Tasks may enqueue
    /// follow-up tasks; those run in the same drain.
    pub fn drain_tasks(&self) {
        loop {
            let task = self.inner.borrow_mut().tasks.pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    /// Whether any frame callback or task is pending.
    pub fn has_pending_work(&self) -> bool {
        let inner = self.inner.borrow();
        !inner.frame_callbacks.is_empty() || !inner.tasks.is_empty()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

pub struct FrameCallbackRegistration {
    runtime: Runtime,
    id: Option<FrameCallbackId>,
}

impl FrameCallbackRegistration {
    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

impl Drop for FrameCallbackRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
