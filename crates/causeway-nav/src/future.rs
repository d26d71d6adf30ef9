//! Completion handle for navigation operations.
//!
//! Single-threaded by design: the engine resolves the shared state from the
//! UI thread and the embedder either polls the handle as a `Future` or
//! attaches an `on_complete` callback.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::error::NavResult;

type CompletionCallback = Box<dyn FnOnce(NavResult)>;

struct Shared {
    result: Option<NavResult>,
    waker: Option<Waker>,
    callbacks: Vec<CompletionCallback>,
}

/// Resolves when the navigation operation settles. Clone-cheap; all clones
/// observe the same resolution.
#[derive(Clone)]
pub struct NavFuture {
    shared: Rc<RefCell<Shared>>,
}

/// Write side of a [`NavFuture`]. Consumed on resolve; a dropped resolver
/// leaves the future pending forever, so the engine always resolves.
pub struct NavResolver {
    shared: Rc<RefCell<Shared>>,
}

pub(crate) fn completion_pair() -> (NavFuture, NavResolver) {
    let shared = Rc::new(RefCell::new(Shared {
        result: None,
        waker: None,
        callbacks: Vec::new(),
    }));
    (
        NavFuture {
            shared: shared.clone(),
        },
        NavResolver { shared },
    )
}

impl NavFuture {
    /// Already-settled future, for operations that need no transition.
    pub fn resolved(result: NavResult) -> Self {
        let (future, resolver) = completion_pair();
        resolver.resolve(result);
        future
    }

    pub fn is_resolved(&self) -> bool {
        self.shared.borrow().result.is_some()
    }

    /// Outcome, once settled.
    pub fn result(&self) -> Option<NavResult> {
        self.shared.borrow().result.clone()
    }

    /// Runs `callback` when the operation settles; immediately if it
    /// already has.
    pub fn on_complete(&self, callback: impl FnOnce(NavResult) + 'static) {
        let settled = {
            let mut shared = self.shared.borrow_mut();
            match &shared.result {
                Some(result) => Some(result.clone()),
                None => {
                    shared.callbacks.push(Box::new(callback));
                    return;
                }
            }
        };
        if let Some(result) = settled {
            callback(result);
        }
    }
}

impl Future for NavFuture {
    type Output = NavResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut shared = self.shared.borrow_mut();
        match &shared.result {
            Some(result) => Poll::Ready(result.clone()),
            None => {
                shared.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl NavResolver {
    /// Settles the future and runs any attached completion callbacks.
    pub fn resolve(self, result: NavResult) {
        let (callbacks, waker) = {
            let mut shared = self.shared.borrow_mut();
            shared.result = Some(result.clone());
            (std::mem::take(&mut shared.callbacks), shared.waker.take())
        };
        for callback in callbacks {
            callback(result.clone());
        }
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}
