use super::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn frame_callbacks_fire_with_frame_time() {
    let runtime = Runtime::new();
    let seen = Rc::new(Cell::new(0u64));

    let seen_cb = Rc::clone(&seen);
    let registration = runtime.with_frame_nanos(move |time| seen_cb.set(time));
    std::mem::forget(registration);

    runtime.advance_frame(16_000_000);
    assert_eq!(seen.get(), 16_000_000);
    assert_eq!(runtime.now_millis(), 16);
}

#[test]
fn dropped_registration_cancels_callback() {
    let runtime = Runtime::new();
    let fired = Rc::new(Cell::new(false));

    let fired_cb = Rc::clone(&fired);
    let registration = runtime.with_frame_nanos(move |_| fired_cb.set(true));
    drop(registration);

    runtime.advance_frame(16_000_000);
    assert!(!fired.get());
}

#[test]
fn callback_registered_during_dispatch_waits_for_next_frame() {
    let runtime = Runtime::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    let order_outer = Rc::clone(&order);
    let runtime_inner = runtime.clone();
    let registration = runtime.with_frame_nanos(move |_| {
        order_outer.borrow_mut().push("first");
        let order_inner = Rc::clone(&order_outer);
        let inner = runtime_inner.with_frame_nanos(move |_| {
            order_inner.borrow_mut().push("second");
        });
        std::mem::forget(inner);
    });
    std::mem::forget(registration);

    runtime.advance_frame(16_000_000);
    assert_eq!(order.borrow().as_slice(), &["first"]);

    runtime.advance_frame(33_000_000);
    assert_eq!(order.borrow().as_slice(), &["first", "second"]);
}

#[test]
fn tasks_drain_in_fifo_order_including_nested() {
    let runtime = Runtime::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    let order_a = Rc::clone(&order);
    let order_b = Rc::clone(&order);
    let runtime_for_task = runtime.clone();
    runtime.enqueue(move || {
        order_a.borrow_mut().push(1);
        let order_nested = Rc::clone(&order_a);
        runtime_for_task.enqueue(move || order_nested.borrow_mut().push(3));
    });
    runtime.enqueue(move || order_b.borrow_mut().push(2));

    runtime.drain_tasks();
    assert_eq!(order.borrow().as_slice(), &[1, 2, 3]);
    assert!(!runtime.has_pending_work());
}
