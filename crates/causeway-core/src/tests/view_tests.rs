use super::*;
use std::cell::RefCell;
use std::rc::Rc;

fn record(name: &str) -> ViewRecord {
    ViewRecord::new(PageKind::new(name), Params::new())
}

#[test]
fn destroy_hooks_run_once_in_registration_order() {
    let view = record("detail");
    let order = Rc::new(RefCell::new(Vec::new()));

    for tag in ["content", "navbar"] {
        let order = Rc::clone(&order);
        view.add_destroy_hook(move || order.borrow_mut().push(tag));
    }

    view.destroy();
    view.destroy();
    assert_eq!(order.borrow().as_slice(), &["content", "navbar"]);
    assert!(view.is_destroyed());
}

#[test]
fn hook_added_after_destroy_runs_immediately() {
    let view = record("detail");
    view.destroy();

    let ran = Rc::new(RefCell::new(false));
    let ran_hook = Rc::clone(&ran);
    view.add_destroy_hook(move || *ran_hook.borrow_mut() = true);
    assert!(*ran.borrow());
}

#[test]
fn mark_loaded_fires_loaded_event_once() {
    struct Counting {
        loads: RefCell<u32>,
    }
    impl PageEvents for Counting {
        fn loaded(&self) {
            *self.loads.borrow_mut() += 1;
        }
    }

    let view = record("home");
    let events = Rc::new(Counting {
        loads: RefCell::new(0),
    });
    view.set_events(events.clone());

    assert!(!view.is_loaded());
    view.mark_loaded();
    view.mark_loaded();
    assert!(view.is_loaded());
    assert_eq!(*events.loads.borrow(), 1);
}

#[test]
fn lifecycle_events_stop_after_destroy() {
    struct Counting {
        enters: RefCell<u32>,
    }
    impl PageEvents for Counting {
        fn will_enter(&self) {
            *self.enters.borrow_mut() += 1;
        }
    }

    let view = record("home");
    let events = Rc::new(Counting {
        enters: RefCell::new(0),
    });
    view.set_events(events.clone());

    view.will_enter();
    view.destroy();
    view.will_enter();
    assert_eq!(*events.enters.borrow(), 1);
}

#[test]
fn params_are_owned_by_the_record() {
    let params = Params::new().with("id", "325");
    let view = ViewRecord::new(PageKind::new("detail"), params);
    assert_eq!(view.params().get("id"), Some("325"));
    assert_eq!(view.params().get("missing"), None);
}

#[test]
fn placeholder_has_no_page_and_default_transitions() {
    let view = ViewRecord::placeholder();
    assert!(view.is_placeholder());
    assert_eq!(
        &*view.transition_name(NavDirection::Forward),
        DEFAULT_FORWARD_TRANSITION
    );
    assert_eq!(
        &*view.transition_name(NavDirection::Back),
        DEFAULT_BACK_TRANSITION
    );
}

#[test]
fn transition_names_can_be_declared_per_direction() {
    let view = record("modal");
    view.set_transition_names("modal-slide-up", "modal-slide-down");
    assert_eq!(
        &*view.transition_name(NavDirection::Forward),
        "modal-slide-up"
    );
    assert_eq!(&*view.transition_name(NavDirection::Back), "modal-slide-down");
}
