use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tether::event_loop::{self, Scope};

fn square(x: u64) -> u64 {
    x * x
}

#[test]
fn wait_matches_direct_call() {
    for x in [0, 1, 7, 1_000] {
        assert_eq!(tether::wait(move || square(x)), square(x));
    }
}

#[test]
fn then_delivers_the_value_once() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let scope = Scope::new();

    let (c, exit) = (calls.clone(), scope.clone());
    tether::run(|| 42).then(move |value| {
        c.borrow_mut().push(value);
        exit.exit();
    });
    scope.exec();

    // Nothing else is queued for this task.
    event_loop::process_events();
    assert_eq!(*calls.borrow(), vec![42]);
}

#[test]
fn wait_returns_owned_values() {
    assert_eq!(tether::wait(|| "x"), "x");
    assert_eq!(tether::wait(|| vec![1, 2, 3]), vec![1, 2, 3]);
}

#[test]
fn continuation_runs_after_the_task_returns() {
    let finished = Arc::new(AtomicBool::new(false));
    let observed = Rc::new(Cell::new(false));
    let scope = Scope::new();

    let f = finished.clone();
    let (o, exit) = (observed.clone(), scope.clone());
    tether::run(move || {
        thread::sleep(Duration::from_millis(20));
        f.store(true, Ordering::SeqCst);
    })
    .then(move |()| {
        o.set(finished.load(Ordering::SeqCst));
        exit.exit();
    });

    assert!(!observed.get());
    scope.exec();
    assert!(observed.get());
}

#[test]
fn task_and_continuation_threads() {
    let caller = thread::current().id();
    let seen = Rc::new(Cell::new(None));
    let scope = Scope::new();

    let (s, exit) = (seen.clone(), scope.clone());
    tether::run(|| thread::current().id()).then(move |worker| {
        s.set(Some((worker, thread::current().id())));
        exit.exit();
    });
    scope.exec();

    let (worker, continuation) = seen.get().unwrap();
    assert_ne!(worker, caller);
    assert_eq!(continuation, caller);

    let worker = tether::wait(|| thread::current().id());
    assert_ne!(worker, caller);
}

#[test]
fn get_runs_inline() {
    let caller = thread::current().id();
    assert_eq!(tether::run(|| thread::current().id()).get(), caller);
    assert_eq!(tether::run(|| square(9)).get(), 81);
}

#[test]
fn nothing_survives_delivery() {
    let token = Arc::new(());
    let held = token.clone();

    let value = tether::wait(move || {
        let _held = held;
        5
    });

    assert_eq!(value, 5);
    assert_eq!(Arc::strong_count(&token), 1);
    assert_eq!(event_loop::pending_continuations(), 0);
    assert_eq!(event_loop::depth(), 0);
}

#[test]
fn unit_tasks_behave_the_same() {
    let ran = Arc::new(AtomicBool::new(false));

    let r = ran.clone();
    tether::wait(move || r.store(true, Ordering::SeqCst));
    assert!(ran.load(Ordering::SeqCst));

    let delivered = Rc::new(Cell::new(0));
    let scope = Scope::new();
    let (d, exit) = (delivered.clone(), scope.clone());
    tether::run(|| ()).then(move |()| {
        d.set(d.get() + 1);
        exit.exit();
    });
    scope.exec();
    assert_eq!(delivered.get(), 1);

    let r = ran.clone();
    r.store(false, Ordering::SeqCst);
    tether::run(move || r.store(true, Ordering::SeqCst)).get();
    assert!(ran.load(Ordering::SeqCst));
}

#[test]
fn concurrent_tasks_are_independent() {
    let results = Rc::new(RefCell::new(Vec::new()));
    let remaining = Rc::new(Cell::new(2));
    let scope = Scope::new();

    for (label, delay) in [("slow", 80), ("fast", 5)] {
        let (r, left, exit) = (results.clone(), remaining.clone(), scope.clone());
        tether::run(move || {
            thread::sleep(Duration::from_millis(delay));
            label
        })
        .then(move |label| {
            r.borrow_mut().push(label);
            left.set(left.get() - 1);
            if left.get() == 0 {
                exit.exit();
            }
        });
    }
    scope.exec();

    assert_eq!(*results.borrow(), vec!["fast", "slow"]);
    assert_eq!(event_loop::pending_continuations(), 0);
}

#[test]
fn exec_runs_side_effects() {
    let (tx, rx) = std::sync::mpsc::channel();
    tether::exec(move || tx.send(thread::current().id()).unwrap());

    let worker = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_ne!(worker, thread::current().id());
}

#[test]
fn exec_needs_no_event_loop() {
    let (tx, rx) = std::sync::mpsc::channel();
    for i in 0..1_000 {
        let tx = tx.clone();
        tether::exec(move || tx.send(i).unwrap());
    }
    drop(tx);

    assert_eq!(rx.iter().count(), 1_000);
    assert_eq!(event_loop::pending_continuations(), 0);
    assert_eq!(event_loop::process_events(), 0);
}

#[test]
fn wait_on_and_wait_for() {
    let future = tether::run(|| String::from("queued"));
    assert_eq!(tether::wait_on(future), "queued");

    assert_eq!(tether::wait_for(async { 6 * 7 }), 42);
    let value = tether::wait_for(futures::future::ready("ready"));
    assert_eq!(value, "ready");
}

#[test]
fn custom_config_names_threads() {
    let config = tether::Config {
        thread_name_prefix: "custom".to_string(),
        stack_size: Some(512 * 1024),
    };
    let name = tether::run_with(&config, || thread::current().name().map(str::to_owned)).wait();
    assert!(name.unwrap().starts_with("custom-"));
}
