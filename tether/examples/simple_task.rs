use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use tether::event_loop::Scope;

// A simple computation function
fn expensive_computation(x: i32) -> i32 {
    // Simulate some work
    thread::sleep(Duration::from_millis(100));
    x * x
}

fn main() {
    println!("🚀 Starting tether example");

    // Block on the current thread
    let direct = tether::run(|| expensive_computation(3)).get();
    println!("get: 3² = {}", direct);

    // Continue on this thread once a worker is done
    let scope = Scope::new();
    let remaining = Rc::new(Cell::new(3));
    for i in 1..=3 {
        let (left, done) = (remaining.clone(), scope.clone());
        let handle = tether::run(move || expensive_computation(i)).then(move |result| {
            println!("then: task {} finished with {}", i, result);
            left.set(left.get() - 1);
            if left.get() == 0 {
                done.exit();
            }
        });
        println!("📤 Task submitted with ID: {}", handle.id());
    }
    scope.exec();

    // Suspend without blocking this thread's event loop
    let result = tether::wait(|| expensive_computation(42));
    println!("✅ wait: 42² = {}", result);

    // Fire and forget
    tether::exec(|| println!("exec: running on {:?}", thread::current().name()));
    thread::sleep(Duration::from_millis(50));
}
