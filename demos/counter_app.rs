//! Complete counter application demonstrating all features together

use stowage::{Action, Logger, Middleware, Store};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct CounterState {
    count: i32,
    step: i32,
    history: Vec<i32>,
}

impl CounterState {
    fn new() -> Self {
        Self {
            count: 0,
            step: 1,
            history: vec![0],
        }
    }
}

#[derive(Debug)]
enum CounterAction {
    Increment,
    Decrement,
    SetStep(i32),
    Reset,
}

fn counter_reducer(state: &CounterState, action: &CounterAction) -> CounterState {
    let mut next = state.clone();
    match action {
        CounterAction::Increment => next.count += next.step,
        CounterAction::Decrement => next.count -= next.step,
        CounterAction::SetStep(step) => {
            next.step = *step;
            return next;
        }
        CounterAction::Reset => next.count = 0,
    }
    next.history.push(next.count);
    next
}

fn main() -> stowage::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Complete Counter Application ===\n");

    println!("1. Initializing counter store");
    let store = Store::with_middleware(
        counter_reducer,
        CounterState::new(),
        vec![Arc::new(Logger::new("counter")) as Arc<dyn Middleware<CounterState, CounterAction>>],
    );

    // Setup a subscriber to log changes
    store
        .subscribe(|state| {
            println!("   [State] Count: {}, Step: {}", state.count, state.step);
        })
        .detach();

    println!("\n2. Setting up memoized selectors");
    let is_positive = store.select(|state| state.count > 0);
    let is_even = store.select(|state| state.count % 2 == 0);
    let absolute_value = store.select(|state| state.count.abs());

    // Only fires when the parity actually flips
    let _parity = store.watch(
        |state| state.count % 2 == 0,
        |even| println!("   [Watch] Now {}", if *even { "even" } else { "odd" }),
    );

    let print_state = || {
        println!(
            "   Count: {} | Positive: {} | Even: {} | Abs: {}",
            store.read(|s| s.count),
            is_positive.get(),
            is_even.get(),
            absolute_value.get()
        );
    };

    println!("\n3. Initial state:");
    print_state();

    println!("\n4. Incrementing...");
    for _ in 0..3 {
        store.dispatch(CounterAction::Increment)?;
        print_state();
    }

    println!("\n5. Changing step size to 5");
    store.dispatch(CounterAction::SetStep(5))?;

    println!("\n6. Incrementing with new step...");
    store.dispatch(CounterAction::Increment)?;
    print_state();

    println!("\n7. Decrementing...");
    for _ in 0..3 {
        store.dispatch(CounterAction::Decrement)?;
        print_state();
    }

    println!("\n8. History:");
    store.read(|state| println!("   {:?}", state.history));

    println!("\n9. Resetting...");
    store.dispatch(CounterAction::Reset)?;
    print_state();

    println!("\n10. Final history:");
    store.read(|state| println!("   {:?}", state.history));

    // The process-wide application store is always available too.
    let app = stowage::app::store();
    app.dispatch(Action::new("counter_app/finished"))?;

    println!("\n✓ Counter application complete!");
    Ok(())
}
