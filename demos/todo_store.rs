//! Demonstration of a configured store for managing application state

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use stowage::{configure_store, Slice, StoreConfig};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TodoItem {
    id: usize,
    title: String,
    completed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TodoFilter {
    All,
    Active,
    Completed,
}

fn todos_slice() -> Slice<Vec<TodoItem>> {
    Slice::new("todos", Vec::new())
        .case("add", |todos: &mut Vec<TodoItem>, action| {
            if let Some(title) = action.payload().and_then(Value::as_str) {
                let id = todos.len();
                todos.push(TodoItem {
                    id,
                    title: title.to_string(),
                    completed: false,
                });
            }
        })
        .case("toggle", |todos, action| {
            let id = action.payload().and_then(Value::as_u64);
            if let Some(todo) = todos.iter_mut().find(|t| Some(t.id as u64) == id) {
                todo.completed = !todo.completed;
            }
        })
}

fn filter_slice() -> Slice<TodoFilter> {
    Slice::new("filter", TodoFilter::All).case("set", |filter, action| {
        if let Some(next) = action
            .payload()
            .and_then(|p| serde_json::from_value(p.clone()).ok())
        {
            *filter = next;
        }
    })
}

fn stats(todos: &[TodoItem]) -> (usize, usize, usize) {
    let total = todos.len();
    let completed = todos.iter().filter(|t| t.completed).count();
    (total, total - completed, completed)
}

fn main() -> stowage::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Store Example: Todo App ===\n");

    let todos = todos_slice().actions();
    let filter = filter_slice().actions();
    let store = configure_store(
        StoreConfig::new()
            .name("todo")
            .slice(todos_slice())
            .slice(filter_slice()),
    )?;

    println!("1. Setting up subscriber");
    let todo_list = store.select(|state| {
        state
            .slice::<Vec<TodoItem>>("todos")
            .ok()
            .flatten()
            .unwrap_or_default()
    });
    let stats_view = todo_list.clone();
    store
        .subscribe(move |_| {
            let (total, active, completed) = stats(&stats_view.get());
            println!(
                "   [Store Update] Total: {}, Active: {}, Completed: {}",
                total, active, completed
            );
        })
        .detach();

    println!("\n2. Adding todos");
    for title in ["Learn Rust", "Build state container", "Write documentation"] {
        store.dispatch(todos.action_with("add", json!(title)))?;
    }

    println!("\n3. Completing the first two todos");
    store.dispatch(todos.action_with("toggle", json!(0)))?;
    store.dispatch(todos.action_with("toggle", json!(1)))?;

    for wanted in [TodoFilter::Active, TodoFilter::Completed] {
        println!("\n4. Filtering to {:?}", wanted);
        store.dispatch(filter.action_with("set", json!(wanted)))?;

        let current: TodoFilter = store
            .read(|state| state.slice("filter"))?
            .unwrap_or(TodoFilter::All);
        for todo in todo_list.get().iter().filter(|t| match current {
            TodoFilter::All => true,
            TodoFilter::Active => !t.completed,
            TodoFilter::Completed => t.completed,
        }) {
            let status = if todo.completed { "✓" } else { " " };
            println!("   [{}] {}", status, todo.title);
        }
    }

    println!("\n5. Final state as JSON:");
    println!(
        "   {}",
        serde_json::to_string(&store.get_state()).unwrap_or_default()
    );

    println!("\n✓ Example complete!");
    Ok(())
}
