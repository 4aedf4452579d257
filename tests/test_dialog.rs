//! End-to-end dialog scenarios through the public `Dialog` API.

use std::path::Path;
use std::sync::Arc;

use expense_bot::config;
use expense_bot::subsystems::dialog::{ConversationStore, Dialog, Reply, Stage};

const MENU: [&str; 3] = ["Add expense", "Categories", "Show all expenses"];

fn dialog() -> Dialog {
    Dialog::new(Arc::new(ConversationStore::new()))
}

fn send(d: &Dialog, id: i64, text: &str) -> Reply {
    d.handle(id, "tester", text).unwrap()
}

fn add_expense(d: &Dialog, id: i64, category: &str, amount: &str) {
    send(d, id, "Add expense");
    send(d, id, category);
    assert_eq!(send(d, id, amount).text, "Expense added");
}

#[test]
fn test_full_add_flow() {
    let d = dialog();

    let reply = send(&d, 1, "/start");
    assert_eq!(reply.text, "Hi there!");
    assert_eq!(reply.choices, MENU);

    let reply = send(&d, 1, "Add expense");
    assert_eq!(reply.text, "Enter a category");
    assert!(reply.choices.is_empty());
    assert_eq!(d.snapshot(1).unwrap().stage(), Stage::AwaitingCategory);

    let reply = send(&d, 1, "Food");
    assert_eq!(reply.text, "Enter the amount");
    assert!(reply.choices.is_empty());
    assert_eq!(d.snapshot(1).unwrap().stage(), Stage::AwaitingAmount);

    let reply = send(&d, 1, "42");
    assert_eq!(reply.text, "Expense added");
    assert_eq!(reply.choices, MENU);

    let state = d.snapshot(1).unwrap();
    assert_eq!(state.stage(), Stage::Idle);
    assert_eq!(state.amounts("Food"), Some(&[42][..]));
}

#[test]
fn test_unknown_command_before_start() {
    let d = dialog();
    let reply = send(&d, 2, "Food");
    assert_eq!(reply.text, "Unknown command");
    assert!(reply.choices.is_empty());
    assert_eq!(d.snapshot(2).unwrap().stage(), Stage::Idle);
}

#[test]
fn test_repeated_category_accumulates() {
    let d = dialog();
    add_expense(&d, 3, "Food", "10");
    add_expense(&d, 3, "Food", "5");

    let state = d.snapshot(3).unwrap();
    assert_eq!(state.amounts("Food"), Some(&[10, 5][..]));
    assert_eq!(state.total("Food"), Some(15));
    assert_eq!(send(&d, 3, "Categories").text, "Food: 15");
}

#[test]
fn test_category_step_alone_only_creates_key() {
    let d = dialog();
    send(&d, 4, "Add expense");
    send(&d, 4, "Books");

    let state = d.snapshot(4).unwrap();
    assert!(state.amounts("Books").is_some_and(|a| a.is_empty()));
    assert_eq!(state.pending_category(), Some("Books"));
}

#[test]
fn test_bad_amount_then_good_amount() {
    let d = dialog();
    send(&d, 5, "Add expense");
    send(&d, 5, "Taxi");

    let reply = send(&d, 5, "twelve");
    assert_eq!(reply.text, "Please enter a valid number");
    assert_eq!(d.snapshot(5).unwrap().total("Taxi"), Some(0));

    assert_eq!(send(&d, 5, "12").text, "Expense added");
    assert_eq!(d.snapshot(5).unwrap().amounts("Taxi"), Some(&[12][..]));
}

#[test]
fn test_listings_are_stable_without_adds() {
    let d = dialog();
    add_expense(&d, 6, "Food", "3");
    add_expense(&d, 6, "Coffee", "2");
    add_expense(&d, 6, "Food", "4");

    let categories = send(&d, 6, "Categories");
    assert_eq!(categories, send(&d, 6, "Categories"));
    assert_eq!(categories.text, "Coffee: 2\nFood: 7");

    let all = send(&d, 6, "Show all expenses");
    assert_eq!(all, send(&d, 6, "Show all expenses"));
    assert_eq!(all.text, "Coffee: 2\nFood: 3, 4");
}

#[test]
fn test_start_clears_pending_category() {
    let d = dialog();
    send(&d, 7, "Add expense");
    send(&d, 7, "Food");

    let reply = send(&d, 7, "/start");
    assert_eq!(reply.choices, MENU);
    let state = d.snapshot(7).unwrap();
    assert_eq!(state.stage(), Stage::Idle);
    assert!(state.pending_category().is_none());
}

#[test]
fn test_parallel_conversations_stay_isolated() {
    let d = Arc::new(dialog());
    let workers: Vec<_> = (0..8)
        .map(|id| {
            let d = d.clone();
            std::thread::spawn(move || {
                for amount in 1..=10 {
                    add_expense(&d, id, "Food", &amount.to_string());
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    assert_eq!(d.store().len(), 8);
    for id in 0..8 {
        assert_eq!(d.snapshot(id).unwrap().total("Food"), Some(55));
    }
}

#[test]
fn test_shipped_config_loads() {
    let cfg = config::load_from(Path::new("config/default.toml"), None, Some("123:abc".into())).unwrap();
    assert_eq!(cfg.bot_name, "My expenses");
    assert!(cfg.comms_telegram_should_load());
    assert!(!cfg.comms_pty_should_load());
    assert_eq!(cfg.require_bot_token().unwrap(), "123:abc");
}
