//! The add-expense state machine.
//!
//! [`transition`] is pure: it reads the current [`ConversationState`] and the
//! resolved [`Input`] and returns the next stage, the data change and the
//! reply. The caller commits the result with [`ConversationState::apply`].

use super::command::{Button, Input};
use super::state::{ConversationState, Stage};

pub const GREETING: &str = "Hi there!";
pub const ASK_CATEGORY: &str = "Enter a category";
pub const ASK_AMOUNT: &str = "Enter the amount";
pub const INVALID_AMOUNT: &str = "Please enter a valid number";
pub const EXPENSE_ADDED: &str = "Expense added";
pub const UNKNOWN_COMMAND: &str = "Unknown command";
pub const SOMETHING_WRONG: &str = "Something went wrong";
pub const NO_CATEGORIES: &str = "No categories yet";
pub const NO_EXPENSES: &str = "No expenses yet";

/// Outbound message. Empty `choices` means "remove the keyboard".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub choices: Vec<String>,
}

impl Reply {
    /// Text with the three menu buttons.
    pub fn with_menu(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choices: Button::MENU.iter().map(|b| b.label().to_string()).collect(),
        }
    }

    /// Text with the keyboard hidden.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choices: Vec::new(),
        }
    }
}

/// Data change a transition asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Make sure the category exists and remember it as pending.
    OpenCategory(String),
    /// Append `amount` to `category`.
    Record { category: String, amount: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Stage,
    pub effect: Effect,
    pub reply: Reply,
}

impl Transition {
    fn without_effect(next: Stage, reply: Reply) -> Self {
        Self {
            next,
            effect: Effect::None,
            reply,
        }
    }
}

/// Outcome of reading an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountInput {
    Parsed(i32),
    Invalid,
}

impl AmountInput {
    pub fn parse(text: &str) -> Self {
        match text.trim().parse::<i32>() {
            Ok(amount) => AmountInput::Parsed(amount),
            Err(_) => AmountInput::Invalid,
        }
    }
}

pub fn transition(state: &ConversationState, input: &Input) -> Transition {
    // `/start` resets from anywhere.
    if *input == Input::Start {
        return Transition::without_effect(Stage::Idle, Reply::with_menu(GREETING));
    }

    match state.stage() {
        Stage::Idle => idle(state, input),
        Stage::AwaitingCategory => {
            let category = input.as_text().to_string();
            Transition {
                next: Stage::AwaitingAmount,
                effect: Effect::OpenCategory(category),
                reply: Reply::plain(ASK_AMOUNT),
            }
        }
        Stage::AwaitingAmount => awaiting_amount(state, input),
    }
}

fn idle(state: &ConversationState, input: &Input) -> Transition {
    match input {
        Input::Button(Button::AddExpense) => {
            Transition::without_effect(Stage::AwaitingCategory, Reply::plain(ASK_CATEGORY))
        }
        Input::Button(Button::ShowCategories) => {
            let text = state
                .categories_summary()
                .unwrap_or_else(|| NO_CATEGORIES.to_string());
            Transition::without_effect(Stage::Idle, Reply::with_menu(text))
        }
        Input::Button(Button::ShowExpenses) => {
            let text = state
                .expenses_listing()
                .unwrap_or_else(|| NO_EXPENSES.to_string());
            Transition::without_effect(Stage::Idle, Reply::with_menu(text))
        }
        Input::Start => Transition::without_effect(Stage::Idle, Reply::with_menu(GREETING)),
        Input::Text(_) => Transition::without_effect(Stage::Idle, Reply::plain(UNKNOWN_COMMAND)),
    }
}

fn awaiting_amount(state: &ConversationState, input: &Input) -> Transition {
    let amount = match AmountInput::parse(input.as_text()) {
        AmountInput::Parsed(amount) => amount,
        AmountInput::Invalid => {
            return Transition::without_effect(Stage::AwaitingAmount, Reply::plain(INVALID_AMOUNT));
        }
    };

    let Some(category) = state.pending_category() else {
        return Transition::without_effect(Stage::Idle, Reply::with_menu(SOMETHING_WRONG));
    };

    Transition {
        next: Stage::Idle,
        effect: Effect::Record {
            category: category.to_string(),
            amount,
        },
        reply: Reply::with_menu(EXPENSE_ADDED),
    }
}
