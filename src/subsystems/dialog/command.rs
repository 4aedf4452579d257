//! Inbound text → [`Input`] resolution.
//!
//! Button labels are matched exactly and case-sensitively; anything that is
//! neither `/start` nor a label is free text.

/// Menu buttons shown while idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    AddExpense,
    ShowCategories,
    ShowExpenses,
}

impl Button {
    /// Canonical menu order.
    pub const MENU: [Button; 3] = [Button::AddExpense, Button::ShowCategories, Button::ShowExpenses];

    pub fn label(self) -> &'static str {
        match self {
            Button::AddExpense => "Add expense",
            Button::ShowCategories => "Categories",
            Button::ShowExpenses => "Show all expenses",
        }
    }

    pub fn from_label(text: &str) -> Option<Button> {
        Button::MENU.into_iter().find(|b| b.label() == text)
    }
}

/// A resolved inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    Button(Button),
    Text(String),
}

impl Input {
    pub const START_COMMAND: &'static str = "/start";

    pub fn parse(text: &str) -> Input {
        if text == Self::START_COMMAND {
            return Input::Start;
        }
        match Button::from_label(text) {
            Some(button) => Input::Button(button),
            None => Input::Text(text.to_string()),
        }
    }

    /// The raw text the user sent, for stages that take free text.
    pub fn as_text(&self) -> &str {
        match self {
            Input::Start => Self::START_COMMAND,
            Input::Button(b) => b.label(),
            Input::Text(t) => t,
        }
    }
}
