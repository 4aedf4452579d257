//! Per-conversation state and the expense ledger it carries.

use std::collections::BTreeMap;
use std::fmt;

use super::machine::Effect;

/// Where a conversation is in the add-expense dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Idle,
    AwaitingCategory,
    AwaitingAmount,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Idle => "IDLE",
            Stage::AwaitingCategory => "AWAITING_CATEGORY",
            Stage::AwaitingAmount => "AWAITING_AMOUNT",
        })
    }
}

/// One conversation: its dialog stage plus everything it has recorded.
///
/// `pending_category` is `Some` only while the stage is
/// [`Stage::AwaitingAmount`]; [`ConversationState::apply`] clears it on every
/// other transition.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    stage: Stage,
    pending_category: Option<String>,
    /// category -> amounts in entry order
    expenses: BTreeMap<String, Vec<i32>>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn pending_category(&self) -> Option<&str> {
        self.pending_category.as_deref()
    }

    /// Amounts recorded under `category`, or `None` if it was never opened.
    pub fn amounts(&self, category: &str) -> Option<&[i32]> {
        self.expenses.get(category).map(Vec::as_slice)
    }

    pub fn total(&self, category: &str) -> Option<i64> {
        self.amounts(category).map(sum)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.expenses.keys().map(String::as_str)
    }

    /// `name: total` per category, one per line. `None` when nothing exists yet.
    pub fn categories_summary(&self) -> Option<String> {
        if self.expenses.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .expenses
            .iter()
            .map(|(name, amounts)| format!("{name}: {}", sum(amounts)))
            .collect();
        Some(lines.join("\n"))
    }

    /// `name: a, b, c` per category with at least one amount.
    pub fn expenses_listing(&self) -> Option<String> {
        let lines: Vec<String> = self
            .expenses
            .iter()
            .filter(|(_, amounts)| !amounts.is_empty())
            .map(|(name, amounts)| {
                let joined: Vec<String> = amounts.iter().map(i32::to_string).collect();
                format!("{name}: {}", joined.join(", "))
            })
            .collect();
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    /// Commit a transition computed by the state machine.
    pub fn apply(&mut self, next: Stage, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::OpenCategory(category) => {
                self.expenses.entry(category.clone()).or_default();
                self.pending_category = Some(category);
            }
            Effect::Record { category, amount } => {
                self.expenses.entry(category).or_default().push(amount);
            }
        }
        self.stage = next;
        if next != Stage::AwaitingAmount {
            self.pending_category = None;
        }
    }

    /// A state that skipped the category step, used to exercise the guard.
    #[cfg(test)]
    pub(crate) fn awaiting_amount_without_category() -> Self {
        Self {
            stage: Stage::AwaitingAmount,
            ..Self::default()
        }
    }
}

fn sum(amounts: &[i32]) -> i64 {
    amounts.iter().map(|&a| i64::from(a)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(state: &mut ConversationState, category: &str) {
        state.apply(Stage::AwaitingAmount, Effect::OpenCategory(category.into()));
    }

    fn record(state: &mut ConversationState, category: &str, amount: i32) {
        state.apply(
            Stage::Idle,
            Effect::Record {
                category: category.into(),
                amount,
            },
        );
    }

    #[test]
    fn fresh_state_is_idle_and_empty() {
        let state = ConversationState::new();
        assert_eq!(state.stage(), Stage::Idle);
        assert!(state.pending_category().is_none());
        assert!(state.categories_summary().is_none());
        assert!(state.expenses_listing().is_none());
    }

    #[test]
    fn opening_a_category_creates_empty_key() {
        let mut state = ConversationState::new();
        open(&mut state, "Food");
        assert_eq!(state.pending_category(), Some("Food"));
        assert!(state.amounts("Food").is_some_and(|a| a.is_empty()));
        assert_eq!(state.categories_summary().as_deref(), Some("Food: 0"));
        assert!(state.expenses_listing().is_none());
    }

    #[test]
    fn reopening_keeps_existing_amounts() {
        let mut state = ConversationState::new();
        open(&mut state, "Food");
        record(&mut state, "Food", 10);
        open(&mut state, "Food");
        assert_eq!(state.amounts("Food"), Some(&[10][..]));
    }

    #[test]
    fn leaving_awaiting_amount_clears_pending() {
        let mut state = ConversationState::new();
        open(&mut state, "Food");
        state.apply(Stage::Idle, Effect::None);
        assert!(state.pending_category().is_none());
    }

    #[test]
    fn summary_and_listing_are_sorted_by_category() {
        let mut state = ConversationState::new();
        for (cat, amount) in [("Taxi", 7), ("Food", 10), ("Food", 5)] {
            open(&mut state, cat);
            record(&mut state, cat, amount);
        }
        assert_eq!(state.categories_summary().unwrap(), "Food: 15\nTaxi: 7");
        assert_eq!(state.expenses_listing().unwrap(), "Food: 10, 5\nTaxi: 7");
        assert_eq!(state.categories().collect::<Vec<_>>(), ["Food", "Taxi"]);
    }

    #[test]
    fn totals_do_not_overflow_i32() {
        let mut state = ConversationState::new();
        for _ in 0..2 {
            open(&mut state, "Rent");
            record(&mut state, "Rent", i32::MAX);
        }
        assert_eq!(state.total("Rent"), Some(2 * i64::from(i32::MAX)));
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::AwaitingCategory.to_string(), "AWAITING_CATEGORY");
    }
}
