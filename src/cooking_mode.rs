//! Step-by-step walkthrough of a recipe's instructions.

use crate::recipe::Recipe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookingState {
    Viewing { index: usize },
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookingEvent {
    Next,
    Prev,
    Close,
    /// Only accepted on the last step.
    Finish,
}

#[derive(Debug, Clone)]
pub struct CookingMode {
    recipe_name: String,
    steps: Vec<String>,
    state: CookingState,
}

impl CookingMode {
    /// Starts on the first step. A recipe without steps starts closed.
    pub fn start(recipe: &Recipe) -> Self {
        let steps = recipe.step_lines();
        let state = if steps.is_empty() {
            CookingState::Closed
        } else {
            CookingState::Viewing { index: 0 }
        };
        Self {
            recipe_name: recipe.name.clone(),
            steps,
            state,
        }
    }

    pub fn recipe_name(&self) -> &str {
        &self.recipe_name
    }

    pub fn state(&self) -> CookingState {
        self.state
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.state == CookingState::Closed
    }

    pub fn current_step(&self) -> Option<&str> {
        match self.state {
            CookingState::Viewing { index } => self.steps.get(index).map(String::as_str),
            CookingState::Closed => None,
        }
    }

    pub fn is_first(&self) -> bool {
        matches!(self.state, CookingState::Viewing { index: 0 })
    }

    pub fn is_last(&self) -> bool {
        matches!(self.state, CookingState::Viewing { index } if index + 1 == self.steps.len())
    }

    /// `"ステップ 2 / 5"`, or `None` once closed.
    pub fn progress_label(&self) -> Option<String> {
        match self.state {
            CookingState::Viewing { index } => {
                Some(format!("ステップ {} / {}", index + 1, self.steps.len()))
            }
            CookingState::Closed => None,
        }
    }

    /// Applies an event and returns the resulting state. Events that do not
    /// apply in the current state leave it unchanged.
    pub fn handle(&mut self, event: CookingEvent) -> CookingState {
        self.state = match (self.state, event) {
            (CookingState::Closed, _) => CookingState::Closed,
            (_, CookingEvent::Close) => CookingState::Closed,
            (CookingState::Viewing { index }, CookingEvent::Next) if index + 1 < self.steps.len() => {
                CookingState::Viewing { index: index + 1 }
            }
            (CookingState::Viewing { index }, CookingEvent::Prev) if index > 0 => {
                CookingState::Viewing { index: index - 1 }
            }
            (CookingState::Viewing { index }, CookingEvent::Finish) if index + 1 == self.steps.len() => {
                CookingState::Closed
            }
            (state, _) => state,
        };
        self.state
    }
}
