//! Alert setup dialogue. A user with no entry in the conversation map is idle.

use jobbot_core::{CoreError, UserId};
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupState {
    AwaitingKeyword,
    AwaitingLocation { keyword: String },
    AwaitingSalary { keyword: String, location: String },
}

/// Criteria collected by a completed setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRequest {
    pub keyword: String,
    pub location: String,
    pub min_salary: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Input accepted, ask the next question.
    Ask(SetupState),
    Done(AlertRequest),
}

/// An answer the dialogue cannot accept. `state` is unchanged so the same
/// question can be asked again.
#[derive(Debug)]
pub struct Rejection {
    pub state: SetupState,
    pub error: CoreError,
}

impl Rejection {
    fn new(state: SetupState, message: &str) -> Self {
        Self {
            state,
            error: CoreError::InvalidInput {
                message: message.to_string(),
            },
        }
    }
}

impl SetupState {
    pub fn advance(self, input: &str) -> Result<Transition, Rejection> {
        let input = input.trim();
        match self {
            SetupState::AwaitingKeyword if input.is_empty() => {
                Err(Rejection::new(self, "keyword is empty"))
            }
            SetupState::AwaitingKeyword => Ok(Transition::Ask(SetupState::AwaitingLocation {
                keyword: input.to_string(),
            })),
            SetupState::AwaitingLocation { .. } if input.is_empty() => {
                Err(Rejection::new(self, "location is empty"))
            }
            SetupState::AwaitingLocation { keyword } => {
                Ok(Transition::Ask(SetupState::AwaitingSalary {
                    keyword,
                    location: input.to_string(),
                }))
            }
            SetupState::AwaitingSalary { keyword, location } => match parse_salary(input) {
                Some(min_salary) => Ok(Transition::Done(AlertRequest {
                    keyword,
                    location,
                    min_salary,
                })),
                None => Err(Rejection::new(
                    SetupState::AwaitingSalary { keyword, location },
                    "salary must be a whole number of rupees",
                )),
            },
        }
    }
}

/// Whole rupees, thousands separators allowed. Negative or non-numeric
/// input is rejected.
pub fn parse_salary(input: &str) -> Option<u64> {
    let digits: String = input.trim().chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// In-progress setups keyed by user.
#[derive(Debug, Default)]
pub struct Conversations {
    states: Mutex<HashMap<UserId, SetupState>>,
}

impl Conversations {
    pub async fn begin(&self, user_id: UserId) {
        self.states
            .lock()
            .await
            .insert(user_id, SetupState::AwaitingKeyword);
    }

    /// Removes and returns the user's state so the caller can advance it.
    pub async fn take(&self, user_id: UserId) -> Option<SetupState> {
        self.states.lock().await.remove(&user_id)
    }

    pub async fn put(&self, user_id: UserId, state: SetupState) {
        self.states.lock().await.insert(user_id, state);
    }

    /// True if a setup was in progress.
    pub async fn cancel(&self, user_id: UserId) -> bool {
        self.states.lock().await.remove(&user_id).is_some()
    }

    pub async fn is_active(&self, user_id: UserId) -> bool {
        self.states.lock().await.contains_key(&user_id)
    }
}
