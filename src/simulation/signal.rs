//! Signal indications and the commands the controller issues for them

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::SignalGroupId;

/// Indication shown by a signal group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalState {
    Red,
    RedYellow,
    Green,
    GreenArrow,
    Yellow,
}

impl SignalState {
    /// Only green and the green arrow let vehicles enter the intersection
    pub fn permits_entry(self) -> bool {
        matches!(self, SignalState::Green | SignalState::GreenArrow)
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalState::Red => "RED",
            SignalState::RedYellow => "RED_YELLOW",
            SignalState::Green => "GREEN",
            SignalState::GreenArrow => "GREEN_ARROW",
            SignalState::Yellow => "YELLOW",
        };
        f.write_str(name)
    }
}

/// Instruction to switch one signal group to a new indication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalCommand {
    pub group: SignalGroupId,
    pub state: SignalState,
}

impl SignalCommand {
    pub fn new(group: impl Into<SignalGroupId>, state: SignalState) -> Self {
        Self {
            group: group.into(),
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_green_indications_permit_entry() {
        assert!(SignalState::Green.permits_entry());
        assert!(SignalState::GreenArrow.permits_entry());
        assert!(!SignalState::Red.permits_entry());
        assert!(!SignalState::RedYellow.permits_entry());
        assert!(!SignalState::Yellow.permits_entry());
    }

    #[test]
    fn test_serialized_names_match_display() {
        for state in [
            SignalState::Red,
            SignalState::RedYellow,
            SignalState::Green,
            SignalState::GreenArrow,
            SignalState::Yellow,
        ] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{state}\""));
        }
    }
}
