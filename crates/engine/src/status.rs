//! Expense lifecycle status and approval decision codes.
//!
//! The whole transition graph lives in [`ExpenseStatus::can_transition_to`];
//! no operation checks statuses with ad hoc conditionals.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Lifecycle status of an expense.
///
/// The graph is `draft → pending → {approved, rejected}` and
/// `approved → {paid, annulled}`. `rejected`, `paid` and `annulled` are
/// terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    Paid,
    Annulled,
}

impl ExpenseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
            Self::Annulled => "annulled",
        }
    }

    /// Single source of truth for the lifecycle graph.
    pub fn can_transition_to(self, next: ExpenseStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Pending)
                | (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Approved, Self::Paid)
                | (Self::Approved, Self::Annulled)
        )
    }

    /// Attributes may only change while the expense is in review.
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Draft | Self::Pending)
    }

    /// Only never-submitted expenses may be removed.
    pub fn is_deletable(self) -> bool {
        matches!(self, Self::Draft)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Paid | Self::Annulled)
    }
}

impl TryFrom<&str> for ExpenseStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "paid" => Ok(Self::Paid),
            "annulled" => Ok(Self::Annulled),
            other => Err(EngineError::Validation(format!(
                "invalid expense status: {other}"
            ))),
        }
    }
}

/// Outcome recorded by a single reviewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Aprobado,
    Rechazado,
}

impl ApprovalDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aprobado => "aprobado",
            Self::Rechazado => "rechazado",
        }
    }
}

impl TryFrom<&str> for ApprovalDecision {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "aprobado" => Ok(Self::Aprobado),
            "rechazado" => Ok(Self::Rechazado),
            other => Err(EngineError::Validation(format!(
                "invalid approval decision: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ExpenseStatus::*;

    const ALL: [super::ExpenseStatus; 6] = [Draft, Pending, Approved, Rejected, Paid, Annulled];

    #[test]
    fn transition_graph_is_exact() {
        let allowed = [
            (Draft, Pending),
            (Pending, Approved),
            (Pending, Rejected),
            (Approved, Paid),
            (Approved, Annulled),
        ];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{} -> {}",
                    from.as_str(),
                    to.as_str()
                );
            }
        }
    }

    #[test]
    fn draft_cannot_skip_to_approved() {
        assert!(!Draft.can_transition_to(Approved));
    }

    #[test]
    fn terminal_states_allow_nothing() {
        for from in [Rejected, Paid, Annulled] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn codes_round_trip() {
        for status in ALL {
            assert_eq!(
                super::ExpenseStatus::try_from(status.as_str()).unwrap(),
                status
            );
        }
        assert!(super::ExpenseStatus::try_from("void").is_err());
    }
}
