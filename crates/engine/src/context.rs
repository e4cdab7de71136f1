//! Request context and injected approval policy.
//!
//! The engine never reads ambient framework state: every call receives a
//! [`Ctx`] carrying the caller identity, role and community scope, so the
//! manager is testable without an HTTP harness.

use crate::EngineError;

/// Role of a user inside a community.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberRole {
    Admin,
    Manager,
    Resident,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Resident => "resident",
        }
    }

    pub fn can_write(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }

    /// Who may record approval decisions.
    pub fn can_approve(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

impl TryFrom<&str> for MemberRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "resident" => Ok(Self::Resident),
            other => Err(EngineError::Validation(format!(
                "invalid member role: {other}"
            ))),
        }
    }
}

/// Caller identity and community scope for one engine call.
#[derive(Clone, Debug)]
pub struct Ctx {
    pub user_id: String,
    pub community_id: String,
    pub role: MemberRole,
}

impl Ctx {
    #[must_use]
    pub fn new(user_id: impl Into<String>, community_id: impl Into<String>, role: MemberRole) -> Self {
        Self {
            user_id: user_id.into(),
            community_id: community_id.into(),
            role,
        }
    }
}

/// Community-level approval configuration.
///
/// The threshold and the reject-dominance rule are injected, never
/// hardcoded: they are decided by each community's administration.
#[derive(Clone, Copy, Debug)]
pub struct ApprovalPolicy {
    /// Number of `aprobado` decisions required to reach `approved`.
    pub required_approvals: u32,
    /// When true a single `rechazado` decision rejects the expense.
    pub reject_dominant: bool,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            required_approvals: 1,
            reject_dominant: true,
        }
    }
}
