use sea_orm::DatabaseConnection;

use crate::{ApprovalPolicy, Ctx, EngineError, ResultEngine};

mod access;
mod catalog;
mod communities;
mod emissions;
mod expenses;
mod numbering;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The expense lifecycle manager.
///
/// Stateless over a [`DatabaseConnection`]; every operation takes an
/// explicit [`Ctx`] and runs in its own DB transaction.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    policy: ApprovalPolicy,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The approval policy this engine was built with.
    pub fn policy(&self) -> ApprovalPolicy {
        self.policy
    }
}

fn require_write_role(ctx: &Ctx) -> ResultEngine<()> {
    if !ctx.role.can_write() {
        return Err(EngineError::Forbidden(format!(
            "role {} cannot modify expenses",
            ctx.role.as_str()
        )));
    }
    Ok(())
}

fn require_approve_role(ctx: &Ctx) -> ResultEngine<()> {
    if !ctx.role.can_approve() {
        return Err(EngineError::Forbidden(format!(
            "role {} cannot record approval decisions",
            ctx.role.as_str()
        )));
    }
    Ok(())
}

fn normalize_required_text(
    value: &str,
    label: &str,
    min_len: usize,
    max_len: usize,
) -> ResultEngine<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min_len || len > max_len {
        return Err(EngineError::Validation(format!(
            "{label} must be {min_len}-{max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn validate_amount(amount_minor: i64) -> ResultEngine<i64> {
    if amount_minor <= 0 {
        return Err(EngineError::Validation(
            "amount_minor must be > 0".to_string(),
        ));
    }
    Ok(amount_minor)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    policy: ApprovalPolicy,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Inject the community approval policy (threshold, reject dominance).
    pub fn policy(mut self, policy: ApprovalPolicy) -> EngineBuilder {
        self.policy = policy;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        if self.policy.required_approvals == 0 {
            return Err(EngineError::Validation(
                "required_approvals must be >= 1".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            policy: self.policy,
        })
    }
}
