//! Command structs for engine operations.
//!
//! These types group parameters for write operations (create/update/
//! decision/annul), keeping call sites readable and avoiding long
//! argument lists. Required fields go through `new`, optional ones
//! through builder methods.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{ApprovalDecision, ExpenseStatus};

/// Create a new expense in `draft`.
#[derive(Clone, Debug)]
pub struct CreateExpenseCmd {
    pub category_id: Uuid,
    pub fecha: NaiveDate,
    pub amount_minor: i64,
    pub glosa: String,
    pub cost_center_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub purchase_document_id: Option<Uuid>,
    pub extraordinary: bool,
}

impl CreateExpenseCmd {
    #[must_use]
    pub fn new(
        category_id: Uuid,
        fecha: NaiveDate,
        amount_minor: i64,
        glosa: impl Into<String>,
    ) -> Self {
        Self {
            category_id,
            fecha,
            amount_minor,
            glosa: glosa.into(),
            cost_center_id: None,
            provider_id: None,
            purchase_document_id: None,
            extraordinary: false,
        }
    }

    #[must_use]
    pub fn cost_center_id(mut self, id: Uuid) -> Self {
        self.cost_center_id = Some(id);
        self
    }

    #[must_use]
    pub fn provider_id(mut self, id: Uuid) -> Self {
        self.provider_id = Some(id);
        self
    }

    #[must_use]
    pub fn purchase_document_id(mut self, id: Uuid) -> Self {
        self.purchase_document_id = Some(id);
        self
    }

    #[must_use]
    pub fn extraordinary(mut self, extraordinary: bool) -> Self {
        self.extraordinary = extraordinary;
        self
    }
}

/// Patch an editable expense. `None` keeps the stored value.
#[derive(Clone, Debug)]
pub struct UpdateExpenseCmd {
    pub expense_id: Uuid,
    pub category_id: Option<Uuid>,
    pub cost_center_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub purchase_document_id: Option<Uuid>,
    pub fecha: Option<NaiveDate>,
    pub amount_minor: Option<i64>,
    pub glosa: Option<String>,
    pub extraordinary: Option<bool>,
}

impl UpdateExpenseCmd {
    #[must_use]
    pub fn new(expense_id: Uuid) -> Self {
        Self {
            expense_id,
            category_id: None,
            cost_center_id: None,
            provider_id: None,
            purchase_document_id: None,
            fecha: None,
            amount_minor: None,
            glosa: None,
            extraordinary: None,
        }
    }

    #[must_use]
    pub fn category_id(mut self, id: Uuid) -> Self {
        self.category_id = Some(id);
        self
    }

    #[must_use]
    pub fn cost_center_id(mut self, id: Uuid) -> Self {
        self.cost_center_id = Some(id);
        self
    }

    #[must_use]
    pub fn provider_id(mut self, id: Uuid) -> Self {
        self.provider_id = Some(id);
        self
    }

    #[must_use]
    pub fn purchase_document_id(mut self, id: Uuid) -> Self {
        self.purchase_document_id = Some(id);
        self
    }

    #[must_use]
    pub fn fecha(mut self, fecha: NaiveDate) -> Self {
        self.fecha = Some(fecha);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn glosa(mut self, glosa: impl Into<String>) -> Self {
        self.glosa = Some(glosa.into());
        self
    }

    #[must_use]
    pub fn extraordinary(mut self, extraordinary: bool) -> Self {
        self.extraordinary = Some(extraordinary);
        self
    }
}

/// Record one reviewer decision on a pending expense.
#[derive(Clone, Debug)]
pub struct DecisionCmd {
    pub expense_id: Uuid,
    pub decision: ApprovalDecision,
    pub observations: Option<String>,
    pub approved_amount_minor: Option<i64>,
}

impl DecisionCmd {
    #[must_use]
    pub fn new(expense_id: Uuid, decision: ApprovalDecision) -> Self {
        Self {
            expense_id,
            decision,
            observations: None,
            approved_amount_minor: None,
        }
    }

    #[must_use]
    pub fn observations(mut self, observations: impl Into<String>) -> Self {
        self.observations = Some(observations.into());
        self
    }

    #[must_use]
    pub fn approved_amount_minor(mut self, amount_minor: i64) -> Self {
        self.approved_amount_minor = Some(amount_minor);
        self
    }
}

/// Annul an approved expense, with a mandatory reason.
#[derive(Clone, Debug)]
pub struct AnnulExpenseCmd {
    pub expense_id: Uuid,
    pub reason: String,
}

impl AnnulExpenseCmd {
    #[must_use]
    pub fn new(expense_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            expense_id,
            reason: reason.into(),
        }
    }
}

/// Filter for expense listings.
#[derive(Clone, Debug)]
pub struct ExpenseListFilter {
    pub status: Option<ExpenseStatus>,
    pub category_id: Option<Uuid>,
    pub extraordinary: Option<bool>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: u64,
    pub offset: u64,
}

impl Default for ExpenseListFilter {
    fn default() -> Self {
        Self {
            status: None,
            category_id: None,
            extraordinary: None,
            from: None,
            to: None,
            limit: 50,
            offset: 0,
        }
    }
}
