use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod membership {
    use super::*;

    /// Role of a user inside a community.
    ///
    /// The server treats roles as:
    /// - `admin`: full access and can manage members.
    /// - `manager`: can register expenses and record decisions.
    /// - `resident`: read-only.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MemberRole {
        Admin,
        Manager,
        Resident,
    }

    impl MemberRole {
        /// Returns the canonical role string used by the engine/database.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Admin => "admin",
                Self::Manager => "manager",
                Self::Resident => "resident",
            }
        }
    }

    /// Request body for adding/updating a member.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberUpsert {
        pub username: String,
        pub role: MemberRole,
    }

    /// Response body for listing members.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }

    /// A member with their role.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub username: String,
        pub role: MemberRole,
    }
}

pub mod community {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CommunityNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CommunityView {
        pub id: String,
        pub name: String,
        pub role: membership::MemberRole,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CommunitiesResponse {
        pub communities: Vec<CommunityView>,
    }
}

pub mod catalog {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CostCenterNew {
        pub name: String,
        pub code: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProviderNew {
        pub name: String,
        pub tax_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseDocumentNew {
        pub provider_id: Option<Uuid>,
        pub doc_type: String,
        pub folio: String,
        /// ISO date (`YYYY-MM-DD`).
        pub issued_at: NaiveDate,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Created {
        pub id: Uuid,
    }
}

pub mod expense {
    use super::*;

    /// Lifecycle status of an expense.
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

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub category_id: Uuid,
        pub cost_center_id: Option<Uuid>,
        pub provider_id: Option<Uuid>,
        pub purchase_document_id: Option<Uuid>,
        /// ISO date (`YYYY-MM-DD`). Also selects the correlative year.
        pub fecha: NaiveDate,
        /// Amount in minor currency units. Must be > 0.
        pub amount_minor: i64,
        pub glosa: String,
        pub extraordinary: Option<bool>,
    }

    /// Partial update. Absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub category_id: Option<Uuid>,
        pub cost_center_id: Option<Uuid>,
        pub provider_id: Option<Uuid>,
        pub purchase_document_id: Option<Uuid>,
        pub fecha: Option<NaiveDate>,
        pub amount_minor: Option<i64>,
        pub glosa: Option<String>,
        pub extraordinary: Option<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseList {
        pub status: Option<ExpenseStatus>,
        pub category_id: Option<Uuid>,
        pub extraordinary: Option<bool>,
        pub fecha_from: Option<NaiveDate>,
        pub fecha_to: Option<NaiveDate>,
        pub limit: Option<u64>,
        pub offset: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        /// Correlative number, e.g. `G2026-0001`.
        pub numero: String,
        pub category_id: Uuid,
        pub cost_center_id: Option<Uuid>,
        pub provider_id: Option<Uuid>,
        pub purchase_document_id: Option<Uuid>,
        pub fecha: NaiveDate,
        pub amount_minor: i64,
        pub glosa: String,
        pub extraordinary: bool,
        pub status: ExpenseStatus,
        pub created_by: String,
        pub approved_by: Option<String>,
        pub annul_reason: Option<String>,
        pub version: i64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnnulNew {
        pub reason: String,
    }
}

pub mod approval {
    use super::*;

    /// A reviewer's verdict on a pending expense.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ApprovalDecision {
        Aprobado,
        Rechazado,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DecisionNew {
        pub decision: ApprovalDecision,
        pub observations: Option<String>,
        pub approved_amount_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ApprovalView {
        pub id: Uuid,
        pub decision: ApprovalDecision,
        pub observations: Option<String>,
        pub approved_amount_minor: Option<i64>,
        pub decided_by: String,
        pub decided_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ApprovalsResponse {
        pub approvals: Vec<ApprovalView>,
    }
}

pub mod history {
    use super::*;

    /// One recorded field change on an expense.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryView {
        pub id: Uuid,
        pub field: String,
        pub old_value: Option<String>,
        pub new_value: Option<String>,
        pub changed_by: String,
        pub changed_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryResponse {
        pub entries: Vec<HistoryView>,
    }
}

pub mod emission {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmissionNew {
        /// Billing period, e.g. `2026-03`.
        pub period: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmissionView {
        pub id: Uuid,
        pub period: String,
        pub status: String,
        pub closed_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmissionsResponse {
        pub emissions: Vec<EmissionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmissionItemNew {
        pub expense_id: Uuid,
    }
}
