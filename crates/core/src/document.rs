//! Berita Acara document model.
//!
//! Both report kinds (BAPB goods-receipt and BAPP work-completion) share
//! this shape. Kind-specific data lives in the opaque `payload`, which the
//! approval workflow never inspects.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Defines a string-backed enum whose wire/database form is the
/// snake_case name of each variant.
macro_rules! define_str_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored string form.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $val),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($val => Ok($name::$variant),)+
                    other => Err(format!(
                        "Invalid {} '{other}'. Must be one of: {}",
                        stringify!($name),
                        [$($val),+].join(", ")
                    )),
                }
            }
        }
    };
}

define_str_enum! {
    /// Which of the two report types a document is.
    DocumentKind {
        /// Berita Acara Penerimaan Barang (goods receipt).
        Bapb = "bapb",
        /// Berita Acara Penyelesaian Pekerjaan (work completion).
        Bapp = "bapp",
    }
}

define_str_enum! {
    /// Position of a document in the approval chain.
    WorkflowStage {
        Draft = "draft",
        WaitingPic = "waiting_pic",
        WaitingDireksi = "waiting_direksi",
        Approved = "approved",
        Rejected = "rejected",
    }
}

define_str_enum! {
    /// Coarse document status, always derived from [`WorkflowStage`].
    DocumentStatus {
        Pending = "pending",
        Approved = "approved",
        Rejected = "rejected",
    }
}

define_str_enum! {
    /// Checkpoint recorded by an [`ApprovalLogEntry`].
    Checkpoint {
        VendorSubmit = "vendor_submit",
        PicReview = "pic_review",
        DireksiReview = "direksi_review",
    }
}

impl WorkflowStage {
    /// The status implied by this stage.
    pub fn status(self) -> DocumentStatus {
        match self {
            WorkflowStage::Approved => DocumentStatus::Approved,
            WorkflowStage::Rejected => DocumentStatus::Rejected,
            WorkflowStage::Draft | WorkflowStage::WaitingPic | WorkflowStage::WaitingDireksi => {
                DocumentStatus::Pending
            }
        }
    }

    /// Approved and rejected documents accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowStage::Approved | WorkflowStage::Rejected)
    }
}

/// One append-only entry in a document's approval history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalLogEntry {
    pub stage: Checkpoint,
    pub status: DocumentStatus,
    pub actor_id: DbId,
    pub actor_name: String,
    /// Role verified by the role provider when the action was taken.
    pub actor_role: String,
    pub signature_url: Option<String>,
    pub notes: Option<String>,
    pub timestamp: Timestamp,
}

/// The principal performing an operation.
///
/// Carries no role. The engine resolves the role from the
/// actor id on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: DbId,
    pub name: String,
    pub signature_url: Option<String>,
}

impl Actor {
    pub fn new(id: DbId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            signature_url: None,
        }
    }

    pub fn with_signature(mut self, url: impl Into<String>) -> Self {
        self.signature_url = Some(url.into());
        self
    }
}

/// A persisted Berita Acara document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DbId,
    pub kind: DocumentKind,
    pub vendor_id: DbId,
    pub status: DocumentStatus,
    pub current_stage: WorkflowStage,
    pub approval_history: Vec<ApprovalLogEntry>,
    /// Kind-specific body (items, work details, notes, attachment URLs).
    pub payload: serde_json::Value,
    pub is_archived: bool,
    pub archived_at: Option<Timestamp>,
    pub archived_by: Option<DbId>,
    /// Optimistic-concurrency token, bumped on every write.
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Everything needed to insert a new document; the repository assigns
/// `id`, `version` and the creation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDocumentRecord {
    pub kind: DocumentKind,
    pub vendor_id: DbId,
    pub current_stage: WorkflowStage,
    pub approval_history: Vec<ApprovalLogEntry>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_derived_from_stage() {
        assert_eq!(WorkflowStage::Draft.status(), DocumentStatus::Pending);
        assert_eq!(WorkflowStage::WaitingPic.status(), DocumentStatus::Pending);
        assert_eq!(WorkflowStage::WaitingDireksi.status(), DocumentStatus::Pending);
        assert_eq!(WorkflowStage::Approved.status(), DocumentStatus::Approved);
        assert_eq!(WorkflowStage::Rejected.status(), DocumentStatus::Rejected);
    }

    #[test]
    fn only_approved_and_rejected_are_terminal() {
        let terminal: Vec<_> = WorkflowStage::ALL
            .iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![&WorkflowStage::Approved, &WorkflowStage::Rejected]);
    }

    #[test]
    fn stage_parses_from_stored_string() {
        assert_eq!(
            "waiting_direksi".parse::<WorkflowStage>(),
            Ok(WorkflowStage::WaitingDireksi)
        );
        let err = "waiting".parse::<WorkflowStage>().unwrap_err();
        assert!(err.contains("Invalid WorkflowStage"));
        assert!(err.contains("waiting_pic"));
    }

    #[test]
    fn serde_form_matches_as_str() {
        for kind in DocumentKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
        }
        for checkpoint in Checkpoint::ALL {
            let json = serde_json::to_value(checkpoint).unwrap();
            assert_eq!(json, checkpoint.as_str());
        }
    }

    #[test]
    fn actor_builder_sets_signature() {
        let actor = Actor::new(7, "Sari").with_signature("/uploads/sig/a.png");
        assert_eq!(actor.signature_url.as_deref(), Some("/uploads/sig/a.png"));
    }
}
