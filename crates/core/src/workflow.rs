//! Approval state machine shared by BAPB and BAPP documents.
//!
//! ```text
//! waiting_pic --approve--> waiting_direksi --approve--> approved
//!      |                          |
//!      +--reject--> rejected <----+--reject
//! ```
//!
//! The two document kinds differ only in which role reviews the
//! `waiting_pic` stage; see [`WorkflowConfig`]. Everything here is pure:
//! [`plan`] decides against a snapshot and [`apply`] builds the next
//! document. Persisting the result is the engine's job.

use crate::document::{
    Actor, ApprovalLogEntry, Checkpoint, Document, DocumentKind, DocumentStatus, WorkflowStage,
};
use crate::error::WorkflowError;
use crate::roles::{ROLE_ADMIN, ROLE_DIREKSI, ROLE_PIC_GUDANG, ROLE_PIC_PEMESAN};
use crate::types::Timestamp;

/// Notes recorded on the seeded `vendor_submit` entry.
pub const INITIAL_SUBMISSION_NOTE: &str = "Initial submission";

/// Per-kind role table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub kind: DocumentKind,
    /// Reviews documents in `waiting_pic`.
    pub pic_role: &'static str,
    /// Reviews documents in `waiting_direksi`.
    pub direksi_role: &'static str,
}

const BAPB_CONFIG: WorkflowConfig = WorkflowConfig {
    kind: DocumentKind::Bapb,
    pic_role: ROLE_PIC_GUDANG,
    direksi_role: ROLE_DIREKSI,
};

const BAPP_CONFIG: WorkflowConfig = WorkflowConfig {
    kind: DocumentKind::Bapp,
    pic_role: ROLE_PIC_PEMESAN,
    direksi_role: ROLE_DIREKSI,
};

impl WorkflowConfig {
    pub fn for_kind(kind: DocumentKind) -> &'static WorkflowConfig {
        match kind {
            DocumentKind::Bapb => &BAPB_CONFIG,
            DocumentKind::Bapp => &BAPP_CONFIG,
        }
    }

    /// The non-admin role allowed to act at `stage`, if anyone is.
    pub fn reviewer_for(&self, stage: WorkflowStage) -> Option<&'static str> {
        match stage {
            WorkflowStage::WaitingPic => Some(self.pic_role),
            WorkflowStage::WaitingDireksi => Some(self.direksi_role),
            WorkflowStage::Draft | WorkflowStage::Approved | WorkflowStage::Rejected => None,
        }
    }

    /// Admin substitutes for whichever reviewer the stage needs.
    pub fn may_review(&self, stage: WorkflowStage, role: &str) -> bool {
        match self.reviewer_for(stage) {
            Some(reviewer) => role == reviewer || role == ROLE_ADMIN,
            None => false,
        }
    }
}

/// A reviewer decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Approve,
    Reject,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Approve => "approve",
            Action::Reject => "reject",
        }
    }
}

/// A validated stage change and the history entry tag it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: WorkflowStage,
    pub to: WorkflowStage,
    pub checkpoint: Checkpoint,
    pub outcome: DocumentStatus,
}

/// Decide whether `role` may perform `action` on `document` as it is now.
pub fn plan(
    config: &WorkflowConfig,
    document: &Document,
    action: Action,
    role: &str,
) -> Result<Transition, WorkflowError> {
    if document.is_archived {
        return Err(WorkflowError::Unauthorized(format!(
            "document {} is archived",
            document.id
        )));
    }

    let from = document.current_stage;
    if from.is_terminal() {
        return Err(WorkflowError::AlreadyTerminal {
            id: document.id,
            stage: from.as_str(),
        });
    }

    let (checkpoint, approved_to) = match from {
        WorkflowStage::WaitingPic => (Checkpoint::PicReview, WorkflowStage::WaitingDireksi),
        WorkflowStage::WaitingDireksi => (Checkpoint::DireksiReview, WorkflowStage::Approved),
        WorkflowStage::Draft | WorkflowStage::Approved | WorkflowStage::Rejected => {
            return Err(WorkflowError::Unauthorized(format!(
                "document {} is in stage '{from}' which has no reviewer",
                document.id
            )));
        }
    };

    if !config.may_review(from, role) {
        return Err(WorkflowError::Unauthorized(format!(
            "role '{role}' may not {} a {} document in stage '{from}'",
            action.as_str(),
            config.kind
        )));
    }

    let (to, outcome) = match action {
        Action::Approve => (approved_to, DocumentStatus::Approved),
        Action::Reject => (WorkflowStage::Rejected, DocumentStatus::Rejected),
    };

    Ok(Transition {
        from,
        to,
        checkpoint,
        outcome,
    })
}

/// Build the document that results from applying `transition`.
///
/// Appends exactly one history entry and bumps `version`; the input is
/// left untouched so a failed write can be retried or discarded.
pub fn apply(
    document: &Document,
    transition: &Transition,
    actor: &Actor,
    role: &str,
    notes: Option<String>,
    now: Timestamp,
) -> Document {
    let mut next = document.clone();
    next.current_stage = transition.to;
    next.status = transition.to.status();
    next.approval_history.push(ApprovalLogEntry {
        stage: transition.checkpoint,
        status: transition.outcome,
        actor_id: actor.id,
        actor_name: actor.name.clone(),
        actor_role: role.to_string(),
        signature_url: actor.signature_url.clone(),
        notes,
        timestamp: now,
    });
    next.updated_at = now;
    next.version = document.version + 1;
    next
}

/// History seeded on creation: submission is a self-approving checkpoint.
pub fn initial_history(submitter: &Actor, role: &str, now: Timestamp) -> Vec<ApprovalLogEntry> {
    vec![ApprovalLogEntry {
        stage: Checkpoint::VendorSubmit,
        status: DocumentStatus::Approved,
        actor_id: submitter.id,
        actor_name: submitter.name.clone(),
        actor_role: role.to_string(),
        signature_url: submitter.signature_url.clone(),
        notes: Some(INITIAL_SUBMISSION_NOTE.to_string()),
        timestamp: now,
    }]
}

/// Trim free-text notes, treating blank input as absent.
pub fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

/// Rejections must say why.
pub fn require_rejection_notes(notes: Option<String>) -> Result<String, WorkflowError> {
    normalize_notes(notes)
        .ok_or_else(|| WorkflowError::Validation("notes are required when rejecting".into()))
}
