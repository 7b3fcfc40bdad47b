//! Status vocabularies and transition rules for the domain entities.
//!
//! Statuses are stored as lowercase text columns with CHECK constraints;
//! the constants here must match the migrations. Transition checks live
//! next to the vocabularies so repositories and handlers share one rule.

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

pub mod application {
    pub const PENDING: &str = "pending";
    pub const UNDER_REVIEW: &str = "under_review";
    pub const APPROVED: &str = "approved";
    pub const REJECTED: &str = "rejected";

    pub const ALL: &[&str] = &[PENDING, UNDER_REVIEW, APPROVED, REJECTED];

    pub fn is_valid(status: &str) -> bool {
        ALL.contains(&status)
    }

    /// Applications move forward only; approved/rejected are terminal.
    pub fn can_transition(from: &str, to: &str) -> bool {
        matches!(
            (from, to),
            (PENDING, UNDER_REVIEW)
                | (PENDING, REJECTED)
                | (UNDER_REVIEW, APPROVED)
                | (UNDER_REVIEW, REJECTED)
        )
    }
}

// ---------------------------------------------------------------------------
// Plots
// ---------------------------------------------------------------------------

pub mod plot {
    pub const AVAILABLE: &str = "available";
    pub const RESERVED: &str = "reserved";
    pub const BOOKED: &str = "booked";
    pub const POSSESSED: &str = "possessed";

    pub const ALL: &[&str] = &[AVAILABLE, RESERVED, BOOKED, POSSESSED];

    pub fn is_valid(status: &str) -> bool {
        ALL.contains(&status)
    }
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

pub mod member {
    pub const ACTIVE: &str = "active";
    pub const SUSPENDED: &str = "suspended";
    pub const CANCELLED: &str = "cancelled";

    pub const ALL: &[&str] = &[ACTIVE, SUSPENDED, CANCELLED];

    pub fn is_valid(status: &str) -> bool {
        ALL.contains(&status)
    }
}

// ---------------------------------------------------------------------------
// Bills
// ---------------------------------------------------------------------------

pub mod bill {
    pub const UNPAID: &str = "unpaid";
    pub const PAID: &str = "paid";
    pub const WAIVED: &str = "waived";

    pub const ALL: &[&str] = &[UNPAID, PAID, WAIVED];

    pub const TYPES: &[&str] = &[
        "maintenance",
        "water",
        "electricity",
        "fine",
        "transfer_fee",
    ];

    pub fn is_valid(status: &str) -> bool {
        ALL.contains(&status)
    }

    pub fn is_valid_type(bill_type: &str) -> bool {
        TYPES.contains(&bill_type)
    }
}

// ---------------------------------------------------------------------------
// Installments
// ---------------------------------------------------------------------------

pub mod installment {
    pub const PENDING: &str = "pending";
    pub const PARTIAL: &str = "partial";
    pub const PAID: &str = "paid";

    pub const ALL: &[&str] = &[PENDING, PARTIAL, PAID];

    pub fn is_valid(status: &str) -> bool {
        ALL.contains(&status)
    }
}

// ---------------------------------------------------------------------------
// Possessions
// ---------------------------------------------------------------------------

pub mod possession {
    pub const REQUESTED: &str = "requested";
    pub const DOCUMENTS_VERIFIED: &str = "documents_verified";
    pub const DUES_CLEARED: &str = "dues_cleared";
    pub const SCHEDULED: &str = "scheduled";
    pub const HANDED_OVER: &str = "handed_over";
    pub const REJECTED: &str = "rejected";

    pub const ALL: &[&str] = &[
        REQUESTED,
        DOCUMENTS_VERIFIED,
        DUES_CLEARED,
        SCHEDULED,
        HANDED_OVER,
        REJECTED,
    ];

    /// Workflow order of the forward path.
    const FORWARD: &[&str] = &[
        REQUESTED,
        DOCUMENTS_VERIFIED,
        DUES_CLEARED,
        SCHEDULED,
        HANDED_OVER,
    ];

    pub fn is_valid(status: &str) -> bool {
        ALL.contains(&status)
    }

    /// The handover workflow only moves one step forward at a time.
    /// Any non-terminal state may move to `rejected`.
    pub fn can_transition(from: &str, to: &str) -> bool {
        if from == HANDED_OVER || from == REJECTED {
            return false;
        }
        if to == REJECTED {
            return true;
        }
        let from_idx = FORWARD.iter().position(|s| *s == from);
        let to_idx = FORWARD.iter().position(|s| *s == to);
        match (from_idx, to_idx) {
            (Some(f), Some(t)) => t == f + 1,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaulters
// ---------------------------------------------------------------------------

pub mod defaulter {
    pub const NOTICE_1: &str = "notice_1";
    pub const NOTICE_2: &str = "notice_2";
    pub const FINAL_NOTICE: &str = "final_notice";
    pub const LEGAL: &str = "legal";

    pub const ALL: &[&str] = &[NOTICE_1, NOTICE_2, FINAL_NOTICE, LEGAL];

    pub fn is_valid(stage: &str) -> bool {
        ALL.contains(&stage)
    }

    /// Rank of a stage in the escalation ladder; unknown stages rank lowest.
    pub fn stage_rank(stage: &str) -> usize {
        ALL.iter().position(|s| *s == stage).map_or(0, |i| i + 1)
    }

    /// Escalation only moves up the ladder, one or more steps.
    pub fn can_escalate(from: &str, to: &str) -> bool {
        is_valid(to) && stage_rank(to) > stage_rank(from)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
