//! Text-valued domain enums.
//!
//! Every enum is stored as its upper-case label in a `TEXT` column guarded by
//! a `CHECK` constraint, and travels over JSON with the same label.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Declare a closed enum whose wire and storage form is a fixed label.
///
/// Generates `as_str`, `parse`, `ALL`, `Display`, `FromStr`, and the
/// `TryFrom<String>` used by `#[sqlx(try_from = "String")]` row fields.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($field:literal) {
            $( $variant:ident = $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( #[serde(rename = $label)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $( $label => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// Parse a label, reporting a field-level validation error on failure.
            pub fn parse_field(value: &str) -> Result<Self, crate::validation::FieldError> {
                Self::parse(value).ok_or_else(|| {
                    let allowed: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                    crate::validation::FieldError::new(
                        $field,
                        format!("'{value}' is not one of {}", allowed.join(", ")),
                    )
                })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse_field(s).map_err(|e| CoreError::Validation(vec![e]))
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

text_enum! {
    /// Project lifecycle state. Transitions are governed by `crate::transition`.
    ProjectStatus ("status") {
        Pending = "PENDING",
        InProgress = "IN_PROGRESS",
        Review = "REVIEW",
        Completed = "COMPLETED",
        Archived = "ARCHIVED",
        Cancelled = "CANCELLED",
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Pending
    }
}

text_enum! {
    Priority ("priority") {
        Low = "LOW",
        Medium = "MEDIUM",
        High = "HIGH",
        Urgent = "URGENT",
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

text_enum! {
    TaskStatus ("status") {
        Pending = "PENDING",
        InProgress = "IN_PROGRESS",
        Completed = "COMPLETED",
        Blocked = "BLOCKED",
        Cancelled = "CANCELLED",
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

text_enum! {
    InvoiceStatus ("status") {
        Pending = "PENDING",
        Sent = "SENT",
        Paid = "PAID",
        Overdue = "OVERDUE",
        Cancelled = "CANCELLED",
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Pending
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

text_enum! {
    /// Role of a user inside one team. At most one active `Lead` per team.
    TeamRole ("role") {
        Member = "MEMBER",
        Lead = "LEAD",
        Admin = "ADMIN",
    }
}

impl Default for TeamRole {
    fn default() -> Self {
        TeamRole::Member
    }
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

text_enum! {
    MilestoneStatus ("status") {
        Pending = "PENDING",
        InProgress = "IN_PROGRESS",
        Completed = "COMPLETED",
    }
}

impl Default for MilestoneStatus {
    fn default() -> Self {
        MilestoneStatus::Pending
    }
}
