//! User profile and credit transaction data models.
//!
//! Each credit movement (generation debit, purchase) is recorded as a
//! transaction alongside the balance update.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Credits granted to a newly created profile.
pub const STARTING_CREDITS: u32 = 3;

/// A user profile as stored in the profile store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UserProfile {
    /// Account email, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Remaining credit balance. Never negative.
    pub credits: u32,
}

impl UserProfile {
    /// A fresh profile with the starting credit grant.
    pub fn new(email: Option<String>) -> Self {
        Self {
            email,
            credits: STARTING_CREDITS,
        }
    }
}

/// What a credit movement was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CreditKind {
    /// One successful content generation (-1)
    Generation,
    /// Credit pack purchase (+N)
    Purchase,
    /// Manual adjustment (signup grant, support correction)
    Grant,
}

impl CreditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generation => "generation",
            Self::Purchase => "purchase",
            Self::Grant => "grant",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "generation" => Some(Self::Generation),
            "purchase" => Some(Self::Purchase),
            "grant" => Some(Self::Grant),
            _ => None,
        }
    }

    /// Whether this kind subtracts from the balance.
    pub fn is_debit(&self) -> bool {
        matches!(self, Self::Generation)
    }
}

/// A single credit movement record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreditTransaction {
    /// Unique identifier for this transaction (UUID)
    pub id: String,
    /// User whose balance moved
    pub user_id: String,
    /// What the movement was for
    pub kind: CreditKind,
    /// Number of credits moved (always positive; `kind` carries direction)
    pub amount: u32,
    /// Balance after this transaction
    pub balance_after: u32,
    /// Human-readable description
    pub description: String,
    /// When the transaction occurred
    pub created_at: DateTime<Utc>,
}

impl CreditTransaction {
    /// Create a new credit transaction stamped with the current time.
    pub fn new(
        user_id: impl Into<String>,
        kind: CreditKind,
        amount: u32,
        balance_after: u32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            kind,
            amount,
            balance_after,
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}
