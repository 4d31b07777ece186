//! Enums - Enumerated types stored as TEXT columns

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    BahanBaku,
    Operasional,
    Gaji,
    Pemasaran,
    Transportasi,
    Lainnya,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::BahanBaku,
        ExpenseCategory::Operasional,
        ExpenseCategory::Gaji,
        ExpenseCategory::Pemasaran,
        ExpenseCategory::Transportasi,
        ExpenseCategory::Lainnya,
    ];

    /// Human readable label used in exports and prompts
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::BahanBaku => "Bahan Baku",
            ExpenseCategory::Operasional => "Operasional",
            ExpenseCategory::Gaji => "Gaji",
            ExpenseCategory::Pemasaran => "Pemasaran",
            ExpenseCategory::Transportasi => "Transportasi",
            ExpenseCategory::Lainnya => "Lainnya",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Admin,
    Comment,
    System,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Active,
    Ended,
}
