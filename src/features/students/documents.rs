use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::AppError;

/// Fixed set of named document categories a student can upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSlot {
    Aadhar,
    Pan,
    Caste,
    Tenth,
    Inter,
    Degree,
    Income,
}

impl DocumentSlot {
    pub const ALL: [DocumentSlot; 7] = [
        DocumentSlot::Aadhar,
        DocumentSlot::Pan,
        DocumentSlot::Caste,
        DocumentSlot::Tenth,
        DocumentSlot::Inter,
        DocumentSlot::Degree,
        DocumentSlot::Income,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSlot::Aadhar => "aadhar",
            DocumentSlot::Pan => "pan",
            DocumentSlot::Caste => "caste",
            DocumentSlot::Tenth => "tenth",
            DocumentSlot::Inter => "inter",
            DocumentSlot::Degree => "degree",
            DocumentSlot::Income => "income",
        }
    }
}

impl std::fmt::Display for DocumentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentSlot {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        DocumentSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == key)
            .ok_or_else(|| AppError::Validation(format!("Invalid document key '{}'", key)))
    }
}
