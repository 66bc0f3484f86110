use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Active,   // active
    Inactive, // inactive
    OnLeave,  // on_leave
}

impl WorkerStatus {
    pub const ALL: [WorkerStatus; 3] = [
        WorkerStatus::Active,
        WorkerStatus::Inactive,
        WorkerStatus::OnLeave,
    ];

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            WorkerStatus::Active => "active",
            WorkerStatus::Inactive => "inactive",
            WorkerStatus::OnLeave => "on_leave",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(WorkerStatus::Active),
            "inactive" => Some(WorkerStatus::Inactive),
            "on_leave" => Some(WorkerStatus::OnLeave),
            _ => None,
        }
    }

    /// Helper: parse user input, accepting "on-leave" and any case.
    pub fn from_input(s: &str) -> Option<Self> {
        Self::from_db_str(&s.trim().to_lowercase().replace('-', "_"))
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkerStatus::Active => "Active",
            WorkerStatus::Inactive => "Inactive",
            WorkerStatus::OnLeave => "On leave",
        }
    }

    pub fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|s| s.to_db_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
