use std::fmt;
use serde::{Deserialize, Serialize};

/// Blood pressure category based on measurements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BpCategory {
    /// Normal blood pressure (systolic < 120 and diastolic < 80)
    Normal,

    /// Elevated blood pressure (systolic 120-129 and diastolic < 80)
    Elevated,

    /// Stage 1 Hypertension (systolic 130-139 or diastolic 80-89)
    Hypertension1,

    /// Stage 2 Hypertension (systolic ≥ 140 or diastolic ≥ 90)
    Hypertension2,

    /// Hypertensive crisis (systolic > 180 and/or diastolic > 120)
    HypertensiveCrisis,
}

/// How much risk a category carries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
    Severe,
}

impl RiskLevel {
    /// Human-readable label
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very high",
            RiskLevel::Severe => "severe",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Presentation view of a category
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CategoryDetails {
    pub name: &'static str,
    pub description: &'static str,
    pub risk: RiskLevel,
}

impl BpCategory {
    /// Every category, from least to most severe
    pub const ALL: [BpCategory; 5] = [
        BpCategory::Normal,
        BpCategory::Elevated,
        BpCategory::Hypertension1,
        BpCategory::Hypertension2,
        BpCategory::HypertensiveCrisis,
    ];

    /// Display name, also the label cached on classified readings
    pub const fn name(self) -> &'static str {
        match self {
            BpCategory::Normal => "Normal",
            BpCategory::Elevated => "Elevated",
            BpCategory::Hypertension1 => "Hypertension Stage 1",
            BpCategory::Hypertension2 => "Hypertension Stage 2",
            BpCategory::HypertensiveCrisis => "Hypertensive Crisis",
        }
    }

    /// Short description of what the category means
    pub const fn description(self) -> &'static str {
        match self {
            BpCategory::Normal => "Blood pressure in normal range",
            BpCategory::Elevated => "Blood pressure is slightly high",
            BpCategory::Hypertension1 => "Blood pressure is high",
            BpCategory::Hypertension2 => "Blood pressure is very high",
            BpCategory::HypertensiveCrisis => "Seek emergency medical attention",
        }
    }

    /// Risk tier of the category
    pub const fn risk(self) -> RiskLevel {
        match self {
            BpCategory::Normal => RiskLevel::Low,
            BpCategory::Elevated => RiskLevel::Moderate,
            BpCategory::Hypertension1 => RiskLevel::High,
            BpCategory::Hypertension2 => RiskLevel::VeryHigh,
            BpCategory::HypertensiveCrisis => RiskLevel::Severe,
        }
    }

    /// Name, description and risk together
    pub const fn details(self) -> CategoryDetails {
        CategoryDetails {
            name: self.name(),
            description: self.description(),
            risk: self.risk(),
        }
    }

    /// Look a category up by its display name
    pub fn from_name(name: &str) -> Option<Self> {
        BpCategory::ALL.iter().copied().find(|category| category.name() == name)
    }
}

impl fmt::Display for BpCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
