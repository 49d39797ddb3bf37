use std::borrow::Cow;

use crate::entities::category::BpCategory;

/// Categorize blood pressure based on measurements.
///
/// The thresholds overlap, so the order of the checks decides the result:
/// the most severe matching category wins.
pub fn classify(systolic: i32, diastolic: i32) -> BpCategory {
    if systolic > 180 || diastolic > 120 {
        BpCategory::HypertensiveCrisis
    } else if systolic >= 140 || diastolic >= 90 {
        BpCategory::Hypertension2
    } else if systolic >= 130 || diastolic >= 80 {
        BpCategory::Hypertension1
    } else if systolic >= 120 && diastolic < 80 {
        BpCategory::Elevated
    } else {
        BpCategory::Normal
    }
}

/// Health recommendation for a category
pub fn recommend(category: BpCategory) -> &'static str {
    match category {
        BpCategory::Normal => {
            "Maintain a healthy lifestyle with regular exercise and balanced diet."
        }
        BpCategory::Elevated => {
            "Consider lifestyle changes including reduced sodium intake and regular exercise. Monitor BP regularly."
        }
        BpCategory::Hypertension1 => {
            "Consult your healthcare provider. Lifestyle changes and possibly medication may be needed."
        }
        BpCategory::Hypertension2 => {
            "Consult your healthcare provider promptly. Medication is likely needed along with lifestyle changes."
        }
        BpCategory::HypertensiveCrisis => "SEEK EMERGENCY MEDICAL ATTENTION IMMEDIATELY!",
    }
}

/// Health recommendation for a category label, such as the one cached on a
/// stored reading. Unknown labels get a generic message instead of an error.
pub fn recommend_for_name(name: &str) -> Cow<'static, str> {
    match BpCategory::from_name(name) {
        Some(category) => Cow::Borrowed(recommend(category)),
        None => Cow::Owned(format!(
            "Unknown category: {}. Please consult your healthcare provider.",
            name
        )),
    }
}
