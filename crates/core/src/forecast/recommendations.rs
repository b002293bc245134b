//! Advisory text attached to a forecast summary

use crate::core_types::hazard::HazardRiskLevel;
use crate::forecast::threat::{ThreatArea, ThreatLevel};

/// Advice when the forecast ran on defaults
pub const LIMITED_DATA_RECOMMENDATIONS: [&str; 3] = [
    "Monitor official fire and weather updates for the area",
    "Review evacuation routes and household emergency plans",
    "Forecast uses conservative defaults because live hazard or weather data is unavailable",
];

/// Recommendations for the peak forecast level and the most exposed directions
#[must_use]
pub fn recommendations_for(peak: HazardRiskLevel, threats: &[ThreatArea]) -> Vec<String> {
    let mut out: Vec<String> = match peak {
        HazardRiskLevel::Critical => vec![
            "Prepare for immediate evacuation of downwind communities".into(),
            "Pre-position suppression resources ahead of the head fire".into(),
            "Issue public warnings across all threatened directions".into(),
        ],
        HazardRiskLevel::High => vec![
            "Place downwind communities on evacuation standby".into(),
            "Increase aerial and ground monitoring of the fire perimeter".into(),
        ],
        HazardRiskLevel::Moderate => vec![
            "Maintain readiness of local suppression crews".into(),
            "Advise residents to review evacuation plans".into(),
        ],
        HazardRiskLevel::Low => vec!["Continue routine monitoring".into()],
    };

    let mut exposed: Vec<&ThreatArea> = threats
        .iter()
        .filter(|t| t.threat_level >= ThreatLevel::High)
        .collect();
    exposed.sort_by(|a, b| a.eta_hours.total_cmp(&b.eta_hours));
    if let Some(first) = exposed.first() {
        let directions: Vec<&str> = exposed.iter().map(|t| t.direction.label()).collect();
        out.push(format!(
            "Prioritize warnings to the {} (arrival possible within {:.0} hours)",
            directions.join(", "),
            first.eta_hours
        ));
    }
    out
}
