//! The seven fixed steps of a vehicle check-in

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a check-in step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKey {
    Vehicle,
    Exterior,
    Interior,
    Engine,
    Wheels,
    Warnings,
    Final,
}

impl StepKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKey::Vehicle => "vehicle",
            StepKey::Exterior => "exterior",
            StepKey::Interior => "interior",
            StepKey::Engine => "engine",
            StepKey::Wheels => "wheels",
            StepKey::Warnings => "warnings",
            StepKey::Final => "final",
        }
    }

    /// Definition of this step
    pub fn step(&self) -> &'static Step {
        let index = STEPS
            .iter()
            .position(|step| step.key == *self)
            .unwrap_or(0);
        &STEPS[index]
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A step: its title and the inspection checklist shown with it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub key: StepKey,
    pub title: &'static str,
    pub checklist: &'static [&'static str],
}

impl Step {
    /// `item_key` of a checklist entry in `checkin_items`
    pub fn item_key(&self, index: usize) -> String {
        format!("{}.{}", self.key, index)
    }
}

pub const STEPS: [Step; 7] = [
    Step {
        key: StepKey::Vehicle,
        title: "Vehicle details",
        checklist: &[],
    },
    Step {
        key: StepKey::Exterior,
        title: "Exterior condition",
        checklist: &[
            "Check for scratches, dents, or paint damage",
            "Inspect bumpers and body panels",
            "Examine lights (headlights, taillights, indicators)",
            "Look for rust or corrosion",
            "Check mirrors and glass condition",
            "Document any existing damage",
        ],
    },
    Step {
        key: StepKey::Interior,
        title: "Interior condition",
        checklist: &[
            "Test all seats and adjustments",
            "Check dashboard and instrument cluster",
            "Verify air conditioning/heating works",
            "Test radio, infotainment system",
            "Inspect upholstery for tears or stains",
            "Check seatbelts and safety features",
        ],
    },
    Step {
        key: StepKey::Engine,
        title: "Engine bay",
        checklist: &[
            "Check fluid levels (oil, coolant, brake fluid)",
            "Inspect belts and hoses for wear",
            "Look for leaks or corrosion",
            "Check battery terminals and condition",
            "Examine air filter condition",
            "Note any unusual sounds or smells",
        ],
    },
    Step {
        key: StepKey::Wheels,
        title: "Wheels & Tires",
        checklist: &[
            "Check tire tread depth and wear patterns",
            "Inspect for cuts, bulges, or damage",
            "Verify proper tire pressure",
            "Examine wheel rims for damage",
            "Check spare tire condition",
            "Look for any signs of alignment issues",
        ],
    },
    Step {
        key: StepKey::Warnings,
        title: "Dash/Warning lights",
        checklist: &[
            "Check engine light status",
            "Verify all dashboard lights function",
            "Note any active warning lights",
            "Test hazard lights and indicators",
            "Check fuel gauge and other gauges",
            "Document any error codes or messages",
        ],
    },
    Step {
        key: StepKey::Final,
        title: "Final notes",
        checklist: &[
            "Overall vehicle condition assessment",
            "Any additional concerns or observations",
            "Customer-specific requests or notes",
            "Recommended maintenance or repairs",
            "Schedule follow-up if needed",
        ],
    },
];
