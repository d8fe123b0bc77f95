//! JSON export of a check-in, also used as the draft format of the CLI

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::export;
use crate::intake::steps::StepKey;
use crate::intake::wizard::{CheckinWizard, VehicleForm};
use crate::media::{MediaList, MediaRef};

/// One checklist entry in an export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistExport {
    pub item: String,
    #[serde(default)]
    pub media: Vec<MediaRef>,
    #[serde(default)]
    pub service_needed: bool,
    #[serde(default)]
    pub notes: String,
}

/// One step in an export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepExport {
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub media: Vec<MediaRef>,
    #[serde(default)]
    pub checklist: Vec<ChecklistExport>,
}

/// Exported check-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinExport {
    pub vehicle: VehicleForm,
    #[serde(default)]
    pub steps: BTreeMap<StepKey, StepExport>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub check_in_id: String,
}

impl CheckinExport {
    /// `car-checkin-{plate}-{date}.json`
    pub fn file_name(&self) -> String {
        export::file_name("car-checkin", &self.vehicle.plate, self.timestamp.date_naive())
    }
}

impl CheckinWizard {
    /// Snapshot of the wizard for download
    pub fn export(&self) -> CheckinExport {
        let now = Utc::now();
        let steps = self
            .steps()
            .iter()
            .map(|state| {
                let checklist = state
                    .step()
                    .checklist
                    .iter()
                    .zip(state.items.iter())
                    .map(|(label, entry)| ChecklistExport {
                        item: label.to_string(),
                        media: entry.media.refs(),
                        service_needed: entry.service_needed,
                        notes: entry.notes.clone(),
                    })
                    .collect();
                let step = StepExport {
                    notes: state.notes.clone(),
                    media: state.media.refs(),
                    checklist,
                };
                (state.key, step)
            })
            .collect();

        CheckinExport {
            vehicle: self.vehicle.clone(),
            steps,
            timestamp: now,
            check_in_id: format!("checkin-{}", now.timestamp_millis()),
        }
    }

    /// Restore a wizard from an export or a hand-written draft.
    ///
    /// Checklist entries are matched by position; extra entries are an error.
    pub fn from_export(draft: &CheckinExport) -> Result<Self> {
        let mut wizard = CheckinWizard::new();
        wizard.vehicle = draft.vehicle.clone();

        for (key, step) in &draft.steps {
            let state = wizard.step_mut(*key);
            state.notes = step.notes.clone();
            state.media = MediaList::from_refs(&step.media)?;

            if step.checklist.len() > state.items.len() {
                return Err(Error::validation(format!(
                    "step {} has {} checklist items, draft has {}",
                    key,
                    state.items.len(),
                    step.checklist.len()
                )));
            }
            for (entry, exported) in state.items.iter_mut().zip(step.checklist.iter()) {
                entry.media = MediaList::from_refs(&exported.media)?;
                entry.service_needed = exported.service_needed;
                entry.notes = exported.notes.clone();
            }
        }
        Ok(wizard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaItem;

    fn wizard() -> CheckinWizard {
        let mut wizard = CheckinWizard::new();
        wizard.vehicle.plate = "AA-00-BB".to_string();
        wizard.vehicle.customer_name = "Ana".to_string();
        wizard.set_notes(StepKey::Final, "Customer waits on site");
        wizard.add_media(
            StepKey::Vehicle,
            MediaItem::from_bytes("walkaround.mp4", vec![0, 1, 2]).unwrap(),
        );
        wizard
            .add_item_media(StepKey::Wheels, 1, MediaItem::from_bytes("bulge.jpg", vec![9]).unwrap())
            .unwrap();
        wizard.set_service_needed(StepKey::Wheels, 1, true).unwrap();
        wizard
    }

    #[test]
    fn export_shape() {
        let export = wizard().export();
        let value = serde_json::to_value(&export).unwrap();

        assert_eq!(value["vehicle"]["plate"], "AA-00-BB");
        assert_eq!(value["vehicle"]["carModel"], "");
        assert!(value["checkInId"].as_str().unwrap().starts_with("checkin-"));
        assert_eq!(value["steps"].as_object().unwrap().len(), 7);
        assert_eq!(value["steps"]["vehicle"]["media"][0]["type"], "video");
        assert_eq!(
            value["steps"]["wheels"]["checklist"][1]["item"],
            "Inspect for cuts, bulges, or damage"
        );
        assert_eq!(value["steps"]["wheels"]["checklist"][1]["serviceNeeded"], true);
        assert!(export.file_name().starts_with("car-checkin-AA-00-BB-"));
    }

    #[test]
    fn export_round_trips_through_json() {
        let export = wizard().export();
        let text = export::to_pretty_json(&export).unwrap();
        let parsed: CheckinExport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, export);
        assert_eq!(export::to_pretty_json(&parsed).unwrap(), text);
    }

    #[test]
    fn wizard_restores_from_export() {
        let original = wizard();
        let restored = CheckinWizard::from_export(&original.export()).unwrap();
        assert_eq!(restored.vehicle, original.vehicle);
        assert_eq!(restored.media_count(), 2);
        assert!(restored.step(StepKey::Wheels).items[1].service_needed);
        assert_eq!(restored.step(StepKey::Final).notes, "Customer waits on site");
    }

    #[test]
    fn oversized_checklist_is_rejected() {
        let mut export = wizard().export();
        let final_step = export.steps.get_mut(&StepKey::Final).unwrap();
        for _ in 0..3 {
            final_step.checklist.push(ChecklistExport {
                item: "extra".to_string(),
                media: vec![],
                service_needed: false,
                notes: String::new(),
            });
        }
        assert!(CheckinWizard::from_export(&export).is_err());
    }
}
