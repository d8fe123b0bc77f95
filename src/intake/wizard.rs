//! Form state of the check-in wizard

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::intake::steps::{Step, StepKey, STEPS};
use crate::media::{MediaItem, MediaList};
use crate::model::ContactInfo;

/// Customer and vehicle fields of the first step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleForm {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub plate: String,
    pub vin: String,
    pub mileage: String,
    pub car_model: String,
    pub car_year: String,
}

impl VehicleForm {
    /// Labels of the fields still blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("customer name", &self.customer_name),
            ("phone", &self.customer_phone),
            ("email", &self.customer_email),
            ("plate", &self.plate),
            ("VIN", &self.vin),
            ("mileage", &self.mileage),
            ("model", &self.car_model),
            ("year", &self.car_year),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| *label)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn contact(&self) -> Result<ContactInfo> {
        ContactInfo::new(&self.customer_name, &self.customer_phone, &self.customer_email)
    }

    /// Odometer reading in whole kilometres.
    ///
    /// Accepts plain digits or digits grouped in threes by one separator
    /// (`84,500`, `84.500`, `1 204 000`). Anything with a fractional part or
    /// beyond the `integer` column is rejected.
    pub fn mileage_value(&self) -> Result<Option<i64>> {
        let raw = self.mileage.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let not_whole = || {
            Error::validation(format!("mileage '{}' is not a whole number of kilometres", raw))
        };

        let digits = match raw.chars().find(|c| !c.is_ascii_digit()) {
            None => raw.to_string(),
            Some(separator) if GROUPING_SEPARATORS.contains(&separator) => {
                let groups: Vec<&str> = raw.split(separator).collect();
                let is_digits = |group: &str| group.chars().all(|c| c.is_ascii_digit());
                let well_formed = groups.iter().enumerate().all(|(index, group)| {
                    let width_ok = if index == 0 {
                        (1..=3).contains(&group.len())
                    } else {
                        group.len() == 3
                    };
                    width_ok && is_digits(group)
                });
                if !well_formed {
                    return Err(not_whole());
                }
                groups.concat()
            }
            Some(_) => return Err(not_whole()),
        };

        // only digits remain, so a failed parse is an overflow
        let value = digits
            .parse::<i32>()
            .map_err(|_| Error::validation(format!("mileage '{}' is out of range", raw)))?;
        Ok(Some(i64::from(value)))
    }
}

const GROUPING_SEPARATORS: [char; 5] = [',', '.', ' ', '_', '\''];

/// Media, service flag and notes recorded against one checklist entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChecklistEntry {
    pub media: MediaList,
    pub service_needed: bool,
    pub notes: String,
}

/// Everything captured on one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepState {
    pub key: StepKey,
    pub notes: String,
    pub media: MediaList,
    pub items: Vec<ChecklistEntry>,
}

impl StepState {
    fn new(step: &Step) -> Self {
        StepState {
            key: step.key,
            notes: String::new(),
            media: MediaList::new(),
            items: vec![ChecklistEntry::default(); step.checklist.len()],
        }
    }

    pub fn step(&self) -> &'static Step {
        self.key.step()
    }

    /// A checklist entry by index
    pub fn item_mut(&mut self, index: usize) -> Result<&mut ChecklistEntry> {
        let key = self.key;
        self.items.get_mut(index).ok_or_else(|| {
            Error::validation(format!("step {} has no checklist item {}", key, index))
        })
    }

    /// Media attached to the step and to its checklist entries
    pub fn media_count(&self) -> usize {
        self.media.len() + self.items.iter().map(|item| item.media.len()).sum::<usize>()
    }
}

/// The guided check-in: current position and all captured data
#[derive(Debug, Clone, PartialEq)]
pub struct CheckinWizard {
    index: usize,
    pub vehicle: VehicleForm,
    steps: Vec<StepState>,
}

impl Default for CheckinWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckinWizard {
    pub fn new() -> Self {
        CheckinWizard {
            index: 0,
            vehicle: VehicleForm::default(),
            steps: STEPS.iter().map(StepState::new).collect(),
        }
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_step(&self) -> &'static Step {
        &STEPS[self.index]
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == STEPS.len()
    }

    /// Percentage shown in the wizard header
    pub fn progress(&self) -> u8 {
        (((self.index + 1) as f64 / STEPS.len() as f64) * 100.0).round() as u8
    }

    /// Only the vehicle step gates moving on
    pub fn can_advance(&self) -> bool {
        self.current_step().key != StepKey::Vehicle || self.vehicle.is_complete()
    }

    /// Move to the next step; stays on the last one
    pub fn next(&mut self) -> Result<usize> {
        if !self.can_advance() {
            return Err(Error::validation(format!(
                "missing {}",
                self.vehicle.missing_fields().join(", ")
            )));
        }
        self.index = (self.index + 1).min(STEPS.len() - 1);
        Ok(self.index)
    }

    /// Move to the previous step; stays on the first one
    pub fn back(&mut self) -> usize {
        self.index = self.index.saturating_sub(1);
        self.index
    }

    pub fn steps(&self) -> &[StepState] {
        &self.steps
    }

    pub(crate) fn steps_mut(&mut self) -> &mut [StepState] {
        &mut self.steps
    }

    pub fn step(&self, key: StepKey) -> &StepState {
        let index = STEPS.iter().position(|s| s.key == key).unwrap_or(0);
        &self.steps[index]
    }

    pub fn step_mut(&mut self, key: StepKey) -> &mut StepState {
        let index = STEPS.iter().position(|s| s.key == key).unwrap_or(0);
        &mut self.steps[index]
    }

    pub fn set_notes(&mut self, key: StepKey, notes: &str) {
        self.step_mut(key).notes = notes.to_string();
    }

    /// Attach general media to a step
    pub fn add_media(&mut self, key: StepKey, item: MediaItem) -> String {
        self.step_mut(key).media.add(item)
    }

    pub fn remove_media(&mut self, key: StepKey, id: &str) -> Option<MediaItem> {
        self.step_mut(key).media.remove(id)
    }

    /// Attach media to one checklist entry
    pub fn add_item_media(&mut self, key: StepKey, index: usize, item: MediaItem) -> Result<String> {
        Ok(self.step_mut(key).item_mut(index)?.media.add(item))
    }

    pub fn set_service_needed(&mut self, key: StepKey, index: usize, needed: bool) -> Result<()> {
        self.step_mut(key).item_mut(index)?.service_needed = needed;
        Ok(())
    }

    pub fn set_item_notes(&mut self, key: StepKey, index: usize, notes: &str) -> Result<()> {
        self.step_mut(key).item_mut(index)?.notes = notes.to_string();
        Ok(())
    }

    /// All media captured in the wizard
    pub fn media_count(&self) -> usize {
        self.steps.iter().map(StepState::media_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> VehicleForm {
        VehicleForm {
            customer_name: "Ana Lima".to_string(),
            customer_phone: "+351 912 000 000".to_string(),
            customer_email: "ana@shop.example".to_string(),
            plate: "AA-00-BB".to_string(),
            vin: "1HGCM82633A004352".to_string(),
            mileage: "120,500".to_string(),
            car_model: "Honda Civic".to_string(),
            car_year: "2020".to_string(),
        }
    }

    #[test]
    fn vehicle_step_blocks_until_complete() {
        let mut wizard = CheckinWizard::new();
        assert!(!wizard.can_advance());
        wizard.vehicle = filled();
        wizard.vehicle.vin.clear();
        match wizard.next() {
            Err(Error::Validation(msg)) => assert_eq!(msg, "missing VIN"),
            other => panic!("Expected validation error, got {:?}", other),
        }

        wizard.vehicle = filled();
        assert_eq!(wizard.next().unwrap(), 1);
        assert_eq!(wizard.current_step().title, "Exterior condition");
    }

    #[test]
    fn navigation_clamps_to_bounds() {
        let mut wizard = CheckinWizard::new();
        assert_eq!(wizard.back(), 0);
        wizard.vehicle = filled();
        for _ in 0..10 {
            wizard.next().unwrap();
        }
        assert!(wizard.is_last());
        assert_eq!(wizard.current_index(), 6);
        assert_eq!(wizard.progress(), 100);
    }

    #[test]
    fn progress_rounds_per_step() {
        let mut wizard = CheckinWizard::new();
        wizard.vehicle = filled();
        let mut seen = vec![wizard.progress()];
        while !wizard.is_last() {
            wizard.next().unwrap();
            seen.push(wizard.progress());
        }
        assert_eq!(seen, vec![14, 29, 43, 57, 71, 86, 100]);
    }

    #[test]
    fn mileage_parsing() {
        assert_eq!(filled().mileage_value().unwrap(), Some(120500));
        let mut form = filled();
        form.mileage = "lots".to_string();
        assert!(form.mileage_value().is_err());
        form.mileage.clear();
        assert_eq!(form.mileage_value().unwrap(), None);
        form.mileage = " 1 204 000 ".to_string();
        assert_eq!(form.mileage_value().unwrap(), Some(1_204_000));
        form.mileage = "84.500".to_string();
        assert_eq!(form.mileage_value().unwrap(), Some(84_500));
    }

    #[test]
    fn mileage_rejects_fractions_and_overflow() {
        let mut form = filled();
        for input in ["12.5", "84,500.5", "1,2,3", "1,234.567", "-40", "1e6"] {
            form.mileage = input.to_string();
            match form.mileage_value() {
                Err(Error::Validation(msg)) => assert!(msg.contains("whole number"), "{}", msg),
                other => panic!("{} parsed as {:?}", input, other),
            }
        }

        form.mileage = "2,147,483,647".to_string();
        assert_eq!(form.mileage_value().unwrap(), Some(2_147_483_647));
        form.mileage = "2147483648".to_string();
        match form.mileage_value() {
            Err(Error::Validation(msg)) => assert!(msg.contains("out of range")),
            other => panic!("expected a range error, got {:?}", other),
        }
    }

    #[test]
    fn checklist_entries_are_bounds_checked() {
        let mut wizard = CheckinWizard::new();
        wizard.set_service_needed(StepKey::Engine, 2, true).unwrap();
        assert!(wizard.step(StepKey::Engine).items[2].service_needed);
        assert!(wizard.set_service_needed(StepKey::Engine, 6, true).is_err());
        assert!(wizard.set_item_notes(StepKey::Vehicle, 0, "x").is_err());
    }

    #[test]
    fn media_counts_include_checklist_items() {
        let mut wizard = CheckinWizard::new();
        let id = wizard.add_media(
            StepKey::Exterior,
            MediaItem::from_bytes("front.jpg", vec![1]).unwrap(),
        );
        wizard
            .add_item_media(StepKey::Exterior, 0, MediaItem::from_bytes("dent.jpg", vec![2]).unwrap())
            .unwrap();
        assert_eq!(wizard.media_count(), 2);
        assert!(wizard.remove_media(StepKey::Exterior, &id).is_some());
        assert_eq!(wizard.media_count(), 1);
    }
}
