//! Parts and service documentation form

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::export;
use crate::media::{MediaItem, MediaList, MediaRef};
use crate::model::{Client, PartsSessionRow, VehicleDetails};
use crate::rest::Table;
use crate::AutoCheck;

/// A part fitted during the service
#[derive(Debug, Clone, PartialEq)]
pub struct PartEntry {
    pub id: String,
    pub serial_number: String,
    pub part_name: String,
    pub media: MediaList,
    pub justification: String,
}

impl PartEntry {
    fn new() -> Self {
        PartEntry {
            id: format!("part-{}", Uuid::new_v4()),
            serial_number: String::new(),
            part_name: String::new(),
            media: MediaList::new(),
            justification: String::new(),
        }
    }
}

/// A part as exported and as stored in the session blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartExport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub serial_number: String,
    pub part_name: String,
    pub justification: String,
    #[serde(default)]
    pub media: Vec<MediaRef>,
}

/// Exported parts form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartsExport {
    pub vehicle_details: VehicleDetails,
    #[serde(default)]
    pub general_media: Vec<MediaRef>,
    #[serde(default)]
    pub parts: Vec<PartExport>,
    #[serde(default = "Utc::now")]
    pub export_date: DateTime<Utc>,
}

impl PartsExport {
    /// `parts-service-{plate}-{date}.json`
    pub fn file_name(&self) -> String {
        export::file_name(
            "parts-service",
            &self.vehicle_details.license_plate,
            self.export_date.date_naive(),
        )
    }
}

/// State of the parts form
#[derive(Debug, Clone, PartialEq)]
pub struct PartsForm {
    /// Row id used when the form is saved
    pub session_id: String,
    pub vehicle: VehicleDetails,
    pub general_media: MediaList,
    parts: Vec<PartEntry>,
}

impl Default for PartsForm {
    fn default() -> Self {
        Self::new()
    }
}

impl PartsForm {
    pub fn new() -> Self {
        PartsForm {
            session_id: Uuid::new_v4().to_string(),
            vehicle: VehicleDetails::for_parts(),
            general_media: MediaList::new(),
            parts: Vec::new(),
        }
    }

    /// A form with the client's contact details filled in
    pub fn for_client(client: &Client) -> Result<Self> {
        let mut form = Self::new();
        form.vehicle.fill_contact(client.require_complete()?);
        Ok(form)
    }

    pub fn parts(&self) -> &[PartEntry] {
        &self.parts
    }

    /// Add an empty part and return its id
    pub fn add_part(&mut self) -> String {
        let part = PartEntry::new();
        let id = part.id.clone();
        self.parts.push(part);
        id
    }

    pub fn part_mut(&mut self, id: &str) -> Result<&mut PartEntry> {
        self.parts
            .iter_mut()
            .find(|part| part.id == id)
            .ok_or_else(|| Error::not_found(format!("part {}", id)))
    }

    /// Edit one part in place
    pub fn update_part<F>(&mut self, id: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut PartEntry),
    {
        edit(self.part_mut(id)?);
        Ok(())
    }

    pub fn add_part_media(&mut self, id: &str, item: MediaItem) -> Result<String> {
        Ok(self.part_mut(id)?.media.add(item))
    }

    /// Remove a part together with its media
    pub fn remove_part(&mut self, id: &str) -> Option<PartEntry> {
        let index = self.parts.iter().position(|part| part.id == id)?;
        Some(self.parts.remove(index))
    }

    fn part_records(&self, with_ids: bool) -> Vec<PartExport> {
        self.parts
            .iter()
            .map(|part| PartExport {
                id: with_ids.then(|| part.id.clone()),
                serial_number: part.serial_number.clone(),
                part_name: part.part_name.clone(),
                justification: part.justification.clone(),
                media: part.media.refs(),
            })
            .collect()
    }

    pub fn export(&self) -> PartsExport {
        PartsExport {
            vehicle_details: self.vehicle.clone(),
            general_media: self.general_media.refs(),
            parts: self.part_records(false),
            export_date: Utc::now(),
        }
    }

    /// Restore a form from an export or draft
    pub fn from_export(draft: &PartsExport) -> Result<Self> {
        let mut form = Self::new();
        form.vehicle = draft.vehicle_details.clone();
        form.general_media = MediaList::from_refs(&draft.general_media)?;
        for exported in &draft.parts {
            let mut part = PartEntry::new();
            if let Some(id) = &exported.id {
                part.id = id.clone();
            }
            part.serial_number = exported.serial_number.clone();
            part.part_name = exported.part_name.clone();
            part.justification = exported.justification.clone();
            part.media = MediaList::from_refs(&exported.media)?;
            form.parts.push(part);
        }
        Ok(form)
    }

    /// Upload pending media and upsert the session for a complete client
    pub async fn save(&mut self, shop: &AutoCheck, client: &Client) -> Result<PartsSessionRow> {
        client.require_complete()?;

        let storage = shop.storage();
        let bucket = storage.from(&shop.options.media_bucket);
        let prefix = format!("parts/{}", self.session_id);
        self.general_media.upload_all(&bucket, &prefix).await?;
        for part in self.parts.iter_mut() {
            part.media.upload_all(&bucket, &prefix).await?;
        }

        let row = PartsSessionRow {
            id: self.session_id.clone(),
            client_id: client.id.clone(),
            parts_data: serde_json::to_value(self.part_records(true))?,
            vehicle_details: serde_json::to_value(&self.vehicle)?,
            general_media: serde_json::to_value(self.general_media.refs())?,
            status: None,
            created_at: None,
            updated_at: None,
        };

        let saved: PartsSessionRow = shop
            .from(Table::PartsServiceSessions)
            .upsert(&row)
            .on_conflict("id")
            .single()
            .await?;
        info!(
            "Saved parts session {} ({} parts) for client {}",
            saved.id,
            self.parts.len(),
            client.client_number
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClientRow;

    fn incomplete_client() -> Client {
        Client::from(ClientRow {
            id: "c1".to_string(),
            client_number: "CL-1".to_string(),
            customer_name: Some("Pending".to_string()),
            customer_phone: None,
            customer_email: None,
            created_at: None,
            updated_at: None,
        })
    }

    #[test]
    fn add_update_remove() {
        let mut form = PartsForm::new();
        let id = form.add_part();
        form.update_part(&id, |part| {
            part.part_name = "Brake pads".to_string();
            part.serial_number = "BP-778".to_string();
        })
        .unwrap();
        form.add_part_media(&id, MediaItem::from_bytes("old-pads.jpg", vec![1]).unwrap())
            .unwrap();
        assert_eq!(form.parts()[0].part_name, "Brake pads");
        assert!(form.update_part("part-missing", |_| {}).is_err());

        let removed = form.remove_part(&id).unwrap();
        assert_eq!(removed.media.len(), 1);
        assert!(form.parts().is_empty());
    }

    #[test]
    fn export_shape_and_round_trip() {
        let mut form = PartsForm::new();
        form.vehicle.license_plate = "AA-00-BB".to_string();
        let id = form.add_part();
        form.update_part(&id, |part| part.justification = "Worn below 3mm".to_string())
            .unwrap();

        let export = form.export();
        let value = serde_json::to_value(&export).unwrap();
        assert!(value["vehicleDetails"]["entryDate"].is_string());
        assert!(value["parts"][0].get("id").is_none());
        assert_eq!(value["parts"][0]["justification"], "Worn below 3mm");
        assert!(export.file_name().starts_with("parts-service-AA-00-BB-"));

        let text = export::to_pretty_json(&export).unwrap();
        let parsed: PartsExport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, export);

        let restored = PartsForm::from_export(&parsed).unwrap();
        assert_eq!(restored.parts()[0].justification, "Worn below 3mm");
    }

    #[test]
    fn incomplete_client_cannot_prefill() {
        assert!(matches!(
            PartsForm::for_client(&incomplete_client()),
            Err(Error::Validation(_))
        ));
    }
}
