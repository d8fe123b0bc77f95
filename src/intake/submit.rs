//! Persisting a finished check-in

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::intake::steps::StepKey;
use crate::intake::wizard::CheckinWizard;
use crate::model::{CheckinRow, NewCheckin, NewCheckinItem, NewCheckinMedia};
use crate::portal;
use crate::rest::Table;
use crate::AutoCheck;

/// Status of a freshly submitted check-in
pub const NEW_CHECKIN_STATUS: &str = "pending";

/// What the shop hands the customer after intake
#[derive(Debug, Clone)]
pub struct CheckinReceipt {
    pub client_id: String,
    pub client_number: String,
    pub checkin_id: String,
    /// Portal password, when one was issued
    pub password: Option<String>,
    /// Tracking link, when a portal base URL is configured
    pub portal_url: Option<String>,
    /// Confirmation page for the mechanic, under the same base URL
    pub completion_url: Option<String>,
    /// Files sent to the bucket by this call
    pub media_uploaded: usize,
    /// `checkin_media` rows written, including media stored before this call
    pub media_recorded: usize,
    pub items_recorded: usize,
}

impl CheckinWizard {
    /// Create the client and check-in, upload all media and record the
    /// checklist.
    ///
    /// Requests run one after another; a failure stops the submission and
    /// rows already written stay in place.
    pub async fn submit(&mut self, shop: &AutoCheck) -> Result<CheckinReceipt> {
        let missing = self.vehicle.missing_fields();
        if !missing.is_empty() {
            return Err(Error::validation(format!("missing {}", missing.join(", "))));
        }
        let contact = self.vehicle.contact()?;
        let mileage = self.vehicle.mileage_value()?;

        let saved = shop.clients().create_client(&contact).await?;
        let client = saved.client;

        let mechanic_id = shop
            .auth()
            .get_session()
            .and_then(|session| session.claims().ok())
            .map(|claims| claims.sub);
        if mechanic_id.is_none() {
            warn!("Submitting check-in without a signed-in mechanic");
        }

        let checkin: CheckinRow = shop
            .from(Table::Checkins)
            .insert(NewCheckin {
                client_id: client.id.clone(),
                plate: self.vehicle.plate.trim().to_string(),
                vehicle_vin: self.vehicle.vin.trim().to_string(),
                mileage,
                car_model: self.vehicle.car_model.trim().to_string(),
                car_year: self.vehicle.car_year.trim().to_string(),
                status: NEW_CHECKIN_STATUS.to_string(),
                mechanic_id,
            })
            .single()
            .await?;
        info!(
            "Created check-in {} for client {}",
            checkin.id, client.client_number
        );

        let storage = shop.storage();
        let bucket = storage.from(&shop.options.media_bucket);
        let mut media_uploaded = 0;
        let mut media_rows = Vec::new();
        for state in self.steps_mut().iter_mut() {
            let prefix = format!("checkins/{}/{}", checkin.id, state.key);
            media_uploaded += state.media.upload_all(&bucket, &prefix).await?;
            let mut stored = state.media.stored(&bucket);
            for entry in state.items.iter_mut() {
                media_uploaded += entry.media.upload_all(&bucket, &prefix).await?;
                stored.extend(entry.media.stored(&bucket));
            }
            media_rows.extend(stored.into_iter().map(|(file_path, media_type)| NewCheckinMedia {
                checkin_id: checkin.id.clone(),
                file_path,
                media_type,
            }));
        }
        if !media_rows.is_empty() {
            shop.from(Table::CheckinMedia)
                .insert(&media_rows)
                .execute_no_return()
                .await?;
        }
        debug!("Recorded {} media files", media_rows.len());

        let items = checklist_rows(self, &checkin.id);
        if !items.is_empty() {
            shop.from(Table::CheckinItems)
                .insert(&items)
                .execute_no_return()
                .await?;
        }

        let base = shop.options.portal_base_url.as_deref();
        let portal_url = base.map(|base| portal::portal_url(base, &client.client_number));
        let completion_url = base.map(|base| portal::completion_url(base, &client.client_number));

        Ok(CheckinReceipt {
            client_id: client.id,
            client_number: client.client_number,
            checkin_id: checkin.id,
            password: saved.password,
            portal_url,
            completion_url,
            media_uploaded,
            media_recorded: media_rows.len(),
            items_recorded: items.len(),
        })
    }
}

/// One row per checklist entry, plus one per step carrying step notes
pub(crate) fn checklist_rows(wizard: &CheckinWizard, checkin_id: &str) -> Vec<NewCheckinItem> {
    let mut rows = Vec::new();
    for state in wizard.steps() {
        let step = state.step();
        if !state.notes.trim().is_empty() {
            rows.push(NewCheckinItem {
                checkin_id: checkin_id.to_string(),
                item_key: step.key.to_string(),
                notes: Some(state.notes.trim().to_string()),
                service_needed: false,
            });
        }
        if step.key == StepKey::Vehicle {
            continue;
        }
        for (index, entry) in state.items.iter().enumerate() {
            let notes = entry.notes.trim();
            rows.push(NewCheckinItem {
                checkin_id: checkin_id.to_string(),
                item_key: step.item_key(index),
                notes: (!notes.is_empty()).then(|| notes.to_string()),
                service_needed: entry.service_needed,
            });
        }
    }
    rows
}
