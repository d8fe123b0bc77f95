//! Checkout form: final inspection items approved by the customer

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::export;
use crate::media::{MediaItem, MediaList, MediaRef};
use crate::model::{CheckoutSessionRow, Client, VehicleDetails};
use crate::rest::Table;
use crate::AutoCheck;

pub const CHECKOUT_ITEMS: [&str; 12] = [
    "Exterior condition - no new damage",
    "Interior cleanliness and condition",
    "All lights functioning properly",
    "Engine compartment inspection",
    "Fluid levels checked",
    "Tire condition and pressure",
    "Battery terminals and connections",
    "Windshield and mirrors clean",
    "Service work completed as requested",
    "All tools and equipment removed",
    "Test drive completed successfully",
    "Customer walkthrough completed",
];

/// Media and customer approval of one checkout item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutItemState {
    pub media: MediaList,
    pub approved: bool,
}

/// A checkout item as exported and stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutItemExport {
    pub item: String,
    #[serde(default)]
    pub media: Vec<MediaRef>,
    #[serde(default)]
    pub approved: bool,
}

/// Exported checkout form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutExport {
    pub vehicle_details: VehicleDetails,
    #[serde(default)]
    pub general_media: Vec<MediaRef>,
    #[serde(default)]
    pub checkout_items: Vec<CheckoutItemExport>,
    #[serde(default = "Utc::now")]
    pub export_date: DateTime<Utc>,
}

impl CheckoutExport {
    /// `checkout-{plate}-{date}.json`
    pub fn file_name(&self) -> String {
        export::file_name(
            "checkout",
            &self.vehicle_details.license_plate,
            self.export_date.date_naive(),
        )
    }
}

/// State of the checkout form
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutForm {
    pub session_id: String,
    pub vehicle: VehicleDetails,
    pub general_media: MediaList,
    items: Vec<CheckoutItemState>,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutForm {
    pub fn new() -> Self {
        CheckoutForm {
            session_id: Uuid::new_v4().to_string(),
            vehicle: VehicleDetails::for_checkout(),
            general_media: MediaList::new(),
            items: vec![CheckoutItemState::default(); CHECKOUT_ITEMS.len()],
        }
    }

    pub fn for_client(client: &Client) -> Result<Self> {
        let mut form = Self::new();
        form.vehicle.fill_contact(client.require_complete()?);
        Ok(form)
    }

    pub fn items(&self) -> &[CheckoutItemState] {
        &self.items
    }

    fn item_mut(&mut self, index: usize) -> Result<&mut CheckoutItemState> {
        self.items
            .get_mut(index)
            .ok_or_else(|| Error::validation(format!("no checkout item {}", index)))
    }

    pub fn set_approved(&mut self, index: usize, approved: bool) -> Result<()> {
        self.item_mut(index)?.approved = approved;
        Ok(())
    }

    pub fn add_item_media(&mut self, index: usize, item: MediaItem) -> Result<String> {
        Ok(self.item_mut(index)?.media.add(item))
    }

    pub fn remove_item_media(&mut self, index: usize, id: &str) -> Result<Option<MediaItem>> {
        Ok(self.item_mut(index)?.media.remove(id))
    }

    pub fn approved_count(&self) -> usize {
        self.items.iter().filter(|item| item.approved).count()
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn all_approved(&self) -> bool {
        self.approved_count() == self.total()
    }

    fn item_records(&self) -> Vec<CheckoutItemExport> {
        CHECKOUT_ITEMS
            .iter()
            .zip(self.items.iter())
            .map(|(label, state)| CheckoutItemExport {
                item: label.to_string(),
                media: state.media.refs(),
                approved: state.approved,
            })
            .collect()
    }

    pub fn export(&self) -> CheckoutExport {
        CheckoutExport {
            vehicle_details: self.vehicle.clone(),
            general_media: self.general_media.refs(),
            checkout_items: self.item_records(),
            export_date: Utc::now(),
        }
    }

    /// Restore a form from an export or draft. Items are matched by label.
    pub fn from_export(draft: &CheckoutExport) -> Result<Self> {
        let mut form = Self::new();
        form.vehicle = draft.vehicle_details.clone();
        form.general_media = MediaList::from_refs(&draft.general_media)?;
        for exported in &draft.checkout_items {
            let index = CHECKOUT_ITEMS
                .iter()
                .position(|label| *label == exported.item)
                .ok_or_else(|| {
                    Error::validation(format!("unknown checkout item '{}'", exported.item))
                })?;
            form.items[index] = CheckoutItemState {
                media: MediaList::from_refs(&exported.media)?,
                approved: exported.approved,
            };
        }
        Ok(form)
    }

    /// Upload pending media and upsert the session for a complete client
    pub async fn save(&mut self, shop: &AutoCheck, client: &Client) -> Result<CheckoutSessionRow> {
        client.require_complete()?;

        let storage = shop.storage();
        let bucket = storage.from(&shop.options.media_bucket);
        let prefix = format!("checkout/{}", self.session_id);
        self.general_media.upload_all(&bucket, &prefix).await?;
        for item in self.items.iter_mut() {
            item.media.upload_all(&bucket, &prefix).await?;
        }

        let row = CheckoutSessionRow {
            id: self.session_id.clone(),
            client_id: client.id.clone(),
            checkout_items: serde_json::to_value(self.item_records())?,
            vehicle_details: serde_json::to_value(&self.vehicle)?,
            general_media: serde_json::to_value(self.general_media.refs())?,
            status: None,
            created_at: None,
            updated_at: None,
        };

        let saved: CheckoutSessionRow = shop
            .from(Table::CheckoutSessions)
            .upsert(&row)
            .on_conflict("id")
            .single()
            .await?;
        info!(
            "Saved checkout session {} ({}/{} approved) for client {}",
            saved.id,
            self.approved_count(),
            self.total(),
            client.client_number
        );
        Ok(saved)
    }
}
