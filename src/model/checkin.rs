//! Check-in, checklist item, media and service approval rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `checkins` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinRow {
    pub id: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub plate: Option<String>,
    #[serde(default)]
    pub vehicle_vin: Option<String>,
    #[serde(default)]
    pub mileage: Option<i64>,
    #[serde(default)]
    pub car_model: Option<String>,
    #[serde(default)]
    pub car_year: Option<String>,
    #[serde(default)]
    pub checkin_approved: Option<bool>,
    #[serde(default)]
    pub checkout_approved: Option<bool>,
    #[serde(default)]
    pub client_notes: Option<String>,
    #[serde(default)]
    pub mechanic_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CheckinRow {
    pub fn is_approved(&self) -> bool {
        self.checkin_approved.unwrap_or(false)
    }

    pub fn is_checked_out(&self) -> bool {
        self.checkout_approved.unwrap_or(false)
    }
}

/// Body of a `checkins` insert
#[derive(Debug, Clone, Serialize)]
pub struct NewCheckin {
    pub client_id: String,
    pub plate: String,
    pub vehicle_vin: String,
    pub mileage: Option<i64>,
    pub car_model: String,
    pub car_year: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanic_id: Option<String>,
}

/// Gate update on a check-in
#[derive(Debug, Clone, Serialize)]
pub struct CheckinGatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_approved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_approved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_notes: Option<String>,
}

/// Body of a `checkin_items` insert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCheckinItem {
    pub checkin_id: String,
    pub item_key: String,
    pub notes: Option<String>,
    pub service_needed: bool,
}

/// Kind of a captured media file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Kind implied by a MIME type, if it is an image or a video
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let major = content_type.split('/').next().unwrap_or("");
        match major {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a `checkin_media` insert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCheckinMedia {
    pub checkin_id: String,
    pub file_path: String,
    pub media_type: MediaKind,
}

/// A `service_approvals` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceApprovalRow {
    pub id: String,
    pub checkin_id: String,
    pub service_description: String,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub client_notes: Option<String>,
    #[serde(default)]
    pub part_request_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ServiceApprovalRow {
    pub fn is_approved(&self) -> bool {
        self.approved.unwrap_or(false)
    }
}

/// Customer approval of one service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceApprovalPatch {
    pub approved: bool,
    pub approved_at: DateTime<Utc>,
    pub client_notes: Option<String>,
}
