//! Parts/service and checkout session rows

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::ContactInfo;

/// Date a visit form refers to. Serialized under the form's own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisitDate {
    #[serde(rename = "entryDate")]
    Entry(NaiveDate),
    #[serde(rename = "checkoutDate")]
    Checkout(NaiveDate),
}

impl VisitDate {
    pub fn date(&self) -> NaiveDate {
        match self {
            VisitDate::Entry(date) | VisitDate::Checkout(date) => *date,
        }
    }
}

/// Customer and vehicle block shared by the parts and checkout forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetails {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub car_model: String,
    pub car_year: String,
    #[serde(flatten)]
    pub date: VisitDate,
    pub license_plate: String,
    pub mileage: String,
}

impl VehicleDetails {
    fn blank(date: VisitDate) -> Self {
        VehicleDetails {
            customer_name: String::new(),
            customer_phone: String::new(),
            customer_email: String::new(),
            car_model: String::new(),
            car_year: String::new(),
            date,
            license_plate: String::new(),
            mileage: String::new(),
        }
    }

    /// Empty details for the parts form, dated today
    pub fn for_parts() -> Self {
        Self::blank(VisitDate::Entry(Utc::now().date_naive()))
    }

    /// Empty details for the checkout form, dated today
    pub fn for_checkout() -> Self {
        Self::blank(VisitDate::Checkout(Utc::now().date_naive()))
    }

    /// Copy the customer's contact details into the form
    pub fn fill_contact(&mut self, contact: &ContactInfo) {
        self.customer_name = contact.name.clone();
        self.customer_phone = contact.phone.clone();
        self.customer_email = contact.email.clone();
    }
}

/// A `parts_service_sessions` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartsSessionRow {
    pub id: String,
    pub client_id: String,
    pub parts_data: Value,
    pub vehicle_details: Value,
    pub general_media: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A `checkout_sessions` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSessionRow {
    pub id: String,
    pub client_id: String,
    pub checkout_items: Value,
    pub vehicle_details: Value,
    pub general_media: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
