//! Customer-facing tracking page: status, progress and approvals

use chrono::Utc;
use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::model::{CheckinGatePatch, CheckinRow, Client, ServiceApprovalPatch, ServiceApprovalRow};
use crate::progress::{progress, Progress};
use crate::rest::{SortOrder, Table};
use crate::workflow::{Gate, GateState, TransitionError, WorkflowStage};
use crate::AutoCheck;

/// Tracking link for a client: `{base}/client/{number}`
pub fn portal_url(base: &str, client_number: &str) -> String {
    format!("{}/client/{}", base.trim_end_matches('/'), client_number)
}

/// Page shown to the mechanic after intake: `{base}/check-in-complete/{number}`
pub fn completion_url(base: &str, client_number: &str) -> String {
    format!("{}/check-in-complete/{}", base.trim_end_matches('/'), client_number)
}

/// One gate as listed on the tracking page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub label: &'static str,
    pub done: bool,
}

/// Everything the tracking page shows for one client
#[derive(Debug, Clone)]
pub struct PortalView {
    pub client: Client,
    pub checkin: Option<CheckinRow>,
    pub services: Vec<ServiceApprovalRow>,
}

impl PortalView {
    pub fn gates(&self) -> GateState {
        GateState {
            checkin_received: self.checkin.is_some(),
            checkin_approved: self.checkin.as_ref().map_or(false, CheckinRow::is_approved),
            services_total: self.services.len(),
            services_approved: self.services.iter().filter(|s| s.is_approved()).count(),
            checkout_approved: self.checkin.as_ref().map_or(false, CheckinRow::is_checked_out),
        }
    }

    pub fn progress(&self) -> Progress {
        progress(&self.gates())
    }

    pub fn stage(&self) -> WorkflowStage {
        self.gates().stage()
    }

    pub fn milestones(&self) -> Vec<Milestone> {
        let gates = self.gates();
        Gate::ALL
            .iter()
            .map(|gate| Milestone {
                label: gate.label(),
                done: gates.is_passed(*gate),
            })
            .collect()
    }

    /// The checkout card is only offered once everything before it is approved
    pub fn checkout_available(&self) -> bool {
        let gates = self.gates();
        gates.checkout_available() && !gates.checkout_approved
    }

    pub fn pending_services(&self) -> impl Iterator<Item = &ServiceApprovalRow> {
        self.services.iter().filter(|s| !s.is_approved())
    }

    fn checkin_id(&self) -> std::result::Result<String, TransitionError> {
        self.checkin
            .as_ref()
            .map(|checkin| checkin.id.clone())
            .ok_or(TransitionError::NoCheckin)
    }
}

/// Portal reads and gate updates
pub struct Portal<'a> {
    shop: &'a AutoCheck,
}

impl<'a> Portal<'a> {
    pub(crate) fn new(shop: &'a AutoCheck) -> Self {
        Self { shop }
    }

    /// Load a client's latest check-in and its proposed services
    pub async fn load(&self, client_number: &str) -> Result<PortalView> {
        let client = self.shop.clients().find_by_number(client_number).await?;

        let checkin: Option<CheckinRow> = self
            .shop
            .from(Table::Checkins)
            .select("*")
            .eq("client_id", &client.id)
            .order("created_at", SortOrder::Descending)
            .maybe_single()
            .await?;

        let services = match &checkin {
            Some(checkin) => {
                self.shop
                    .from(Table::ServiceApprovals)
                    .select("*")
                    .eq("checkin_id", &checkin.id)
                    .order("created_at", SortOrder::Ascending)
                    .execute::<ServiceApprovalRow>()
                    .await?
            }
            None => Vec::new(),
        };

        Ok(PortalView {
            client,
            checkin,
            services,
        })
    }

    /// Customer accepts the check-in report
    pub async fn approve_checkin(&self, view: &mut PortalView) -> Result<()> {
        view.gates().check_approve_checkin()?;
        let checkin_id = view.checkin_id()?;

        self.shop
            .from(Table::Checkins)
            .update(CheckinGatePatch {
                checkin_approved: Some(true),
                checkout_approved: None,
                client_notes: None,
            })
            .eq("id", &checkin_id)
            .execute_no_return()
            .await?;

        if let Some(checkin) = view.checkin.as_mut() {
            checkin.checkin_approved = Some(true);
        }
        info!("Client {} approved check-in {}", view.client.client_number, checkin_id);
        Ok(())
    }

    /// Customer accepts one proposed service
    pub async fn approve_service(
        &self,
        view: &mut PortalView,
        service_id: &str,
        notes: Option<&str>,
    ) -> Result<()> {
        let already_approved = view
            .services
            .iter()
            .find(|s| s.id == service_id)
            .map(ServiceApprovalRow::is_approved)
            .ok_or_else(|| TransitionError::UnknownService(service_id.to_string()))?;
        view.gates().check_approve_service(already_approved)?;

        let approved_at = Utc::now();
        let notes = notes.map(str::to_string);
        self.shop
            .from(Table::ServiceApprovals)
            .update(ServiceApprovalPatch {
                approved: true,
                approved_at,
                client_notes: notes.clone(),
            })
            .eq("id", service_id)
            .execute_no_return()
            .await?;

        if let Some(service) = view.services.iter_mut().find(|s| s.id == service_id) {
            service.approved = Some(true);
            service.approved_at = Some(approved_at);
            service.client_notes = notes;
        }
        info!("Client {} approved service {}", view.client.client_number, service_id);
        Ok(())
    }

    /// Customer accepts the checkout
    pub async fn approve_checkout(&self, view: &mut PortalView) -> Result<()> {
        view.gates().check_approve_checkout()?;
        let checkin_id = view.checkin_id()?;

        self.shop
            .from(Table::Checkins)
            .update(CheckinGatePatch {
                checkin_approved: None,
                checkout_approved: Some(true),
                client_notes: None,
            })
            .eq("id", &checkin_id)
            .execute_no_return()
            .await?;

        if let Some(checkin) = view.checkin.as_mut() {
            checkin.checkout_approved = Some(true);
        }
        info!("Client {} approved checkout of {}", view.client.client_number, checkin_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClientRow;

    fn view(checkin: Option<(bool, bool)>, services: &[bool]) -> PortalView {
        let client = Client::from(ClientRow {
            id: "c1".to_string(),
            client_number: "CL-7".to_string(),
            customer_name: Some("Ana".to_string()),
            customer_phone: Some("555".to_string()),
            customer_email: Some("ana@shop.example".to_string()),
            created_at: None,
            updated_at: None,
        });
        let checkin = checkin.map(|(approved, checked_out)| {
            serde_json::from_value::<CheckinRow>(serde_json::json!({
                "id": "k1",
                "client_id": "c1",
                "checkin_approved": approved,
                "checkout_approved": checked_out,
            }))
            .unwrap()
        });
        let services = services
            .iter()
            .enumerate()
            .map(|(i, approved)| {
                serde_json::from_value::<ServiceApprovalRow>(serde_json::json!({
                    "id": format!("s{}", i),
                    "checkin_id": "k1",
                    "service_description": "Replace pads",
                    "estimated_cost": 120.5,
                    "approved": approved,
                }))
                .unwrap()
            })
            .collect();
        PortalView {
            client,
            checkin,
            services,
        }
    }

    #[test]
    fn urls() {
        assert_eq!(
            portal_url("https://shop.example/", "CL-7"),
            "https://shop.example/client/CL-7"
        );
        assert_eq!(
            completion_url("https://shop.example", "CL-7"),
            "https://shop.example/check-in-complete/CL-7"
        );
    }

    #[test]
    fn progress_and_milestones() {
        assert_eq!(view(None, &[]).progress(), Progress::ZERO);

        let partial = view(Some((true, false)), &[true, false]);
        assert_eq!(partial.progress().percent(), 50);
        assert_eq!(partial.stage(), WorkflowStage::AwaitingServiceApproval);
        assert_eq!(
            partial.milestones().iter().map(|m| m.done).collect::<Vec<_>>(),
            vec![true, true, false, false]
        );
        assert_eq!(partial.pending_services().count(), 1);
        assert!(!partial.checkout_available());

        let ready = view(Some((true, false)), &[]);
        assert!(ready.checkout_available());
        assert_eq!(ready.progress().percent(), 75);

        let done = view(Some((true, true)), &[true]);
        assert_eq!(done.progress(), Progress::DONE);
        assert!(!done.checkout_available());
    }
}
