use std::sync::Arc;

use chrono::{Local, NaiveDateTime, NaiveTime, Timelike};
use tracing::{info, instrument};

use crate::backend::{BackendResult, HrBackend};
use crate::model::presence::{NewPresence, PointageKind, PresenceReceipt, PresenceStatus};

/// Sends attendance events to the backend.
#[derive(Clone)]
pub struct PresenceRecorder {
    backend: Arc<dyn HrBackend>,
}

impl PresenceRecorder {
    pub fn new(backend: Arc<dyn HrBackend>) -> Self {
        Self { backend }
    }

    /// Payload for `employee_id` at `now`. Check-in fills the arrival time and
    /// defaults the status to PRESENT; check-out only fills the departure time.
    pub fn build_payload(employee_id: u64, intent: PointageKind, now: NaiveDateTime) -> NewPresence {
        let time = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or_default();
        let (heure_entree, heure_sortie, statut) = match intent {
            PointageKind::CheckIn => (Some(time), None, Some(PresenceStatus::Present)),
            PointageKind::CheckOut => (None, Some(time), None),
        };

        NewPresence {
            employee_id,
            date_presence: now.date(),
            heure_entree,
            heure_sortie,
            statut,
            motif_absence: None,
        }
    }

    #[instrument(skip(self))]
    pub async fn record(&self, employee_id: u64, intent: PointageKind) -> BackendResult<PresenceReceipt> {
        let payload = Self::build_payload(employee_id, intent, Local::now().naive_local());
        let receipt = self.backend.record_presence(&payload).await?;
        info!(
            employee_id,
            employee = %receipt.employee.display_name(),
            %intent,
            "Presence recorded"
        );
        Ok(receipt)
    }

    /// Simple variant keyed by matricule; the backend fills in date and time.
    #[instrument(skip(self))]
    pub async fn record_pointage(&self, matricule: &str, kind: PointageKind) -> BackendResult<()> {
        self.backend.record_pointage(matricule, kind).await?;
        info!(matricule, %kind, "Pointage recorded");
        Ok(())
    }
}
