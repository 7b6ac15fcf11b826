use std::str::FromStr;

use actix_web::{HttpResponse, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    api::{ColumnOrder, TableQuery, with_fallback},
    backend::HrBackend,
    error::AppError,
    model::presence::{ManualPresenceForm, Presence, PresenceReceipt, PresenceStatus},
    utils::mock_data,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PresenceQuery {
    /// PRESENT, ABSENT, RETARD or DEMI_JOURNEE
    pub status: Option<String>,
}

/// Presence as displayed, with the status badge text and style.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRow {
    #[serde(flatten)]
    pub presence: Presence,
    pub status_label: &'static str,
    pub status_class: &'static str,
}

impl From<Presence> for PresenceRow {
    fn from(presence: Presence) -> Self {
        Self {
            status_label: presence.statut.label(),
            status_class: presence.statut.css_class(),
            presence,
        }
    }
}

impl PresenceQuery {
    fn status(&self) -> Result<Option<PresenceStatus>, AppError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => PresenceStatus::from_str(raw)
                .map(Some)
                .map_err(|_| AppError::BadRequest(format!("Unknown presence status: {raw}"))),
        }
    }
}

/// Sortable presence columns, by wire name.
fn presence_order(column: &str) -> Option<ColumnOrder<Presence>> {
    let order: ColumnOrder<Presence> = match column {
        "employeeName" => |a, b| a.employee_name.cmp(&b.employee_name),
        "datePresence" => |a, b| a.date_presence.cmp(&b.date_presence),
        "heureEntree" => |a, b| a.heure_entree.cmp(&b.heure_entree),
        "heureSortie" => |a, b| a.heure_sortie.cmp(&b.heure_sortie),
        "statut" => |a, b| a.statut.label().cmp(b.statut.label()),
        "motifAbsence" => |a, b| a.motif_absence.cmp(&b.motif_absence),
        _ => return None,
    };
    Some(order)
}

/* =========================
List presences
========================= */
#[utoipa::path(
    get,
    path = "/kiosk/presences",
    params(TableQuery, PresenceQuery),
    responses(
        (status = 200, description = "Presence rows, demo data when the backend is down", body = Object, example = json!({
            "data": [{
                "id": 1,
                "employeeId": 1,
                "employeeName": "Jean Dupont",
                "datePresence": "2024-01-15",
                "heureEntree": "08:30",
                "heureSortie": "17:30",
                "statut": "PRESENT",
                "statusLabel": "Présent",
                "statusClass": "status-present"
            }],
            "source": "backend",
            "page": 1,
            "per_page": 10,
            "total": 1
        })),
        (status = 400, description = "Unknown status or sort column", body = Object)
    ),
    tag = "Presence"
)]
pub async fn list_presences(
    backend: web::Data<dyn HrBackend>,
    table: web::Query<TableQuery>,
    query: web::Query<PresenceQuery>,
) -> Result<HttpResponse, AppError> {
    let status = query.status()?;
    let needle = table.needle();

    let mut screen = with_fallback("presences", backend.list_presences(), || {
        mock_data::PRESENCES.clone()
    })
    .await;

    let matching: Vec<Presence> = std::mem::take(&mut screen.data)
        .into_iter()
        .filter(|p| status.is_none_or(|s| p.statut == s))
        .filter(|p| {
            needle
                .as_deref()
                .is_none_or(|n| p.filter_haystack().contains(n))
        })
        .collect();
    let (rows, paging) = table.arrange(matching, presence_order)?;
    let rows: Vec<PresenceRow> = rows.into_iter().map(PresenceRow::from).collect();

    Ok(HttpResponse::Ok().json(screen.page(rows, paging)))
}

/* =========================
Today's presence stats
========================= */
#[utoipa::path(
    get,
    path = "/kiosk/presences/stats",
    responses(
        (status = 200, description = "Counters for today", body = Object, example = json!({
            "data": {
                "totalPresences": 1247,
                "presentsToday": 18,
                "absentsToday": 7,
                "retardsToday": 3
            },
            "source": "fallback",
            "notice": "Backend unreachable, showing demo data"
        }))
    ),
    tag = "Presence"
)]
pub async fn presence_stats(backend: web::Data<dyn HrBackend>) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();
    let screen = with_fallback("presence stats", backend.presence_stats(today), || {
        mock_data::PRESENCE_STATS.clone()
    })
    .await;
    Ok(HttpResponse::Ok().json(screen))
}

/* =========================
Manual presence entry
========================= */
#[utoipa::path(
    post,
    path = "/kiosk/presences",
    request_body = ManualPresenceForm,
    responses(
        (status = 201, description = "Presence recorded", body = PresenceReceipt),
        (status = 422, description = "Form validation failed", body = Object, example = json!({
            "message": "Validation failed",
            "errors": { "employeeId": ["employeeId is required"] }
        })),
        (status = 502, description = "Backend refused or unreachable", body = Object)
    ),
    tag = "Presence"
)]
pub async fn create_presence(
    backend: web::Data<dyn HrBackend>,
    payload: web::Json<ManualPresenceForm>,
) -> Result<HttpResponse, AppError> {
    let form = payload.into_inner();
    form.validate()
        .map_err(|e| AppError::validation(&e, ManualPresenceForm::wire_name))?;

    let presence = form.into_new_presence();
    let receipt = backend.record_presence(&presence).await?;
    info!(
        employee_id = presence.employee_id,
        date = %presence.date_presence,
        "Manual presence recorded"
    );
    Ok(HttpResponse::Created().json(receipt))
}
