//! Viewer-specific job status labels.
//!
//! Labels are computed on every read from the job document and the
//! engagement signals around it. Nothing here writes, caches or persists;
//! the same inputs always produce the same labels.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    chatmodels::Conversation,
    interactionmodel::{Interaction, InteractionStatus},
    jobmodel::{Job, LifecycleStatus, OfferStatus, TrackingStatus},
    usermodel::UserRole,
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedLabel {
    #[serde(rename = "NUEVA")]
    Nueva,
    #[serde(rename = "CONTACTADA")]
    Contactada,
    #[serde(rename = "PRESUPUESTADA")]
    Presupuestada,
    #[serde(rename = "ACEPTADO")]
    Aceptado,
    #[serde(rename = "EN EJECUCIÓN")]
    EnEjecucion,
    #[serde(rename = "VALIDANDO")]
    Validando,
    #[serde(rename = "VALORACIÓN")]
    Valoracion,
    #[serde(rename = "TERMINADO")]
    Terminado,
    #[serde(rename = "ELIMINADA")]
    Eliminada,
    #[serde(rename = "ABIERTA")]
    Abierta,
    #[serde(rename = "RECHAZADA")]
    Rechazada,
    #[serde(rename = "PERDIDA")]
    Perdida,
    #[serde(rename = "CERRADA")]
    Cerrada,
}

impl DerivedLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DerivedLabel::Nueva => "NUEVA",
            DerivedLabel::Contactada => "CONTACTADA",
            DerivedLabel::Presupuestada => "PRESUPUESTADA",
            DerivedLabel::Aceptado => "ACEPTADO",
            DerivedLabel::EnEjecucion => "EN EJECUCIÓN",
            DerivedLabel::Validando => "VALIDANDO",
            DerivedLabel::Valoracion => "VALORACIÓN",
            DerivedLabel::Terminado => "TERMINADO",
            DerivedLabel::Eliminada => "ELIMINADA",
            DerivedLabel::Abierta => "ABIERTA",
            DerivedLabel::Rechazada => "RECHAZADA",
            DerivedLabel::Perdida => "PERDIDA",
            DerivedLabel::Cerrada => "CERRADA",
        }
    }
}

/// Facts about a job that live outside the job document.
#[derive(Debug, Clone, Default)]
pub struct StatusSignals {
    pub interactions: Vec<Interaction>,
    pub conversations: Vec<Conversation>,
    pub has_rating: bool,
}

impl StatusSignals {
    fn has_any_conversation(&self) -> bool {
        !self.conversations.is_empty()
    }

    fn has_conversation_with(&self, professional_id: Uuid) -> bool {
        self.conversations
            .iter()
            .any(|conversation| conversation.professional_id == professional_id)
    }

    fn any_contacted(&self) -> bool {
        self.interactions
            .iter()
            .any(|interaction| interaction.status == InteractionStatus::Contacted)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct DerivedStatus {
    #[serde(rename = "clientLabel")]
    pub client_label: DerivedLabel,
    #[serde(rename = "proLabel")]
    pub pro_label: DerivedLabel,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ProfessionalStatus {
    pub professional_id: Uuid,
    pub label: DerivedLabel,
}

/// Labels for `viewer_id`. Professionals get their own pro label; clients and
/// admins see the pro label of whoever holds the job, if anyone.
pub fn derive_status(
    job: &Job,
    signals: &StatusSignals,
    viewer_id: Uuid,
    viewer_role: UserRole,
) -> DerivedStatus {
    let subject = match viewer_role {
        UserRole::Professional => Some(viewer_id),
        UserRole::Client | UserRole::Admin => job
            .professional_id
            .or_else(|| job.accepted_offer().map(|offer| offer.pro_id)),
    };

    DerivedStatus {
        client_label: client_label(job, signals),
        pro_label: pro_label(job, signals, subject),
    }
}

pub fn client_label(job: &Job, signals: &StatusSignals) -> DerivedLabel {
    if job.lifecycle_status == LifecycleStatus::Canceled {
        return DerivedLabel::Eliminada;
    }

    if let Some(label) = engagement_label(job, signals) {
        return label;
    }

    if job.has_offer_in(OfferStatus::Pending) {
        return DerivedLabel::Presupuestada;
    }

    if signals.has_any_conversation() || signals.any_contacted() {
        return DerivedLabel::Contactada;
    }

    DerivedLabel::Nueva
}

pub fn pro_label(job: &Job, signals: &StatusSignals, viewer: Option<Uuid>) -> DerivedLabel {
    if job.lifecycle_status == LifecycleStatus::Canceled {
        return DerivedLabel::Eliminada;
    }

    let Some(viewer) = viewer else {
        return DerivedLabel::Abierta;
    };

    if job.is_winner(viewer) {
        return engagement_label(job, signals).unwrap_or(DerivedLabel::Aceptado);
    }

    if job.lifecycle_status.is_taken() {
        return DerivedLabel::Perdida;
    }

    open_job_label(job, signals, viewer)
}

/// One entry per professional who ever touched the job, judged against the
/// recorded hire rather than the live assignment.
pub fn admin_statuses(job: &Job, signals: &StatusSignals) -> Vec<ProfessionalStatus> {
    participants(job, signals)
        .into_iter()
        .map(|professional_id| ProfessionalStatus {
            professional_id,
            label: admin_label(job, signals, professional_id),
        })
        .collect()
}

fn admin_label(job: &Job, signals: &StatusSignals, professional_id: Uuid) -> DerivedLabel {
    if job.hired_professional_id == Some(professional_id) {
        if job.lifecycle_status == LifecycleStatus::Canceled {
            return DerivedLabel::Eliminada;
        }
        return engagement_label(job, signals).unwrap_or(DerivedLabel::Aceptado);
    }

    if job.lifecycle_status.is_closed() {
        return DerivedLabel::Cerrada;
    }

    if job.lifecycle_status.is_taken() {
        return DerivedLabel::Perdida;
    }

    open_job_label(job, signals, professional_id)
}

// Rules shared by the client and the winning professional once someone is
// engaged: rated, awaiting rating, validating, executing, accepted.
fn engagement_label(job: &Job, signals: &StatusSignals) -> Option<DerivedLabel> {
    let status = job.lifecycle_status;

    if status == LifecycleStatus::Rated
        || (status == LifecycleStatus::Completed && job.client_finished && signals.has_rating)
    {
        return Some(DerivedLabel::Terminado);
    }

    if status == LifecycleStatus::Completed && job.client_finished {
        return Some(DerivedLabel::Valoracion);
    }

    if job.pro_finished && !job.client_finished {
        return Some(DerivedLabel::Validando);
    }

    if status == LifecycleStatus::InProgress && job.tracking_status == TrackingStatus::Started {
        return Some(DerivedLabel::EnEjecucion);
    }

    if status == LifecycleStatus::InProgress || job.has_offer_in(OfferStatus::Accepted) {
        return Some(DerivedLabel::Aceptado);
    }

    None
}

fn open_job_label(job: &Job, signals: &StatusSignals, viewer: Uuid) -> DerivedLabel {
    match job.offer_by_pro(viewer).map(|offer| offer.status) {
        None if signals.has_conversation_with(viewer) => DerivedLabel::Contactada,
        None => DerivedLabel::Abierta,
        Some(OfferStatus::Rejected) => DerivedLabel::Rechazada,
        Some(OfferStatus::Pending) => DerivedLabel::Presupuestada,
        Some(OfferStatus::Accepted) => DerivedLabel::Aceptado,
    }
}

fn participants(job: &Job, signals: &StatusSignals) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    let candidates = job
        .offers
        .iter()
        .map(|offer| offer.pro_id)
        .chain(signals.interactions.iter().map(|i| i.user_id))
        .chain(signals.conversations.iter().map(|c| c.professional_id))
        .chain(job.hired_professional_id);

    candidates
        .filter(|id| *id != job.client_id)
        .filter(|id| seen.insert(*id))
        .collect()
}
