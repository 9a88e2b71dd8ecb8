//! Attendance view-model.
//!
//! Owns the in-memory roster mirrored from the document store and exposes
//! derived views (search, metrics, reports, export) plus the mutation
//! operations. Per-client UI state (search text, which dialog is open) lives
//! in [`ViewState`] and is passed in by the caller.
//!
//! Every snapshot replaces the roster wholesale. In [`SyncMode::Subscribe`]
//! writes never touch the local roster; the change feed brings them back.
//! [`SyncMode::FetchOnce`] has no feed, so successful writes are applied
//! locally exactly as the store merged them.

pub mod messages;
pub mod state;
pub mod sync;

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{broadcast, watch};

use crate::models::participant::export::{self, ExportError};
use crate::models::participant::query::{self, ReportFilter};
use crate::models::participant::{
    Asistencia, Color, Metrics, Participant, ParticipantForm, TakenKeys, ValidationError,
    attendance_patch, validate_new_against,
};
use crate::store::{DocumentStore, Snapshot, StoreError};

pub use state::{Modal, ViewState};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Continuous push subscription; the feed is the only writer of local state.
    Subscribe,
    /// One read at startup, optimistic local updates after each write.
    FetchOnce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Pushed to observers (the WebSocket channel, tests).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    Snapshot { total: usize, presentes: usize },
    Notice(Notice),
}

impl ViewEvent {
    /// Whether every connected browser should see this event. Notices answer
    /// one client's action and reach it through its own session flash.
    pub fn is_shared(&self) -> bool {
        matches!(self, ViewEvent::Snapshot { .. })
    }
}

#[derive(Debug)]
pub enum ViewModelError {
    Validation(ValidationError),
    Store(StoreError),
    NotFound(String),
    /// A confirm/choose step arrived with no matching dialog open.
    NoPendingAction,
    EmptyExport,
    Export(ExportError),
}

impl fmt::Display for ViewModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewModelError::Validation(e) => write!(f, "{e}"),
            ViewModelError::Store(e) => write!(f, "{e}"),
            ViewModelError::NotFound(id) => write!(f, "Participante {id} no encontrado"),
            ViewModelError::NoPendingAction => write!(f, "No hay ninguna acción pendiente"),
            ViewModelError::EmptyExport => write!(f, "No hay participantes para exportar."),
            ViewModelError::Export(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ViewModelError {}

impl From<ValidationError> for ViewModelError {
    fn from(e: ValidationError) -> Self {
        ViewModelError::Validation(e)
    }
}

impl From<StoreError> for ViewModelError {
    fn from(e: StoreError) -> Self {
        ViewModelError::Store(e)
    }
}

impl From<ExportError> for ViewModelError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::Empty => ViewModelError::EmptyExport,
            other => ViewModelError::Export(other),
        }
    }
}

/// Counts shown under the roster list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListSummary {
    pub mostrando: usize,
    pub total: usize,
    pub presentes: usize,
    pub ausentes: usize,
}

/// A rendered export ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
struct RosterState {
    participants: Vec<Participant>,
    /// Name and phone of stored documents that failed to decode.
    withheld: Vec<TakenKeys>,
    last_error: Option<String>,
}

pub struct AttendanceViewModel {
    store: Arc<dyn DocumentStore>,
    mode: SyncMode,
    roster: RwLock<RosterState>,
    ready: watch::Sender<bool>,
    events: broadcast::Sender<ViewEvent>,
}

impl AttendanceViewModel {
    pub fn new(store: Arc<dyn DocumentStore>, mode: SyncMode) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (ready, _) = watch::channel(false);
        AttendanceViewModel {
            store,
            mode,
            roster: RwLock::new(RosterState::default()),
            ready,
            events,
        }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    fn read_roster(&self) -> RwLockReadGuard<'_, RosterState> {
        self.roster.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_roster(&self) -> RwLockWriteGuard<'_, RosterState> {
        self.roster.write().unwrap_or_else(|e| e.into_inner())
    }

    // ----- observation -----

    /// True once the repair pass and the first snapshot (or fetch) are done.
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    pub async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        let _ = rx.wait_for(|ready| *ready).await;
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    /// Most recent sync error, cleared by the next good snapshot.
    pub fn last_error(&self) -> Option<String> {
        self.read_roster().last_error.clone()
    }

    fn emit(&self, event: ViewEvent) {
        // No observers is fine.
        let _ = self.events.send(event);
    }

    fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        self.emit(ViewEvent::Notice(Notice {
            level,
            message: message.into(),
        }));
    }

    fn emit_snapshot(&self) {
        let (total, presentes) = {
            let roster = self.read_roster();
            (
                roster.participants.len(),
                roster.participants.iter().filter(|p| p.is_present()).count(),
            )
        };
        self.emit(ViewEvent::Snapshot { total, presentes });
    }

    // ----- reconciliation -----

    /// Replace the roster with `snapshot`. Undecodable documents are left out
    /// of the roster but still reserve their name and phone.
    pub fn apply_snapshot(&self, snapshot: Snapshot) {
        let mut participants = Vec::with_capacity(snapshot.len());
        let mut withheld = Vec::new();
        for doc in snapshot.iter() {
            match Participant::from_fields(&doc.id, &doc.data) {
                Ok(p) => participants.push(p),
                Err(reason) => {
                    log::warn!("Skipping document {}: {}", doc.id, reason);
                    withheld.push(TakenKeys::from_fields(&doc.data));
                }
            }
        }
        query::sort_by_nombre(&mut participants);

        {
            let mut roster = self.write_roster();
            roster.participants = participants;
            roster.withheld = withheld;
            roster.last_error = None;
        }
        self.ready.send_replace(true);
        self.emit_snapshot();
    }

    /// Record a feed or read failure. The roster keeps its last good state.
    pub fn apply_sync_error(&self, err: &StoreError) {
        log::warn!("Roster sync error: {}", err);
        self.write_roster().last_error = Some(err.to_string());
        self.notify(NoticeLevel::Error, messages::ERROR_SINCRONIZACION);
    }

    /// Full read of the collection, replacing the roster.
    pub async fn refresh(&self) -> Result<(), ViewModelError> {
        match self.store.read_all().await {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                Ok(())
            }
            Err(e) => {
                self.apply_sync_error(&e);
                Err(e.into())
            }
        }
    }

    fn apply_local(&self, id: &str, asistencia: Asistencia, color: Option<Color>) {
        {
            let mut roster = self.write_roster();
            if let Some(p) = roster.participants.iter_mut().find(|p| p.id == id) {
                p.asistencia = asistencia;
                match (asistencia, color) {
                    (Asistencia::NoActivo, _) => p.color = None,
                    (Asistencia::Activo, Some(c)) => p.color = Some(c),
                    (Asistencia::Activo, None) => {}
                }
            }
        }
        self.emit_snapshot();
    }

    // ----- derived views -----

    /// Whole roster, ordered by name.
    pub fn roster(&self) -> Vec<Participant> {
        self.read_roster().participants.clone()
    }

    pub fn find(&self, id: &str) -> Option<Participant> {
        self.read_roster()
            .participants
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn search(&self, busqueda: &str) -> Vec<Participant> {
        query::search(&self.read_roster().participants, busqueda)
    }

    /// Roster rows for a client's current search.
    pub fn visible(&self, state: &ViewState) -> Vec<Participant> {
        self.search(&state.busqueda)
    }

    pub fn list_summary(&self, state: &ViewState) -> ListSummary {
        let roster = self.read_roster();
        let shown = query::search(&roster.participants, &state.busqueda);
        let presentes = shown.iter().filter(|p| p.is_present()).count();
        ListSummary {
            mostrando: shown.len(),
            total: roster.participants.len(),
            presentes,
            ausentes: shown.len() - presentes,
        }
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::compute(&self.read_roster().participants)
    }

    pub fn report(&self, filter: &ReportFilter) -> Vec<Participant> {
        filter.apply(&self.read_roster().participants)
    }

    pub fn tipo_options(&self) -> Vec<String> {
        query::tipo_options(&self.read_roster().participants)
    }

    pub fn departamento_options(&self) -> Vec<String> {
        query::departamento_options(&self.read_roster().participants)
    }

    /// CSV of the filtered report, named for `today`. An empty result is
    /// refused and no file is produced.
    pub fn export(&self, filter: &ReportFilter, today: NaiveDate) -> Result<ExportFile, ViewModelError> {
        let rows = self.report(filter);
        match export::to_csv(&rows) {
            Ok(bytes) => Ok(ExportFile {
                file_name: export::file_name(today),
                bytes,
            }),
            Err(e) => {
                self.notify(NoticeLevel::Error, e.to_string());
                Err(e.into())
            }
        }
    }

    // ----- mutations -----

    /// Validate and submit a new participant. Returns the store-assigned id;
    /// the record itself shows up with the next sync.
    pub async fn add_participant(&self, form: &ParticipantForm) -> Result<String, ViewModelError> {
        let new = {
            let roster = self.read_roster();
            validate_new_against(form, &roster.participants, &roster.withheld)
        };
        let new = match new {
            Ok(n) => n,
            Err(e) => {
                self.notify(NoticeLevel::Error, e.to_string());
                return Err(e.into());
            }
        };

        match self.store.create(new.to_fields()).await {
            Ok(id) => {
                log::info!("Participant '{}' added as {}", new.nombre, id);
                self.notify(NoticeLevel::Success, messages::PARTICIPANTE_AGREGADO);
                if self.mode == SyncMode::FetchOnce {
                    let _ = self.refresh().await;
                }
                Ok(id)
            }
            Err(e) => {
                log::error!("Failed to add participant '{}': {}", new.nombre, e);
                self.notify(NoticeLevel::Error, messages::ERROR_AGREGAR);
                Err(e.into())
            }
        }
    }

    /// Set a participant present, tagging `color` in the same write.
    pub async fn mark(&self, id: &str, color: Option<Color>) -> Result<(), ViewModelError> {
        if self.find(id).is_none() {
            return Err(ViewModelError::NotFound(id.to_string()));
        }
        let patch = attendance_patch(Asistencia::Activo, color);
        match self.store.update_fields(id, patch).await {
            Ok(()) => {
                if self.mode == SyncMode::FetchOnce {
                    self.apply_local(id, Asistencia::Activo, color);
                }
                self.notify(NoticeLevel::Success, messages::ASISTENCIA_MARCADA);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to mark attendance for {}: {}", id, e);
                self.notify(NoticeLevel::Error, messages::ERROR_MARCAR);
                Err(e.into())
            }
        }
    }

    /// Reset to not-present and clear the color. Only reachable through the
    /// confirmation step.
    async fn unmark(&self, id: &str) -> Result<(), ViewModelError> {
        if self.find(id).is_none() {
            return Err(ViewModelError::NotFound(id.to_string()));
        }
        let patch = attendance_patch(Asistencia::NoActivo, None);
        match self.store.update_fields(id, patch).await {
            Ok(()) => {
                if self.mode == SyncMode::FetchOnce {
                    self.apply_local(id, Asistencia::NoActivo, None);
                }
                self.notify(NoticeLevel::Success, messages::ASISTENCIA_ELIMINADA);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to unmark attendance for {}: {}", id, e);
                self.notify(NoticeLevel::Error, messages::ERROR_DESMARCAR);
                Err(e.into())
            }
        }
    }

    // ----- dialog flow -----

    pub fn set_search(&self, state: &mut ViewState, busqueda: &str) {
        state.busqueda = busqueda.to_string();
    }

    pub fn open_add(&self, state: &mut ViewState) {
        state.modal = Modal::AddParticipant;
    }

    /// Submit the add dialog. The dialog closes only on success.
    pub async fn submit_add(
        &self,
        state: &mut ViewState,
        form: &ParticipantForm,
    ) -> Result<String, ViewModelError> {
        let id = self.add_participant(form).await?;
        state.modal = Modal::None;
        Ok(id)
    }

    /// Start marking: opens the color picker for `id`.
    pub fn begin_mark(&self, state: &mut ViewState, id: &str) -> Result<(), ViewModelError> {
        let p = self
            .find(id)
            .ok_or_else(|| ViewModelError::NotFound(id.to_string()))?;
        state.modal = Modal::PickColor {
            id: p.id,
            nombre: p.nombre,
        };
        Ok(())
    }

    /// Finish marking with the chosen color; status and color go out in one write.
    pub async fn choose_color(&self, state: &mut ViewState, color: Color) -> Result<(), ViewModelError> {
        let Modal::PickColor { id, .. } = state.modal.clone() else {
            return Err(ViewModelError::NoPendingAction);
        };
        state.modal = Modal::None;
        self.mark(&id, Some(color)).await
    }

    /// Ask for confirmation before unmarking `id`.
    pub fn request_unmark(&self, state: &mut ViewState, id: &str) -> Result<(), ViewModelError> {
        let p = self
            .find(id)
            .ok_or_else(|| ViewModelError::NotFound(id.to_string()))?;
        state.modal = Modal::ConfirmUnmark {
            id: p.id,
            nombre: p.nombre,
        };
        Ok(())
    }

    pub async fn confirm_unmark(&self, state: &mut ViewState) -> Result<(), ViewModelError> {
        let Modal::ConfirmUnmark { id, .. } = state.modal.clone() else {
            return Err(ViewModelError::NoPendingAction);
        };
        state.modal = Modal::None;
        self.unmark(&id).await
    }

    pub fn cancel(&self, state: &mut ViewState) {
        state.modal = Modal::None;
    }
}
