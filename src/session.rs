use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::participant::ParticipantForm;
use crate::viewmodel::{NoticeLevel, ViewState};

const FLASH_KEY: &str = "flash";
const VIEW_STATE_KEY: &str = "view_state";
const ADD_DRAFT_KEY: &str = "add_draft";

/// One-shot notification carried across a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: String,
    pub message: String,
}

/// Cookie-backed session used for flash notices and per-client view state.
pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(false)
        .cookie_http_only(true)
        .build()
}

pub fn set_flash(session: &Session, level: NoticeLevel, message: impl Into<String>) {
    let kind = match level {
        NoticeLevel::Success => "success",
        NoticeLevel::Error => "error",
    };
    let flash = Flash {
        kind: kind.to_string(),
        message: message.into(),
    };
    if let Err(e) = session.insert(FLASH_KEY, flash) {
        log::warn!("Failed to store flash message: {}", e);
    }
}

pub fn take_flash(session: &Session) -> Option<Flash> {
    let flash = session.get::<Flash>(FLASH_KEY).unwrap_or(None);
    if flash.is_some() {
        session.remove(FLASH_KEY);
    }
    flash
}

pub fn load_view_state(session: &Session) -> ViewState {
    session
        .get::<ViewState>(VIEW_STATE_KEY)
        .unwrap_or(None)
        .unwrap_or_default()
}

pub fn save_view_state(session: &Session, state: &ViewState) -> Result<(), AppError> {
    session
        .insert(VIEW_STATE_KEY, state)
        .map_err(|e| AppError::Session(format!("Failed to store view state: {}", e)))
}

/// Add-dialog input kept after a rejected submit so the form can be refilled.
pub fn take_add_draft(session: &Session) -> ParticipantForm {
    let draft = session.get::<ParticipantForm>(ADD_DRAFT_KEY).unwrap_or(None);
    if draft.is_some() {
        session.remove(ADD_DRAFT_KEY);
    }
    draft.unwrap_or_default()
}

pub fn keep_add_draft(session: &Session, form: &ParticipantForm) {
    if let Err(e) = session.insert(ADD_DRAFT_KEY, form) {
        log::warn!("Failed to store add draft: {}", e);
    }
}
