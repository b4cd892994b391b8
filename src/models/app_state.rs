use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::config::SESSION_MAX_AGE_DAYS;
use crate::models::store::Store;

/// One signed-in browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: u64,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: u64) -> Self {
        Session {
            user_id,
            issued_at: Utc::now(),
        }
    }

    /// Sessions live as long as the cookie that carries them.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at >= Duration::days(SESSION_MAX_AGE_DAYS)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<Store>>,
    /// Where `store` is persisted after every change.
    pub data_file: PathBuf,
    /// Session id -> session.
    pub sessions: Arc<Mutex<HashMap<String, Session>>>,
    /// Session id -> pending flash messages.
    pub flash_store: Arc<Mutex<HashMap<String, Vec<String>>>>,
    pub public_base_url: String,
    pub custom_css: Option<String>,
}

impl AppState {
    pub fn new(store: Store, data_file: PathBuf, public_base_url: String) -> Self {
        AppState {
            store: Arc::new(Mutex::new(store)),
            data_file,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            flash_store: Arc::new(Mutex::new(HashMap::new())),
            public_base_url,
            custom_css: None,
        }
    }

    pub fn open_session(&self, sid: impl Into<String>, user_id: u64) {
        self.sessions
            .lock()
            .unwrap()
            .insert(sid.into(), Session::new(user_id));
    }

    /// User behind `sid`, unless the session has expired.
    pub fn session_user(&self, sid: &str) -> Option<u64> {
        let now = Utc::now();
        self.sessions
            .lock()
            .unwrap()
            .get(sid)
            .filter(|s| !s.is_expired(now))
            .map(|s| s.user_id)
    }

    pub fn close_session(&self, sid: &str) {
        self.sessions.lock().unwrap().remove(sid);
        self.flash_store.lock().unwrap().remove(sid);
    }

    /// Drops expired sessions and any flash messages not tied to a live
    /// session. Returns how many sessions were dropped.
    pub fn prune_sessions(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        self.flash_store
            .lock()
            .unwrap()
            .retain(|sid, _| sessions.contains_key(sid));
        before - sessions.len()
    }
}
