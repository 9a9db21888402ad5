use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::errors::ClientError;

/// User shape returned by the login endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub external_user_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub tenant_id: Option<String>,
}

/// Payload posted to the login endpoint
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub external_user_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub tenant_id: Option<String>,
}

/// Best-effort de-duplication of login syncs
///
/// An in-memory last-sync timestamp plus an in-flight flag guarding a single
/// async call. Racing callers only cost a redundant network request; this is
/// not a correctness mechanism.
pub struct SyncGuard {
    cooldown: Duration,
    in_flight: AtomicBool,
    last_sync: Mutex<Option<Instant>>,
}

impl SyncGuard {
    /// Cooldown between syncs; the frontend default is five seconds
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            in_flight: AtomicBool::new(false),
            last_sync: Mutex::new(None),
        }
    }

    /// Whether a sync is currently in flight
    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Whether the last successful sync is still fresh
    pub fn in_cooldown(&self) -> bool {
        let last = self.last_sync.lock().expect("last_sync lock poisoned");
        last.map(|t| t.elapsed() < self.cooldown).unwrap_or(false)
    }

    /// Mark a sync as started; returns false if one was already in flight
    pub fn try_begin(&self) -> bool {
        !self.in_flight.swap(true, Ordering::SeqCst)
    }

    /// Mark the in-flight sync as finished, recording success for cooldown
    pub fn finish(&self, success: bool) {
        if success {
            let mut last = self.last_sync.lock().expect("last_sync lock poisoned");
            *last = Some(Instant::now());
        }
        self.in_flight.store(false, Ordering::SeqCst);
    }

    /// Forget the sync history (logout, forced refresh)
    pub fn clear(&self) {
        let mut last = self.last_sync.lock().expect("last_sync lock poisoned");
        *last = None;
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Client for the login-sync flow with cached-user de-duplication
pub struct UserSyncClient {
    api: ApiClient,
    login_path: String,
    guard: SyncGuard,
    current: Mutex<Option<UserProfile>>,
}

impl UserSyncClient {
    pub fn new(api: ApiClient, login_path: impl Into<String>, cooldown: Duration) -> Self {
        Self {
            api,
            login_path: login_path.into(),
            guard: SyncGuard::new(cooldown),
            current: Mutex::new(None),
        }
    }

    /// The most recently synced user, if any
    pub fn current_user(&self) -> Option<UserProfile> {
        self.current.lock().expect("current lock poisoned").clone()
    }

    /// Sync the user with the backend, de-duplicating redundant calls
    ///
    /// Returns the cached user without a network call when a sync is already
    /// in flight, or when the previous sync is within the cooldown window and
    /// produced a user. `force` bypasses both checks.
    pub async fn sync_user(
        &self,
        payload: &LoginPayload,
        force: bool,
    ) -> Result<Option<UserProfile>, ClientError> {
        if !force {
            if self.guard.in_flight() {
                tracing::debug!("Login sync already in flight, returning cached user");
                return Ok(self.current_user());
            }
            if self.guard.in_cooldown() && self.current_user().is_some() {
                tracing::debug!("Login sync within cooldown, returning cached user");
                return Ok(self.current_user());
            }
        }

        if !self.guard.try_begin() && !force {
            // Lost the flag race to a concurrent caller
            return Ok(self.current_user());
        }

        let result = self.api.post::<UserProfile, _>(&self.login_path, payload).await;
        match result {
            Ok(user) => {
                *self.current.lock().expect("current lock poisoned") = Some(user.clone());
                self.guard.finish(true);
                Ok(Some(user))
            }
            Err(err) => {
                self.guard.finish(false);
                Err(err)
            }
        }
    }

    /// Drop the cached user and sync history (logout)
    pub fn clear(&self) {
        *self.current.lock().expect("current lock poisoned") = None;
        self.guard.clear();
    }
}
