//! Per-session state
//!
//! Each browser session owns an explicit `Session` created on start and
//! removed on end. Handlers reach it through `SessionStore` in `AppState`;
//! nothing is kept in process-wide globals.

use chrono::{DateTime, Utc};
use pdscan_common::{Error, ModalitySet, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Maximum display name length accepted by the form
pub const MAX_NAME_CHARS: usize = 30;

/// Maximum age accepted by the form
pub const MAX_AGE: u16 = 120;

/// User information collected by the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    /// Wider than the accepted range so `validate` reports out-of-range ages
    #[serde(default)]
    pub age: u16,
    #[serde(default)]
    pub email: String,
}

impl UserProfile {
    /// Basic type/length checks; the email is only checked when present
    pub fn validate(&self) -> Result<()> {
        if self.name.chars().count() > MAX_NAME_CHARS {
            return Err(Error::InvalidInput(format!(
                "Name must be at most {} characters",
                MAX_NAME_CHARS
            )));
        }
        if self.age > MAX_AGE {
            return Err(Error::InvalidInput(format!(
                "Age must be between 0 and {}",
                MAX_AGE
            )));
        }
        if !self.email.is_empty() && !looks_like_email(&self.email) {
            return Err(Error::InvalidInput(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }
        Ok(())
    }
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

/// State held for one browser session
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub profile: UserProfile,
    pub modalities: ModalitySet,
    /// Last rendered report, cleared whenever a new image is classified
    pub report_path: Option<PathBuf>,
    pub faq_visible: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn new(profile: UserProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile,
            modalities: ModalitySet::new(),
            report_path: None,
            faq_visible: false,
            created_at: Utc::now(),
        }
    }

    /// Attach a rendered report only if it was built from the current results
    ///
    /// Returns `false` and leaves the session unchanged when an upload has
    /// replaced any result since `rendered_from` was captured.
    pub fn attach_report(&mut self, rendered_from: &ModalitySet, path: PathBuf) -> bool {
        if &self.modalities != rendered_from {
            return false;
        }
        self.report_path = Some(path);
        true
    }
}

/// Sessions keyed by id
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session; the profile must pass validation
    pub async fn create(&self, profile: UserProfile) -> Result<Uuid> {
        profile.validate()?;
        let session = Session::new(profile);
        let id = session.id;
        self.sessions.write().await.insert(id, session);
        info!("Session {} started", id);
        Ok(id)
    }

    /// Snapshot of a session
    pub async fn get(&self, id: Uuid) -> Result<Session> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| session_not_found(id))
    }

    /// Mutate a session in place and return the closure's result
    pub async fn update<F, R>(&self, id: Uuid, f: F) -> Result<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
        Ok(f(session))
    }

    /// End a session, returning its final state
    pub async fn remove(&self, id: Uuid) -> Result<Session> {
        let removed = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| session_not_found(id))?;
        info!("Session {} ended", id);
        Ok(removed)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn session_not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Session {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdscan_common::fusion::ModalityResult;
    use pdscan_common::{Confidence, Modality};

    fn profile() -> UserProfile {
        UserProfile {
            name: "Ada".to_string(),
            age: 64,
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_profile_validation() {
        assert!(profile().validate().is_ok());
        assert!(UserProfile::default().validate().is_ok());

        let long_name = UserProfile { name: "x".repeat(31), ..profile() };
        assert!(long_name.validate().is_err());

        let old = UserProfile { age: 121, ..profile() };
        assert!(old.validate().is_err());

        for bad in ["ada", "ada@", "@example.com", "ada @example.com", "ada@localhost"] {
            let p = UserProfile { email: bad.to_string(), ..profile() };
            assert!(p.validate().is_err(), "{} should be rejected", bad);
        }
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = SessionStore::new();
        let id = store.create(profile()).await.unwrap();
        assert_eq!(store.len().await, 1);

        store
            .update(id, |s| {
                s.modalities.record(ModalityResult {
                    modality: Modality::Mri,
                    confidence: Confidence::new(0.7).unwrap(),
                });
                s.faq_visible = true;
            })
            .await
            .unwrap();

        let snapshot = store.get(id).await.unwrap();
        assert!(snapshot.faq_visible);
        assert_eq!(snapshot.modalities.results().len(), 1);

        store.remove(id).await.unwrap();
        assert!(store.is_empty().await);
        assert!(matches!(store.get(id).await, Err(Error::NotFound(_))));
        assert!(store.remove(id).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_profile_creates_nothing() {
        let store = SessionStore::new();
        let result = store
            .create(UserProfile { age: 200, ..profile() })
            .await;
        assert!(result.is_err());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_report_from_replaced_results_is_not_attached() {
        let store = SessionStore::new();
        let id = store.create(profile()).await.unwrap();
        let mri = |v: f64| ModalityResult {
            modality: Modality::Mri,
            confidence: Confidence::new(v).unwrap(),
        };

        store.update(id, |s| s.modalities.record(mri(0.7))).await.unwrap();
        let rendered_from = store.get(id).await.unwrap().modalities;

        // Upload lands while the report is being rendered
        store.update(id, |s| s.modalities.record(mri(0.2))).await.unwrap();

        let attached = store
            .update(id, |s| s.attach_report(&rendered_from, PathBuf::from("/tmp/a.pdf")))
            .await
            .unwrap();
        assert!(!attached);
        assert!(store.get(id).await.unwrap().report_path.is_none());

        let current = store.get(id).await.unwrap().modalities;
        let attached = store
            .update(id, |s| s.attach_report(&current, PathBuf::from("/tmp/b.pdf")))
            .await
            .unwrap();
        assert!(attached);
        assert_eq!(
            store.get(id).await.unwrap().report_path,
            Some(PathBuf::from("/tmp/b.pdf"))
        );
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.create(profile()).await.unwrap();
        let b = store.create(profile()).await.unwrap();
        store.update(a, |s| s.faq_visible = true).await.unwrap();
        assert!(!store.get(b).await.unwrap().faq_visible);
    }
}
