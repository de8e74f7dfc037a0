//! Language context: active locale, translation and text direction.
//!
//! One `LanguageContext` is built at startup and handed to every consumer.
//! It starts on the built-in default locale, switches once to the persisted
//! preference when [`LanguageContext::initialize`] completes, and afterwards
//! only changes through [`LanguageContext::change_locale`]. Consumers that
//! need to re-render subscribe to the snapshot feed.

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::i18n::{self, Locale};
use crate::store::SettingsStore;

/// Storage key of the persisted language preference.
pub const LANGUAGE_KEY: &str = "language";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LanguagePhase {
    /// The persisted preference has not been read yet.
    DefaultLocale,
    /// The initial read completed, or the user picked a locale.
    ResolvedLocale,
}

/// What consumers render from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageSnapshot {
    pub code: String,
    pub phase: LanguagePhase,
}

impl LanguageSnapshot {
    pub fn is_rtl(&self) -> bool {
        self.code == Locale::RTL.code()
    }

    pub fn translate<'a>(&self, key: &'a str) -> &'a str {
        i18n::translate(&self.code, key)
    }
}

pub struct LanguageContext<S> {
    store: S,
    state: watch::Sender<LanguageSnapshot>,
}

impl<S: SettingsStore> LanguageContext<S> {
    pub fn new(store: S) -> Self {
        let (state, _) = watch::channel(LanguageSnapshot {
            code: Locale::DEFAULT.code().to_string(),
            phase: LanguagePhase::DefaultLocale,
        });
        Self { store, state }
    }

    /// Adopt the persisted locale, if one was saved.
    ///
    /// Runs once; later calls return immediately. A failed read keeps the
    /// default. A locale picked by the user while the read was in flight
    /// takes precedence over the stored value.
    pub async fn initialize(&self) {
        if self.phase() == LanguagePhase::ResolvedLocale {
            debug!("language already resolved, skipping initial read");
            return;
        }

        let saved = match self.store.get(LANGUAGE_KEY).await {
            Ok(Some(code)) if !code.trim().is_empty() => Some(code),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "failed to read persisted language, keeping default");
                None
            }
        };

        let adopted = self.state.send_if_modified(|snapshot| {
            if snapshot.phase == LanguagePhase::ResolvedLocale {
                return false;
            }
            snapshot.phase = LanguagePhase::ResolvedLocale;
            if let Some(code) = saved.as_deref() {
                snapshot.code = code.to_string();
            }
            true
        });

        if adopted {
            info!(locale = %self.locale(), "language resolved");
        } else {
            debug!("language changed during initial read, persisted value ignored");
        }
    }

    /// Switch the active locale and persist it.
    ///
    /// The in-memory switch happens before the write starts. Write failures
    /// are logged only; the displayed locale is not rolled back.
    pub async fn change_locale(&self, code: &str) {
        self.state.send_modify(|snapshot| {
            snapshot.code = code.to_string();
            snapshot.phase = LanguagePhase::ResolvedLocale;
        });

        if Locale::from_code(code).is_none() {
            debug!(locale = %code, "unsupported locale selected, lookups will return raw keys");
        }
        info!(locale = %code, rtl = self.is_right_to_left(), "language changed");

        if let Err(e) = self.store.set(LANGUAGE_KEY, code).await {
            warn!(locale = %code, error = %e, "failed to persist language preference");
        }
    }

    pub fn translate<'a>(&self, key: &'a str) -> &'a str {
        self.state.borrow().translate(key)
    }

    pub fn locale(&self) -> String {
        self.state.borrow().code.clone()
    }

    /// The active locale when it is one of the supported ones.
    pub fn supported_locale(&self) -> Option<Locale> {
        Locale::from_code(&self.state.borrow().code)
    }

    pub fn is_right_to_left(&self) -> bool {
        self.state.borrow().is_rtl()
    }

    pub fn phase(&self) -> LanguagePhase {
        self.state.borrow().phase
    }

    pub fn snapshot(&self) -> LanguageSnapshot {
        self.state.borrow().clone()
    }

    /// Change feed for consumers that re-render on locale switches.
    pub fn subscribe(&self) -> watch::Receiver<LanguageSnapshot> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::store::{SqliteSettingsStore, StoreError};
    use std::future::Future;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn memory_store() -> SqliteSettingsStore {
        SqliteSettingsStore::new(Arc::new(db::open_in_memory().expect("in-memory db")))
    }

    /// Store whose reads and writes always fail.
    struct BrokenStore;

    impl SettingsStore for BrokenStore {
        fn get(
            &self,
            _key: &str,
        ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send {
            async { Err(StoreError::Backend("disk unavailable".into())) }
        }

        fn set(&self, _key: &str, _value: &str) -> impl Future<Output = Result<(), StoreError>> + Send {
            async { Err(StoreError::Backend("disk unavailable".into())) }
        }
    }

    /// Store whose reads wait until the test opens the gate.
    struct GatedStore {
        inner: SqliteSettingsStore,
        gate: Arc<Notify>,
    }

    impl SettingsStore for GatedStore {
        fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send {
            let gate = self.gate.clone();
            let read = self.inner.get(key);
            async move {
                gate.notified().await;
                read.await
            }
        }

        fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send {
            self.inner.set(key, value)
        }
    }

    #[tokio::test]
    async fn fresh_load_without_preference_uses_default() {
        let ctx = LanguageContext::new(memory_store());
        ctx.initialize().await;

        assert_eq!(ctx.locale(), "en");
        assert_eq!(ctx.phase(), LanguagePhase::ResolvedLocale);
        assert_eq!(ctx.translate("home"), "Home");
        assert!(!ctx.is_right_to_left());
    }

    #[tokio::test]
    async fn changed_locale_survives_restart() {
        let store = memory_store();
        {
            let ctx = LanguageContext::new(store.clone());
            ctx.initialize().await;
            ctx.change_locale("ar").await;
        }

        let restarted = LanguageContext::new(store);
        assert_eq!(restarted.locale(), "en");
        restarted.initialize().await;
        assert_eq!(restarted.locale(), "ar");
        assert!(restarted.is_right_to_left());
        assert_eq!(restarted.translate("home"), "الرئيسية");
    }

    #[tokio::test]
    async fn rtl_tracks_active_locale() {
        let ctx = LanguageContext::new(memory_store());
        ctx.initialize().await;

        ctx.change_locale("ar").await;
        assert!(ctx.is_right_to_left());
        ctx.change_locale("en").await;
        assert!(!ctx.is_right_to_left());
        ctx.change_locale("fr").await;
        assert!(!ctx.is_right_to_left());
    }

    #[tokio::test]
    async fn unsupported_locale_is_stored_and_translates_to_keys() {
        let store = memory_store();
        let ctx = LanguageContext::new(store.clone());
        ctx.change_locale("fr").await;

        assert_eq!(ctx.locale(), "fr");
        assert_eq!(ctx.supported_locale(), None);
        assert_eq!(ctx.translate("home"), "home");
        assert_eq!(
            store.get(LANGUAGE_KEY).await.expect("get"),
            Some("fr".to_string())
        );
    }

    #[tokio::test]
    async fn empty_persisted_value_keeps_default() {
        let store = memory_store();
        store.set(LANGUAGE_KEY, "").await.expect("set");

        let ctx = LanguageContext::new(store);
        ctx.initialize().await;
        assert_eq!(ctx.locale(), "en");
        assert_eq!(ctx.phase(), LanguagePhase::ResolvedLocale);
    }

    #[tokio::test]
    async fn read_failure_keeps_default_silently() {
        let ctx = LanguageContext::new(BrokenStore);
        ctx.initialize().await;
        assert_eq!(ctx.locale(), "en");
        assert_eq!(ctx.phase(), LanguagePhase::ResolvedLocale);
    }

    #[tokio::test]
    async fn write_failure_does_not_roll_back() {
        let ctx = LanguageContext::new(BrokenStore);
        ctx.change_locale("ar").await;
        assert_eq!(ctx.locale(), "ar");
        assert_eq!(ctx.translate("refund"), "استرداد");
    }

    #[tokio::test]
    async fn consumers_see_default_until_read_resolves() {
        let inner = memory_store();
        inner.set(LANGUAGE_KEY, "ar").await.expect("seed");
        let gate = Arc::new(Notify::new());
        let ctx = Arc::new(LanguageContext::new(GatedStore {
            inner,
            gate: gate.clone(),
        }));
        let mut feed = ctx.subscribe();

        let init = tokio::spawn({
            let ctx = ctx.clone();
            async move { ctx.initialize().await }
        });
        tokio::task::yield_now().await;

        assert_eq!(ctx.locale(), "en");
        assert_eq!(ctx.phase(), LanguagePhase::DefaultLocale);

        gate.notify_one();
        init.await.expect("initialize task");

        feed.changed().await.expect("snapshot update");
        let snapshot = feed.borrow_and_update().clone();
        assert_eq!(snapshot.code, "ar");
        assert_eq!(snapshot.phase, LanguagePhase::ResolvedLocale);
        assert!(snapshot.is_rtl());
    }

    #[tokio::test]
    async fn user_choice_during_initial_read_wins() {
        let inner = memory_store();
        inner.set(LANGUAGE_KEY, "ar").await.expect("seed");
        let gate = Arc::new(Notify::new());
        let ctx = Arc::new(LanguageContext::new(GatedStore {
            inner,
            gate: gate.clone(),
        }));

        let init = tokio::spawn({
            let ctx = ctx.clone();
            async move { ctx.initialize().await }
        });
        tokio::task::yield_now().await;

        ctx.change_locale("en").await;
        gate.notify_one();
        init.await.expect("initialize task");

        assert_eq!(ctx.locale(), "en");
    }

    #[tokio::test]
    async fn initialize_runs_once() {
        let store = memory_store();
        let ctx = LanguageContext::new(store.clone());
        ctx.initialize().await;

        store.set(LANGUAGE_KEY, "ar").await.expect("external write");
        ctx.initialize().await;
        assert_eq!(ctx.locale(), "en");
    }
}
