//! EZ EATS Staff - app core
//!
//! Everything the staff front-end needs beneath its screens: localization
//! with a persisted language preference, phone sign-in, the order lists and
//! detail view, and manager-authorized refunds. The front-end talks to this
//! crate through [`invoke`] using the channel names listed there (the
//! `ezeats-staff` binary exposes the same channels over JSON lines).

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod commands;
pub mod config;
pub mod db;
pub mod diagnostics;
pub mod i18n;
pub mod language;
pub mod manager_auth;
pub mod navigation;
pub mod notify;
pub mod orders;
pub mod refunds;
pub mod sign_in;
pub mod store;

use config::AppConfig;
use db::DbState;
use language::LanguageContext;
use manager_auth::{AuthPhase, BcryptCodeValidator, ConfiguredValidator, FixedCodeValidator};
use navigation::{Route, RouteStack};
use notify::QueuedNotifier;
use orders::{CollapsibleSection, FixtureError, OrderBook};
use refunds::RefundDesk;
use sign_in::{OtpEntry, PhoneEntry, ResendTimer, SessionState};
use store::SqliteSettingsStore;

pub(crate) fn value_str(v: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = v.get(*key).and_then(|x| x.as_str()) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

pub(crate) fn value_i64(v: &Value, keys: &[&str]) -> Option<i64> {
    for key in keys {
        if let Some(n) = v.get(*key).and_then(|x| x.as_i64()) {
            return Some(n);
        }
    }
    None
}

/// State shared by every command.
pub struct AppState {
    pub config: AppConfig,
    pub language: Arc<LanguageContext<SqliteSettingsStore>>,
    pub orders: OrderBook,
    pub refunds: RefundDesk<ConfiguredValidator>,
    pub alerts: QueuedNotifier,
    pub nav: RouteStack,
    pub sessions: SessionState,
    pub phone: PhoneEntry,
    pub otp: OtpEntry,
    pub resend: ResendTimer,
    /// Item section of the order detail on screen, keyed by order id.
    pub items_section: Option<(String, CollapsibleSection)>,
}

impl AppState {
    pub fn new(config: AppConfig, db: Arc<DbState>) -> Result<Self, FixtureError> {
        let validator = match &config.manager_code_hash {
            Some(hash) => {
                info!("manager codes verified against configured bcrypt hash");
                ConfiguredValidator::Bcrypt(BcryptCodeValidator::from_hash(hash.clone()))
            }
            None => ConfiguredValidator::Fixed(FixedCodeValidator::new(
                config.manager_code.clone(),
                config.simulated_delay,
            )),
        };

        Ok(Self {
            language: Arc::new(LanguageContext::new(SqliteSettingsStore::new(db))),
            orders: OrderBook::bundled()?,
            refunds: RefundDesk::new(validator),
            alerts: QueuedNotifier::new(),
            nav: RouteStack::new(Route::PhoneNumber),
            sessions: SessionState::default(),
            phone: PhoneEntry::default(),
            otp: OtpEntry::default(),
            resend: ResendTimer::default(),
            items_section: None,
            config,
        })
    }

    /// Read the persisted language in the background. Screens render with
    /// the default locale until it lands.
    pub fn spawn_language_init(&self) -> tokio::task::JoinHandle<()> {
        let language = Arc::clone(&self.language);
        tokio::spawn(async move { language.initialize().await })
    }

    /// Dismiss the refund keypad once its order's detail screen is no longer
    /// on top, so entered digits never outlive the modal.
    pub(crate) fn close_offscreen_keypad(&mut self) {
        let Some(order_id) = self.refunds.order_id() else {
            return;
        };
        let on_screen = matches!(
            self.nav.current(),
            Route::OrderDetail { id } if id == order_id
        );
        if on_screen || self.refunds.flow().phase() == AuthPhase::Validating {
            return;
        }
        if let Err(e) = self.refunds.cancel() {
            warn!(error = %e, "failed to dismiss refund keypad");
        }
    }
}

/// Dispatch one front-end call.
///
/// | Channel                 | Payload                              |
/// |-------------------------|--------------------------------------|
/// | `settings:get-language` |                                      |
/// | `settings:set-language` | `"ar"` or `{ language }`             |
/// | `i18n:translate`        | `"key"` or `{ key }`                 |
/// | `i18n:get-strings`      |                                      |
/// | `orders:list`           | `{ tab?: "home" \| "ready", status? }` |
/// | `orders:open`           | `"#ORD-1021"` or `{ id }`            |
/// | `orders:get-detail`     | optional id, else the route's `id`   |
/// | `orders:toggle-items`   |                                      |
/// | `auth:set-phone`        | `{ countryCode?, number }`           |
/// | `auth:send-code`        |                                      |
/// | `auth:set-otp`          | `"1234"` or `{ code }`               |
/// | `auth:confirm-otp`      |                                      |
/// | `auth:resend-code`      |                                      |
/// | `auth:tick`             |                                      |
/// | `auth:get-session`      |                                      |
/// | `auth:logout`           |                                      |
/// | `refund:open`           | optional order id                    |
/// | `refund:append-digit`   | `7` or `{ digit }`                   |
/// | `refund:delete-last`    |                                      |
/// | `refund:clear`          |                                      |
/// | `refund:cancel`         |                                      |
/// | `refund:get-state`      |                                      |
/// | `refund:submit`         |                                      |
/// | `nav:current`           |                                      |
/// | `nav:back`              |                                      |
/// | `nav:open-language`     |                                      |
/// | `alerts:drain`          |                                      |
/// | `app:get-info`          |                                      |
pub async fn invoke(
    state: &mut AppState,
    channel: &str,
    payload: Option<Value>,
) -> Result<Value, String> {
    use commands::{auth, orders, refunds, settings, system};

    match channel {
        "settings:get-language" => settings::settings_get_language(state).await,
        "settings:set-language" => settings::settings_set_language(state, payload).await,
        "i18n:translate" => settings::i18n_translate(state, payload).await,
        "i18n:get-strings" => settings::i18n_get_strings(state).await,
        "orders:list" => orders::orders_list(state, payload).await,
        "orders:open" => orders::orders_open(state, payload).await,
        "orders:get-detail" => orders::orders_get_detail(state, payload).await,
        "orders:toggle-items" => orders::orders_toggle_items(state).await,
        "auth:set-phone" => auth::auth_set_phone(state, payload).await,
        "auth:send-code" => auth::auth_send_code(state).await,
        "auth:set-otp" => auth::auth_set_otp(state, payload).await,
        "auth:confirm-otp" => auth::auth_confirm_otp(state).await,
        "auth:resend-code" => auth::auth_resend_code(state).await,
        "auth:tick" => auth::auth_tick(state).await,
        "auth:get-session" => auth::auth_get_session(state).await,
        "auth:logout" => auth::auth_logout(state).await,
        "refund:open" => refunds::refund_open(state, payload).await,
        "refund:append-digit" => refunds::refund_append_digit(state, payload).await,
        "refund:delete-last" => refunds::refund_delete_last(state).await,
        "refund:clear" => refunds::refund_clear(state).await,
        "refund:cancel" => refunds::refund_cancel(state).await,
        "refund:get-state" => refunds::refund_get_state(state).await,
        "refund:submit" => refunds::refund_submit(state).await,
        "nav:current" => system::nav_current(state).await,
        "nav:back" => system::nav_back(state).await,
        "nav:open-language" => system::nav_open_language(state).await,
        "alerts:drain" => system::alerts_drain(state).await,
        "app:get-info" => system::app_get_info().await,
        other => {
            warn!(channel = %other, "unknown channel");
            Err(format!("unknown channel: {other}"))
        }
    }
}

/// Console + daily rolling file logging. Keep the returned guard alive for
/// the lifetime of the process; dropping it flushes the file writer.
pub fn init_logging(log_dir: &Path) -> WorkerGuard {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ezeats_staff_lib=debug"));

    // Prune old log files before setting up the appender
    diagnostics::prune_old_logs(log_dir);
    std::fs::create_dir_all(log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, diagnostics::LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);
    // stdout carries bridge responses, so the console layer writes to stderr.
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let config = AppConfig {
        data_dir: std::env::temp_dir(),
        log_dir: std::env::temp_dir(),
        simulated_delay: std::time::Duration::ZERO,
        manager_code: manager_auth::DEFAULT_MANAGER_CODE.to_string(),
        manager_code_hash: None,
    };
    let db = db::open_in_memory().expect("in-memory db");
    AppState::new(config, Arc::new(db)).expect("bundled orders")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_helpers_skip_blank_and_missing() {
        let v = serde_json::json!({ "a": "  ", "b": " x ", "n": 4 });
        assert_eq!(value_str(&v, &["a", "b"]), Some("x".to_string()));
        assert_eq!(value_str(&v, &["missing"]), None);
        assert_eq!(value_i64(&v, &["a", "n"]), Some(4));
    }

    #[tokio::test]
    async fn unknown_channel_is_an_error() {
        let mut state = test_state();
        let err = invoke(&mut state, "orders:delete", None)
            .await
            .expect_err("unknown");
        assert!(err.contains("orders:delete"));
    }

    #[tokio::test]
    async fn staff_flow_through_invoke() {
        let mut state = test_state();
        state.spawn_language_init().await.expect("init");

        let start = invoke(&mut state, "nav:current", None).await.expect("nav");
        assert_eq!(start["route"]["screen"], "phoneNumber");

        invoke(&mut state, "auth:set-phone", Some(serde_json::json!("1001234567")))
            .await
            .expect("phone");
        invoke(&mut state, "auth:send-code", None).await.expect("send");
        invoke(&mut state, "auth:set-otp", Some(serde_json::json!("4321")))
            .await
            .expect("otp");
        invoke(&mut state, "auth:confirm-otp", None)
            .await
            .expect("confirm");

        invoke(&mut state, "settings:set-language", Some(serde_json::json!("ar")))
            .await
            .expect("language");
        invoke(&mut state, "orders:open", Some(serde_json::json!("#ORD-1023")))
            .await
            .expect("open");
        let detail = invoke(&mut state, "orders:get-detail", None)
            .await
            .expect("detail");
        assert_eq!(detail["view"]["rtl"], true);
        assert_eq!(detail["labels"]["refund"], "استرداد");

        invoke(&mut state, "refund:open", None).await.expect("refund");
        for d in [1, 2, 3, 4] {
            invoke(&mut state, "refund:append-digit", Some(serde_json::json!(d)))
                .await
                .expect("digit");
        }
        let submitted = invoke(&mut state, "refund:submit", None)
            .await
            .expect("submit");
        assert_eq!(submitted["decision"]["orderId"], "#ORD-1023");

        let alerts = invoke(&mut state, "alerts:drain", None).await.expect("alerts");
        assert_eq!(alerts["alerts"][0]["title"], "نجاح");
    }
}
