//! Phone-number sign-in with a simulated OTP round trip.
//!
//! Nothing here talks to an SMS gateway: sending the code and confirming it
//! both wait a fixed simulated delay and then succeed. The confirmed phone
//! number becomes an in-memory staff session that gates the tab screens.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use zeroize::{Zeroize, Zeroizing};

use crate::navigation::{Navigator, Route};

pub const DEFAULT_COUNTRY_CODE: &str = "+20";
pub const MAX_PHONE_DIGITS: usize = 15;
pub const OTP_LENGTH: usize = 4;
pub const RESEND_COOLDOWN_SECS: u32 = 30;
pub const DEFAULT_SIMULATED_DELAY: Duration = Duration::from_millis(1000);

const SESSION_MAX_DURATION_HOURS: i64 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignInError {
    #[error("phone number is required")]
    EmptyPhone,
    #[error("country code must look like +20")]
    InvalidCountryCode,
    #[error("verification code needs 4 digits")]
    IncompleteCode,
    #[error("resend is available in {0}s")]
    ResendCoolingDown(u32),
}

// ---------------------------------------------------------------------------
// Phone entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneEntry {
    country_code: String,
    number: String,
}

impl Default for PhoneEntry {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            number: String::new(),
        }
    }
}

impl PhoneEntry {
    pub fn set_country_code(&mut self, code: &str) -> Result<(), SignInError> {
        let trimmed = code.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or("");
        if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(SignInError::InvalidCountryCode);
        }
        self.country_code = trimmed.to_string();
        Ok(())
    }

    /// Keep only digits, capped at the keypad's maximum length.
    pub fn set_number(&mut self, raw: &str) {
        self.number = raw
            .chars()
            .filter(|c| c.is_ascii_digit())
            .take(MAX_PHONE_DIGITS)
            .collect();
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn full_number(&self) -> String {
        format!("{}{}", self.country_code, self.number)
    }

    /// Simulate sending the SMS, then open the verification screen.
    pub async fn submit<N: Navigator>(
        &self,
        nav: &mut N,
        delay: Duration,
    ) -> Result<String, SignInError> {
        if self.number.is_empty() {
            return Err(SignInError::EmptyPhone);
        }
        let phone_number = self.full_number();
        tokio::time::sleep(delay).await;
        info!(phone = %mask_phone(&phone_number), "verification code sent");
        nav.push(Route::Verify {
            phone_number: phone_number.clone(),
        });
        Ok(phone_number)
    }
}

// ---------------------------------------------------------------------------
// OTP entry
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct OtpEntry {
    code: Zeroizing<String>,
}

impl OtpEntry {
    /// Replace the typed code, keeping at most four digits.
    pub fn set_code(&mut self, raw: &str) {
        self.code.zeroize();
        self.code
            .extend(raw.chars().filter(|c| c.is_ascii_digit()).take(OTP_LENGTH));
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// The confirm button is enabled only with a full code.
    pub fn can_confirm(&self) -> bool {
        self.code.len() == OTP_LENGTH
    }

    /// Simulate verifying the code, sign in and land on the home tabs.
    pub async fn confirm<N: Navigator>(
        &mut self,
        phone_number: &str,
        sessions: &mut SessionState,
        nav: &mut N,
        delay: Duration,
    ) -> Result<StaffSession, SignInError> {
        if !self.can_confirm() {
            return Err(SignInError::IncompleteCode);
        }
        tokio::time::sleep(delay).await;
        self.code.zeroize();
        let session = sessions.sign_in(phone_number);
        nav.replace(Route::Home);
        Ok(session)
    }
}

// ---------------------------------------------------------------------------
// Resend countdown
// ---------------------------------------------------------------------------

/// Seconds until the code may be sent again. Driven by a 1 s ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResendTimer {
    remaining: u32,
}

impl Default for ResendTimer {
    fn default() -> Self {
        Self {
            remaining: RESEND_COOLDOWN_SECS,
        }
    }
}

impl ResendTimer {
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn can_resend(&self) -> bool {
        self.remaining == 0
    }

    pub fn resend(&mut self) -> Result<(), SignInError> {
        if !self.can_resend() {
            return Err(SignInError::ResendCoolingDown(self.remaining));
        }
        self.remaining = RESEND_COOLDOWN_SECS;
        info!("verification code re-sent");
        Ok(())
    }

    /// `"17s"` while counting down, the resend label once it reaches zero.
    pub fn label(&self, resend_label: &str) -> String {
        if self.remaining > 0 {
            format!("{}s", self.remaining)
        } else {
            resend_label.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffSession {
    pub session_id: String,
    pub phone_number: String,
    pub login_time: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StaffSession {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    current: Option<StaffSession>,
}

impl SessionState {
    pub fn sign_in(&mut self, phone_number: &str) -> StaffSession {
        let now = Utc::now();
        let session = StaffSession {
            session_id: Uuid::new_v4().to_string(),
            phone_number: phone_number.to_string(),
            login_time: now,
            expires_at: now + chrono::Duration::hours(SESSION_MAX_DURATION_HOURS),
        };
        info!(
            session_id = %session.session_id,
            phone = %mask_phone(phone_number),
            "staff signed in"
        );
        self.current = Some(session.clone());
        session
    }

    pub fn sign_out(&mut self) {
        if let Some(session) = self.current.take() {
            info!(session_id = %session.session_id, "staff signed out");
        }
    }

    /// The active session, dropping it first if it has expired.
    pub fn current(&mut self) -> Option<&StaffSession> {
        if self
            .current
            .as_ref()
            .is_some_and(|s| s.is_expired(Utc::now()))
        {
            warn!("staff session expired");
            self.current = None;
        }
        self.current.as_ref()
    }

    pub fn is_signed_in(&mut self) -> bool {
        self.current().is_some()
    }

    /// Redirect screens that need a session to the phone-number screen.
    pub fn guard(&mut self, route: Route) -> Route {
        if route.requires_session() && !self.is_signed_in() {
            return Route::PhoneNumber;
        }
        route
    }

    #[cfg(test)]
    fn expire_now(&mut self) {
        if let Some(session) = self.current.as_mut() {
            session.expires_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }
}

/// `+201001234567` -> `+20*******567`
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 6 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 6))
}
