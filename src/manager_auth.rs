//! Manager authorization keypad.
//!
//! Sensitive actions (refunds) are gated behind a 4-digit manager code typed
//! on an on-screen keypad. The flow is a small state machine:
//!
//! ```text
//! closed --open--> entering (0-3 digits) --4th digit--> ready --submit--> validating
//!    ^                  ^                                                    |
//!    |                  +------------------- mismatch (code cleared) --------+
//!    +---------------------------------------- match (code cleared) ---------+
//! ```
//!
//! The check itself is delegated to a [`ManagerCodeValidator`] so a real
//! authorization backend can replace the fixed code without touching the
//! state machine. There is no attempt limit and no lockout; failures are only
//! counted for the log.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, Zeroizing};

pub const CODE_LENGTH: usize = 4;
pub const DEFAULT_MANAGER_CODE: &str = "1234";
pub const DEFAULT_VALIDATION_LATENCY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthPhase {
    Closed,
    Entering,
    Ready,
    Validating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthOutcome {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFlowError {
    #[error("manager authorization is not open")]
    NotOpen,
    #[error("manager authorization is already open")]
    AlreadyOpen,
    #[error("manager code needs 4 digits")]
    Incomplete,
    #[error("manager code is already being validated")]
    AlreadyValidating,
    #[error("no manager code validation in progress")]
    NotValidating,
    #[error("invalid keypad digit: {0}")]
    InvalidDigit(u8),
}

/// Decides whether an entered manager code authorizes the action.
pub trait ManagerCodeValidator: Send + Sync {
    fn validate(&self, code: &str) -> impl Future<Output = bool> + Send;
}

/// Compares against one configured code after a fixed simulated latency.
pub struct FixedCodeValidator {
    secret: Zeroizing<String>,
    latency: Duration,
}

impl FixedCodeValidator {
    pub fn new(secret: impl Into<String>, latency: Duration) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            latency,
        }
    }
}

impl Default for FixedCodeValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MANAGER_CODE, DEFAULT_VALIDATION_LATENCY)
    }
}

impl ManagerCodeValidator for FixedCodeValidator {
    fn validate(&self, code: &str) -> impl Future<Output = bool> + Send {
        let matches = code == self.secret.as_str();
        let latency = self.latency;
        async move {
            tokio::time::sleep(latency).await;
            matches
        }
    }
}

/// Verifies the code against a bcrypt hash on the blocking pool.
pub struct BcryptCodeValidator {
    hash: String,
}

impl BcryptCodeValidator {
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// Hash `code` with the given bcrypt cost.
    pub fn from_code(code: &str, cost: u32) -> Result<Self, bcrypt::BcryptError> {
        Ok(Self {
            hash: bcrypt::hash(code, cost)?,
        })
    }
}

impl ManagerCodeValidator for BcryptCodeValidator {
    fn validate(&self, code: &str) -> impl Future<Output = bool> + Send {
        let hash = self.hash.clone();
        let code = Zeroizing::new(code.to_string());
        async move {
            tokio::task::spawn_blocking(move || bcrypt::verify(code.as_str(), &hash).unwrap_or(false))
                .await
                .unwrap_or(false)
        }
    }
}

/// Validator picked from configuration at startup.
pub enum ConfiguredValidator {
    Fixed(FixedCodeValidator),
    Bcrypt(BcryptCodeValidator),
}

impl ManagerCodeValidator for ConfiguredValidator {
    fn validate(&self, code: &str) -> impl Future<Output = bool> + Send {
        async move {
            match self {
                ConfiguredValidator::Fixed(v) => v.validate(code).await,
                ConfiguredValidator::Bcrypt(v) => v.validate(code).await,
            }
        }
    }
}

pub struct ManagerAuthFlow<V> {
    validator: V,
    phase: AuthPhase,
    code: Zeroizing<String>,
    failed_attempts: u32,
}

impl<V: ManagerCodeValidator> ManagerAuthFlow<V> {
    pub fn new(validator: V) -> Self {
        Self {
            validator,
            phase: AuthPhase::Closed,
            code: Zeroizing::new(String::with_capacity(CODE_LENGTH)),
            failed_attempts: 0,
        }
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    pub fn entered_len(&self) -> usize {
        self.code.len()
    }

    /// Whether the submit action should be enabled.
    pub fn can_submit(&self) -> bool {
        self.phase == AuthPhase::Ready
    }

    /// Failed submissions since the last approval.
    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn open(&mut self) -> Result<(), AuthFlowError> {
        if self.phase != AuthPhase::Closed {
            return Err(AuthFlowError::AlreadyOpen);
        }
        self.code.zeroize();
        self.phase = AuthPhase::Entering;
        debug!("manager authorization opened");
        Ok(())
    }

    /// Append one keypad digit. Ignored once four digits are entered.
    pub fn append_digit(&mut self, digit: u8) -> Result<(), AuthFlowError> {
        if digit > 9 {
            return Err(AuthFlowError::InvalidDigit(digit));
        }
        match self.phase {
            AuthPhase::Closed => Err(AuthFlowError::NotOpen),
            AuthPhase::Validating | AuthPhase::Ready => Ok(()),
            AuthPhase::Entering => {
                self.code.push(char::from(b'0' + digit));
                if self.code.len() == CODE_LENGTH {
                    self.phase = AuthPhase::Ready;
                }
                Ok(())
            }
        }
    }

    pub fn delete_last(&mut self) -> Result<(), AuthFlowError> {
        match self.phase {
            AuthPhase::Closed => Err(AuthFlowError::NotOpen),
            AuthPhase::Validating => Ok(()),
            AuthPhase::Entering | AuthPhase::Ready => {
                self.code.pop();
                if self.code.len() < CODE_LENGTH {
                    self.phase = AuthPhase::Entering;
                }
                Ok(())
            }
        }
    }

    pub fn clear(&mut self) -> Result<(), AuthFlowError> {
        match self.phase {
            AuthPhase::Closed => Err(AuthFlowError::NotOpen),
            AuthPhase::Validating => Ok(()),
            AuthPhase::Entering | AuthPhase::Ready => {
                self.code.zeroize();
                self.phase = AuthPhase::Entering;
                Ok(())
            }
        }
    }

    /// Dismiss the keypad, discarding any entered digits.
    pub fn cancel(&mut self) -> Result<(), AuthFlowError> {
        if self.phase == AuthPhase::Validating {
            return Err(AuthFlowError::AlreadyValidating);
        }
        self.code.zeroize();
        self.phase = AuthPhase::Closed;
        Ok(())
    }

    /// Validate the entered code and settle the flow.
    pub async fn submit(&mut self) -> Result<AuthOutcome, AuthFlowError> {
        let code = self.begin_validation()?;
        let approved = self.validator.validate(&code).await;
        self.finish_validation(approved)
    }

    /// Move `ready -> validating` and hand out the entered code.
    ///
    /// Split from [`submit`](Self::submit) for event loops that run the
    /// check elsewhere; every call must be paired with
    /// [`finish_validation`](Self::finish_validation).
    pub fn begin_validation(&mut self) -> Result<Zeroizing<String>, AuthFlowError> {
        match self.phase {
            AuthPhase::Ready => {
                self.phase = AuthPhase::Validating;
                Ok(Zeroizing::new(self.code.as_str().to_string()))
            }
            AuthPhase::Validating => Err(AuthFlowError::AlreadyValidating),
            AuthPhase::Entering => Err(AuthFlowError::Incomplete),
            AuthPhase::Closed => Err(AuthFlowError::NotOpen),
        }
    }

    pub fn finish_validation(&mut self, approved: bool) -> Result<AuthOutcome, AuthFlowError> {
        if self.phase != AuthPhase::Validating {
            return Err(AuthFlowError::NotValidating);
        }
        self.code.zeroize();

        if approved {
            self.phase = AuthPhase::Closed;
            self.failed_attempts = 0;
            info!("manager code accepted");
            Ok(AuthOutcome::Approved)
        } else {
            self.phase = AuthPhase::Entering;
            self.failed_attempts += 1;
            warn!(attempts = self.failed_attempts, "manager code rejected");
            Ok(AuthOutcome::Rejected)
        }
    }
}
