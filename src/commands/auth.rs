use serde_json::{json, Value};

use crate::navigation::{Route, RouteParams, RouteStack};
use crate::sign_in::{OtpEntry, ResendTimer};
use crate::{value_str, AppState};

#[derive(Debug, PartialEq)]
struct PhonePayload {
    country_code: Option<String>,
    number: String,
}

fn parse_phone_payload(arg0: Option<Value>) -> Result<PhonePayload, String> {
    match arg0 {
        Some(Value::String(number)) => Ok(PhonePayload {
            country_code: None,
            number,
        }),
        Some(obj @ Value::Object(_)) => Ok(PhonePayload {
            country_code: value_str(&obj, &["countryCode", "country_code"]),
            number: obj
                .get("number")
                .or_else(|| obj.get("phoneNumber"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
        _ => Err("phone number payload expected".to_string()),
    }
}

fn parse_code_payload(arg0: Option<Value>) -> String {
    match arg0 {
        Some(Value::String(code)) => code,
        Some(Value::Number(n)) => n.to_string(),
        Some(obj @ Value::Object(_)) => value_str(&obj, &["code", "otp"]).unwrap_or_default(),
        _ => String::new(),
    }
}

fn resend_state(state: &AppState) -> Value {
    json!({
        "remaining": state.resend.remaining(),
        "canResend": state.resend.can_resend(),
        "label": state.resend.label(state.language.translate("resend")),
    })
}

pub async fn auth_set_phone(state: &mut AppState, arg0: Option<Value>) -> Result<Value, String> {
    let payload = parse_phone_payload(arg0)?;
    if let Some(code) = payload.country_code {
        state
            .phone
            .set_country_code(&code)
            .map_err(|e| e.to_string())?;
    }
    state.phone.set_number(&payload.number);
    Ok(json!({
        "countryCode": state.phone.country_code(),
        "number": state.phone.number(),
        "canSend": !state.phone.number().is_empty(),
    }))
}

/// Simulated SMS send. Opens the verification screen with a fresh countdown.
pub async fn auth_send_code(state: &mut AppState) -> Result<Value, String> {
    let delay = state.config.simulated_delay;
    let phone_number = state
        .phone
        .submit(&mut state.nav, delay)
        .await
        .map_err(|e| e.to_string())?;
    state.otp = OtpEntry::default();
    state.resend = ResendTimer::default();
    Ok(json!({
        "phoneNumber": phone_number,
        "route": state.nav.current(),
        "resend": resend_state(state),
    }))
}

pub async fn auth_set_otp(state: &mut AppState, arg0: Option<Value>) -> Result<Value, String> {
    state.otp.set_code(&parse_code_payload(arg0));
    Ok(json!({
        "length": state.otp.len(),
        "canConfirm": state.otp.can_confirm(),
    }))
}

/// Simulated OTP check for the number on the verification screen.
pub async fn auth_confirm_otp(state: &mut AppState) -> Result<Value, String> {
    let phone_number = state
        .nav
        .param("phoneNumber")
        .map(str::to_string)
        .ok_or("no phone number awaiting verification")?;
    let delay = state.config.simulated_delay;
    let session = state
        .otp
        .confirm(&phone_number, &mut state.sessions, &mut state.nav, delay)
        .await
        .map_err(|e| e.to_string())?;
    Ok(json!({
        "session": session,
        "route": state.nav.current(),
    }))
}

pub async fn auth_resend_code(state: &mut AppState) -> Result<Value, String> {
    state.resend.resend().map_err(|e| e.to_string())?;
    Ok(resend_state(state))
}

/// One second of the resend countdown.
pub async fn auth_tick(state: &mut AppState) -> Result<Value, String> {
    state.resend.tick();
    Ok(resend_state(state))
}

pub async fn auth_get_session(state: &mut AppState) -> Result<Value, String> {
    Ok(match state.sessions.current() {
        Some(session) => json!({ "signedIn": true, "session": session }),
        None => json!({ "signedIn": false, "session": null }),
    })
}

pub async fn auth_logout(state: &mut AppState) -> Result<Value, String> {
    state.sessions.sign_out();
    state.items_section = None;
    state.nav = RouteStack::new(Route::PhoneNumber);
    state.close_offscreen_keypad();
    Ok(json!({ "success": true, "route": state.nav.current() }))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_state;

    #[tokio::test]
    async fn phone_to_home_round_trip() {
        let mut state = test_state();

        let phone = auth_set_phone(&mut state, Some(json!({ "number": "100-123-4567" })))
            .await
            .expect("set phone");
        assert_eq!(phone["number"], "1001234567");
        assert_eq!(phone["canSend"], true);

        let sent = auth_send_code(&mut state).await.expect("send");
        assert_eq!(sent["phoneNumber"], "+201001234567");
        assert_eq!(sent["route"]["screen"], "verify");
        assert_eq!(sent["resend"]["label"], "30s");

        let partial = auth_set_otp(&mut state, Some(json!("12")))
            .await
            .expect("otp");
        assert_eq!(partial["canConfirm"], false);
        assert!(auth_confirm_otp(&mut state).await.is_err());

        auth_set_otp(&mut state, Some(json!("1234")))
            .await
            .expect("otp");
        let confirmed = auth_confirm_otp(&mut state).await.expect("confirm");
        assert_eq!(confirmed["route"]["screen"], "home");
        assert_eq!(confirmed["session"]["phoneNumber"], "+201001234567");

        let session = auth_get_session(&mut state).await.expect("session");
        assert_eq!(session["signedIn"], true);

        let out = auth_logout(&mut state).await.expect("logout");
        assert_eq!(out["route"]["screen"], "phoneNumber");
        let session = auth_get_session(&mut state).await.expect("session");
        assert_eq!(session["signedIn"], false);
    }

    #[tokio::test]
    async fn empty_phone_is_rejected() {
        let mut state = test_state();
        assert!(auth_send_code(&mut state).await.is_err());
        assert!(auth_set_phone(&mut state, Some(json!({ "countryCode": "20", "number": "1" })))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn resend_waits_for_countdown() {
        let mut state = test_state();
        assert!(auth_resend_code(&mut state).await.is_err());
        for _ in 0..29 {
            auth_tick(&mut state).await.expect("tick");
        }
        let last = auth_tick(&mut state).await.expect("tick");
        assert_eq!(last["label"], "Resend");
        assert_eq!(last["canResend"], true);

        let resent = auth_resend_code(&mut state).await.expect("resend");
        assert_eq!(resent["remaining"], 30);
    }
}
