use serde_json::{json, Value};

use crate::navigation::RouteParams;
use crate::{value_i64, value_str, AppState};

fn parse_digit_payload(arg0: Option<Value>) -> Result<u8, String> {
    let raw = match arg0 {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(obj @ Value::Object(_)) => value_i64(&obj, &["digit"]).or_else(|| {
            value_str(&obj, &["digit"]).and_then(|s| s.parse::<i64>().ok())
        }),
        _ => None,
    };
    match raw {
        Some(d) if (0..=9).contains(&d) => Ok(d as u8),
        Some(d) => Err(format!("invalid keypad digit: {d}")),
        None => Err("missing keypad digit".to_string()),
    }
}

fn keypad_state(state: &AppState) -> Value {
    let flow = state.refunds.flow();
    json!({
        "phase": flow.phase(),
        "orderId": state.refunds.order_id(),
        "entered": flow.entered_len(),
        "canSubmit": flow.can_submit(),
        "failedAttempts": flow.failed_attempts(),
        "labels": {
            "title": state.language.translate("managerAuthorization"),
            "cancel": state.language.translate("cancel"),
            "clear": state.language.translate("clear"),
            "validate": state.language.translate("validate"),
        },
    })
}

/// Open the manager keypad for the order on screen (or the given id).
pub async fn refund_open(state: &mut AppState, arg0: Option<Value>) -> Result<Value, String> {
    let order_id = match arg0.as_ref() {
        Some(Value::String(id)) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Some(obj @ Value::Object(_)) => value_str(obj, &["orderId", "order_id", "id"]),
        _ => None,
    }
    .or_else(|| state.nav.param("id").map(str::to_string))
    .ok_or("missing order id")?;

    let order = state
        .orders
        .find(&order_id)
        .ok_or_else(|| format!("order not found: {order_id}"))?;
    state.refunds.start(order).map_err(|e| e.to_string())?;
    Ok(keypad_state(state))
}

pub async fn refund_append_digit(
    state: &mut AppState,
    arg0: Option<Value>,
) -> Result<Value, String> {
    let digit = parse_digit_payload(arg0)?;
    state
        .refunds
        .flow_mut()
        .append_digit(digit)
        .map_err(|e| e.to_string())?;
    Ok(keypad_state(state))
}

pub async fn refund_delete_last(state: &mut AppState) -> Result<Value, String> {
    state
        .refunds
        .flow_mut()
        .delete_last()
        .map_err(|e| e.to_string())?;
    Ok(keypad_state(state))
}

pub async fn refund_clear(state: &mut AppState) -> Result<Value, String> {
    state.refunds.flow_mut().clear().map_err(|e| e.to_string())?;
    Ok(keypad_state(state))
}

pub async fn refund_cancel(state: &mut AppState) -> Result<Value, String> {
    state.refunds.cancel().map_err(|e| e.to_string())?;
    Ok(keypad_state(state))
}

pub async fn refund_get_state(state: &AppState) -> Result<Value, String> {
    Ok(keypad_state(state))
}

/// Validate the code. The outcome alert is queued for `alerts:drain`.
pub async fn refund_submit(state: &mut AppState) -> Result<Value, String> {
    let snapshot = state.language.snapshot();
    let decision = state
        .refunds
        .submit(&snapshot, &state.alerts)
        .await
        .map_err(|e| e.to_string())?;
    Ok(json!({
        "decision": decision,
        "keypad": keypad_state(state),
    }))
}
