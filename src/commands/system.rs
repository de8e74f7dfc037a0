use serde_json::{json, Value};

use crate::navigation::{Navigator, Route, RouteStack};
use crate::{diagnostics, AppState};

fn route_state(nav: &RouteStack) -> Value {
    let route = nav.current();
    json!({
        "route": route,
        "path": route.path(),
        "depth": nav.depth(),
    })
}

pub async fn app_get_info() -> Result<Value, String> {
    Ok(diagnostics::get_about_info())
}

/// Current screen. A screen that needs a session collapses the stack to
/// the phone-number screen once the session is gone.
pub async fn nav_current(state: &mut AppState) -> Result<Value, String> {
    let current = state.nav.current().clone();
    let guarded = state.sessions.guard(current.clone());
    if guarded != current {
        state.nav = RouteStack::new(guarded);
    }
    state.close_offscreen_keypad();
    Ok(route_state(&state.nav))
}

pub async fn nav_back(state: &mut AppState) -> Result<Value, String> {
    let popped = state.nav.back();
    state.close_offscreen_keypad();
    let mut result = route_state(&state.nav);
    result["popped"] = json!(popped);
    Ok(result)
}

pub async fn nav_open_language(state: &mut AppState) -> Result<Value, String> {
    let route = state.sessions.guard(Route::Language);
    state.nav.push(route);
    state.close_offscreen_keypad();
    Ok(route_state(&state.nav))
}

pub async fn alerts_drain(state: &AppState) -> Result<Value, String> {
    Ok(json!({ "alerts": state.alerts.drain() }))
}
