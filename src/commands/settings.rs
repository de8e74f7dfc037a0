use serde_json::{json, Value};

use crate::i18n::{self, Locale};
use crate::{value_str, AppState};

fn parse_language_payload(arg0: Option<Value>) -> Result<String, String> {
    match arg0 {
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Err("language is required".to_string())
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(obj @ Value::Object(_)) => value_str(&obj, &["language", "locale", "code"])
            .ok_or_else(|| "language is required".to_string()),
        _ => Err("language is required".to_string()),
    }
}

fn parse_translate_payload(arg0: Option<Value>) -> Result<String, String> {
    match arg0 {
        Some(Value::String(key)) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        Some(obj @ Value::Object(_)) => {
            value_str(&obj, &["key"]).ok_or_else(|| "missing translation key".to_string())
        }
        _ => Err("missing translation key".to_string()),
    }
}

pub async fn settings_get_language(state: &AppState) -> Result<Value, String> {
    let snapshot = state.language.snapshot();
    let supported: Vec<Value> = Locale::ALL
        .iter()
        .map(|locale| {
            json!({
                "code": locale.code(),
                "name": snapshot.translate(locale.name_key()),
                "selected": locale.code() == snapshot.code,
            })
        })
        .collect();
    Ok(json!({
        "language": snapshot.code.clone(),
        "rtl": snapshot.is_rtl(),
        "phase": snapshot.phase,
        "supported": supported,
    }))
}

pub async fn settings_set_language(
    state: &AppState,
    arg0: Option<Value>,
) -> Result<Value, String> {
    let code = parse_language_payload(arg0)?;
    state.language.change_locale(&code).await;
    let supported = state.language.supported_locale().is_some();
    Ok(json!({
        "success": true,
        "language": code,
        "supported": supported,
        "rtl": state.language.is_right_to_left(),
    }))
}

pub async fn i18n_translate(state: &AppState, arg0: Option<Value>) -> Result<Value, String> {
    let key = parse_translate_payload(arg0)?;
    Ok(Value::String(state.language.translate(&key).to_string()))
}

/// Every UI string of the active language, keyed like the tables.
pub async fn i18n_get_strings(state: &AppState) -> Result<Value, String> {
    let snapshot = state.language.snapshot();
    let mut strings = serde_json::Map::new();
    for key in i18n::keys(Locale::DEFAULT) {
        strings.insert(key.to_string(), json!(snapshot.translate(key)));
    }
    Ok(json!({
        "language": snapshot.code.clone(),
        "rtl": snapshot.is_rtl(),
        "strings": strings,
    }))
}

#[cfg(test)]
mod dto_tests {
    use super::{parse_language_payload, parse_translate_payload};

    #[test]
    fn parse_language_payload_supports_string_and_object() {
        assert_eq!(
            parse_language_payload(Some(serde_json::json!(" ar "))),
            Ok("ar".to_string())
        );
        assert_eq!(
            parse_language_payload(Some(serde_json::json!({ "locale": "en" }))),
            Ok("en".to_string())
        );
        assert!(parse_language_payload(Some(serde_json::json!(""))).is_err());
        assert!(parse_language_payload(None).is_err());
    }

    #[test]
    fn parse_translate_payload_requires_key() {
        assert_eq!(
            parse_translate_payload(Some(serde_json::json!({ "key": "refund" }))),
            Ok("refund".to_string())
        );
        assert!(parse_translate_payload(Some(serde_json::json!(42))).is_err());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguagePhase;
    use crate::test_state;

    #[tokio::test]
    async fn set_language_switches_direction_and_strings() {
        let state = test_state();
        state.language.initialize().await;

        let before = settings_get_language(&state).await.expect("get");
        assert_eq!(before["language"], "en");
        assert_eq!(before["rtl"], false);
        assert_eq!(before["supported"].as_array().map(Vec::len), Some(2));

        let result = settings_set_language(&state, Some(serde_json::json!("ar")))
            .await
            .expect("set");
        assert_eq!(result["rtl"], true);
        assert_eq!(state.language.phase(), LanguagePhase::ResolvedLocale);

        let text = i18n_translate(&state, Some(serde_json::json!("refund")))
            .await
            .expect("translate");
        assert_eq!(text, serde_json::json!("استرداد"));

        let strings = i18n_get_strings(&state).await.expect("strings");
        assert_eq!(strings["strings"]["home"], "الرئيسية");
        assert_eq!(strings["rtl"], true);
    }

    #[tokio::test]
    async fn unsupported_language_falls_back_to_keys() {
        let state = test_state();
        let result = settings_set_language(&state, Some(serde_json::json!({ "language": "fr" })))
            .await
            .expect("set");
        assert_eq!(result["supported"], false);
        assert_eq!(result["rtl"], false);

        let text = i18n_translate(&state, Some(serde_json::json!("refund")))
            .await
            .expect("translate");
        assert_eq!(text, serde_json::json!("refund"));
    }
}
