use serde_json::{json, Value};

use crate::navigation::{Navigator, Route, RouteParams};
use crate::orders::{CollapsibleSection, HomeTab, OrderCard, OrderDetailView, OrderStatus};
use crate::{value_str, AppState};

#[derive(Debug, PartialEq)]
struct OrdersListPayload {
    tab: HomeTab,
    status: Option<OrderStatus>,
}

fn parse_orders_list_payload(arg0: Option<Value>) -> Result<OrdersListPayload, String> {
    let payload = arg0.unwrap_or_else(|| json!({}));
    let tab = match value_str(&payload, &["tab"]).or_else(|| payload.as_str().map(str::to_string))
    {
        None => HomeTab::Home,
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "home" => HomeTab::Home,
            "ready" => HomeTab::Ready,
            other => return Err(format!("unknown tab: {other}")),
        },
    };
    let status = value_str(&payload, &["status"]).map(|s| OrderStatus::parse(&s));
    Ok(OrdersListPayload { tab, status })
}

fn order_id_from(arg0: Option<&Value>) -> Option<String> {
    match arg0 {
        Some(Value::String(id)) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Some(obj @ Value::Object(_)) => value_str(obj, &["id", "orderId", "order_id"]),
        _ => None,
    }
}

pub async fn orders_list(state: &AppState, arg0: Option<Value>) -> Result<Value, String> {
    let payload = parse_orders_list_payload(arg0)?;
    let snapshot = state.language.snapshot();
    let cards: Vec<OrderCard> = state
        .orders
        .for_tab(payload.tab)
        .into_iter()
        .filter(|order| payload.status.map_or(true, |s| order.status == s))
        .map(|order| OrderCard::build(order, &snapshot))
        .collect();
    Ok(json!({
        "tab": payload.tab,
        "title": snapshot.translate(payload.tab.key()),
        "restaurantName": snapshot.translate("restaurantName"),
        "restaurantHours": snapshot.translate("restaurantHours"),
        "rtl": snapshot.is_rtl(),
        "orders": cards,
    }))
}

/// Push the detail screen for an order.
pub async fn orders_open(state: &mut AppState, arg0: Option<Value>) -> Result<Value, String> {
    let id = order_id_from(arg0.as_ref()).ok_or("missing order id")?;
    let route = state.sessions.guard(Route::OrderDetail { id });
    state.nav.push(route.clone());
    state.close_offscreen_keypad();
    Ok(json!({ "route": route, "path": route.path() }))
}

/// Detail screen content. Without an explicit id the current route's `id`
/// parameter is used; neither present renders the not-found view.
pub async fn orders_get_detail(state: &mut AppState, arg0: Option<Value>) -> Result<Value, String> {
    let id = order_id_from(arg0.as_ref())
        .or_else(|| state.nav.param("id").map(str::to_string))
        .unwrap_or_default();
    let snapshot = state.language.snapshot();
    let view = state.orders.detail(&id, &snapshot);

    let section = match &view {
        OrderDetailView::Found(detail) => {
            let keep = state
                .items_section
                .as_ref()
                .is_some_and(|(open_id, _)| open_id == &detail.id);
            if !keep {
                state.items_section = Some((
                    detail.id.clone(),
                    CollapsibleSection::new(detail.items.len()),
                ));
            }
            state.items_section.as_ref().map(|(_, s)| *s)
        }
        OrderDetailView::NotFound { .. } => {
            state.items_section = None;
            None
        }
    };

    Ok(json!({
        "view": view,
        "itemsSection": section,
        "labels": {
            "title": snapshot.translate("orderDetails"),
            "orderedAt": snapshot.translate("orderedAt"),
            "orderType": snapshot.translate("orderType"),
            "orderPrice": snapshot.translate("orderPrice"),
            "itemDetails": snapshot.translate("itemDetails"),
            "refund": snapshot.translate("refund"),
        },
    }))
}

pub async fn orders_toggle_items(state: &mut AppState) -> Result<Value, String> {
    let (_, section) = state
        .items_section
        .as_mut()
        .ok_or("no order detail is open")?;
    section.toggle();
    Ok(json!({
        "collapsed": section.collapsed,
        "showsChildren": section.shows_children(),
    }))
}

#[cfg(test)]
mod dto_tests {
    use super::*;

    #[test]
    fn parse_orders_list_payload_defaults_to_home() {
        assert_eq!(
            parse_orders_list_payload(None),
            Ok(OrdersListPayload {
                tab: HomeTab::Home,
                status: None
            })
        );
        assert_eq!(
            parse_orders_list_payload(Some(json!({ "tab": "Ready", "status": "ready" }))),
            Ok(OrdersListPayload {
                tab: HomeTab::Ready,
                status: Some(OrderStatus::Ready)
            })
        );
        assert_eq!(
            parse_orders_list_payload(Some(json!("ready"))).map(|p| p.tab),
            Ok(HomeTab::Ready)
        );
        assert!(parse_orders_list_payload(Some(json!({ "tab": "archive" }))).is_err());
    }

    #[test]
    fn order_id_accepts_string_or_object() {
        assert_eq!(order_id_from(Some(&json!("#ORD-1021"))), Some("#ORD-1021".into()));
        assert_eq!(
            order_id_from(Some(&json!({ "orderId": "#ORD-1022" }))),
            Some("#ORD-1022".into())
        );
        assert_eq!(order_id_from(Some(&json!({}))), None);
        assert_eq!(order_id_from(None), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_state;

    #[tokio::test]
    async fn ready_tab_lists_only_ready_orders() {
        let state = test_state();
        let listed = orders_list(&state, Some(json!({ "tab": "ready" })))
            .await
            .expect("list");
        let ids: Vec<&str> = listed["orders"]
            .as_array()
            .expect("orders")
            .iter()
            .filter_map(|o| o["id"].as_str())
            .collect();
        assert_eq!(ids, vec!["#ORD-1021", "#ORD-1023", "#ORD-1027"]);
        assert_eq!(listed["title"], "Ready");

        let home = orders_list(&state, None).await.expect("list");
        assert_eq!(home["orders"].as_array().map(Vec::len), Some(8));
    }

    #[tokio::test]
    async fn detail_uses_route_param_and_keeps_section_state() {
        let mut state = test_state();
        state.sessions.sign_in("+201001234567");
        orders_open(&mut state, Some(json!("#ORD-1021")))
            .await
            .expect("open");

        let detail = orders_get_detail(&mut state, None).await.expect("detail");
        assert_eq!(detail["view"]["kind"], "found");
        assert_eq!(detail["view"]["id"], "#ORD-1021");
        assert_eq!(detail["itemsSection"]["collapsed"], false);

        let toggled = orders_toggle_items(&mut state).await.expect("toggle");
        assert_eq!(toggled["collapsed"], true);

        let again = orders_get_detail(&mut state, None).await.expect("detail");
        assert_eq!(again["itemsSection"]["collapsed"], true);
    }

    #[tokio::test]
    async fn unknown_or_missing_id_renders_not_found() {
        let mut state = test_state();
        let missing = orders_get_detail(&mut state, Some(json!("#ORD-9999")))
            .await
            .expect("detail");
        assert_eq!(missing["view"]["kind"], "notFound");
        assert_eq!(missing["view"]["message"], "Order not found");
        assert!(missing["itemsSection"].is_null());

        let no_id = orders_get_detail(&mut state, None).await.expect("detail");
        assert_eq!(no_id["view"]["kind"], "notFound");
        assert!(orders_toggle_items(&mut state).await.is_err());
    }

    #[tokio::test]
    async fn opening_detail_without_session_redirects_to_sign_in() {
        let mut state = test_state();
        let opened = orders_open(&mut state, Some(json!({ "id": "#ORD-1021" })))
            .await
            .expect("open");
        assert_eq!(opened["route"]["screen"], "phoneNumber");
    }
}
