//! Route stack shared by the sign-in and order flows.
//!
//! Screens only depend on [`Navigator`] and [`RouteParams`]; the front-end
//! shell owns the real stack. [`RouteStack`] is the in-process implementation
//! used by the bridge binary and by tests.

use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "camelCase")]
pub enum Route {
    PhoneNumber,
    Verify {
        #[serde(rename = "phoneNumber")]
        phone_number: String,
    },
    Home,
    Language,
    OrderDetail {
        id: String,
    },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::PhoneNumber => "/(auth)/phone-number".to_string(),
            Route::Verify { .. } => "/verify".to_string(),
            Route::Home => "/(tabs)".to_string(),
            Route::Language => "/(tabs)/language".to_string(),
            Route::OrderDetail { id } => format!("/order/{id}"),
        }
    }

    /// Screens that need a signed-in staff session.
    pub fn requires_session(&self) -> bool {
        matches!(
            self,
            Route::Home | Route::Language | Route::OrderDetail { .. }
        )
    }

    fn param(&self, name: &str) -> Option<&str> {
        match (self, name) {
            (Route::Verify { phone_number }, "phoneNumber") => Some(phone_number.as_str()),
            (Route::OrderDetail { id }, "id") => Some(id.as_str()),
            _ => None,
        }
    }
}

pub trait Navigator {
    fn push(&mut self, route: Route);
    fn replace(&mut self, route: Route);
    /// Pop the current route. Returns `false` when already at the root.
    fn back(&mut self) -> bool;
}

pub trait RouteParams {
    fn param(&self, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteStack {
    stack: Vec<Route>,
}

impl RouteStack {
    pub fn new(root: Route) -> Self {
        Self { stack: vec![root] }
    }

    pub fn current(&self) -> &Route {
        // The stack is never emptied: `back` refuses to pop the root.
        &self.stack[self.stack.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Navigator for RouteStack {
    fn push(&mut self, route: Route) {
        debug!(path = %route.path(), "navigate push");
        self.stack.push(route);
    }

    fn replace(&mut self, route: Route) {
        debug!(path = %route.path(), "navigate replace");
        self.stack.pop();
        self.stack.push(route);
    }

    fn back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        debug!(path = %self.current().path(), "navigate back");
        true
    }
}

impl RouteParams for RouteStack {
    fn param(&self, name: &str) -> Option<&str> {
        self.current().param(name)
    }
}
