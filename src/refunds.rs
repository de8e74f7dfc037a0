//! Manager-approved refunds.
//!
//! Pressing "Refund" on an order opens the manager keypad for that order.
//! An approved code produces a [`RefundApproval`]; no money moves, the
//! approval is only recorded and announced. Both outcomes are reported to
//! the user through the notification surface in the active language.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::language::LanguageSnapshot;
use crate::manager_auth::{AuthFlowError, AuthOutcome, ManagerAuthFlow, ManagerCodeValidator};
use crate::notify::Notifier;
use crate::orders::Order;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundApproval {
    pub approval_id: String,
    pub order_id: String,
    pub amount: f64,
    pub approved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum RefundDecision {
    Approved(RefundApproval),
    #[serde(rename_all = "camelCase")]
    Rejected { order_id: String, attempts: u32 },
}

/// Keypad flow bound to the order being refunded.
pub struct RefundDesk<V> {
    flow: ManagerAuthFlow<V>,
    order: Option<(String, f64)>,
}

impl<V: ManagerCodeValidator> RefundDesk<V> {
    pub fn new(validator: V) -> Self {
        Self {
            flow: ManagerAuthFlow::new(validator),
            order: None,
        }
    }

    pub fn flow(&self) -> &ManagerAuthFlow<V> {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut ManagerAuthFlow<V> {
        &mut self.flow
    }

    pub fn order_id(&self) -> Option<&str> {
        self.order.as_ref().map(|(id, _)| id.as_str())
    }

    /// Open the keypad for `order`.
    pub fn start(&mut self, order: &Order) -> Result<(), AuthFlowError> {
        self.flow.open()?;
        self.order = Some((order.id.clone(), order.price));
        info!(order_id = %order.id, "refund authorization requested");
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), AuthFlowError> {
        self.flow.cancel()?;
        if let Some((order_id, _)) = self.order.take() {
            info!(order_id = %order_id, "refund authorization cancelled");
        }
        Ok(())
    }

    /// Submit the entered code and tell the user how it went.
    pub async fn submit(
        &mut self,
        lang: &LanguageSnapshot,
        notifier: &dyn Notifier,
    ) -> Result<RefundDecision, AuthFlowError> {
        let (order_id, amount) = self.order.clone().ok_or(AuthFlowError::NotOpen)?;

        match self.flow.submit().await? {
            AuthOutcome::Approved => {
                self.order = None;
                let approval = RefundApproval {
                    approval_id: Uuid::new_v4().to_string(),
                    order_id,
                    amount,
                    approved_at: Utc::now(),
                };
                info!(
                    approval_id = %approval.approval_id,
                    order_id = %approval.order_id,
                    amount = approval.amount,
                    "refund approved"
                );
                notifier.alert(lang.translate("success"), lang.translate("refundApproved"));
                Ok(RefundDecision::Approved(approval))
            }
            AuthOutcome::Rejected => {
                let attempts = self.flow.failed_attempts();
                warn!(order_id = %order_id, attempts, "refund authorization rejected");
                notifier.alert(lang.translate("error"), lang.translate("invalidManagerCode"));
                Ok(RefundDecision::Rejected { order_id, attempts })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguagePhase;
    use crate::manager_auth::{AuthPhase, FixedCodeValidator};
    use crate::notify::{LogNotifier, QueuedNotifier};
    use crate::orders::OrderBook;
    use std::time::Duration;

    fn lang(code: &str) -> LanguageSnapshot {
        LanguageSnapshot {
            code: code.to_string(),
            phase: LanguagePhase::ResolvedLocale,
        }
    }

    fn desk() -> RefundDesk<FixedCodeValidator> {
        RefundDesk::new(FixedCodeValidator::new("1234", Duration::ZERO))
    }

    fn type_code(desk: &mut RefundDesk<FixedCodeValidator>, digits: [u8; 4]) {
        for d in digits {
            desk.flow_mut().append_digit(d).expect("digit");
        }
    }

    #[tokio::test]
    async fn approved_refund_alerts_success_and_closes() {
        let book = OrderBook::bundled().expect("fixture");
        let order = book.find("#ORD-1021").expect("order");
        let notifier = QueuedNotifier::new();
        let mut desk = desk();

        desk.start(order).expect("start");
        assert_eq!(desk.order_id(), Some("#ORD-1021"));
        type_code(&mut desk, [1, 2, 3, 4]);

        let decision = desk.submit(&lang("en"), &notifier).await.expect("submit");
        let RefundDecision::Approved(approval) = decision else {
            panic!("expected approval");
        };
        assert_eq!(approval.order_id, "#ORD-1021");
        assert_eq!(approval.amount, order.price);
        assert_eq!(desk.flow().phase(), AuthPhase::Closed);
        assert_eq!(desk.order_id(), None);

        let alerts = notifier.drain();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "Success");
        assert_eq!(alerts[0].message, "Refund has been approved and processed.");
    }

    #[tokio::test]
    async fn rejected_refund_alerts_error_in_arabic_and_stays_open() {
        let book = OrderBook::bundled().expect("fixture");
        let notifier = QueuedNotifier::new();
        let mut desk = desk();

        desk.start(book.find("#ORD-1022").expect("order"))
            .expect("start");
        type_code(&mut desk, [9, 9, 9, 9]);

        let decision = desk.submit(&lang("ar"), &notifier).await.expect("submit");
        assert_eq!(
            decision,
            RefundDecision::Rejected {
                order_id: "#ORD-1022".into(),
                attempts: 1
            }
        );
        assert_eq!(desk.flow().phase(), AuthPhase::Entering);
        assert_eq!(desk.flow().entered_len(), 0);
        assert_eq!(desk.order_id(), Some("#ORD-1022"));

        let alerts = notifier.drain();
        assert_eq!(alerts[0].title, "خطأ");
        assert_eq!(alerts[0].message, "رمز المدير غير صالح. يرجى المحاولة مرة أخرى.");
    }

    #[tokio::test]
    async fn submit_without_start_is_refused() {
        let notifier = QueuedNotifier::new();
        let mut desk = desk();
        assert_eq!(
            desk.submit(&lang("en"), &notifier).await,
            Err(AuthFlowError::NotOpen)
        );
        assert!(notifier.drain().is_empty());
    }

    #[tokio::test]
    async fn log_notifier_is_enough_for_headless_use() {
        let book = OrderBook::bundled().expect("fixture");
        let mut desk = desk();
        desk.start(book.find("#ORD-1027").expect("order"))
            .expect("start");
        type_code(&mut desk, [1, 2, 3, 4]);
        let decision = desk
            .submit(&lang("en"), &LogNotifier)
            .await
            .expect("submit");
        assert!(matches!(decision, RefundDecision::Approved(_)));
    }

    #[test]
    fn cancel_forgets_the_order() {
        let book = OrderBook::bundled().expect("fixture");
        let mut desk = desk();
        desk.start(book.find("#ORD-1023").expect("order"))
            .expect("start");
        assert_eq!(
            desk.start(book.find("#ORD-1024").expect("order")),
            Err(AuthFlowError::AlreadyOpen)
        );
        desk.cancel().expect("cancel");
        assert_eq!(desk.order_id(), None);
        assert_eq!(desk.flow().phase(), AuthPhase::Closed);
    }
}
