//! Payment lifecycle: creation, balance, cash approval and notification
//!
//! ```text
//! POST /api/payment/add ──▶ PaymentLedger::create_payment ──┐
//!                                                          ├──▶ PaymentNotifier ──▶ EventBus
//! PUT /api/payment/approve/{id} ──▶ approve_cash_payment ───┘
//! ```

pub mod approval;
pub mod ledger;
pub mod notifier;
pub mod view;

pub use ledger::{PaymentLedger, compute_balance};
pub use notifier::{EventBusNotifier, NoopNotifier, PaymentNotifier};
pub use view::PaymentView;
