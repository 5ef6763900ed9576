//! Payment creation, balance computation and payment queries

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::Entity;
use crate::core::error::{EntityError, PortalResult, ValidationError};
use crate::entities::{House, NewPayment, Payment, Rental, RentalPaymentStatus, User};
use crate::payments::{PaymentNotifier, PaymentView};
use crate::storage::Stores;

/// Outstanding amount after this attempt, never negative
pub fn compute_balance(amount_due: f64, prior_total: f64, amount: f64) -> f64 {
    (amount_due - (prior_total + amount)).max(0.0)
}

/// The payment ledger
///
/// Append-only: every attempt is a new record and the balance is recomputed
/// from the stored history each time. Two concurrent attempts against the
/// same rental may both miss each other in their prior total.
#[derive(Clone)]
pub struct PaymentLedger {
    pub(crate) stores: Stores,
    pub(crate) notifier: Arc<dyn PaymentNotifier>,
}

impl PaymentLedger {
    pub fn new(stores: Stores, notifier: Arc<dyn PaymentNotifier>) -> Self {
        Self { stores, notifier }
    }

    /// Record a payment attempt by `input.tenant_id` against a rental
    pub async fn create_payment(&self, input: NewPayment) -> PortalResult<PaymentView> {
        if input.month.trim().is_empty() {
            return Err(ValidationError::field("month", "Month is required").into());
        }
        if !(input.amount.is_finite() && input.amount > 0.0) {
            return Err(
                ValidationError::field("amount", "Amount must be a positive number").into(),
            );
        }

        let mut rental = self
            .stores
            .rentals
            .get(&input.rental_id)
            .await?
            .ok_or_else(|| EntityError::not_found("rental", input.rental_id))?;

        let prior_total = self.prior_total(input.rental_id, input.tenant_id).await?;
        let balance = compute_balance(rental.amount, prior_total, input.amount);

        let payment = self
            .stores
            .payments
            .create(Payment::new(input, balance))
            .await?;

        tracing::info!(
            payment_id = %payment.id,
            tenant_id = %payment.tenant_id,
            rental_id = %payment.rental_id,
            method = %payment.method,
            amount = payment.amount,
            balance = payment.balance,
            status = %payment.status,
            "payment recorded"
        );

        if !payment.method.requires_approval() && balance == 0.0 {
            rental.payment_status = RentalPaymentStatus::Paid;
            rental.touch();
            self.stores.rentals.update(&payment.rental_id, rental).await?;
            tracing::debug!(rental_id = %payment.rental_id, "rental settled");
        }

        let view = self.view(&payment).await?;
        if payment.is_successful() {
            self.notifier.payment_approved(payment.tenant_id, &view);
        }

        Ok(view)
    }

    /// Every payment, newest first
    pub async fn list_all(&self) -> PortalResult<Vec<PaymentView>> {
        let payments = self.stores.payments.list().await?;
        self.views(payments).await
    }

    /// Payments made by one tenant, newest first
    pub async fn list_for_tenant(&self, tenant_id: Uuid) -> PortalResult<Vec<PaymentView>> {
        let payments = self
            .stores
            .payments
            .search("tenantId", &tenant_id.to_string())
            .await?;
        self.views(payments).await
    }

    /// Raw payment record
    pub async fn get(&self, payment_id: Uuid) -> PortalResult<Payment> {
        Ok(self
            .stores
            .payments
            .get(&payment_id)
            .await?
            .ok_or_else(|| EntityError::not_found("payment", payment_id))?)
    }

    /// Most recent payment of a tenant, if any
    pub async fn latest_for_tenant(&self, tenant_id: Uuid) -> PortalResult<Option<PaymentView>> {
        let mut payments = self
            .stores
            .payments
            .search("tenantId", &tenant_id.to_string())
            .await?;
        sort_newest_first(&mut payments);

        match payments.first() {
            Some(latest) => Ok(Some(self.view(latest).await?)),
            None => Ok(None),
        }
    }

    /// Denormalize a single payment
    pub async fn view(&self, payment: &Payment) -> PortalResult<PaymentView> {
        let tenant = self.stores.users.get(&payment.tenant_id).await?;
        let house = match self.stores.rentals.get(&payment.rental_id).await? {
            Some(rental) => self.stores.houses.get(&rental.house_id).await?,
            None => None,
        };
        Ok(PaymentView::assemble(payment, tenant.as_ref(), house.as_ref()))
    }

    async fn prior_total(&self, rental_id: Uuid, tenant_id: Uuid) -> PortalResult<f64> {
        let previous = self
            .stores
            .payments
            .search("rentalId", &rental_id.to_string())
            .await?;
        Ok(previous
            .iter()
            .filter(|p| p.tenant_id == tenant_id)
            .map(|p| p.amount)
            .sum())
    }

    /// Denormalize many payments, looking each related record up once
    async fn views(&self, mut payments: Vec<Payment>) -> PortalResult<Vec<PaymentView>> {
        sort_newest_first(&mut payments);

        let mut users: HashMap<Uuid, Option<User>> = HashMap::new();
        let mut rentals: HashMap<Uuid, Option<Rental>> = HashMap::new();
        let mut houses: HashMap<Uuid, Option<House>> = HashMap::new();
        let mut views = Vec::with_capacity(payments.len());

        for payment in &payments {
            if !users.contains_key(&payment.tenant_id) {
                let user = self.stores.users.get(&payment.tenant_id).await?;
                users.insert(payment.tenant_id, user);
            }
            if !rentals.contains_key(&payment.rental_id) {
                let rental = self.stores.rentals.get(&payment.rental_id).await?;
                rentals.insert(payment.rental_id, rental);
            }
            let house_id = rentals
                .get(&payment.rental_id)
                .and_then(|r| r.as_ref())
                .map(|r| r.house_id);
            if let Some(house_id) = house_id
                && !houses.contains_key(&house_id)
            {
                let house = self.stores.houses.get(&house_id).await?;
                houses.insert(house_id, house);
            }

            let tenant = users.get(&payment.tenant_id).and_then(|u| u.as_ref());
            let house = house_id
                .and_then(|id| houses.get(&id))
                .and_then(|h| h.as_ref());
            views.push(PaymentView::assemble(payment, tenant, house));
        }

        Ok(views)
    }
}

/// Stable, so records sharing a timestamp keep the store's order
fn sort_newest_first(payments: &mut [Payment]) {
    payments.sort_by_key(|p| std::cmp::Reverse(p.payment_date));
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::error::PortalError;
    use crate::entities::{PaymentMethod, PaymentStatus, Role};
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub(crate) sent: Mutex<Vec<(Uuid, PaymentView)>>,
    }

    impl RecordingNotifier {
        pub(crate) fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl PaymentNotifier for RecordingNotifier {
        fn payment_approved(&self, tenant_id: Uuid, payment: &PaymentView) {
            self.sent.lock().unwrap().push((tenant_id, payment.clone()));
        }
    }

    pub(crate) struct Fixture {
        pub(crate) ledger: PaymentLedger,
        pub(crate) notifier: Arc<RecordingNotifier>,
        pub(crate) tenant: User,
        pub(crate) rental: Rental,
    }

    pub(crate) async fn fixture(rent: f64) -> Fixture {
        let stores = Stores::in_memory();
        let notifier = Arc::new(RecordingNotifier::default());

        let tenant = User::new(
            "Jane Tenant".to_string(),
            "jane@example.com".to_string(),
            None,
            String::new(),
            Role::Tenant,
        );
        stores.users.create(tenant.clone()).await.unwrap();

        let house = House::new("A1".to_string(), rent);
        stores.houses.create(house.clone()).await.unwrap();

        let rental = Rental::new(house.id, tenant.id, rent, Utc::now(), None);
        stores.rentals.create(rental.clone()).await.unwrap();

        Fixture {
            ledger: PaymentLedger::new(stores, notifier.clone()),
            notifier,
            tenant,
            rental,
        }
    }

    pub(crate) fn attempt(f: &Fixture, amount: f64, method: PaymentMethod) -> NewPayment {
        NewPayment {
            tenant_id: f.tenant.id,
            rental_id: f.rental.id,
            amount,
            method,
            transaction_id: None,
            month: "Nov".to_string(),
            receipt_url: None,
        }
    }

    async fn rental_status(f: &Fixture) -> RentalPaymentStatus {
        f.ledger
            .stores
            .rentals
            .get(&f.rental.id)
            .await
            .unwrap()
            .unwrap()
            .payment_status
    }

    #[test]
    fn test_compute_balance() {
        assert_eq!(compute_balance(10000.0, 0.0, 10000.0), 0.0);
        assert_eq!(compute_balance(10000.0, 0.0, 4000.0), 6000.0);
        assert_eq!(compute_balance(10000.0, 4000.0, 4000.0), 2000.0);
        assert_eq!(compute_balance(10000.0, 8000.0, 4000.0), 0.0);
    }

    #[tokio::test]
    async fn test_full_mobile_money_payment_settles_rental() {
        let f = fixture(10000.0).await;

        let view = f
            .ledger
            .create_payment(attempt(&f, 10000.0, PaymentMethod::MobileMoney))
            .await
            .unwrap();

        assert_eq!(view.status, PaymentStatus::Successful);
        assert_eq!(view.balance, 0.0);
        assert_eq!(view.tenant_name, "Jane Tenant");
        assert_eq!(view.house_no, "A1");
        assert_eq!(rental_status(&f).await, RentalPaymentStatus::Paid);

        let sent = f.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, f.tenant.id);
        assert_eq!(sent[0].1.id, view.id);
    }

    #[tokio::test]
    async fn test_partial_card_payment_does_not_settle() {
        let f = fixture(10000.0).await;

        let view = f
            .ledger
            .create_payment(attempt(&f, 2500.0, PaymentMethod::Card))
            .await
            .unwrap();

        assert_eq!(view.status, PaymentStatus::Successful);
        assert_eq!(view.balance, 7500.0);
        assert_eq!(rental_status(&f).await, RentalPaymentStatus::Pending);
        assert_eq!(f.notifier.count(), 1);
    }

    #[tokio::test]
    async fn test_cash_payment_is_pending_and_silent() {
        let f = fixture(10000.0).await;

        let view = f
            .ledger
            .create_payment(attempt(&f, 4000.0, PaymentMethod::Cash))
            .await
            .unwrap();

        assert_eq!(view.status, PaymentStatus::Pending);
        assert_eq!(view.balance, 6000.0);
        assert!(view.approved_by.is_none());
        assert_eq!(rental_status(&f).await, RentalPaymentStatus::Pending);
        assert_eq!(f.notifier.count(), 0);
    }

    #[tokio::test]
    async fn test_cash_covering_rent_does_not_settle_before_approval() {
        let f = fixture(5000.0).await;

        let view = f
            .ledger
            .create_payment(attempt(&f, 5000.0, PaymentMethod::Cash))
            .await
            .unwrap();

        assert_eq!(view.balance, 0.0);
        assert_eq!(rental_status(&f).await, RentalPaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_balance_includes_prior_payments_of_every_status() {
        let f = fixture(10000.0).await;

        f.ledger
            .create_payment(attempt(&f, 4000.0, PaymentMethod::Cash))
            .await
            .unwrap();
        let second = f
            .ledger
            .create_payment(attempt(&f, 3000.0, PaymentMethod::Card))
            .await
            .unwrap();

        assert_eq!(second.balance, 3000.0);
    }

    #[tokio::test]
    async fn test_prior_payments_of_other_tenants_are_ignored() {
        let f = fixture(10000.0).await;

        let mut other = attempt(&f, 9000.0, PaymentMethod::Card);
        other.tenant_id = Uuid::new_v4();
        f.ledger.create_payment(other).await.unwrap();

        let mine = f
            .ledger
            .create_payment(attempt(&f, 1000.0, PaymentMethod::Card))
            .await
            .unwrap();
        assert_eq!(mine.balance, 9000.0);
    }

    #[tokio::test]
    async fn test_unknown_rental_persists_nothing() {
        let f = fixture(10000.0).await;
        let mut input = attempt(&f, 100.0, PaymentMethod::Card);
        input.rental_id = Uuid::new_v4();

        let err = f.ledger.create_payment(input).await.unwrap_err();
        assert!(matches!(
            err,
            PortalError::Entity(EntityError::NotFound { .. })
        ));
        assert_eq!(err.to_string(), "Rental not found");
        assert!(f.ledger.list_all().await.unwrap().is_empty());
        assert_eq!(f.notifier.count(), 0);
    }

    #[tokio::test]
    async fn test_blank_month_is_rejected() {
        let f = fixture(10000.0).await;
        let mut input = attempt(&f, 100.0, PaymentMethod::Card);
        input.month = "  ".to_string();

        let err = f.ledger.create_payment(input).await.unwrap_err();
        assert_eq!(err.to_string(), "Month is required");
        assert!(f.ledger.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_rejected() {
        let f = fixture(10000.0).await;
        for amount in [0.0, -10.0, f64::NAN] {
            let err = f
                .ledger
                .create_payment(attempt(&f, amount, PaymentMethod::Card))
                .await
                .unwrap_err();
            assert!(matches!(err, PortalError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_tenant_listing_and_latest() {
        let f = fixture(10000.0).await;
        assert!(f.ledger.latest_for_tenant(f.tenant.id).await.unwrap().is_none());

        f.ledger
            .create_payment(attempt(&f, 1000.0, PaymentMethod::Card))
            .await
            .unwrap();
        let newest = f
            .ledger
            .create_payment(attempt(&f, 2000.0, PaymentMethod::Cash))
            .await
            .unwrap();

        let mut someone_else = attempt(&f, 50.0, PaymentMethod::Card);
        someone_else.tenant_id = Uuid::new_v4();
        f.ledger.create_payment(someone_else).await.unwrap();

        let mine = f.ledger.list_for_tenant(f.tenant.id).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, newest.id);

        let all = f.ledger.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].tenant_name, "Jane Tenant");
        assert_eq!(all[0].tenant_name, "Unknown");

        let latest = f.ledger.latest_for_tenant(f.tenant.id).await.unwrap().unwrap();
        assert_eq!(latest.id, newest.id);
    }

    #[tokio::test]
    async fn test_get_missing_payment() {
        let f = fixture(10000.0).await;
        let err = f.ledger.get(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.to_string(), "Payment not found");
    }
}
