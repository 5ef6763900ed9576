//! Admin approval of cash payments

use uuid::Uuid;

use crate::core::Entity;
use crate::core::error::{EntityError, PortalResult};
use crate::entities::RentalPaymentStatus;
use crate::payments::{PaymentLedger, PaymentView};

impl PaymentLedger {
    /// Confirm a pending cash payment
    ///
    /// The rental is marked paid whatever the remaining balance. Non-cash and
    /// already settled payments are rejected without touching any record.
    /// The caller is responsible for checking that `admin_id` is an admin.
    pub async fn approve_cash_payment(
        &self,
        payment_id: Uuid,
        admin_id: Uuid,
    ) -> PortalResult<PaymentView> {
        let mut payment = self
            .stores
            .payments
            .get(&payment_id)
            .await?
            .ok_or_else(|| EntityError::not_found("payment", payment_id))?;

        payment.approve(admin_id)?;
        let payment = self.stores.payments.update(&payment_id, payment).await?;

        tracing::info!(
            payment_id = %payment.id,
            admin_id = %admin_id,
            tenant_id = %payment.tenant_id,
            "cash payment approved"
        );

        self.mark_rental_paid(payment.rental_id).await?;

        let view = self.view(&payment).await?;
        self.notifier.payment_approved(payment.tenant_id, &view);

        Ok(view)
    }

    async fn mark_rental_paid(&self, rental_id: Uuid) -> PortalResult<()> {
        let Some(mut rental) = self.stores.rentals.get(&rental_id).await? else {
            tracing::warn!(rental_id = %rental_id, "approved payment refers to a missing rental");
            return Ok(());
        };

        rental.payment_status = RentalPaymentStatus::Paid;
        rental.touch();
        self.stores.rentals.update(&rental_id, rental).await?;
        Ok(())
    }
}
