//! Stored records of the portal

pub mod complaint;
pub mod house;
pub mod message;
pub mod payment;
pub mod rental;
pub mod user;

pub use complaint::{Complaint, ComplaintStatus};
pub use house::{Availability, House};
pub use message::Message;
pub use payment::{NewPayment, Payment, PaymentMethod, PaymentStatus};
pub use rental::{Rental, RentalPaymentStatus, RentalStatus};
pub use user::{PublicUser, Role, User, normalize_email};
