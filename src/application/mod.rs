//! Application layer orchestrating a checkout attempt.
//!
//! `PaymentInitiator` validates a request, opens the hosted overlay and wires
//! the provider's callbacks to navigation or a user notification.
//! `PaymentSession` lets the caller observe how the attempt ended.

pub mod initiator;
pub mod session;
