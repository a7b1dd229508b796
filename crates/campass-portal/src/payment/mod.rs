//! Payment-platform service adapter.
//!
//! This module provides a [`PaymentClient`] that exchanges a CAS service
//! ticket for the platform's API token and then reads account and project
//! data with it.
//!
//! # Features
//!
//! - Ticket redemption across the platform's three-step login redirect
//! - API token capture from the final redirect's query string
//! - Account profile lookup
//! - Payable project listing
//!
//! # Example
//!
//! ```ignore
//! use campass_portal::bridge::ServiceBridge;
//! use campass_portal::config::PaymentConfig;
//! use campass_portal::payment::PaymentClient;
//!
//! let mut payment = PaymentClient::new(PaymentConfig::default());
//! if payment.authenticate_by_cas(&session).await? {
//!     let user = payment.user_info(&session).await?;
//!     println!("balance account for {}", user.name);
//! }
//! ```

mod client;

pub use client::{PaymentClient, PaymentProject, PaymentUser};
