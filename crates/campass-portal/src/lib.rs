//! CAS identity-provider session and campus service adapters.
//!
//! This crate provides the network layer of campass:
//!
//! - [`CasSession`] - Authenticated session against the CAS identity provider
//! - [`ServiceBridge`] - The trait campus service clients implement to ride a session
//! - [`AcademicClient`] - Timetables, exams, and directory data
//! - [`PaymentClient`] - Payment-platform account and project data
//! - [`PortalError`] - Error types for portal operations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ CAS provider │  password/SMS login, cookies, service tickets
//! └──────┬───────┘
//!        │ CasSession
//!        ├───────────────────────────┐
//!        ▼                           ▼
//! ┌────────────────┐        ┌────────────────┐
//! │ AcademicClient │        │ PaymentClient  │
//! └──────┬─────────┘        └──────┬─────────┘
//!        │ redirect chain          │ ticket redemption + API token
//!        ▼                         ▼
//!  timetable, exams,         account profile,
//!  students, elections       payable projects
//! ```
//!
//! # Example
//!
//! ```ignore
//! use campass_portal::config::CasConfig;
//! use campass_portal::credentials::Credential;
//! use campass_portal::session::CasSession;
//!
//! let session = CasSession::new(CasConfig::default())?;
//! let mut credential = Credential::new("202401001", "hunter2");
//! if session.login_with_password(&mut credential).await? {
//!     println!("logged in as {:?}", session.student_id());
//! }
//! ```

pub mod academic;
pub mod bridge;
pub mod config;
pub mod credentials;
pub mod crypto;
pub mod error;
pub mod payment;
pub mod redirect;
pub mod session;

// Re-export main types at crate root
pub use academic::{AcademicClient, ElectionRound, TimetableContext, WeekOption};
pub use bridge::{BoxFuture, ServiceBridge};
pub use config::{AcademicConfig, CasConfig, PaymentConfig};
pub use credentials::{Credential, CredentialStore};
pub use crypto::CredentialCipher;
pub use error::{PortalError, PortalErrorCode, PortalResult};
pub use payment::{PaymentClient, PaymentProject, PaymentUser};
pub use redirect::{ChainStep, RedirectChain};
pub use session::CasSession;
