//! Academic-records service adapter.
//!
//! This module provides an [`AcademicClient`] that rides an authenticated
//! [`CasSession`](crate::session::CasSession) into the academic system and
//! reads timetables, exam arrangements, and directory data out of it.
//!
//! # Features
//!
//! - SSO entry via a bounded, manually walked redirect chain
//! - Timetable context discovery (display mode, semesters, teaching weeks)
//! - Weekly timetable fetch with slot-grid extraction
//! - Exam arrangement listing per semester
//! - Student directory search
//! - Course election round listing
//!
//! # Example
//!
//! ```ignore
//! use campass_portal::academic::AcademicClient;
//! use campass_portal::bridge::ServiceBridge;
//! use campass_portal::config::AcademicConfig;
//!
//! let mut academic = AcademicClient::new(AcademicConfig::default());
//! if academic.authenticate_by_cas(&session).await? {
//!     let context = academic.timetable_context(&session).await?;
//!     for week in &context.weeks {
//!         let entries = academic.week_schedule(&session, &context, week).await?;
//!         println!("{} entries in week starting {}", entries.len(), week.start);
//!     }
//! }
//! ```

mod client;
mod extract;

pub use client::AcademicClient;
pub use extract::{ElectionRound, TimetableContext, WeekOption};
