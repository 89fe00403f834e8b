//! Data models for the school visits server

pub mod attendance;
pub mod calendar;
pub mod catalog;
pub mod organizer;
pub mod proposal;
pub mod report;
pub mod visit;

// Re-export commonly used types
pub use attendance::{Attendance, AttendanceSummary};
pub use catalog::{BlockedDate, District, School};
pub use organizer::{Organizer, OrganizerClaims};
pub use proposal::{NewProposal, Proposal};
pub use visit::{NewVisit, Visit, VisitSet, VisitStatus};
