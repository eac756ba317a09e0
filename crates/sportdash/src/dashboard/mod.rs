//! Sport status, extra sport priority, and activity scheduling for facility groups.
//!
//! The computations in [`status`], [`priority`], and [`window`] are pure functions over
//! in-memory slices. [`service::SportDashService`] feeds them from a [`SportRepository`]
//! and [`router::dashboard_router`] exposes the service over HTTP.

pub mod domain;
pub mod import;
pub mod priority;
pub mod repository;
pub mod router;
pub mod service;
pub mod status;
pub mod window;

#[cfg(test)]
mod tests;

pub use domain::{
    ExtraSportMoment, Group, GroupName, MomentStatus, NewActivity, NewGroup, NewMoment,
    ScheduledActivity,
};
pub use import::ImportError;
pub use priority::{parse_candidates_csv, PriorityCandidate, PriorityEntry};
pub use repository::{RepositoryError, SportRepository};
pub use router::dashboard_router;
pub use service::{DashboardServiceError, ImportSummary, SportDashService};
pub use status::{GroupStatusView, NewStatus, StatusCategory, StatusRecord};
pub use window::{DateWindow, Timestamped, WindowError, WindowQuery};
