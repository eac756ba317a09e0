mod domain;
pub mod legacy;
mod resolver;

pub use domain::{NewStatus, StatusCategory, StatusRecord};
pub use legacy::LegacyStatusRecord;
pub use resolver::{resolve_group_status, resolve_overview, GroupStatusView};
