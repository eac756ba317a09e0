use super::domain::{ExtraSportMoment, Group, ScheduledActivity};
use super::status::StatusRecord;

/// Storage abstraction injected into the service; implementations own their lifecycle.
///
/// `list` methods return records in insertion order.
///
/// `insert_group` rejects a group whose id or
/// [`GroupName`](super::domain::GroupName) is already stored with
/// [`RepositoryError::Conflict`], checked under the same lock as the write.
pub trait SportRepository: Send + Sync {
    fn insert_group(&self, group: Group) -> Result<Group, RepositoryError>;
    fn groups(&self) -> Result<Vec<Group>, RepositoryError>;

    fn insert_status(&self, record: StatusRecord) -> Result<StatusRecord, RepositoryError>;
    fn statuses(&self) -> Result<Vec<StatusRecord>, RepositoryError>;

    fn insert_moment(&self, moment: ExtraSportMoment) -> Result<ExtraSportMoment, RepositoryError>;
    fn moments(&self) -> Result<Vec<ExtraSportMoment>, RepositoryError>;

    fn insert_activity(
        &self,
        activity: ScheduledActivity,
    ) -> Result<ScheduledActivity, RepositoryError>;
    fn activities(&self) -> Result<Vec<ScheduledActivity>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
