use std::io::Read;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::domain::{
    ExtraSportMoment, Group, GroupName, NewActivity, NewGroup, NewMoment, ScheduledActivity,
};
use super::import::ImportError;
use super::priority::{count_recent_moments, rank, PriorityEntry};
use super::repository::{RepositoryError, SportRepository};
use super::status::legacy::parse_legacy_csv;
use super::status::{resolve_overview, GroupStatusView, NewStatus, StatusRecord};
use super::window::{filter_events, parse_event_instant, DateWindow, WindowError, WindowQuery};
use crate::config::{DashboardConfig, MAX_PRIORITY_WINDOW_DAYS};

/// Service composing the repository with status resolution, priority scoring, and
/// date-window filtering.
pub struct SportDashService<R> {
    repository: Arc<R>,
    timezone: Tz,
    priority_window: Duration,
}

/// Outcome of a legacy status import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

fn next_id() -> String {
    Uuid::new_v4().to_string()
}

impl<R> SportDashService<R>
where
    R: SportRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: &DashboardConfig) -> Self {
        Self {
            repository,
            timezone: config.timezone,
            priority_window: Duration::days(
                config
                    .priority_window_days
                    .clamp(1, MAX_PRIORITY_WINDOW_DAYS),
            ),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn register_group(&self, new_group: NewGroup) -> Result<Group, DashboardServiceError> {
        let name = GroupName::new(new_group.name.trim());
        if name.is_blank() {
            return Err(DashboardServiceError::Validation(
                "group name must not be empty".to_string(),
            ));
        }

        let group = Group {
            id: next_id(),
            name,
            description: new_group
                .description
                .filter(|description| !description.trim().is_empty()),
        };
        let stored = self.repository.insert_group(group)?;
        info!(group = %stored.name, id = %stored.id, "group registered");
        Ok(stored)
    }

    pub fn groups(&self) -> Result<Vec<Group>, DashboardServiceError> {
        Ok(self.repository.groups()?)
    }

    /// Store a status with its category fixed at creation.
    pub fn record_status(
        &self,
        new_status: NewStatus,
    ) -> Result<StatusRecord, DashboardServiceError> {
        let group = self.require_group(&new_status.group)?;
        let record = StatusRecord {
            id: next_id(),
            group: group.name,
            category: new_status.category,
            active: new_status.active,
            end: new_status.end,
            note: new_status.note.filter(|note| !note.trim().is_empty()),
        };

        let stored = self.repository.insert_status(record)?;
        info!(
            group = %stored.group,
            category = stored.category.label(),
            "status recorded"
        );
        Ok(stored)
    }

    /// Import free-text statuses from a legacy CSV export.
    ///
    /// Rows that do not classify, carry an unreadable end, or name an unregistered group are
    /// counted as skipped.
    pub fn import_legacy_statuses<Rd: Read>(
        &self,
        reader: Rd,
    ) -> Result<ImportSummary, DashboardServiceError> {
        let rows = parse_legacy_csv(reader)?;
        let groups = self.repository.groups()?;
        let mut summary = ImportSummary {
            imported: 0,
            skipped: 0,
        };

        for row in rows {
            let Some(mut record) = row.into_record(next_id()) else {
                summary.skipped += 1;
                continue;
            };

            match groups.iter().find(|group| group.name == record.group) {
                Some(group) => {
                    record.group = group.name.clone();
                    self.repository.insert_status(record)?;
                    summary.imported += 1;
                }
                None => {
                    warn!(group = %record.group, "legacy status references unknown group");
                    summary.skipped += 1;
                }
            }
        }

        info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "legacy statuses imported"
        );
        Ok(summary)
    }

    pub fn group_status(
        &self,
        group: &str,
        now: DateTime<Utc>,
    ) -> Result<GroupStatusView, DashboardServiceError> {
        let group = self.require_group(group)?;
        let records = self.repository.statuses()?;
        let view = GroupStatusView::resolve(&records, &group.name, now);
        debug!(group = %group.name, category = ?view.category, "group status resolved");
        Ok(view)
    }

    pub fn status_overview(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<GroupStatusView>, DashboardServiceError> {
        let groups = self.repository.groups()?;
        let records = self.repository.statuses()?;
        Ok(resolve_overview(&groups, &records, now))
    }

    pub fn log_moment(
        &self,
        new_moment: NewMoment,
    ) -> Result<ExtraSportMoment, DashboardServiceError> {
        let group = self.require_group(&new_moment.group)?;
        self.require_timestamp("start", &new_moment.start)?;

        let moment = ExtraSportMoment {
            id: next_id(),
            group: group.name,
            start: new_moment.start.trim().to_string(),
            status: new_moment.status,
            note: new_moment.note.filter(|note| !note.trim().is_empty()),
        };
        let stored = self.repository.insert_moment(moment)?;
        info!(
            group = %stored.group,
            status = stored.status.label(),
            "extra sport moment logged"
        );
        Ok(stored)
    }

    /// Groups ordered by deficit in completed extra sport moments over the trailing window.
    pub fn extra_sport_priority(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<PriorityEntry>, DashboardServiceError> {
        let groups = self.repository.groups()?;
        let moments = self.repository.moments()?;
        let candidates = count_recent_moments(
            &groups,
            &moments,
            now,
            self.priority_window,
            &self.timezone,
        );
        Ok(rank(candidates))
    }

    pub fn schedule_activity(
        &self,
        new_activity: NewActivity,
    ) -> Result<ScheduledActivity, DashboardServiceError> {
        let group = self.require_group(&new_activity.group)?;
        let title = new_activity.title.trim();
        if title.is_empty() {
            return Err(DashboardServiceError::Validation(
                "activity title must not be empty".to_string(),
            ));
        }
        self.require_timestamp("start", &new_activity.start)?;
        let end = new_activity
            .end
            .map(|end| end.trim().to_string())
            .filter(|end| !end.is_empty());
        if let Some(end) = end.as_deref() {
            self.require_timestamp("end", end)?;
        }

        let activity = ScheduledActivity {
            id: next_id(),
            group: group.name,
            title: title.to_string(),
            start: new_activity.start.trim().to_string(),
            end,
            location: new_activity
                .location
                .filter(|location| !location.trim().is_empty()),
        };
        let stored = self.repository.insert_activity(activity)?;
        info!(group = %stored.group, title = %stored.title, "activity scheduled");
        Ok(stored)
    }

    pub fn window_from_query(&self, query: &WindowQuery) -> Result<DateWindow, DashboardServiceError> {
        Ok(DateWindow::from_query(query, &self.timezone)?)
    }

    /// Scheduled activities inside `window`, in scheduling order.
    pub fn activities(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<ScheduledActivity>, DashboardServiceError> {
        let activities = self.repository.activities()?;
        Ok(filter_events(activities, window, &self.timezone))
    }

    fn find_group(&self, name: &GroupName) -> Result<Option<Group>, DashboardServiceError> {
        Ok(self
            .repository
            .groups()?
            .into_iter()
            .find(|group| group.name == *name))
    }

    fn require_group(&self, raw: &str) -> Result<Group, DashboardServiceError> {
        let name = GroupName::from(raw);
        if name.is_blank() {
            return Err(DashboardServiceError::Validation(
                "group must not be empty".to_string(),
            ));
        }
        self.find_group(&name)?
            .ok_or_else(|| DashboardServiceError::UnknownGroup(name.to_string()))
    }

    fn require_timestamp(&self, field: &str, raw: &str) -> Result<(), DashboardServiceError> {
        match parse_event_instant(raw, &self.timezone) {
            Some(_) => Ok(()),
            None => Err(DashboardServiceError::Validation(format!(
                "{field} '{raw}' is not an ISO-8601 timestamp"
            ))),
        }
    }
}

/// Error raised by the dashboard service.
#[derive(Debug, thiserror::Error)]
pub enum DashboardServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("group '{0}' is not registered")]
    UnknownGroup(String),
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl DashboardServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UnknownGroup(_) => StatusCode::NOT_FOUND,
            Self::Window(_) | Self::Import(_) => StatusCode::BAD_REQUEST,
            Self::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            Self::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
