use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::config::DashboardConfig;
use crate::dashboard::domain::{ExtraSportMoment, Group, NewGroup, ScheduledActivity};
use crate::dashboard::repository::{RepositoryError, SportRepository};
use crate::dashboard::service::SportDashService;
use crate::dashboard::status::StatusRecord;
use crate::dashboard::dashboard_router;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

pub(super) fn dashboard_config() -> DashboardConfig {
    DashboardConfig {
        timezone: chrono_tz::Europe::Brussels,
        priority_window_days: 30,
        data_file: None,
    }
}

pub(super) fn build_service() -> (SportDashService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = SportDashService::new(repository.clone(), &dashboard_config());
    (service, repository)
}

pub(super) fn new_group(name: &str) -> NewGroup {
    NewGroup {
        name: name.to_string(),
        description: None,
    }
}

pub(super) fn seeded_service(
    names: &[&str],
) -> (SportDashService<MemoryRepository>, Arc<MemoryRepository>) {
    let (service, repository) = build_service();
    for name in names {
        service
            .register_group(new_group(name))
            .expect("group registers");
    }
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) groups: Arc<Mutex<Vec<Group>>>,
    pub(super) statuses: Arc<Mutex<Vec<StatusRecord>>>,
    pub(super) moments: Arc<Mutex<Vec<ExtraSportMoment>>>,
    pub(super) activities: Arc<Mutex<Vec<ScheduledActivity>>>,
}

impl SportRepository for MemoryRepository {
    fn insert_group(&self, group: Group) -> Result<Group, RepositoryError> {
        let mut guard = self.groups.lock().expect("repository mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.id == group.id || existing.name == group.name)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.push(group.clone());
        Ok(group)
    }

    fn groups(&self) -> Result<Vec<Group>, RepositoryError> {
        Ok(self.groups.lock().expect("repository mutex poisoned").clone())
    }

    fn insert_status(&self, record: StatusRecord) -> Result<StatusRecord, RepositoryError> {
        self.statuses
            .lock()
            .expect("repository mutex poisoned")
            .push(record.clone());
        Ok(record)
    }

    fn statuses(&self) -> Result<Vec<StatusRecord>, RepositoryError> {
        Ok(self.statuses.lock().expect("repository mutex poisoned").clone())
    }

    fn insert_moment(&self, moment: ExtraSportMoment) -> Result<ExtraSportMoment, RepositoryError> {
        self.moments
            .lock()
            .expect("repository mutex poisoned")
            .push(moment.clone());
        Ok(moment)
    }

    fn moments(&self) -> Result<Vec<ExtraSportMoment>, RepositoryError> {
        Ok(self.moments.lock().expect("repository mutex poisoned").clone())
    }

    fn insert_activity(
        &self,
        activity: ScheduledActivity,
    ) -> Result<ScheduledActivity, RepositoryError> {
        self.activities
            .lock()
            .expect("repository mutex poisoned")
            .push(activity.clone());
        Ok(activity)
    }

    fn activities(&self) -> Result<Vec<ScheduledActivity>, RepositoryError> {
        Ok(self.activities.lock().expect("repository mutex poisoned").clone())
    }
}

pub(super) struct UnavailableRepository;

impl SportRepository for UnavailableRepository {
    fn insert_group(&self, _group: Group) -> Result<Group, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn groups(&self) -> Result<Vec<Group>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_status(&self, _record: StatusRecord) -> Result<StatusRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn statuses(&self) -> Result<Vec<StatusRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_moment(&self, _moment: ExtraSportMoment) -> Result<ExtraSportMoment, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn moments(&self) -> Result<Vec<ExtraSportMoment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_activity(
        &self,
        _activity: ScheduledActivity,
    ) -> Result<ScheduledActivity, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn activities(&self) -> Result<Vec<ScheduledActivity>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: SportDashService<MemoryRepository>) -> axum::Router {
    dashboard_router(Arc::new(service))
}
