use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use sportdash::dashboard::{
    ExtraSportMoment, Group, RepositoryError, ScheduledActivity, SportRepository, StatusRecord,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    groups: Vec<Group>,
    #[serde(default)]
    statuses: Vec<StatusRecord>,
    #[serde(default)]
    moments: Vec<ExtraSportMoment>,
    #[serde(default)]
    activities: Vec<ScheduledActivity>,
}

impl Snapshot {
    fn push_group(&mut self, group: Group) -> Result<Group, RepositoryError> {
        if self
            .groups
            .iter()
            .any(|existing| existing.id == group.id || existing.name == group.name)
        {
            return Err(RepositoryError::Conflict);
        }
        self.groups.push(group.clone());
        Ok(group)
    }

    fn push_status(&mut self, record: StatusRecord) -> Result<StatusRecord, RepositoryError> {
        if self.statuses.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        self.statuses.push(record.clone());
        Ok(record)
    }

    fn push_moment(
        &mut self,
        moment: ExtraSportMoment,
    ) -> Result<ExtraSportMoment, RepositoryError> {
        if self.moments.iter().any(|existing| existing.id == moment.id) {
            return Err(RepositoryError::Conflict);
        }
        self.moments.push(moment.clone());
        Ok(moment)
    }

    fn push_activity(
        &mut self,
        activity: ScheduledActivity,
    ) -> Result<ScheduledActivity, RepositoryError> {
        if self.activities.iter().any(|existing| existing.id == activity.id) {
            return Err(RepositoryError::Conflict);
        }
        self.activities.push(activity.clone());
        Ok(activity)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySportRepository {
    snapshot: Arc<Mutex<Snapshot>>,
}

impl InMemorySportRepository {
    fn guard(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().expect("repository mutex poisoned")
    }
}

impl SportRepository for InMemorySportRepository {
    fn insert_group(&self, group: Group) -> Result<Group, RepositoryError> {
        self.guard().push_group(group)
    }

    fn groups(&self) -> Result<Vec<Group>, RepositoryError> {
        Ok(self.guard().groups.clone())
    }

    fn insert_status(&self, record: StatusRecord) -> Result<StatusRecord, RepositoryError> {
        self.guard().push_status(record)
    }

    fn statuses(&self) -> Result<Vec<StatusRecord>, RepositoryError> {
        Ok(self.guard().statuses.clone())
    }

    fn insert_moment(&self, moment: ExtraSportMoment) -> Result<ExtraSportMoment, RepositoryError> {
        self.guard().push_moment(moment)
    }

    fn moments(&self) -> Result<Vec<ExtraSportMoment>, RepositoryError> {
        Ok(self.guard().moments.clone())
    }

    fn insert_activity(
        &self,
        activity: ScheduledActivity,
    ) -> Result<ScheduledActivity, RepositoryError> {
        self.guard().push_activity(activity)
    }

    fn activities(&self) -> Result<Vec<ScheduledActivity>, RepositoryError> {
        Ok(self.guard().activities.clone())
    }
}

/// Repository persisted as a single JSON document. Every insert is flushed before it returns.
pub(crate) struct JsonFileRepository {
    path: PathBuf,
    snapshot: Mutex<Snapshot>,
}

impl JsonFileRepository {
    /// Loads `path`, starting empty when the file does not exist yet.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let snapshot = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Snapshot::default(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                RepositoryError::Unavailable(format!("{} is not readable: {err}", path.display()))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(err) => {
                return Err(RepositoryError::Unavailable(format!(
                    "{} could not be opened: {err}",
                    path.display()
                )))
            }
        };

        debug!(path = %path.display(), groups = snapshot.groups.len(), "data file opened");
        Ok(Self {
            path,
            snapshot: Mutex::new(snapshot),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the current state through a sibling temp file and renames it into place.
    pub(crate) fn flush(&self) -> Result<(), RepositoryError> {
        let snapshot = self.lock()?;
        self.write(&snapshot)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Snapshot>, RepositoryError> {
        self.snapshot
            .lock()
            .map_err(|_| RepositoryError::Unavailable("data file lock poisoned".to_string()))
    }

    fn write(&self, snapshot: &Snapshot) -> Result<(), RepositoryError> {
        let unavailable = |err: &dyn std::fmt::Display| {
            RepositoryError::Unavailable(format!("{} could not be written: {err}", self.path.display()))
        };

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| unavailable(&err))?;
        }
        let bytes = serde_json::to_vec_pretty(snapshot).map_err(|err| unavailable(&err))?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, bytes).map_err(|err| unavailable(&err))?;
        fs::rename(&staging, &self.path).map_err(|err| unavailable(&err))
    }

    fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut Snapshot) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut snapshot = self.lock()?;
        let mut draft = snapshot.clone();
        let value = apply(&mut draft)?;
        self.write(&draft)?;
        *snapshot = draft;
        Ok(value)
    }
}

impl SportRepository for JsonFileRepository {
    fn insert_group(&self, group: Group) -> Result<Group, RepositoryError> {
        self.mutate(|snapshot| snapshot.push_group(group))
    }

    fn groups(&self) -> Result<Vec<Group>, RepositoryError> {
        Ok(self.lock()?.groups.clone())
    }

    fn insert_status(&self, record: StatusRecord) -> Result<StatusRecord, RepositoryError> {
        self.mutate(|snapshot| snapshot.push_status(record))
    }

    fn statuses(&self) -> Result<Vec<StatusRecord>, RepositoryError> {
        Ok(self.lock()?.statuses.clone())
    }

    fn insert_moment(&self, moment: ExtraSportMoment) -> Result<ExtraSportMoment, RepositoryError> {
        self.mutate(|snapshot| snapshot.push_moment(moment))
    }

    fn moments(&self) -> Result<Vec<ExtraSportMoment>, RepositoryError> {
        Ok(self.lock()?.moments.clone())
    }

    fn insert_activity(
        &self,
        activity: ScheduledActivity,
    ) -> Result<ScheduledActivity, RepositoryError> {
        self.mutate(|snapshot| snapshot.push_activity(activity))
    }

    fn activities(&self) -> Result<Vec<ScheduledActivity>, RepositoryError> {
        Ok(self.lock()?.activities.clone())
    }
}

pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 timestamp ({err})"))
}
