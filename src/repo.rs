use crate::model::{AssessmentData, AssessmentMap, Student, Teacher};
use crate::remote::RemoteStore;
use crate::store::{SnapshotStore, DATA_KEY, USER_KEY};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Synced,
    LocalOnly,
}

impl SaveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveOutcome::Synced => "synced",
            SaveOutcome::LocalOnly => "local_only",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    Local,
}

impl LoadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadSource::Remote => "remote",
            LoadSource::Local => "local",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InitOutcome {
    pub source: LoadSource,
    /// True only when falling back to local data while a teacher session is
    /// already active; a fresh logged-out load stays quiet.
    pub offline_notice: bool,
}

/// Owns the canonical in-memory collection for the session and mediates
/// between the local snapshot store and the remote endpoint. The snapshot's
/// assessment key is written only through this type; remote data enters the
/// snapshot solely via [`Repository::initialize`].
pub struct Repository {
    store: SnapshotStore,
    remote: Option<RemoteStore>,
    session: Option<Teacher>,
    assessments: AssessmentMap,
}

impl Repository {
    /// Build a repository over an opened snapshot store, reloading any
    /// persisted teacher session. The collection stays empty until
    /// `initialize` runs.
    pub fn open(store: SnapshotStore, remote: Option<RemoteStore>) -> Self {
        let session: Option<Teacher> = store.read_json(USER_KEY);
        if let Some(teacher) = &session {
            info!(username = %teacher.username, "restored persisted session");
        }
        Self {
            store,
            remote,
            session,
            assessments: AssessmentMap::new(),
        }
    }

    pub fn session(&self) -> Option<&Teacher> {
        self.session.as_ref()
    }

    pub fn remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.base_url())
    }

    /// Swap the remote endpoint without touching the session or the
    /// in-memory collection.
    pub fn set_remote(&mut self, remote: Option<RemoteStore>) {
        self.remote = remote;
    }

    pub fn assessments(&self) -> &AssessmentMap {
        &self.assessments
    }

    pub fn get(&self, student_id: i64) -> Option<&AssessmentData> {
        self.assessments.get(&student_id)
    }

    /// One fetch attempt, remote-first. On success the fetched collection
    /// becomes the session's source of truth and overwrites the snapshot
    /// (remote wins while reachable). On any failure, fall back to whatever
    /// the snapshot holds. Never retries, never blocks past the single
    /// attempt.
    pub fn initialize(&mut self) -> InitOutcome {
        if let Some(fetched) = self.remote.as_ref().and_then(|r| r.fetch_all()) {
            self.assessments = fetched;
            if let Err(e) = self.store.write_json(DATA_KEY, &self.assessments) {
                // Memory is still authoritative for this session; the stale
                // snapshot only matters if the next load is offline too.
                warn!(error = %e, "failed to mirror remote collection into snapshot");
            }
            return InitOutcome {
                source: LoadSource::Remote,
                offline_notice: false,
            };
        }

        self.assessments = self.store.read_json(DATA_KEY).unwrap_or_default();
        InitOutcome {
            source: LoadSource::Local,
            offline_notice: self.session.is_some(),
        }
    }

    /// Optimistic write: merge into the collection (wholesale replace per
    /// student), persist the full collection locally, then make one
    /// best-effort remote attempt. The local write is never rolled back;
    /// a remote failure only downgrades the outcome.
    pub fn save(
        &mut self,
        student: &Student,
        record: AssessmentData,
    ) -> anyhow::Result<SaveOutcome> {
        self.assessments.insert(record.student_id, record.clone());
        self.store.write_json(DATA_KEY, &self.assessments)?;

        let synced = self
            .remote
            .as_ref()
            .map(|r| r.persist_one(student, &record))
            .unwrap_or(false);
        Ok(if synced {
            SaveOutcome::Synced
        } else {
            SaveOutcome::LocalOnly
        })
    }

    pub fn login(&mut self, teacher: Teacher) -> anyhow::Result<()> {
        self.store.write_json(USER_KEY, &teacher)?;
        self.session = Some(teacher);
        Ok(())
    }

    pub fn logout(&mut self) -> anyhow::Result<()> {
        self.store.remove(USER_KEY)?;
        self.session = None;
        Ok(())
    }
}
