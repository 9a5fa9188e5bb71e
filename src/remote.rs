use crate::model::{AssessmentData, AssessmentMap, Student};
use anyhow::bail;
use serde_json::json;
use tracing::warn;

/// Environment fallback for the endpoint URL when `workspace.select` does
/// not carry one.
pub const REMOTE_URL_ENV: &str = "LIFESKILLS_REMOTE_URL";

/// Thin transport wrapper over the spreadsheet-backed endpoint. Carries no
/// resilience logic of its own (no retries, no auth, default timeouts); the
/// repository already treats it as unreliable. Failures never escape as
/// errors, only as `None`/`false`.
pub struct RemoteStore {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl RemoteStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var(REMOTE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(Self::new)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full studentId -> assessment mapping. Any transport error,
    /// non-2xx status, or unparseable body reads as `None`.
    pub fn fetch_all(&self) -> Option<AssessmentMap> {
        match self.try_fetch_all() {
            Ok(map) => Some(map),
            Err(e) => {
                warn!(error = %e, "remote fetch failed; falling back to local snapshot");
                None
            }
        }
    }

    fn try_fetch_all(&self) -> anyhow::Result<AssessmentMap> {
        let resp = self
            .client
            .get(format!("{}?action=getAll", self.base_url))
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            bail!("remote responded with status {}", status);
        }
        Ok(resp.json()?)
    }

    /// Persist one record, tagged with its student identity. The response
    /// body is not interpreted; transport-level success is enough.
    pub fn persist_one(&self, student: &Student, assessment: &AssessmentData) -> bool {
        match self.try_persist_one(student, assessment) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    student_id = student.id,
                    error = %e,
                    "remote save failed; record kept locally only"
                );
                false
            }
        }
    }

    fn try_persist_one(&self, student: &Student, assessment: &AssessmentData) -> anyhow::Result<()> {
        let payload = json!({
            "student": student,
            "assessment": assessment,
        });
        let resp = self
            .client
            .post(format!("{}?action=save", self.base_url))
            .header("Content-Type", "text/plain;charset=utf-8")
            .body(serde_json::to_string(&payload)?)
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            bail!("remote responded with status {}", status);
        }
        Ok(())
    }
}
