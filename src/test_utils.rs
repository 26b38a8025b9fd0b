//! Shared test doubles and arbitrary generators for property-based testing.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use crate::build::{BuildBackend, BuildConnector, BuildError, BuildParams};
use crate::github::{CheckRunRequest, GitHubApi, GitHubApiError};
use crate::types::{PrNumber, RepoId, Sha};

pub fn arb_pr_number() -> impl Strategy<Value = PrNumber> {
    (1u64..100_000).prop_map(PrNumber)
}

pub fn arb_sha() -> impl Strategy<Value = Sha> {
    "[0-9a-f]{40}".prop_map(|s| Sha::parse(s).unwrap())
}

pub fn sha(c: char) -> Sha {
    Sha::parse(c.to_string().repeat(40)).unwrap()
}

/// Records comments and check runs instead of calling GitHub.
#[derive(Debug, Default)]
pub struct FakeGitHub {
    pub comments: Mutex<Vec<(RepoId, PrNumber, String)>>,
    pub check_runs: Mutex<Vec<(RepoId, CheckRunRequest)>>,
    pub fail_comments: bool,
    /// Check names whose submission fails.
    pub fail_checks: Vec<String>,
}

impl GitHubApi for FakeGitHub {
    async fn create_comment(
        &self,
        repo: &RepoId,
        issue: PrNumber,
        body: &str,
    ) -> Result<(), GitHubApiError> {
        if self.fail_comments {
            return Err(GitHubApiError::without_source("bad gateway"));
        }
        self.comments
            .lock()
            .unwrap()
            .push((repo.clone(), issue, body.to_string()));
        Ok(())
    }

    async fn create_check_run(
        &self,
        repo: &RepoId,
        request: &CheckRunRequest,
    ) -> Result<(), GitHubApiError> {
        if self.fail_checks.contains(&request.name) {
            return Err(GitHubApiError::without_source("unprocessable"));
        }
        self.check_runs
            .lock()
            .unwrap()
            .push((repo.clone(), request.clone()));
        Ok(())
    }
}

/// Which build call should fail, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailAt {
    #[default]
    Nothing,
    Connect,
    GetJob,
    GetInnerJob,
    Invoke,
}

/// An in-memory build server. Jobs are plain strings (`repo/PR-n`).
#[derive(Debug, Default)]
pub struct FakeBuilds {
    pub fail_at: FailAt,
    pub calls: Mutex<Vec<String>>,
    pub invocations: Mutex<Vec<(String, BuildParams)>>,
}

impl FakeBuilds {
    pub fn failing_at(fail_at: FailAt) -> Self {
        Self {
            fail_at,
            ..Self::default()
        }
    }

    fn record(&self, at: FailAt, call: String) -> Result<(), BuildError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_at == at {
            Err(BuildError::Other(format!("{:?} failed", at)))
        } else {
            Ok(())
        }
    }
}

impl BuildConnector for Arc<FakeBuilds> {
    type Backend = Arc<FakeBuilds>;

    async fn connect(&self) -> Result<Self::Backend, BuildError> {
        self.record(FailAt::Connect, "connect".to_string())?;
        Ok(Arc::clone(self))
    }
}

impl BuildBackend for Arc<FakeBuilds> {
    type Job = String;

    async fn get_job(&self, name: &str) -> Result<String, BuildError> {
        self.record(FailAt::GetJob, format!("get_job {}", name))?;
        Ok(name.to_string())
    }

    async fn get_inner_job(&self, parent: &String, name: &str) -> Result<String, BuildError> {
        self.record(FailAt::GetInnerJob, format!("get_inner_job {} {}", parent, name))?;
        Ok(format!("{}/{}", parent, name))
    }

    async fn invoke(&self, job: &String, params: &BuildParams) -> Result<(), BuildError> {
        self.record(FailAt::Invoke, format!("invoke {}", job))?;
        self.invocations
            .lock()
            .unwrap()
            .push((job.clone(), params.clone()));
        Ok(())
    }
}
