//! Build server access.
//!
//! The build command needs three things from a build server: find the job for
//! a repository, find the per-PR job nested under it, and trigger that job with
//! parameters. [`BuildConnector`] and [`BuildBackend`] describe exactly that, so
//! the command executor can be tested without a server. [`JenkinsConnector`]
//! implements them for Jenkins multibranch pipelines.

mod error;
mod jenkins;

use std::collections::BTreeMap;
use std::future::Future;

pub use error::BuildError;
pub use jenkins::{JenkinsClient, JenkinsConfig, JenkinsConnector, JenkinsJob};

/// Build parameters passed to a job invocation.
pub type BuildParams = BTreeMap<String, String>;

/// Opens a session with the build server.
///
/// A new session is opened for each command so that a misconfigured or
/// unreachable server surfaces as a per-command failure rather than a startup
/// failure.
pub trait BuildConnector: Send + Sync {
    /// The session type produced by a successful connection.
    type Backend: BuildBackend;

    /// Creates a client and checks the server is reachable.
    fn connect(&self) -> impl Future<Output = Result<Self::Backend, BuildError>> + Send;
}

/// Job lookup and invocation on a connected build server.
pub trait BuildBackend: Send + Sync {
    /// A handle to a job on the server.
    type Job: Send + Sync;

    /// Looks up a top-level job by name.
    fn get_job(&self, name: &str) -> impl Future<Output = Result<Self::Job, BuildError>> + Send;

    /// Looks up a job nested under `parent` (e.g. a branch or PR job of a
    /// multibranch pipeline).
    fn get_inner_job(
        &self,
        parent: &Self::Job,
        name: &str,
    ) -> impl Future<Output = Result<Self::Job, BuildError>> + Send;

    /// Triggers the job. Returns once the server has accepted the request,
    /// not when the build finishes.
    fn invoke(
        &self,
        job: &Self::Job,
        params: &BuildParams,
    ) -> impl Future<Output = Result<(), BuildError>> + Send;
}
