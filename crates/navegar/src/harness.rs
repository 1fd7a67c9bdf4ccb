//! Per-test context: scoped session acquisition and outcome plumbing.
//!
//! A [`TestContext`] is constructed at test start and owns everything
//! the test's lifetime scopes: the browser session (exclusively; no
//! two tests share one), the driver, the step journal, and the
//! diagnostics hook. [`TestContext::finish`] is the single exit path:
//! it maps the test's result to a [`TestOutcome`], hands failures to
//! the diagnostics hook while the session is still live, and then
//! closes the session, in that order, on every path.

use std::path::PathBuf;
use std::sync::Arc;

use crate::backend::DomBackend;
use crate::diagnostics::{DiagnosticArtifact, FailureArtifacts, TestOutcome};
use crate::driver::Driver;
use crate::result::NavegarResult;
use crate::session::{Session, SessionConfig};
use crate::trace::StepJournal;

/// Build a unique test id: `{name}_{timestamp}_{discriminator}`.
/// Re-runs of the same test therefore never collide in the artifact
/// store.
#[must_use]
pub fn generate_test_id(name: &str) -> String {
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let salt = uuid::Uuid::new_v4().simple().to_string();
    format!("{name}_{stamp}_{}", &salt[..8])
}

/// Everything one test owns, for exactly its lifetime
#[derive(Debug)]
pub struct TestContext {
    test_id: String,
    session: Arc<Session>,
    driver: Driver,
    artifacts: FailureArtifacts,
}

impl TestContext {
    /// Build a context over an already-constructed backend
    pub fn with_backend(
        name: &str,
        backend: impl DomBackend + 'static,
        config: SessionConfig,
        artifact_dir: impl Into<PathBuf>,
    ) -> NavegarResult<Self> {
        let session = Arc::new(Session::with_backend(backend, config)?);
        Ok(Self::assemble(name, session, artifact_dir))
    }

    /// Launch a real browser session for this test
    #[cfg(feature = "browser")]
    pub async fn launch(
        name: &str,
        config: SessionConfig,
        artifact_dir: impl Into<PathBuf>,
    ) -> NavegarResult<Self> {
        let session = Arc::new(Session::launch(config).await?);
        Ok(Self::assemble(name, session, artifact_dir))
    }

    fn assemble(name: &str, session: Arc<Session>, artifact_dir: impl Into<PathBuf>) -> Self {
        let journal = StepJournal::new();
        let driver = Driver::with_journal(Arc::clone(&session), journal.clone());
        let artifacts = FailureArtifacts::new(artifact_dir).with_journal(journal);
        Self {
            test_id: generate_test_id(name),
            session,
            driver,
            artifacts,
        }
    }

    /// The test's unique id
    #[must_use]
    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    /// The test's driver
    #[must_use]
    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// The test's session
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Terminate the test: produce the outcome, capture diagnostics on
    /// failure while the session is still live, then tear the session
    /// down. Returns the outcome and whatever artifacts were written.
    pub async fn finish<T>(
        self,
        result: NavegarResult<T>,
    ) -> (TestOutcome, Vec<DiagnosticArtifact>) {
        let outcome = match &result {
            Ok(_) => TestOutcome::passed(&self.test_id),
            Err(e) => {
                self.driver.journal().error(format!("test failed: {e}"));
                TestOutcome::failed(&self.test_id)
            }
        };
        self.conclude(outcome).await
    }

    /// Terminate a test that faulted outside its assertions
    pub async fn errored(
        self,
        message: &str,
    ) -> (TestOutcome, Vec<DiagnosticArtifact>) {
        self.driver.journal().error(format!("test errored: {message}"));
        let outcome = TestOutcome::errored(&self.test_id);
        self.conclude(outcome).await
    }

    async fn conclude(self, outcome: TestOutcome) -> (TestOutcome, Vec<DiagnosticArtifact>) {
        let artifacts = if outcome.status.is_failure() {
            self.artifacts.on_outcome(&outcome, Some(&self.session)).await
        } else {
            Vec::new()
        };
        if let Err(e) = self.session.close().await {
            tracing::warn!(test_id = %outcome.test_id, error = %e, "session teardown failed");
        }
        (outcome, artifacts)
    }
}
