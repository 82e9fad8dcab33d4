//! Runs registered actions by label.

use super::{render, ActionLog, ActionRegistry, HarnessError, Outcome, Session};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub const STATUS_READY: &str = "Ready";
pub const STATUS_ERROR: &str = "Error occurred";

/// Cheap to clone; clones share the registry, session, log and status.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ActionRegistry>,
    session: Arc<Session>,
    log: Arc<ActionLog>,
    status: Arc<watch::Sender<String>>,
    running: Option<Arc<Mutex<HashSet<String>>>>,
}

/// Removes the label from the running set when the invocation finishes.
struct RunningGuard {
    running: Arc<Mutex<HashSet<String>>>,
    label: String,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.label);
    }
}

impl Dispatcher {
    pub fn new(registry: Arc<ActionRegistry>, session: Arc<Session>, log: Arc<ActionLog>) -> Self {
        let (status, _) = watch::channel("Idle".to_string());
        Self {
            registry,
            session,
            log,
            status: Arc::new(status),
            running: None,
        }
    }

    /// Rejects a second concurrent invocation of the same label with `AlreadyRunning`.
    pub fn with_single_flight(mut self) -> Self {
        self.running = Some(Arc::new(Mutex::new(HashSet::new())));
        self
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn log(&self) -> &Arc<ActionLog> {
        &self.log
    }

    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    pub fn watch_status(&self) -> watch::Receiver<String> {
        self.status.subscribe()
    }

    pub fn set_status(&self, status: impl Into<String>) {
        let status = status.into();
        tracing::debug!(%status, "status");
        self.status.send_replace(status);
    }

    fn enter(&self, label: &str) -> Result<Option<RunningGuard>, HarnessError> {
        let Some(running) = &self.running else {
            return Ok(None);
        };
        let mut set = running.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(label.to_string()) {
            return Err(HarnessError::AlreadyRunning(label.to_string()));
        }
        Ok(Some(RunningGuard {
            running: Arc::clone(running),
            label: label.to_string(),
        }))
    }

    fn fail(&self, err: HarnessError) -> Outcome {
        let outcome = Outcome::from(&err);
        self.log.append(err.severity(), render(&outcome).join("\n"));
        outcome
    }

    /// Runs the action registered under `label` and logs exactly one entry for it.
    ///
    /// Never fails: unknown labels, an uninitialized session, operation errors and panics
    /// all come back as [`Outcome::Failure`].
    pub async fn invoke(&self, label: &str) -> Outcome {
        let Some(action) = self.registry.get(label) else {
            return self.fail(HarnessError::UnknownAction(label.to_string()));
        };
        if !self.session.is_ready() {
            return self.fail(HarnessError::NotReady);
        }
        let _guard = match self.enter(label) {
            Ok(guard) => guard,
            Err(err) => return self.fail(err),
        };

        self.set_status(format!("Executing: {label}..."));
        let result = match AssertUnwindSafe(action.run()).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(HarnessError::RemoteOperationFailure(panic_message(panic))),
        };

        match result {
            Ok(mut lines) => {
                if lines.is_empty() {
                    lines.push(format!("{label} completed"));
                }
                let outcome = Outcome::Success(lines);
                self.log.info(render(&outcome).join("\n"));
                self.set_status(STATUS_READY);
                outcome
            }
            Err(err) => {
                self.set_status(STATUS_ERROR);
                self.fail(err)
            }
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("operation panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("operation panicked: {message}")
    } else {
        "operation panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::harness::{RegistryBuilder, Severity};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::{Barrier, Notify};

    async fn ready_session() -> Arc<Session> {
        let session = Arc::new(Session::new());
        session
            .initialize(&ClientConfig::new("https://x", "p"))
            .await
            .unwrap();
        session
    }

    fn dispatcher(builder: RegistryBuilder, session: Arc<Session>) -> Dispatcher {
        Dispatcher::new(
            Arc::new(builder.freeze()),
            session,
            Arc::new(ActionLog::new("output", 500)),
        )
    }

    #[tokio::test]
    async fn test_not_ready_does_not_run_operation() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let mut builder = RegistryBuilder::new();
        builder
            .register(
                "Get User Info",
                move || {
                    let flag = Arc::clone(&flag);
                    async move {
                        flag.store(true, Ordering::SeqCst);
                        Ok(())
                    }
                },
                |_: &()| vec!["ran".to_string()],
            )
            .unwrap();
        let dispatcher = dispatcher(builder, Arc::new(Session::new()));

        let outcome = dispatcher.invoke("Get User Info").await;
        assert_eq!(outcome, Outcome::from(&HarnessError::NotReady));
        assert!(!ran.load(Ordering::SeqCst));

        let entries = dispatcher.log().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Warning);
        assert_eq!(entries[0].text, "NotReady: not initialized yet");
    }

    #[tokio::test]
    async fn test_unknown_action_adds_one_entry() {
        let dispatcher = dispatcher(RegistryBuilder::new(), ready_session().await);
        let outcome = dispatcher.invoke("Login").await;

        assert!(!outcome.is_success());
        let entries = dispatcher.log().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "UnknownAction: Login");
        assert_eq!(entries[0].severity, Severity::Error);
    }

    #[tokio::test]
    async fn test_success_and_failure_each_log_once() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(
                "Ping Server",
                || async { Ok("Pong".to_string()) },
                |pong: &String| vec![format!("Server ping successful: {pong}")],
            )
            .unwrap();
        builder
            .register(
                "Get Document",
                || async {
                    Err::<(), _>(HarnessError::RemoteOperationFailure(
                        "Get document failed (404 document_not_found): missing".to_string(),
                    ))
                },
                |_: &()| Vec::new(),
            )
            .unwrap();
        let dispatcher = dispatcher(builder, ready_session().await);

        let ok = dispatcher.invoke("Ping Server").await;
        assert_eq!(
            ok,
            Outcome::Success(vec!["Server ping successful: Pong".to_string()])
        );
        assert_eq!(dispatcher.status(), STATUS_READY);

        let failed = dispatcher.invoke("Get Document").await;
        assert!(!failed.is_success());
        assert_eq!(dispatcher.status(), STATUS_ERROR);

        let entries = dispatcher.log().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].severity, Severity::Info);
        assert_eq!(entries[0].text, "Server ping successful: Pong");
        assert_eq!(entries[1].severity, Severity::Error);
        assert!(entries[1].text.contains("document_not_found"));
    }

    #[tokio::test]
    async fn test_panic_becomes_failure() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(
                "Explode",
                || async {
                    if true {
                        panic!("boom");
                    }
                    Ok(())
                },
                |_: &()| Vec::new(),
            )
            .unwrap();
        let dispatcher = dispatcher(builder, ready_session().await);

        let outcome = dispatcher.invoke("Explode").await;
        assert_eq!(
            outcome,
            Outcome::Failure {
                kind: "RemoteOperationFailure",
                message: "operation panicked: boom".to_string()
            }
        );
        assert_eq!(dispatcher.log().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_summary_logs_completion() {
        let mut builder = RegistryBuilder::new();
        builder
            .register("Delete Sessions", || async { Ok(()) }, |_: &()| Vec::new())
            .unwrap();
        let dispatcher = dispatcher(builder, ready_session().await);

        dispatcher.invoke("Delete Sessions").await;
        assert_eq!(dispatcher.log().entries()[0].text, "Delete Sessions completed");
    }

    #[tokio::test]
    async fn test_distinct_labels_run_concurrently() {
        // Both operations wait on the same barrier, so neither finishes unless both are in flight.
        let barrier = Arc::new(Barrier::new(2));
        let mut builder = RegistryBuilder::new();
        for label in ["List Teams", "List Files"] {
            let barrier = Arc::clone(&barrier);
            builder
                .register(
                    label,
                    move || {
                        let barrier = Arc::clone(&barrier);
                        async move {
                            barrier.wait().await;
                            Ok(label.to_string())
                        }
                    },
                    |label: &String| vec![format!("{label} done")],
                )
                .unwrap();
        }
        let dispatcher = dispatcher(builder, ready_session().await);

        let (a, b) = tokio::join!(dispatcher.invoke("List Teams"), dispatcher.invoke("List Files"));
        assert!(a.is_success() && b.is_success());

        let mut texts: Vec<String> = dispatcher.log().entries().into_iter().map(|e| e.text).collect();
        texts.sort();
        assert_eq!(texts, vec!["List Files done", "List Teams done"]);
    }

    #[tokio::test]
    async fn test_single_flight_rejects_duplicate() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let (s, r) = (Arc::clone(&started), Arc::clone(&release));
        let mut builder = RegistryBuilder::new();
        builder
            .register(
                "Upload File (Text)",
                move || {
                    let (started, release) = (Arc::clone(&s), Arc::clone(&r));
                    async move {
                        started.notify_one();
                        release.notified().await;
                        Ok(())
                    }
                },
                |_: &()| vec!["uploaded".to_string()],
            )
            .unwrap();
        let dispatcher = dispatcher(builder, ready_session().await).with_single_flight();

        let first = tokio::spawn({
            let dispatcher = dispatcher.clone();
            async move { dispatcher.invoke("Upload File (Text)").await }
        });
        started.notified().await;

        let second = dispatcher.invoke("Upload File (Text)").await;
        assert_eq!(
            second,
            Outcome::from(&HarnessError::AlreadyRunning("Upload File (Text)".to_string()))
        );
        assert_eq!(dispatcher.log().last().unwrap().severity, Severity::Warning);

        release.notify_one();
        assert!(first.await.unwrap().is_success());

        // The guard is released once the first run finishes.
        let again = tokio::spawn({
            let dispatcher = dispatcher.clone();
            async move { dispatcher.invoke("Upload File (Text)").await }
        });
        started.notified().await;
        release.notify_one();
        assert!(again.await.unwrap().is_success());
    }
}
