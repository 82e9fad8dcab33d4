//! Label → operation registry.
//!
//! Operations are erased to `Fn() -> BoxFuture<Result<Vec<String>, HarnessError>>`: the typed
//! payload is formatted into summary lines inside the future, so the dispatcher never sees it.

use super::HarnessError;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

pub type Operation =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<String>, HarnessError>> + Send + Sync>;

/// A registered action. Immutable once registered.
#[derive(Clone)]
pub struct Action {
    label: String,
    section: String,
    operation: Operation,
}

impl Action {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// Starts one run of the operation.
    pub fn run(&self) -> BoxFuture<'static, Result<Vec<String>, HarnessError>> {
        (self.operation)()
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("label", &self.label)
            .field("section", &self.section)
            .finish_non_exhaustive()
    }
}

/// Collects actions at start-up. [`RegistryBuilder::freeze`] ends registration.
#[derive(Default)]
pub struct RegistryBuilder {
    actions: Vec<Action>,
    index: HashMap<String, usize>,
    section: String,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Section assigned to subsequently registered actions.
    pub fn section(&mut self, name: impl Into<String>) -> &mut Self {
        self.section = name.into();
        self
    }

    /// Registers `operation` under `label`; `formatter` turns its payload into summary lines.
    ///
    /// A duplicate label is rejected and the first registration is kept.
    pub fn register<T, Op, Fut, Fmt>(
        &mut self,
        label: impl Into<String>,
        operation: Op,
        formatter: Fmt,
    ) -> Result<&mut Self, HarnessError>
    where
        T: Send + 'static,
        Op: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, HarnessError>> + Send + 'static,
        Fmt: Fn(&T) -> Vec<String> + Send + Sync + 'static,
    {
        let label = label.into();
        if self.index.contains_key(&label) {
            return Err(HarnessError::DuplicateLabel(label));
        }

        let formatter = Arc::new(formatter);
        let operation: Operation = Arc::new(move || {
            let formatter = Arc::clone(&formatter);
            operation()
                .map(move |result| result.map(|payload| formatter(&payload)))
                .boxed()
        });

        self.index.insert(label.clone(), self.actions.len());
        self.actions.push(Action {
            label,
            section: self.section.clone(),
            operation,
        });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn freeze(self) -> ActionRegistry {
        ActionRegistry {
            actions: self.actions,
            index: self.index,
        }
    }
}

/// Read-only set of actions, shared by every dispatcher clone.
#[derive(Default, Debug)]
pub struct ActionRegistry {
    actions: Vec<Action>,
    index: HashMap<String, usize>,
}

impl ActionRegistry {
    pub fn get(&self, label: &str) -> Option<&Action> {
        self.index.get(label).map(|&i| &self.actions[i])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Actions in registration order.
    pub fn all(&self) -> impl Iterator<Item = &Action> + '_ {
        self.actions.iter()
    }

    /// Actions grouped by section, sections in order of first appearance.
    pub fn sections(&self) -> Vec<(&str, Vec<&Action>)> {
        let mut sections: Vec<(&str, Vec<&Action>)> = Vec::new();
        for action in &self.actions {
            match sections.iter_mut().find(|(name, _)| *name == action.section()) {
                Some((_, actions)) => actions.push(action),
                None => sections.push((action.section(), vec![action])),
            }
        }
        sections
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &'static str) -> impl Fn(&String) -> Vec<String> {
        move |payload| vec![format!("{text}: {payload}")]
    }

    #[tokio::test]
    async fn test_duplicate_label_keeps_first() {
        let mut builder = RegistryBuilder::new();
        builder
            .register("Ping", || async { Ok("first".to_string()) }, lines("ping"))
            .unwrap();
        let err = builder
            .register("Ping", || async { Ok("second".to_string()) }, lines("ping"))
            .err()
            .unwrap();
        assert_eq!(err, HarnessError::DuplicateLabel("Ping".to_string()));

        let registry = builder.freeze();
        assert_eq!(registry.len(), 1);
        let output = registry.get("Ping").unwrap().run().await.unwrap();
        assert_eq!(output, vec!["ping: first".to_string()]);
    }

    #[test]
    fn test_all_in_registration_order_with_sections() {
        let mut builder = RegistryBuilder::new();
        builder.section("AUTH");
        for label in ["Login", "Logout"] {
            builder
                .register(label, || async { Ok(()) }, |_: &()| Vec::new())
                .unwrap();
        }
        builder.section("UTILITIES");
        builder
            .register("Ping Server", || async { Ok(()) }, |_: &()| Vec::new())
            .unwrap();
        builder.section("AUTH");
        builder
            .register("Create JWT", || async { Ok(()) }, |_: &()| Vec::new())
            .unwrap();

        let registry = builder.freeze();
        let labels: Vec<&str> = registry.all().map(Action::label).collect();
        assert_eq!(labels, ["Login", "Logout", "Ping Server", "Create JWT"]);

        let sections = registry.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].0, "AUTH");
        assert_eq!(sections[0].1.len(), 3);
        assert_eq!(sections[1].1[0].label(), "Ping Server");
    }

    #[tokio::test]
    async fn test_operation_error_passes_through() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(
                "Get Document",
                || async { Err::<String, _>(HarnessError::precondition("No documents found. Create one first!")) },
                lines("doc"),
            )
            .unwrap();
        let registry = builder.freeze();
        let err = registry.get("Get Document").unwrap().run().await.unwrap_err();
        assert_eq!(err.kind(), "Precondition");
    }
}
