//! Functions service. Client-side access covers executions only; functions themselves are
//! managed from the console or a server SDK.

pub mod models;

#[cfg(test)]
mod tests;

use crate::core::{segment, Client, Error};
use models::{Execution, ExecutionList, ExecutionRequest};

#[derive(Clone)]
pub struct Functions {
    client: Client,
}

impl Functions {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn executions_path(function_id: &str) -> String {
        format!("/functions/{}/executions", segment(function_id))
    }

    /// Triggers a function execution.
    pub async fn create_execution(
        &self,
        function_id: &str,
        request: &ExecutionRequest,
    ) -> Result<Execution, Error> {
        let request = self
            .client
            .post(&Self::executions_path(function_id))
            .json(request);
        self.client.send(request, "Create execution").await
    }

    pub async fn list_executions(
        &self,
        function_id: &str,
        queries: &[String],
    ) -> Result<ExecutionList, Error> {
        let params: Vec<(&str, &str)> = queries.iter().map(|q| ("queries[]", q.as_str())).collect();
        let request = self
            .client
            .get(&Self::executions_path(function_id))
            .query(&params);
        self.client.send(request, "List executions").await
    }

    pub async fn get_execution(
        &self,
        function_id: &str,
        execution_id: &str,
    ) -> Result<Execution, Error> {
        let path = format!(
            "{}/{}",
            Self::executions_path(function_id),
            segment(execution_id)
        );
        self.client.send(self.client.get(&path), "Get execution").await
    }
}
