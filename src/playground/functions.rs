use super::{add, Context};
use crate::functions::models::{Execution, ExecutionList, ExecutionRequest};
use crate::harness::{HarnessError, RegistryBuilder};
use chrono::Utc;
use serde_json::json;

pub(super) fn register(builder: &mut RegistryBuilder, ctx: &Context) -> Result<(), HarnessError> {
    add(builder, ctx, "List Functions", list_functions, |_: &()| {
        vec![
            "List functions is not available in client SDKs".to_string(),
            "  You can only execute functions and view executions".to_string(),
            format!(
                "  Set {} to test function execution",
                crate::config::ENV_FUNCTION_ID
            ),
        ]
    })?;
    add(builder, ctx, "Execute Function", execute_function, |exec: &Execution| {
        vec![
            format!("Function executed: {}", exec.id),
            format!("  Status: {}", exec.status),
            format!("  Response: {}", exec.response_body),
        ]
    })?;
    add(builder, ctx, "List Executions", list_executions, |list: &ExecutionList| {
        let mut lines = vec![format!("Found {} executions", list.total)];
        lines.extend(
            list.executions
                .iter()
                .take(3)
                .map(|exec| format!("  Execution: {} - {}", exec.id, exec.status)),
        );
        lines
    })?;
    add(builder, ctx, "Get Execution", get_execution, |exec: &Execution| {
        vec![
            format!("Execution info: {}", exec.id),
            format!("  Status: {}", exec.status),
            format!("  Duration: {} seconds", exec.duration),
            format!("  Response: {}", exec.response_body),
        ]
    })?;
    Ok(())
}

/// Functions are managed server-side; the client can only run them.
async fn list_functions(ctx: Context) -> Result<(), HarnessError> {
    ctx.services()?;
    Ok(())
}

async fn execute_function(ctx: Context) -> Result<Execution, HarnessError> {
    let function = ctx.function()?;
    let body = json!({
        "message": "Hello from the playground!",
        "timestamp": Utc::now().to_rfc3339(),
    });
    let request = ExecutionRequest::with_body(body.to_string());
    Ok(ctx
        .services()?
        .functions
        .create_execution(function, &request)
        .await?)
}

async fn list_executions(ctx: Context) -> Result<ExecutionList, HarnessError> {
    let function = ctx.function()?;
    Ok(ctx
        .services()?
        .functions
        .list_executions(function, &[])
        .await?)
}

async fn get_execution(ctx: Context) -> Result<Execution, HarnessError> {
    let list = list_executions(ctx.clone()).await?;
    let first = list
        .executions
        .into_iter()
        .next()
        .ok_or_else(|| HarnessError::precondition("No executions found. Execute a function first!"))?;
    let function = ctx.function()?;
    Ok(ctx
        .services()?
        .functions
        .get_execution(function, &first.id)
        .await?)
}
