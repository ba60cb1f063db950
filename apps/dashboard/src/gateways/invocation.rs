use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use serde::Serialize;
use tracing::info;

use crate::gateways::GatewayError;
use crate::models::UserIdentity;

/// Event body sent to the resume-processing function.
#[derive(Debug, Serialize)]
pub struct ProcessingEvent<'a> {
    pub s3_key: &'a str,
    pub user_id: &'a str,
}

/// One-way dispatch to a remote function. `Ok` means the event was accepted
/// for dispatch, nothing more.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    async fn invoke_event(&self, payload: Vec<u8>) -> Result<(), GatewayError>;
}

pub struct LambdaInvoker {
    client: aws_sdk_lambda::Client,
    function_name: String,
}

impl LambdaInvoker {
    pub fn new(client: aws_sdk_lambda::Client, function_name: String) -> Self {
        Self {
            client,
            function_name,
        }
    }
}

#[async_trait]
impl FunctionInvoker for LambdaInvoker {
    async fn invoke_event(&self, payload: Vec<u8>) -> Result<(), GatewayError> {
        let output = self
            .client
            .invoke()
            .function_name(&self.function_name)
            .invocation_type(InvocationType::Event)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| GatewayError::Invocation(format!("Lambda invoke failed: {e}")))?;

        info!(
            "Dispatched async event to {} (status {})",
            self.function_name,
            output.status_code()
        );
        Ok(())
    }
}

/// Fires the resume-processing event for a freshly uploaded resume.
#[derive(Clone)]
pub struct InvocationGateway {
    invoker: Arc<dyn FunctionInvoker>,
}

impl InvocationGateway {
    pub fn new(invoker: Arc<dyn FunctionInvoker>) -> Self {
        Self { invoker }
    }

    /// Fire-and-forget: downstream processing failures are never observed here.
    pub async fn trigger_processing(
        &self,
        storage_key: &str,
        user: &UserIdentity,
    ) -> Result<(), GatewayError> {
        let payload = serde_json::to_vec(&ProcessingEvent {
            s3_key: storage_key,
            user_id: user.as_str(),
        })?;
        self.invoker.invoke_event(payload).await
    }
}
