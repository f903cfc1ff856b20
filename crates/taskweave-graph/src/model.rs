use async_trait::async_trait;
use taskweave_core::{Message, ToolCall, WeaveResult};
use taskweave_tools::ToolDescriptor;

/// The next action decided by the model — a final answer or tool calls.
#[derive(Debug, Clone)]
pub enum ModelAction {
    /// The model is done: this is the final answer for the run.
    Respond {
        /// Final answer text.
        content: String,
    },
    /// The model requests one or more tool invocations.
    ToolUse {
        /// Optional assistant text accompanying the calls.
        content: Option<String>,
        /// The requested invocations, executed in order.
        calls: Vec<ToolCall>,
    },
}

/// The model-invocation collaborator, opaque to the orchestration core.
///
/// Any failure returned here is treated as a step failure by the loop; the
/// core never inspects provider specifics.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Decide the next action given the system prompt, the transcript so
    /// far, and the tools available this step.
    async fn next_action(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> WeaveResult<ModelAction>;
}
