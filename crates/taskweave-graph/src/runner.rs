use crate::config::GraphConfig;
use crate::guard::RunGuard;
use crate::model::{ModelAction, ModelClient};
use crate::subagent::{SubagentRegistry, SubagentResult, SubagentStatus};
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use taskweave_core::{
    AutoProceed, CheckpointEvent, CheckpointKind, GateDecision, HumanGate, Message, ToolCall,
    ToolResult, WeaveError, WeaveResult,
};
use taskweave_state::{StateContainer, Vfs};
use taskweave_tools::{ToolDescriptor, ToolRegistry};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Name of the delegation tool surfaced to the model when subagents are
/// registered.
pub const TASK_TOOL: &str = "task";

/// What a finished run hands back: the result plus the full state container,
/// preserved even when the run ended in a terminal error so the host can
/// inspect the transcript and files accumulated up to the failure.
#[derive(Debug)]
pub struct RunOutcome {
    /// Final answer, or the error that ended the run.
    pub result: WeaveResult<String>,
    /// The run's state as of completion or failure.
    pub state: StateContainer,
}

impl RunOutcome {
    /// Whether the run produced a final answer.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The final answer, if the run succeeded.
    pub fn final_output(&self) -> Option<&str> {
        self.result.as_deref().ok()
    }
}

/// The orchestrator: advances a model-driven loop over shared state, routing
/// tool calls, consulting the human gate, and dispatching subagents into
/// isolated child contexts.
///
/// The graph itself is immutable during a run; all mutable state lives in the
/// [`StateContainer`] threaded through each step.
pub struct AgentGraph {
    model: Arc<dyn ModelClient>,
    tools: ToolRegistry,
    subagents: SubagentRegistry,
    gate: Arc<dyn HumanGate>,
    config: GraphConfig,
}

impl AgentGraph {
    /// Creates a graph with the given collaborators. Checkpoints auto-proceed
    /// until a gate is attached with [`AgentGraph::with_gate`].
    pub fn new(
        model: Arc<dyn ModelClient>,
        tools: ToolRegistry,
        subagents: SubagentRegistry,
        config: GraphConfig,
    ) -> Self {
        Self {
            model,
            tools,
            subagents,
            gate: Arc::new(AutoProceed),
            config,
        }
    }

    /// Attach a human gate consulted before gated operations.
    pub fn with_gate(mut self, gate: Arc<dyn HumanGate>) -> Self {
        self.gate = gate;
        self
    }

    /// The graph's configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Run a task to completion on a fresh state container.
    pub async fn run(&self, task: &str) -> RunOutcome {
        self.run_cancellable(task, CancellationToken::new()).await
    }

    /// Run a task with an externally held cancellation token. Cancellation is
    /// observed at step boundaries; the partially updated state is preserved
    /// in the outcome.
    pub async fn run_cancellable(&self, task: &str, cancel: CancellationToken) -> RunOutcome {
        let mut state = StateContainer::new();
        let result = self.run_in(&mut state, task, cancel).await;
        RunOutcome { result, state }
    }

    /// Run a task against a host-owned state container, so files and
    /// transcript from earlier runs carry over.
    pub async fn run_in(
        &self,
        state: &mut StateContainer,
        task: &str,
        cancel: CancellationToken,
    ) -> WeaveResult<String> {
        state.begin_task();
        state.add_message(Message::user(task));
        let system_prompt = self.config.compose_system_prompt();
        self.run_loop(state, &system_prompt, &self.tools, cancel)
            .await
    }

    /// The step loop: ask the model for the next action, execute tool calls,
    /// backfill results, repeat until a final answer or a terminal condition.
    ///
    /// Boxed because dispatches re-enter this loop for the child context.
    fn run_loop<'a>(
        &'a self,
        state: &'a mut StateContainer,
        system_prompt: &'a str,
        tools: &'a ToolRegistry,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, WeaveResult<String>> {
        async move {
            let guard = RunGuard::new(self.config.limits);
            let mut descriptors: Vec<ToolDescriptor> =
                tools.descriptors().into_iter().cloned().collect();
            if !self.subagents.is_empty() {
                descriptors.push(self.subagents.task_descriptor());
            }
            info!(
                depth = state.depth,
                tools = descriptors.len(),
                "Starting orchestration loop"
            );

            loop {
                if cancel.is_cancelled() {
                    warn!(depth = state.depth, "Run cancelled at step boundary");
                    return Err(WeaveError::Cancelled);
                }
                guard.record_step(state)?;

                let started = Instant::now();
                let next = self
                    .model
                    .next_action(Some(system_prompt), &state.messages, &descriptors);
                let action = match self.config.step_timeout {
                    Some(limit) => match tokio::time::timeout(limit, next).await {
                        Ok(action) => action,
                        Err(_) => Err(WeaveError::Model(format!(
                            "model call exceeded step timeout of {}ms",
                            limit.as_millis()
                        ))),
                    },
                    None => next.await,
                }?;
                state.record_benchmark("model.next_action", started.elapsed());

                match action {
                    ModelAction::Respond { content } => {
                        state.add_message(Message::assistant(content.clone()));
                        info!(
                            depth = state.depth,
                            steps = state.step_count,
                            "Loop completed with a final answer"
                        );
                        return Ok(content);
                    }
                    ModelAction::ToolUse { content, calls } => {
                        if let Some(text) = content {
                            state.add_message(Message::assistant(text));
                        }
                        for call in calls {
                            info!(tool = %call.name, call_id = %call.id, "Executing tool call");
                            match self.handle_tool_call(&call, state, tools, &cancel).await {
                                Ok(result) => {
                                    let payload = serde_json::json!({
                                        "tool_use_id": result.call_id,
                                        "content": result.content,
                                        "is_error": result.is_error,
                                    });
                                    state.add_message(Message::tool(payload.to_string()));
                                }
                                Err(e) if e.is_terminal() => {
                                    error!(tool = %call.name, error = %e, "Terminal failure during tool call");
                                    return Err(e);
                                }
                                Err(e) => {
                                    warn!(tool = %call.name, error = %e, "Tool call failed; reported to the model");
                                    let payload = serde_json::json!({
                                        "tool_use_id": call.id,
                                        "content": format!("Error: {e}"),
                                        "is_error": true,
                                    });
                                    state.add_message(Message::tool(payload.to_string()));
                                }
                            }
                        }
                    }
                }
            }
        }
        .boxed()
    }

    /// Gate and execute one tool call. Delegation requests route to
    /// [`AgentGraph::dispatch`]; everything else goes through the registry.
    async fn handle_tool_call(
        &self,
        call: &ToolCall,
        state: &mut StateContainer,
        tools: &ToolRegistry,
        cancel: &CancellationToken,
    ) -> WeaveResult<ToolResult> {
        let mut call = call.clone();
        let checkpoint = if call.name == TASK_TOOL {
            Some(CheckpointKind::SubagentDispatch)
        } else {
            tools.get(&call.name).and_then(|t| t.descriptor().checkpoint)
        };
        if let Some(kind) = checkpoint {
            let event = CheckpointEvent::new(kind, format!("pending call to `{}`", call.name));
            match self.gate.checkpoint(event, &call.arguments).await? {
                GateDecision::Proceed => {}
                GateDecision::Modify(arguments) => {
                    info!(tool = %call.name, "Checkpoint replaced the call arguments");
                    call.arguments = arguments;
                }
                GateDecision::Abort { reason } => {
                    let reason =
                        reason.unwrap_or_else(|| format!("call to `{}` rejected", call.name));
                    return Err(WeaveError::HumanAborted(reason));
                }
            }
        }

        if call.name == TASK_TOOL {
            let role = call.arguments["subagent_type"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let task = call.arguments["description"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let started = Instant::now();
            let result = self
                .dispatch(&role, &task, state, cancel.child_token())
                .await?;
            state.record_benchmark(format!("subagent.{role}"), started.elapsed());
            let payload = serde_json::json!({
                "subagent_type": result.role,
                "status": result.status,
                "output": result.output,
                "files_changed": result.file_deltas.len(),
            });
            return Ok(match result.status {
                SubagentStatus::Success => ToolResult::success(&call.id, payload.to_string()),
                _ => ToolResult::error(&call.id, payload.to_string()),
            });
        }

        let started = Instant::now();
        let result = tools.execute(&call, state).await;
        state.record_benchmark(format!("tool.{}", call.name), started.elapsed());
        result
    }

    /// Dispatch one task to a subagent role.
    ///
    /// The child runs the same loop on a forked context holding a copy of the
    /// parent's files. On success the file deltas merge back immediately; on
    /// failure or cancellation they ride along unmerged in the result so the
    /// caller can decide. `UnknownRole` and `DepthExceeded` fail before any
    /// child work runs.
    ///
    /// The human gate is consulted on the model-initiated `task` path before
    /// the loop reaches this method; a host calling directly is not gated.
    /// Tool calls made inside the child still are.
    pub async fn dispatch(
        &self,
        role: &str,
        task: &str,
        state: &mut StateContainer,
        cancel: CancellationToken,
    ) -> WeaveResult<SubagentResult> {
        let def = self.subagents.get(role)?.clone();
        let guard = RunGuard::new(self.config.limits);
        guard.check_dispatch(state.depth)?;
        info!(role = %def.name, depth = state.depth + 1, "Dispatching subagent");

        let tools = match &def.allowed_tools {
            Some(names) => self.tools.subset(names),
            None => self.tools.clone(),
        };
        let base = state.vfs.clone();
        let mut child = state.child();
        child.add_message(Message::user(task));

        let outcome = self
            .run_child(&mut child, &def.instructions, &tools, cancel)
            .await;
        Ok(Self::settle(state, def.name, outcome, child, &base))
    }

    /// Dispatch several tasks concurrently, merging each child's deltas as it
    /// finishes. Later merges win on overlapping paths; parent versions stay
    /// monotonic because merges re-enter the versioned write path.
    ///
    /// Like [`AgentGraph::dispatch`], this host-facing entry point is not
    /// gated; only the children's own tool calls go through the gate.
    pub async fn dispatch_many(
        &self,
        requests: Vec<(String, String)>,
        state: &mut StateContainer,
        cancel: &CancellationToken,
    ) -> WeaveResult<Vec<SubagentResult>> {
        let guard = RunGuard::new(self.config.limits);
        guard.check_dispatch(state.depth)?;

        let mut pending = FuturesUnordered::new();
        for (role, task) in requests {
            let def = self.subagents.get(&role)?.clone();
            let tools = match &def.allowed_tools {
                Some(names) => self.tools.subset(names),
                None => self.tools.clone(),
            };
            let base = state.vfs.clone();
            let mut child = state.child();
            child.add_message(Message::user(task));
            let token = cancel.child_token();
            pending.push(async move {
                let outcome = self
                    .run_child(&mut child, &def.instructions, &tools, token)
                    .await;
                (def.name, outcome, child, base)
            });
        }

        let mut results = Vec::new();
        while let Some((role, outcome, child, base)) = pending.next().await {
            let result = Self::settle(state, role, outcome, child, &base);
            let payload = serde_json::json!({
                "subagent_type": result.role,
                "status": result.status,
                "output": result.output,
                "files_changed": result.file_deltas.len(),
            });
            state.add_message(Message::tool(payload.to_string()));
            results.push(result);
        }
        Ok(results)
    }

    /// Run the child loop under the optional dispatch deadline.
    async fn run_child(
        &self,
        child: &mut StateContainer,
        instructions: &str,
        tools: &ToolRegistry,
        cancel: CancellationToken,
    ) -> WeaveResult<String> {
        let fut = self.run_loop(child, instructions, tools, cancel);
        match self.config.dispatch_timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(outcome) => outcome,
                Err(_) => Err(WeaveError::Tool(format!(
                    "subagent exceeded dispatch timeout of {}ms",
                    limit.as_millis()
                ))),
            },
            None => fut.await,
        }
    }

    /// Convert a finished child into a [`SubagentResult`], merging its file
    /// deltas into the parent only on success.
    fn settle(
        parent: &mut StateContainer,
        role: String,
        outcome: WeaveResult<String>,
        child: StateContainer,
        base: &Vfs,
    ) -> SubagentResult {
        let file_deltas = child.vfs.diff(base);
        match outcome {
            Ok(output) => {
                info!(role = %role, files = file_deltas.len(), "Subagent succeeded");
                parent.vfs.merge(file_deltas.clone());
                SubagentResult {
                    role,
                    output,
                    file_deltas,
                    status: SubagentStatus::Success,
                }
            }
            Err(WeaveError::Cancelled) => {
                warn!(role = %role, "Subagent cancelled; deltas left unmerged");
                SubagentResult {
                    role,
                    output: "dispatch cancelled".to_string(),
                    file_deltas,
                    status: SubagentStatus::Cancelled,
                }
            }
            Err(e) => {
                warn!(role = %role, error = %e, "Subagent failed; deltas left unmerged");
                SubagentResult {
                    role,
                    output: e.to_string(),
                    file_deltas,
                    status: SubagentStatus::Failure,
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::RunLimits;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use taskweave_core::Role;

    /// Replays a fixed sequence of actions, answering "done" once exhausted.
    struct ScriptedModel {
        actions: Mutex<VecDeque<ModelAction>>,
    }

    impl ScriptedModel {
        fn new(actions: Vec<ModelAction>) -> Arc<Self> {
            Arc::new(Self {
                actions: Mutex::new(actions.into()),
            })
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedModel {
        async fn next_action(
            &self,
            _system_prompt: Option<&str>,
            _messages: &[Message],
            _tools: &[ToolDescriptor],
        ) -> WeaveResult<ModelAction> {
            Ok(self
                .actions
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(ModelAction::Respond {
                    content: "done".to_string(),
                }))
        }
    }

    fn graph(model: Arc<dyn ModelClient>) -> AgentGraph {
        AgentGraph::new(
            model,
            ToolRegistry::with_builtins(),
            SubagentRegistry::new(),
            GraphConfig::new("Test agent."),
        )
    }

    fn tool_use(calls: Vec<ToolCall>) -> ModelAction {
        ModelAction::ToolUse {
            content: None,
            calls,
        }
    }

    #[tokio::test]
    async fn test_respond_immediately() {
        let graph = graph(ScriptedModel::new(vec![]));
        let outcome = graph.run("say hi").await;

        assert_eq!(outcome.final_output(), Some("done"));
        assert_eq!(outcome.state.step_count, 1);
        assert_eq!(outcome.state.messages.len(), 2);
        assert_eq!(outcome.state.messages[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_tool_call_backfills_result() {
        let model = ScriptedModel::new(vec![tool_use(vec![ToolCall::new(
            "c1",
            "write_file",
            serde_json::json!({"path": "/a.txt", "content": "hello"}),
        )])]);
        let graph = graph(model);
        let outcome = graph.run("write a file").await;

        assert!(outcome.is_success());
        assert_eq!(outcome.state.vfs.read("/a.txt").unwrap(), "hello");
        let tool_msg = outcome
            .state
            .messages
            .iter()
            .find(|m| m.role == Role::Tool)
            .unwrap();
        assert!(tool_msg.content.contains("tool_use_id"));
        assert!(tool_msg.content.contains("\"is_error\":false"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_recoverable() {
        let model = ScriptedModel::new(vec![tool_use(vec![ToolCall::new(
            "c1",
            "does_not_exist",
            serde_json::json!({}),
        )])]);
        let graph = graph(model);
        let outcome = graph.run("try a bad tool").await;

        // The loop reports the failure to the model and continues.
        assert!(outcome.is_success());
        let tool_msg = outcome
            .state
            .messages
            .iter()
            .find(|m| m.role == Role::Tool)
            .unwrap();
        assert!(tool_msg.content.contains("unknown tool"));
        assert!(tool_msg.content.contains("\"is_error\":true"));
    }

    #[tokio::test]
    async fn test_step_limit_is_terminal() {
        let pwd = || tool_use(vec![ToolCall::new("c", "pwd", serde_json::json!({}))]);
        let model = ScriptedModel::new(vec![pwd(), pwd(), pwd()]);
        let config = GraphConfig::new("Test agent.").with_limits(RunLimits {
            max_depth: 3,
            max_steps: 2,
        });
        let graph = AgentGraph::new(
            model,
            ToolRegistry::with_builtins(),
            SubagentRegistry::new(),
            config,
        );

        let outcome = graph.run("loop forever").await;
        assert!(matches!(
            outcome.result,
            Err(WeaveError::StepLimitExceeded(2))
        ));
        // State up to the trip survives.
        assert_eq!(outcome.state.step_count, 2);
        assert!(!outcome.state.messages.is_empty());
    }

    #[tokio::test]
    async fn test_step_timeout_is_a_model_failure() {
        struct SlowModel;

        #[async_trait]
        impl ModelClient for SlowModel {
            async fn next_action(
                &self,
                _system_prompt: Option<&str>,
                _messages: &[Message],
                _tools: &[ToolDescriptor],
            ) -> WeaveResult<ModelAction> {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                Ok(ModelAction::Respond {
                    content: "too late".to_string(),
                })
            }
        }

        let config = GraphConfig {
            step_timeout: Some(std::time::Duration::from_millis(10)),
            ..GraphConfig::new("Test agent.")
        };
        let graph = AgentGraph::new(
            Arc::new(SlowModel),
            ToolRegistry::with_builtins(),
            SubagentRegistry::new(),
            config,
        );

        let outcome = graph.run("anything").await;
        assert!(matches!(outcome.result, Err(WeaveError::Model(_))));
    }

    #[tokio::test]
    async fn test_pre_cancelled_run() {
        let graph = graph(ScriptedModel::new(vec![]));
        let token = CancellationToken::new();
        token.cancel();

        let outcome = graph.run_cancellable("anything", token).await;
        assert!(matches!(outcome.result, Err(WeaveError::Cancelled)));
        // The seed message is preserved.
        assert_eq!(outcome.state.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_run_in_reuses_host_state() {
        let graph = graph(ScriptedModel::new(vec![]));
        let mut state = StateContainer::new();
        state.vfs.write("/carried.txt", "from before");

        let result = graph
            .run_in(&mut state, "second task", CancellationToken::new())
            .await;
        assert!(result.is_ok());
        assert!(state.vfs.exists("/carried.txt"));
        assert_eq!(state.step_count, 1);
    }
}
