//! The top-level Executor: the Step Loop (§4.2) tying every component
//! together into a single `run()` call that always returns a structured
//! [`ExecutionResult`], success or failure.

use crate::arbiter;
use crate::builder::build_system_prompt;
use crate::error::MdapError;
use crate::pipeline::{MicrostepDefinition, PipelineDescription, TotalSteps};
use crate::progress::{percentage, should_emit, ProgressEmitter, ProgressEvent, DEFAULT_CHANNEL_CAPACITY};
use crate::resolve::AgentResolver;
use crate::value::Value;
use indexmap::IndexMap;
use mdap_checkpoint::{Checkpoint, CheckpointSaver, InMemoryCheckpointSaver};
use mdap_llm::{Provider, RunContext};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// The committed action and state for one named microstep.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub action: String,
    pub next_state: Value,
}

/// What a run produced, whether it succeeded or not. Always returned —
/// the executor never panics its way out of a partial run (§7:
/// "the executor always returns a structured result").
#[derive(Debug)]
pub struct ExecutionResult {
    pub success: bool,
    pub final_state: Value,
    pub duration: Duration,
    pub total_microsteps: u64,
    pub total_samples: u64,
    pub rejected_samples: u64,
    pub voting_rounds: u64,
    pub checkpoints: Vec<Checkpoint<Value>>,
    pub step_results: IndexMap<String, StepResult>,
    pub error: Option<MdapError>,
}

/// Ties the Microstep Builder, Parallel Sampler, Red-Flag Filter, Response
/// Parser, Voting Arbiter, Checkpointer, and Progress Emitter into the
/// single Step Loop (§4.2).
pub struct Executor {
    provider: Arc<dyn Provider>,
    resolver: Arc<dyn AgentResolver>,
    checkpoint_saver: Arc<dyn CheckpointSaver<Value>>,
    progress: ProgressEmitter,
}

impl Executor {
    /// Build an executor with the shipped in-memory checkpoint saver and a
    /// fresh progress channel of default capacity.
    pub fn new(provider: Arc<dyn Provider>, resolver: Arc<dyn AgentResolver>) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (progress, rx) = ProgressEmitter::new(DEFAULT_CHANNEL_CAPACITY);
        (
            Self {
                provider,
                resolver,
                checkpoint_saver: Arc::new(InMemoryCheckpointSaver::new()),
                progress,
            },
            rx,
        )
    }

    /// Replace the default in-memory checkpoint saver with a host-supplied
    /// durable backend (§6: "a host application wires its own durable
    /// saver behind the same trait").
    pub fn with_checkpoint_saver(mut self, saver: Arc<dyn CheckpointSaver<Value>>) -> Self {
        self.checkpoint_saver = saver;
        self
    }

    /// Run `pipeline` to completion (or failure) under ambient
    /// cancellation `ctx`.
    pub async fn run(&self, pipeline: &PipelineDescription, ctx: RunContext) -> ExecutionResult {
        let start = Instant::now();
        self.progress.emit(ProgressEvent::Start);

        let config = match pipeline.mdap_config.resolve() {
            Ok(config) => config,
            Err(e) => return self.fail_before_execution(e, &pipeline.input, start),
        };

        let total_steps = match &pipeline.total_steps {
            TotalSteps::Fixed(n) => *n,
            TotalSteps::Infer => {
                let e = MdapError::config(
                    "total_steps: infer requires an external estimator not implemented by this core",
                );
                return self.fail_before_execution(e, &pipeline.input, start);
            }
        };

        let mut state = pipeline.input.clone();
        let mut last_action = String::new();
        let mut checkpoints = Vec::new();
        let mut step_results = IndexMap::new();
        let mut total_samples = 0u64;
        let mut rejected_samples = 0u64;
        let mut voting_rounds = 0u64;

        for step_index in 0..total_steps {
            if ctx.is_cancelled() {
                self.progress.emit(ProgressEvent::Error {
                    message: "execution cancelled".to_string(),
                });
                return ExecutionResult {
                    success: false,
                    final_state: state,
                    duration: start.elapsed(),
                    total_microsteps: step_index,
                    total_samples,
                    rejected_samples,
                    voting_rounds,
                    checkpoints,
                    step_results,
                    error: Some(MdapError::Cancelled),
                };
            }

            if config.checkpoint_interval > 0
                && step_index > 0
                && step_index % u64::from(config.checkpoint_interval) == 0
            {
                let checkpoint = Checkpoint::new(step_index as i64, state.clone());
                if let Err(e) = self.checkpoint_saver.put(checkpoint.clone()).await {
                    return self.fail(
                        e.into(),
                        step_index,
                        state,
                        start,
                        total_samples,
                        rejected_samples,
                        voting_rounds,
                        checkpoints,
                        step_results,
                    );
                }
                checkpoints.push(checkpoint);
            }

            let step = match pipeline.microsteps.get(step_index as usize) {
                Some(declared) => declared.clone(),
                None => match &pipeline.default_agent {
                    Some(agent) => MicrostepDefinition::synthesize(step_index, agent.clone()),
                    None => {
                        let e = MdapError::resolve(
                            "default_agent",
                            "pipeline has no microstep list and no default_agent to synthesize one",
                        );
                        return self.fail(
                            e,
                            step_index,
                            state,
                            start,
                            total_samples,
                            rejected_samples,
                            voting_rounds,
                            checkpoints,
                            step_results,
                        );
                    }
                },
            };

            let agent = match self.resolver.resolve(&step.agent) {
                Ok(agent) => agent,
                Err(e) => {
                    return self.fail(
                        e,
                        step_index,
                        state,
                        start,
                        total_samples,
                        rejected_samples,
                        voting_rounds,
                        checkpoints,
                        step_results,
                    )
                }
            };
            let system_prompt = build_system_prompt(&agent.system_prompt);

            let outcome = arbiter::run_step(
                &self.provider,
                &ctx,
                &agent.model,
                &system_prompt,
                &pipeline.strategy,
                &state,
                &last_action,
                &step,
                &config,
            )
            .await;

            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(e) => {
                    return self.fail(
                        e,
                        step_index,
                        state,
                        start,
                        total_samples,
                        rejected_samples,
                        voting_rounds,
                        checkpoints,
                        step_results,
                    )
                }
            };

            total_samples += outcome.total_samples;
            rejected_samples += outcome.rejected_samples;
            voting_rounds += u64::from(outcome.rounds);

            state = outcome.winner.next_state.clone();
            last_action = outcome.winner.action.clone();
            step_results.insert(
                step.name.clone(),
                StepResult {
                    action: last_action.clone(),
                    next_state: state.clone(),
                },
            );

            if should_emit(step_index, total_steps) {
                self.progress.emit(ProgressEvent::Step {
                    name: step.name.clone(),
                    index: step_index,
                    percentage: percentage(step_index, total_steps),
                });
            }
        }

        let mut metadata = HashMap::new();
        metadata.insert("total_steps".to_string(), total_steps.to_string());
        metadata.insert("total_samples".to_string(), total_samples.to_string());
        metadata.insert("rejected_samples".to_string(), rejected_samples.to_string());
        metadata.insert("duration".to_string(), format!("{:?}", start.elapsed()));
        self.progress.emit(ProgressEvent::Complete { metadata });

        ExecutionResult {
            success: true,
            final_state: state,
            duration: start.elapsed(),
            total_microsteps: total_steps,
            total_samples,
            rejected_samples,
            voting_rounds,
            checkpoints,
            step_results,
            error: None,
        }
    }

    fn fail_before_execution(&self, error: MdapError, input: &Value, start: Instant) -> ExecutionResult {
        self.progress.emit(ProgressEvent::Error {
            message: error.to_string(),
        });
        ExecutionResult {
            success: false,
            final_state: input.clone(),
            duration: start.elapsed(),
            total_microsteps: 0,
            total_samples: 0,
            rejected_samples: 0,
            voting_rounds: 0,
            checkpoints: Vec::new(),
            step_results: IndexMap::new(),
            error: Some(error),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn fail(
        &self,
        error: MdapError,
        step_index: u64,
        state: Value,
        start: Instant,
        total_samples: u64,
        rejected_samples: u64,
        voting_rounds: u64,
        checkpoints: Vec<Checkpoint<Value>>,
        step_results: IndexMap<String, StepResult>,
    ) -> ExecutionResult {
        self.progress.emit(ProgressEvent::Error {
            message: error.to_string(),
        });
        ExecutionResult {
            success: false,
            final_state: state,
            duration: start.elapsed(),
            total_microsteps: step_index,
            total_samples,
            rejected_samples,
            voting_rounds,
            checkpoints,
            step_results,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeclaredConfig;
    use crate::resolve::StaticAgentResolver;
    use mdap_llm::{CancellationHandle, ScriptedProvider, ScriptedResponse};

    fn resolver() -> Arc<dyn AgentResolver> {
        Arc::new(StaticAgentResolver::new().with_agent("solver", "m", "solve the task"))
    }

    fn pipeline(total_steps: u64) -> PipelineDescription {
        PipelineDescription {
            microsteps: Vec::new(),
            strategy: "be quick".to_string(),
            mdap_config: DeclaredConfig {
                k: Some(1),
                parallel_samples: Some(1),
                checkpoint_interval: Some(0),
                ..Default::default()
            },
            total_steps: TotalSteps::Fixed(total_steps),
            input: Value::object(),
            default_agent: Some(Value::from("solver")),
        }
    }

    #[tokio::test]
    async fn zero_total_steps_succeeds_immediately_with_initial_state() {
        let provider: Arc<dyn Provider> = Arc::new(ScriptedProvider::new(Vec::<ScriptedResponse>::new()));
        let (executor, _rx) = Executor::new(provider, resolver());
        let (_handle, ctx) = CancellationHandle::new();

        let result = executor.run(&pipeline(0), ctx).await;

        assert!(result.success);
        assert_eq!(result.final_state, Value::object());
        assert_eq!(result.total_microsteps, 0);
    }

    #[tokio::test]
    async fn dynamic_microsteps_are_synthesized_and_named_by_index() {
        let provider: Arc<dyn Provider> = Arc::new(ScriptedProvider::new(vec![
            ScriptedResponse::new("action = ok\nnext_state = \"s\""),
            ScriptedResponse::new("action = ok\nnext_state = \"s\""),
        ]));
        let (executor, _rx) = Executor::new(provider, resolver());
        let (_handle, ctx) = CancellationHandle::new();

        let result = executor.run(&pipeline(2), ctx).await;

        assert!(result.success);
        assert!(result.step_results.contains_key("step-0"));
        assert!(result.step_results.contains_key("step-1"));
    }

    #[tokio::test]
    async fn consensus_failure_aborts_the_pipeline_and_preserves_partial_result() {
        let mut p = pipeline(5);
        p.mdap_config.max_retries = Some(1);
        p.mdap_config.k = Some(5);
        p.mdap_config.parallel_samples = Some(1);

        let provider: Arc<dyn Provider> = Arc::new(ScriptedProvider::new(vec![ScriptedResponse::new("action = ok\nnext_state = \"s\"")]));
        let (executor, _rx) = Executor::new(provider, resolver());
        let (_handle, ctx) = CancellationHandle::new();

        let result = executor.run(&p, ctx).await;

        assert!(!result.success);
        assert!(matches!(result.error, Some(MdapError::Consensus { .. })));
        assert_eq!(result.total_microsteps, 0);
    }

    #[tokio::test]
    async fn cancellation_mid_run_preserves_completed_steps() {
        let provider: Arc<dyn Provider> = Arc::new(ScriptedProvider::new(vec![ScriptedResponse::new(
            "action = ok\nnext_state = \"s\"",
        )]));
        let (executor, _rx) = Executor::new(provider, resolver());
        let (handle, ctx) = CancellationHandle::new();
        handle.cancel();

        let result = executor.run(&pipeline(3), ctx).await;

        assert!(!result.success);
        assert!(matches!(result.error, Some(MdapError::Cancelled)));
        assert_eq!(result.total_microsteps, 0);
    }
}
