//! The Parallel Sampler (§4.4): fans `parallel_samples` concurrent
//! completion requests out to a provider and collects them into an
//! index-preserving vector.

use crate::config::EffectiveConfig;
use crate::sample::Sample;
use futures::future::join_all;
use mdap_llm::{CompletionRequest, Provider, RunContext};
use std::sync::Arc;

/// Issue `config.parallel_samples` concurrent requests for round `round`,
/// returning one [`Sample`] per request in request order.
///
/// Mirrors the lineage Pregel loop's superstep barrier: `join_all` waits
/// for every concurrent task before returning, so a round is never
/// partially observed. Each task races the provider call against
/// `ctx.cancelled()` so ambient cancellation abandons in-flight requests
/// immediately rather than waiting for them to resolve on their own (§5).
pub async fn sample_round(
    provider: &Arc<dyn Provider>,
    ctx: &RunContext,
    model: &str,
    system_prompt: &str,
    user_prompt: &str,
    config: &EffectiveConfig,
    round: u32,
) -> Vec<Sample> {
    let tasks = (0..config.parallel_samples).map(|i| {
        let provider = Arc::clone(provider);
        let mut select_ctx = ctx.clone();
        let call_ctx = ctx.clone();
        let temperature = if round == 0 && i == 0 {
            config.temperature_first
        } else {
            config.temperature_subsequent
        };
        let req = CompletionRequest::new(model, system_prompt, user_prompt)
            .with_temperature(temperature)
            .with_max_tokens(config.max_output_tokens);

        async move {
            tokio::select! {
                _ = select_ctx.cancelled() => Sample::cancelled(),
                result = provider.complete(&call_ctx, req) => match result {
                    Ok(resp) => Sample::raw(resp.content, resp.usage.output_tokens),
                    Err(e) => Sample::provider_error(e),
                },
            }
        }
    });

    join_all(tasks).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeclaredConfig;
    use mdap_llm::{CancellationHandle, CompletionResponse, ProviderError, ScriptedProvider, ScriptedResponse};

    /// A provider whose call never resolves on its own, so any test using
    /// it must win via the cancellation branch of the `select!`.
    struct StallingProvider;

    #[async_trait::async_trait]
    impl Provider for StallingProvider {
        async fn complete(
            &self,
            _ctx: &RunContext,
            _req: CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn collects_one_sample_per_parallel_slot_in_order() {
        let config = DeclaredConfig {
            parallel_samples: Some(3),
            ..Default::default()
        }
        .resolve()
        .unwrap();

        let provider: Arc<dyn Provider> = Arc::new(ScriptedProvider::new(vec![
            ScriptedResponse::new("action = A"),
            ScriptedResponse::new("action = B"),
            ScriptedResponse::new("action = C"),
        ]));
        let (_handle, ctx) = CancellationHandle::new();

        let samples = sample_round(&provider, &ctx, "m", "sys", "user", &config, 0).await;

        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].content, "action = A");
        assert_eq!(samples[1].content, "action = B");
        assert_eq!(samples[2].content, "action = C");
    }

    #[tokio::test]
    async fn cancellation_wins_the_race_against_a_stalled_provider_call() {
        let config = DeclaredConfig {
            parallel_samples: Some(2),
            ..Default::default()
        }
        .resolve()
        .unwrap();

        let provider: Arc<dyn Provider> = Arc::new(StallingProvider);
        let (handle, ctx) = CancellationHandle::new();
        handle.cancel();

        let samples = sample_round(&provider, &ctx, "m", "sys", "user", &config, 0).await;

        assert_eq!(samples.len(), 2);
        for sample in samples {
            assert!(sample.cancelled);
            assert!(sample.red_flagged);
        }
    }

    #[tokio::test]
    async fn provider_error_becomes_red_flagged_sample() {
        let config = DeclaredConfig {
            parallel_samples: Some(1),
            ..Default::default()
        }
        .resolve()
        .unwrap();

        let provider: Arc<dyn Provider> = Arc::new(ScriptedProvider::new(Vec::<ScriptedResponse>::new()));
        let (_handle, ctx) = CancellationHandle::new();

        let samples = sample_round(&provider, &ctx, "m", "sys", "user", &config, 0).await;

        assert_eq!(samples.len(), 1);
        assert!(samples[0].red_flagged);
        assert!(samples[0].red_flag_reason.starts_with("LLM error:"));
    }
}
