//! The Voting Arbiter (§4.6): drives rounds of sampling for one microstep
//! until a winner emerges or `max_retries` is exhausted.

use crate::builder::build_prompt;
use crate::config::{EffectiveConfig, VotingStrategy};
use crate::error::{MdapError, Result};
use crate::parser;
use crate::pipeline::MicrostepDefinition;
use crate::redflag;
use crate::sample::Sample;
use crate::sampler::sample_round;
use crate::value::Value;
use indexmap::IndexMap;
use mdap_llm::{Provider, RunContext};
use std::sync::Arc;

/// The winning sample plus the counters accumulated reaching it.
pub struct VoteOutcome {
    pub winner: Sample,
    pub total_samples: u64,
    pub rejected_samples: u64,
    pub rounds: u32,
}

/// Run the per-microstep voting procedure (§4.6) to completion: sample,
/// filter, parse, tally — repeating rounds until a winner is declared or
/// `config.max_retries` rounds pass without one.
#[allow(clippy::too_many_arguments)]
pub async fn run_step(
    provider: &Arc<dyn Provider>,
    ctx: &RunContext,
    model: &str,
    system_prompt: &str,
    strategy: &str,
    state: &Value,
    last_action: &str,
    step: &MicrostepDefinition,
    config: &EffectiveConfig,
) -> Result<VoteOutcome> {
    let user_prompt = build_prompt(strategy, state, last_action, step);

    let mut counts: IndexMap<String, u32> = IndexMap::new();
    let mut representatives: IndexMap<String, Sample> = IndexMap::new();
    let mut total_samples: u64 = 0;
    let mut rejected_samples: u64 = 0;

    for round in 0..config.max_retries {
        if ctx.is_cancelled() {
            return Err(MdapError::Cancelled);
        }

        let samples = sample_round(provider, ctx, model, system_prompt, &user_prompt, config, round).await;
        let samples_in_round = samples.len();

        for (index, mut sample) in samples.into_iter().enumerate() {
            if sample.cancelled {
                return Err(MdapError::Cancelled);
            }

            total_samples += 1;

            if !sample.red_flagged {
                let (action, next_state) = parser::parse(&sample.content, step);
                sample.action = action;
                sample.next_state = next_state;
            }
            redflag::apply(&mut sample, config, step);

            if sample.red_flagged {
                rejected_samples += 1;
                continue;
            }

            *counts.entry(sample.action.clone()).or_insert(0) += 1;
            representatives.entry(sample.action.clone()).or_insert_with(|| sample.clone());

            if config.voting_strategy == VotingStrategy::FirstToAheadByK {
                // A lone leading action with no tallied competitor only wins
                // once this is the last sample left to tally this round —
                // otherwise a later sample could still introduce a real
                // competitor and deny a premature vacuous margin.
                let no_more_samples_this_round = index + 1 == samples_in_round;
                if let Some(winner_action) = margin_reached(&counts, config.k, no_more_samples_this_round) {
                    let winner = representatives
                        .swap_remove(&winner_action)
                        .expect("representative recorded for every tallied action");
                    return Ok(VoteOutcome {
                        winner,
                        total_samples,
                        rejected_samples,
                        rounds: round + 1,
                    });
                }
            }
        }

        if config.voting_strategy == VotingStrategy::Majority {
            let total_non_rejected: u32 = counts.values().sum();
            if total_non_rejected >= 3 * config.k {
                if let Some(winner_action) = plurality_leader(&counts) {
                    let winner = representatives
                        .swap_remove(&winner_action)
                        .expect("representative recorded for every tallied action");
                    return Ok(VoteOutcome {
                        winner,
                        total_samples,
                        rejected_samples,
                        rounds: round + 1,
                    });
                }
            }
        }
    }

    Err(MdapError::Consensus {
        rounds: config.max_retries,
        total_samples,
        rejected_samples,
    })
}

/// The leading action, if its count exceeds the runner-up's by at least
/// `k`. Ties within a count favor the earlier-inserted key, since
/// `IndexMap` iteration is insertion order and only a strictly greater
/// count displaces the current leader.
///
/// `runner_up` stays `None` until a second distinct action has been
/// tallied. When no second action exists yet, the lone leader's margin is
/// only credited if `no_more_samples_this_round` says nothing left in the
/// round could still introduce a competitor (treating an absent runner-up
/// as a count of zero); otherwise the margin is reported not met, since a
/// later sample could still deny it.
fn margin_reached(counts: &IndexMap<String, u32>, k: u32, no_more_samples_this_round: bool) -> Option<String> {
    let mut leader: Option<(&String, u32)> = None;
    let mut runner_up: Option<u32> = None;

    for (action, &count) in counts {
        match leader {
            Some((_, leader_count)) if count > leader_count => {
                runner_up = Some(leader_count);
                leader = Some((action, count));
            }
            Some(_) => {
                runner_up = Some(runner_up.map_or(count, |r| r.max(count)));
            }
            None => leader = Some((action, count)),
        }
    }

    let (action, leader_count) = leader?;
    let runner_up = match runner_up {
        Some(r) => r,
        None if no_more_samples_this_round => 0,
        None => return None,
    };
    (leader_count.saturating_sub(runner_up) >= k).then(|| action.clone())
}

/// The action with the highest count, ties favoring the earlier-inserted
/// key (§4.6: "ties broken by insertion order, i.e., first-to-reach-that-count").
fn plurality_leader(counts: &IndexMap<String, u32>) -> Option<String> {
    let mut leader: Option<(&String, u32)> = None;
    for (action, &count) in counts {
        if leader.is_none() || count > leader.unwrap().1 {
            leader = Some((action, count));
        }
    }
    leader.map(|(action, _)| action.clone())
}
