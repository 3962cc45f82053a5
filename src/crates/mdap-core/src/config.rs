//! The Config Resolver (§4.1): turns a declared, possibly-sparse
//! configuration into an immutable [`EffectiveConfig`] with every field
//! defaulted or validated.

use crate::error::{MdapError, Result};
use serde::{Deserialize, Serialize};

/// How the Voting Arbiter (§4.6) declares a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VotingStrategy {
    FirstToAheadByK,
    Majority,
}

impl std::str::FromStr for VotingStrategy {
    type Err = MdapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first-to-ahead-by-k" => Ok(VotingStrategy::FirstToAheadByK),
            "majority" => Ok(VotingStrategy::Majority),
            other => Err(MdapError::config(format!("unknown voting strategy '{other}'"))),
        }
    }
}

/// The sparse, user-declared side of the configuration. Any field left
/// `None` is resolved to a default (or derived from another field) by
/// [`DeclaredConfig::resolve`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclaredConfig {
    pub voting_strategy: Option<String>,
    pub k: Option<i64>,
    pub parallel_samples: Option<i64>,
    pub temperature_first: Option<f64>,
    pub temperature_subsequent: Option<f64>,
    pub max_output_tokens: Option<i64>,
    pub require_format: Option<bool>,
    pub output_pattern: Option<String>,
    pub checkpoint_interval: Option<i64>,
    pub max_retries: Option<i64>,
}

/// The fully resolved, immutable configuration a run executes under.
///
/// Built once at pipeline start (§3: "Effective Config is built once at
/// pipeline start and is immutable thereafter"); shared read-only across
/// every step and every concurrent sample via `Arc`.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub voting_strategy: VotingStrategy,
    pub k: u32,
    pub parallel_samples: u32,
    pub temperature_first: f32,
    pub temperature_subsequent: f32,
    pub max_output_tokens: u32,
    pub require_format: bool,
    pub output_pattern: Option<regex::Regex>,
    pub checkpoint_interval: u32,
    pub max_retries: u32,
}

impl DeclaredConfig {
    /// Resolve defaults and reject out-of-range values (§4.1).
    ///
    /// `auto(min, max)` dynamic bounds for `k`, mentioned in pipeline
    /// examples, are not applied here (open question, recorded in
    /// DESIGN.md): a `k` field that isn't a plain integer is a
    /// configuration error rather than a silently-clamped guess.
    pub fn resolve(&self) -> Result<EffectiveConfig> {
        let voting_strategy = match &self.voting_strategy {
            Some(s) => s.parse()?,
            None => VotingStrategy::FirstToAheadByK,
        };

        let k = match self.k {
            Some(k) if k < 1 => return Err(MdapError::config(format!("k must be >= 1, got {k}"))),
            Some(k) => k as u32,
            None => 3,
        };

        let parallel_samples = match self.parallel_samples {
            Some(p) if p < 1 => {
                return Err(MdapError::config(format!("parallel_samples must be >= 1, got {p}")))
            }
            Some(p) => p as u32,
            None => k,
        };

        let temperature_first = resolve_temperature(self.temperature_first, 0.0)?;
        let temperature_subsequent = resolve_temperature(self.temperature_subsequent, 0.1)?;

        let max_output_tokens = match self.max_output_tokens {
            Some(t) if t < 1 => {
                return Err(MdapError::config(format!("max_output_tokens must be >= 1, got {t}")))
            }
            Some(t) => t as u32,
            None => 750,
        };

        let require_format = self.require_format.unwrap_or(true);

        let output_pattern = match &self.output_pattern {
            Some(p) => Some(
                regex::Regex::new(p)
                    .map_err(|e| MdapError::config(format!("invalid output_pattern: {e}")))?,
            ),
            None => None,
        };

        let checkpoint_interval = match self.checkpoint_interval {
            Some(i) if i < 0 => {
                return Err(MdapError::config(format!("checkpoint_interval must be >= 0, got {i}")))
            }
            Some(i) => i as u32,
            None => 1000,
        };

        let max_retries = match self.max_retries {
            Some(r) if r < 1 => {
                return Err(MdapError::config(format!("max_retries must be >= 1, got {r}")))
            }
            Some(r) => r as u32,
            None => 100,
        };

        Ok(EffectiveConfig {
            voting_strategy,
            k,
            parallel_samples,
            temperature_first,
            temperature_subsequent,
            max_output_tokens,
            require_format,
            output_pattern,
            checkpoint_interval,
            max_retries,
        })
    }
}

fn resolve_temperature(declared: Option<f64>, default: f32) -> Result<f32> {
    match declared {
        Some(t) if !(0.0..=2.0).contains(&t) => {
            Err(MdapError::config(format!("temperature must be in [0, 2], got {t}")))
        }
        Some(t) => Ok(t as f32),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_every_unset_field() {
        let cfg = DeclaredConfig::default().resolve().unwrap();
        assert_eq!(cfg.voting_strategy, VotingStrategy::FirstToAheadByK);
        assert_eq!(cfg.k, 3);
        assert_eq!(cfg.parallel_samples, 3);
        assert_eq!(cfg.max_output_tokens, 750);
        assert_eq!(cfg.checkpoint_interval, 1000);
        assert_eq!(cfg.max_retries, 100);
        assert!(cfg.require_format);
    }

    #[test]
    fn parallel_samples_defaults_to_k_when_unset() {
        let declared = DeclaredConfig {
            k: Some(5),
            ..Default::default()
        };
        assert_eq!(declared.resolve().unwrap().parallel_samples, 5);
    }

    #[test]
    fn rejects_k_below_one() {
        let declared = DeclaredConfig {
            k: Some(0),
            ..Default::default()
        };
        assert!(declared.resolve().is_err());
    }

    #[test]
    fn rejects_unknown_voting_strategy() {
        let declared = DeclaredConfig {
            voting_strategy: Some("round-robin".to_string()),
            ..Default::default()
        };
        assert!(matches!(declared.resolve(), Err(MdapError::Config(_))));
    }

    #[test]
    fn rejects_negative_checkpoint_interval() {
        let declared = DeclaredConfig {
            checkpoint_interval: Some(-1),
            ..Default::default()
        };
        assert!(declared.resolve().is_err());
    }

    #[test]
    fn accepts_zero_checkpoint_interval_to_disable_checkpoints() {
        let declared = DeclaredConfig {
            checkpoint_interval: Some(0),
            ..Default::default()
        };
        assert_eq!(declared.resolve().unwrap().checkpoint_interval, 0);
    }
}
