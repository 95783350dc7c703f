//! Tiered fallback strategy for table-backed catalogs
//!
//! Tiers are tried strictly in order and the first artifact that passes the
//! field predicates (table discovery order, then row order) wins:
//!
//! | Tier | Scope | Accelerator | ABI relaxation |
//! |------|-------|-------------|----------------|
//! | 1 | restricted | requested | off |
//! | 2 | restricted | `12.8`, only when requested is `12.9` | off |
//! | 3 | full | requested | off |
//! | 4 | full | `12.8`, only when requested is `12.9` | off |
//! | 5 | tiers 1-4 again | | on, only when the caller allows it |

use super::{
    Attempt, MatchError, MatchStrategy, RequestDescriptor, Resolution, ResolutionFailure, Strategy,
};
use crate::catalog::{Artifact, CandidateProvider, Scope};
use crate::tags::step_down;
use tracing::{debug, info};

/// Tier number shared by every ABI-relaxed pass.
const RELAXED_TIER: u8 = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct TieredMatcher;

impl TieredMatcher {
    pub fn new() -> Self {
        Self
    }

    /// The passes this request is entitled to, in the order they run.
    pub fn plan(request: &RequestDescriptor, dotted: &str) -> Vec<Attempt> {
        let relaxation: &[bool] = if request.allow_abi_relaxation {
            &[false, true]
        } else {
            &[false]
        };

        let mut plan = Vec::new();
        for &abi_relaxed in relaxation {
            for (base_tier, scope) in [(1u8, Scope::Restricted), (3u8, Scope::Full)] {
                let tier = |n: u8| if abi_relaxed { RELAXED_TIER } else { n };

                plan.push(Attempt {
                    tier: tier(base_tier),
                    scope,
                    accelerator: dotted.to_string(),
                    abi_relaxed,
                });

                if let Some(fallback) = step_down(dotted) {
                    plan.push(Attempt {
                        tier: tier(base_tier + 1),
                        scope,
                        accelerator: fallback.to_string(),
                        abi_relaxed,
                    });
                }
            }
        }
        plan
    }

    fn try_attempt(
        provider: &dyn CandidateProvider,
        request: &RequestDescriptor,
        attempt: &Attempt,
    ) -> Option<Artifact> {
        let query = request.query(&attempt.accelerator, attempt.abi_relaxed);
        provider
            .candidates(&request.package, request.variant.as_deref(), attempt.scope)
            .into_iter()
            .find(|artifact| query.matches(artifact))
    }
}

impl MatchStrategy for TieredMatcher {
    fn strategy(&self) -> Strategy {
        Strategy::Tiered
    }

    fn resolve(
        &self,
        provider: &dyn CandidateProvider,
        request: &RequestDescriptor,
    ) -> Result<Resolution, MatchError> {
        let dotted = request.dotted_accelerator()?;
        let mut attempted = Vec::new();

        for attempt in Self::plan(request, &dotted) {
            debug!(package = %request.package, "Trying {}", attempt);

            if let Some(artifact) = Self::try_attempt(provider, request, &attempt) {
                info!(url = %artifact.url, "Resolved at {}", attempt);
                return Ok(Resolution {
                    url: artifact.url.clone(),
                    artifact,
                    strategy: Strategy::Tiered,
                    attempt,
                    score: None,
                });
            }
            attempted.push(attempt);
        }

        Err(MatchError::ResolutionFailure(ResolutionFailure::new(
            request,
            &dotted,
            Strategy::Tiered,
            attempted,
        )))
    }
}
