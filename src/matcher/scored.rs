//! Scored strategy for structured catalogs
//!
//! Candidates are drawn once (restricted by the variant filter, if any).
//! Each pass keeps every candidate that passes the field predicates for one
//! accelerator and picks the highest score. An empty pass on `12.9` retries
//! the whole pass on `12.8`; if that is still empty and relaxation has not
//! been tried, both are retried with ABI relaxation on. Steps are numbered
//! in the order they ran.

use super::{
    Attempt, MatchError, MatchStrategy, RequestDescriptor, Resolution, ResolutionFailure, Strategy,
};
use crate::catalog::{Artifact, CandidateProvider, Scope};
use crate::tags::step_down;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoredMatcher;

impl ScoredMatcher {
    pub fn new() -> Self {
        Self
    }
}

struct ScoredRun<'a> {
    request: &'a RequestDescriptor,
    candidates: Vec<Artifact>,
    attempts: Vec<Attempt>,
}

impl<'a> ScoredRun<'a> {
    fn new(provider: &dyn CandidateProvider, request: &'a RequestDescriptor) -> Self {
        let candidates =
            provider.candidates(&request.package, request.variant.as_deref(), Scope::Restricted);
        debug!(
            package = %request.package,
            count = candidates.len(),
            "Collected structured candidates"
        );
        Self {
            request,
            candidates,
            attempts: Vec::new(),
        }
    }

    /// One scored pass on `accelerator`, stepping down on an empty result.
    fn pass(&mut self, accelerator: &str, abi_relaxed: bool) -> Option<Resolution> {
        let attempt = Attempt {
            tier: self.attempts.len() as u8 + 1,
            scope: Scope::Restricted,
            accelerator: accelerator.to_string(),
            abi_relaxed,
        };
        debug!(package = %self.request.package, "Trying {}", attempt);

        if let Some(resolution) = self.best(&attempt) {
            return Some(resolution);
        }
        self.attempts.push(attempt);

        step_down(accelerator).and_then(|fallback| self.pass(fallback, abi_relaxed))
    }

    /// Highest-scoring passing candidate. Ties keep the earliest.
    fn best(&self, attempt: &Attempt) -> Option<Resolution> {
        let query = self.request.query(&attempt.accelerator, attempt.abi_relaxed);

        let mut best: Option<(u32, &Artifact)> = None;
        for artifact in self.candidates.iter().filter(|a| query.matches(a)) {
            let score = query.score(artifact);
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, artifact));
            }
        }

        best.map(|(score, artifact)| Resolution {
            url: artifact.url.clone(),
            artifact: artifact.clone(),
            strategy: Strategy::Scored,
            attempt: attempt.clone(),
            score: Some(score),
        })
    }
}

impl MatchStrategy for ScoredMatcher {
    fn strategy(&self) -> Strategy {
        Strategy::Scored
    }

    fn resolve(
        &self,
        provider: &dyn CandidateProvider,
        request: &RequestDescriptor,
    ) -> Result<Resolution, MatchError> {
        let dotted = request.dotted_accelerator()?;
        let mut run = ScoredRun::new(provider, request);

        let mut resolution = run.pass(&dotted, request.allow_abi_relaxation);
        if resolution.is_none() && !request.allow_abi_relaxation {
            // Structured catalogs retry with relaxation even when the caller
            // did not ask for it.
            resolution = run.pass(&dotted, true);
        }

        match resolution {
            Some(resolution) => {
                info!(
                    url = %resolution.url,
                    score = resolution.score.unwrap_or_default(),
                    "Resolved at {}",
                    resolution.attempt
                );
                Ok(resolution)
            }
            None => Err(MatchError::ResolutionFailure(ResolutionFailure::new(
                request,
                &dotted,
                Strategy::Scored,
                run.attempts,
            ))),
        }
    }
}
