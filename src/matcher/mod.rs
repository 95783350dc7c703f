//! Compatibility matching
//!
//! Resolves a [`RequestDescriptor`] against a [`CandidateProvider`] into a
//! single download URL. Two strategies exist, one per catalog shape, and
//! they are never blended:
//!
//! - [`TieredMatcher`] (markdown tables): strict fallback tiers, first match
//!   in document order wins.
//! - [`ScoredMatcher`] (structured JSON): every passing candidate is scored,
//!   highest score wins, ties keep stream order.
//!
//! Resolution is a pure function of the catalog and the request.

pub mod predicates;
pub mod scored;
pub mod tiered;

use crate::catalog::{Artifact, CandidateProvider, Scope};
use crate::tags::{to_dotted, TagError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use predicates::FieldQuery;
pub use scored::ScoredMatcher;
pub use tiered::TieredMatcher;

/// What the caller wants installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub package: String,
    /// Framework version, `X.Y.Z`.
    pub framework_version: String,
    /// Accelerator tag, `cuNNN` or `NN.N`.
    pub accelerator: String,
    /// Language version, `X.Y`.
    pub language: String,
    pub allow_abi_relaxation: bool,
    pub variant: Option<String>,
}

impl RequestDescriptor {
    pub fn new(
        package: impl Into<String>,
        framework_version: impl Into<String>,
        accelerator: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            framework_version: framework_version.into(),
            accelerator: accelerator.into(),
            language: language.into(),
            allow_abi_relaxation: false,
            variant: None,
        }
    }

    pub fn with_abi_relaxation(mut self, allow: bool) -> Self {
        self.allow_abi_relaxation = allow;
        self
    }

    pub fn with_variant(mut self, variant: Option<String>) -> Self {
        self.variant = variant.filter(|v| !v.trim().is_empty());
        self
    }

    pub fn dotted_accelerator(&self) -> Result<String, TagError> {
        to_dotted(&self.accelerator)
    }

    pub(crate) fn query<'a>(&'a self, accelerator: &'a str, abi_relaxed: bool) -> FieldQuery<'a> {
        FieldQuery {
            framework: &self.framework_version,
            accelerator,
            language: &self.language,
            abi_relaxed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Tiered,
    Scored,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Tiered => write!(f, "tiered"),
            Strategy::Scored => write!(f, "scored"),
        }
    }
}

/// One matching pass: which tier (or scored step), over which scope, with
/// which accelerator, with or without ABI relaxation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub tier: u8,
    pub scope: Scope,
    pub accelerator: String,
    pub abi_relaxed: bool,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tier {} ({} scope, accelerator {}, abi relaxation {})",
            self.tier,
            self.scope,
            self.accelerator,
            if self.abi_relaxed { "on" } else { "off" }
        )
    }
}

/// A resolved artifact and how it was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub url: String,
    pub artifact: Artifact,
    pub strategy: Strategy,
    pub attempt: Attempt,
    /// Winning score, scored strategy only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

/// Every permitted pass was tried and none produced an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionFailure {
    pub package: String,
    pub framework_version: String,
    pub accelerator: String,
    pub language: String,
    pub strategy: Strategy,
    pub attempts: Vec<Attempt>,
    pub abi_relaxation_tried: bool,
}

impl ResolutionFailure {
    fn new(request: &RequestDescriptor, dotted: &str, strategy: Strategy, attempts: Vec<Attempt>) -> Self {
        let abi_relaxation_tried = attempts.iter().any(|a| a.abi_relaxed);
        Self {
            package: request.package.clone(),
            framework_version: request.framework_version.clone(),
            accelerator: dotted.to_string(),
            language: request.language.clone(),
            strategy,
            attempts,
            abi_relaxation_tried,
        }
    }
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "No compatible artifact for {} (framework {}, accelerator {}, language {}) \
             after {} {} attempt(s); abi relaxation tried: {}",
            self.package,
            self.framework_version,
            self.accelerator,
            self.language,
            self.attempts.len(),
            self.strategy,
            if self.abi_relaxation_tried { "yes" } else { "no" }
        )?;
        for attempt in &self.attempts {
            write!(f, "\n  - {}", attempt)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    InvalidTag(#[from] TagError),

    #[error("{0}")]
    ResolutionFailure(ResolutionFailure),
}

/// A resolution strategy over any candidate provider.
pub trait MatchStrategy {
    fn strategy(&self) -> Strategy;

    fn resolve(
        &self,
        provider: &dyn CandidateProvider,
        request: &RequestDescriptor,
    ) -> Result<Resolution, MatchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = RequestDescriptor::new("flash-attn", "2.8.0", "cu129", "3.13")
            .with_abi_relaxation(true)
            .with_variant(Some("  ".to_string()));
        assert!(request.allow_abi_relaxation);
        assert_eq!(request.variant, None);
        assert_eq!(request.dotted_accelerator().unwrap(), "12.9");
    }

    #[test]
    fn test_failure_display_lists_attempts() {
        let request = RequestDescriptor::new("flash-attn", "2.8.0", "cu129", "3.11");
        let attempts = vec![
            Attempt {
                tier: 1,
                scope: Scope::Restricted,
                accelerator: "12.9".to_string(),
                abi_relaxed: false,
            },
            Attempt {
                tier: 2,
                scope: Scope::Restricted,
                accelerator: "12.8".to_string(),
                abi_relaxed: false,
            },
        ];
        let failure = ResolutionFailure::new(&request, "12.9", Strategy::Tiered, attempts);
        let message = failure.to_string();

        assert!(message.contains("flash-attn"));
        assert!(message.contains("framework 2.8.0, accelerator 12.9, language 3.11"));
        assert!(message.contains("tier 1 (restricted scope, accelerator 12.9, abi relaxation off)"));
        assert!(message.contains("tier 2 (restricted scope, accelerator 12.8, abi relaxation off)"));
        assert!(message.contains("abi relaxation tried: no"));
    }
}
