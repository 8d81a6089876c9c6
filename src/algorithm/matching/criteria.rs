//! Matching criteria definitions for treatment-control matching
//!
//! This module provides the structure and logic for deciding whether a
//! population member is an eligible age-matched control for a Hall of Fame
//! inductee.

use serde::{Deserialize, Serialize};

use crate::models::{IndexBoundary, LifeStatus};

/// What to do with subjects whose survival to the index year cannot be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownDeathPolicy {
    /// Leave them out of both the treatment and control sets
    #[default]
    Exclude,
    /// Treat them as alive (biases control survival upward)
    AssumeAlive,
}

/// Criteria for matching treatment subjects to controls
///
/// A control matches a treatment subject when both share a birth year, the
/// control was alive in the treatment subject's index year under
/// `index_boundary`, and the control is not itself a treatment subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingCriteria {
    /// Comparison deciding survival to the index year
    pub index_boundary: IndexBoundary,

    /// Handling of subjects with undated or implied deaths
    pub unknown_death_policy: UnknownDeathPolicy,

    /// Also drop inductees that are not treatment subjects (e.g. posthumous)
    /// from the control pool
    pub exclude_all_inductees: bool,
}

impl Default for MatchingCriteria {
    fn default() -> Self {
        Self {
            index_boundary: IndexBoundary::Strict,
            unknown_death_policy: UnknownDeathPolicy::Exclude,
            exclude_all_inductees: false,
        }
    }
}

impl MatchingCriteria {
    /// Create a new instance with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for constructing matching criteria
    #[must_use]
    pub fn builder() -> MatchingCriteriaBuilder {
        MatchingCriteriaBuilder::new()
    }

    /// Check if two birth years match
    #[must_use]
    pub const fn is_birth_year_match(&self, treatment_year: i32, control_year: i32) -> bool {
        treatment_year == control_year
    }

    /// Whether a subject with `status` counts as alive in `index_year`
    ///
    /// Returns `None` for subjects the data cannot place, unless the policy
    /// says to assume they are alive.
    #[must_use]
    pub const fn is_alive_at_index(&self, status: LifeStatus, index_year: i32) -> Option<bool> {
        match status.alive_in(index_year, self.index_boundary) {
            Some(alive) => Some(alive),
            None => match self.unknown_death_policy {
                UnknownDeathPolicy::Exclude => None,
                UnknownDeathPolicy::AssumeAlive => Some(true),
            },
        }
    }

    /// Convert to a human-readable string representation
    #[must_use]
    pub fn to_string_representation(&self) -> String {
        let boundary = match self.index_boundary {
            IndexBoundary::Strict => "death year > index year",
            IndexBoundary::Inclusive => "death year >= index year",
        };
        let unknown = match self.unknown_death_policy {
            UnknownDeathPolicy::Exclude => "excluded",
            UnknownDeathPolicy::AssumeAlive => "assumed alive",
        };
        format!(
            "Matching Criteria:\n\
             - Matching key: birth year\n\
             - Alive at index: {}\n\
             - Unknown death status: {}\n\
             - Exclude all inductees from controls: {}",
            boundary, unknown, self.exclude_all_inductees
        )
    }
}

/// Builder for constructing matching criteria
#[derive(Debug, Clone, Default)]
pub struct MatchingCriteriaBuilder {
    criteria: MatchingCriteria,
}

impl MatchingCriteriaBuilder {
    /// Create a new builder with default criteria
    #[must_use]
    pub fn new() -> Self {
        Self {
            criteria: MatchingCriteria::default(),
        }
    }

    /// Set the index boundary comparison
    #[must_use]
    pub const fn index_boundary(mut self, boundary: IndexBoundary) -> Self {
        self.criteria.index_boundary = boundary;
        self
    }

    /// Set the unknown-death policy
    #[must_use]
    pub const fn unknown_death_policy(mut self, policy: UnknownDeathPolicy) -> Self {
        self.criteria.unknown_death_policy = policy;
        self
    }

    /// Set whether every inductee is removed from the control pool
    #[must_use]
    pub const fn exclude_all_inductees(mut self, exclude: bool) -> Self {
        self.criteria.exclude_all_inductees = exclude;
        self
    }

    /// Build the matching criteria
    #[must_use]
    pub const fn build(self) -> MatchingCriteria {
        self.criteria
    }
}

/// Configuration for the matching process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// The criteria to use for matching
    pub criteria: MatchingCriteria,

    /// Cap on controls drawn per treatment subject; `None` keeps every match
    pub max_controls_per_treatment: Option<usize>,

    /// Optional random seed for reproducible control draws
    pub random_seed: Option<u64>,

    /// Whether to use parallel processing for matching
    pub use_parallel: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            criteria: MatchingCriteria::default(),
            max_controls_per_treatment: None,
            random_seed: None,
            use_parallel: true,
        }
    }
}

impl MatchingConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for constructing matching configuration
    #[must_use]
    pub fn builder() -> MatchingConfigBuilder {
        MatchingConfigBuilder::new()
    }
}

/// Builder for constructing matching configuration
#[derive(Debug, Clone, Default)]
pub struct MatchingConfigBuilder {
    config: MatchingConfig,
}

impl MatchingConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: MatchingConfig::default(),
        }
    }

    /// Set the matching criteria
    #[must_use]
    pub const fn criteria(mut self, criteria: MatchingCriteria) -> Self {
        self.config.criteria = criteria;
        self
    }

    /// Cap the number of controls per treatment subject
    #[must_use]
    pub const fn max_controls_per_treatment(mut self, max: usize) -> Self {
        self.config.max_controls_per_treatment = Some(max);
        self
    }

    /// Set the random seed
    #[must_use]
    pub const fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = Some(seed);
        self
    }

    /// Set whether to use parallel processing
    #[must_use]
    pub const fn use_parallel(mut self, parallel: bool) -> Self {
        self.config.use_parallel = parallel;
        self
    }

    /// Build the matching configuration
    #[must_use]
    pub const fn build(self) -> MatchingConfig {
        self.config
    }
}
