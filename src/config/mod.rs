//! Configuration for the longevity pipeline.
//!
//! Every fixed constant the analysis depends on (the as-of cutoff, the sanity
//! ceilings, the retirement threshold, matching policy) lives here so the same
//! pipeline can be re-run against a newer data snapshot.

use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::algorithm::matching::MatchingConfig;
use crate::error::util::safe_read_to_string;
use crate::error::{LongevityError, Result};

/// Default snapshot date of the source data
pub const DEFAULT_AS_OF_DATE: (i32, u32, u32) = (2021, 12, 2);

/// Settings for reading delimited source tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Field delimiter
    pub delimiter: char,
    /// Whether the first line is a header
    pub has_header: bool,
    /// Rows per Arrow record batch
    pub batch_size: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_header: true,
            batch_size: 16384,
        }
    }
}

impl SourceConfig {
    /// Delimiter as a byte, as the CSV reader wants it
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter).map_err(|_| {
            LongevityError::config(format!(
                "Delimiter must be a single-byte character, got {:?}",
                self.delimiter
            ))
        })
    }
}

/// Configuration for a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Snapshot date used to censor still-ongoing cases
    pub as_of_date: NaiveDate,
    /// Age above which an undated subject is not assumed alive
    pub lifetime_ceiling_years: f64,
    /// Inactivity after the last game needed to count as retired
    pub retirement_threshold_years: f64,
    /// Heights above this many inches are rejected as implausible
    pub max_height_inches: u32,
    /// Lightest plausible weight in pounds
    pub min_weight_pounds: u32,
    /// Heaviest plausible weight in pounds
    pub max_weight_pounds: u32,
    /// Only Hall of Fame rows with this category count as inductions
    pub hall_of_fame_category: Option<String>,
    /// Use rayon for row-independent stages
    pub parallel: bool,
    /// Source table settings
    pub source: SourceConfig,
    /// Cohort matching policy
    pub matching: MatchingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let (year, month, day) = DEFAULT_AS_OF_DATE;
        Self {
            as_of_date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
            lifetime_ceiling_years: 110.0,
            retirement_threshold_years: 2.0,
            max_height_inches: 84,
            min_weight_pounds: 80,
            max_weight_pounds: 400,
            hall_of_fame_category: Some("Player".to_string()),
            parallel: true,
            source: SourceConfig::default(),
            matching: MatchingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for constructing a configuration
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = safe_read_to_string(path, "pipeline configuration")?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values are usable
    pub fn validate(&self) -> Result<()> {
        if !(self.lifetime_ceiling_years.is_finite() && self.lifetime_ceiling_years > 0.0) {
            return Err(LongevityError::config(format!(
                "lifetime_ceiling_years must be positive, got {}",
                self.lifetime_ceiling_years
            )));
        }
        if !(self.retirement_threshold_years.is_finite() && self.retirement_threshold_years >= 0.0)
        {
            return Err(LongevityError::config(format!(
                "retirement_threshold_years must be non-negative, got {}",
                self.retirement_threshold_years
            )));
        }
        if self.max_height_inches == 0 {
            return Err(LongevityError::config("max_height_inches must be positive"));
        }
        if self.min_weight_pounds > self.max_weight_pounds {
            return Err(LongevityError::config(format!(
                "min_weight_pounds ({}) exceeds max_weight_pounds ({})",
                self.min_weight_pounds, self.max_weight_pounds
            )));
        }
        if self.source.batch_size == 0 {
            return Err(LongevityError::config("source.batch_size must be positive"));
        }
        self.source.delimiter_byte()?;
        if self.matching.max_controls_per_treatment == Some(0) {
            return Err(LongevityError::config(
                "matching.max_controls_per_treatment must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Configuration:")?;
        writeln!(f, "  As-of Date: {}", self.as_of_date)?;
        writeln!(f, "  Lifetime Ceiling: {} years", self.lifetime_ceiling_years)?;
        writeln!(
            f,
            "  Retirement Threshold: {} years",
            self.retirement_threshold_years
        )?;
        writeln!(f, "  Max Height: {} inches", self.max_height_inches)?;
        writeln!(
            f,
            "  Weight Range: {}..={} pounds",
            self.min_weight_pounds, self.max_weight_pounds
        )?;
        if let Some(category) = &self.hall_of_fame_category {
            writeln!(f, "  Hall of Fame Category: {category}")?;
        }
        writeln!(f, "  Parallel: {}", self.parallel)?;
        write!(f, "{}", self.matching.criteria.to_string_representation())
    }
}

/// Builder for constructing a pipeline configuration
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Set the as-of date
    #[must_use]
    pub const fn as_of_date(mut self, date: NaiveDate) -> Self {
        self.config.as_of_date = date;
        self
    }

    /// Set the lifetime sanity ceiling
    #[must_use]
    pub const fn lifetime_ceiling_years(mut self, years: f64) -> Self {
        self.config.lifetime_ceiling_years = years;
        self
    }

    /// Set the retirement inactivity threshold
    #[must_use]
    pub const fn retirement_threshold_years(mut self, years: f64) -> Self {
        self.config.retirement_threshold_years = years;
        self
    }

    /// Set the plausible-height ceiling
    #[must_use]
    pub const fn max_height_inches(mut self, inches: u32) -> Self {
        self.config.max_height_inches = inches;
        self
    }

    /// Set the plausible weight range
    #[must_use]
    pub const fn weight_pounds(mut self, min: u32, max: u32) -> Self {
        self.config.min_weight_pounds = min;
        self.config.max_weight_pounds = max;
        self
    }

    /// Restrict inductions to one Hall of Fame category, or accept all
    #[must_use]
    pub fn hall_of_fame_category(mut self, category: Option<&str>) -> Self {
        self.config.hall_of_fame_category = category.map(str::to_string);
        self
    }

    /// Set whether row-independent stages run in parallel
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Set the source table settings
    #[must_use]
    pub fn source(mut self, source: SourceConfig) -> Self {
        self.config.source = source;
        self
    }

    /// Set the matching configuration
    #[must_use]
    pub fn matching(mut self, matching: MatchingConfig) -> Self {
        self.config.matching = matching;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndexBoundary;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.as_of_date, NaiveDate::from_ymd_opt(2021, 12, 2).unwrap());
        assert!((config.lifetime_ceiling_years - 110.0).abs() < f64::EPSILON);
        assert!((config.retirement_threshold_years - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.matching.criteria.index_boundary, IndexBoundary::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "as_of_date": "2023-01-01", "matching": { "criteria": { "index_boundary": "inclusive" } } }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.as_of_date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(config.max_height_inches, 84);
        assert_eq!((config.min_weight_pounds, config.max_weight_pounds), (80, 400));
        assert_eq!(config.matching.criteria.index_boundary, IndexBoundary::Inclusive);
    }

    #[test]
    fn test_builder_rejects_bad_values() {
        assert!(PipelineConfig::builder().lifetime_ceiling_years(-1.0).build().is_err());
        assert!(
            PipelineConfig::builder()
                .source(SourceConfig {
                    delimiter: 'é',
                    ..SourceConfig::default()
                })
                .build()
                .is_err()
        );
        assert!(PipelineConfig::builder().weight_pounds(300, 200).build().is_err());
        assert!(PipelineConfig::builder().parallel(false).build().is_ok());
    }
}
