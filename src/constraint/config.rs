//! Age-gap rules and compiler configuration.

use crate::error::ConfigurationError;
use crate::pedigree::Gender;

/// Minimum and maximum age of a parent at the birth of a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgeGapRule {
    /// Youngest age at which a parent of this gender can have a child.
    pub min_age: i64,
    /// Oldest age at which a parent of this gender can have a child.
    pub max_age: i64,
}

impl AgeGapRule {
    /// Creates a rule.
    pub fn new(min_age: i64, max_age: i64) -> Self {
        Self { min_age, max_age }
    }

    fn validate(&self, gender: Gender) -> Result<(), ConfigurationError> {
        if self.min_age < 0 {
            return Err(ConfigurationError::InvalidAgeRule {
                gender,
                reason: format!("min_age must be non-negative, got {}", self.min_age),
            });
        }
        if self.min_age > self.max_age {
            return Err(ConfigurationError::InvalidAgeRule {
                gender,
                reason: format!("min_age {} exceeds max_age {}", self.min_age, self.max_age),
            });
        }
        Ok(())
    }
}

/// Age-gap rules keyed by parent gender.
///
/// # Defaults
///
/// ```
/// use u_lineage::constraint::AgeRules;
///
/// let rules = AgeRules::default();
/// assert_eq!((rules.male.min_age, rules.male.max_age), (15, 70));
/// assert_eq!((rules.female.min_age, rules.female.max_age), (15, 50));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgeRules {
    /// Rule for fathers.
    pub male: AgeGapRule,
    /// Rule for mothers.
    pub female: AgeGapRule,
}

impl Default for AgeRules {
    fn default() -> Self {
        Self {
            male: AgeGapRule::new(15, 70),
            female: AgeGapRule::new(15, 50),
        }
    }
}

impl AgeRules {
    /// The rule applied to a parent of `gender`.
    pub fn for_gender(&self, gender: Gender) -> AgeGapRule {
        match gender {
            Gender::Male => self.male,
            Gender::Female => self.female,
        }
    }

    /// Validates both rules.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.male.validate(Gender::Male)?;
        self.female.validate(Gender::Female)
    }
}

/// Upper limits on the average parent age along a single-gender line.
///
/// Individual generations may reach the age-gap maximum, but a long
/// unbroken line cannot sustain it: five consecutive fathers cannot all
/// be seventy at the birth of their sons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineageAverage {
    /// Maximum average gap over 5 to 9 generations.
    pub five_generation: i64,
    /// Maximum average gap over 10 or more generations.
    pub ten_generation: i64,
}

impl LineageAverage {
    /// Creates limits from the five- and ten-generation averages.
    pub fn new(five_generation: i64, ten_generation: i64) -> Self {
        Self {
            five_generation,
            ten_generation,
        }
    }

    /// Maximum birth-year gap to the ancestor `generations` steps up,
    /// or `None` when the line is too short to be limited.
    ///
    /// Between 5 and 9 generations the limit never exceeds the
    /// ten-generation total.
    pub fn limit(&self, generations: usize) -> Option<i64> {
        let n = generations as i64;
        if generations >= 10 {
            Some(self.ten_generation * n)
        } else if generations >= 5 {
            Some((self.five_generation * n).min(self.ten_generation * 10))
        } else {
            None
        }
    }
}

/// Lineage-average limits for father lines and mother lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineageLimits {
    /// Limits along father lines.
    pub male: LineageAverage,
    /// Limits along mother lines.
    pub female: LineageAverage,
}

impl Default for LineageLimits {
    fn default() -> Self {
        Self {
            male: LineageAverage::new(60, 45),
            female: LineageAverage::new(40, 35),
        }
    }
}

impl LineageLimits {
    /// Limits for the line of parents of `gender`.
    pub fn for_gender(&self, gender: Gender) -> LineageAverage {
        match gender {
            Gender::Male => self.male,
            Gender::Female => self.female,
        }
    }

    /// Checks that every average is positive.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for gender in [Gender::Male, Gender::Female] {
            let avg = self.for_gender(gender);
            if avg.five_generation <= 0 || avg.ten_generation <= 0 {
                return Err(ConfigurationError::InvalidAgeRule {
                    gender,
                    reason: "lineage averages must be positive".into(),
                });
            }
        }
        Ok(())
    }
}

/// Configuration for the constraint compiler.
///
/// # Builder Pattern
///
/// ```
/// use u_lineage::constraint::{AgeGapRule, CompilerConfig, LineageLimits};
///
/// let config = CompilerConfig::default()
///     .with_male_rule(AgeGapRule::new(14, 80))
///     .with_lineage_limits(LineageLimits::default())
///     .with_year_window(-2000, 2000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompilerConfig {
    /// Age-gap rules per parent gender.
    pub rules: AgeRules,

    /// Lineage-average limits. `None` (the default) adds no such
    /// constraints; they are mostly useful to disprove doubtful lines.
    pub lineage_limits: Option<LineageLimits>,

    /// Global `[lo, hi]` window applied to every birth year.
    ///
    /// `None` (the default) leaves unconstrained individuals unbounded.
    pub year_window: Option<(i64, i64)>,
}

impl CompilerConfig {
    /// Sets both age-gap rules.
    pub fn with_rules(mut self, rules: AgeRules) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the rule for fathers.
    pub fn with_male_rule(mut self, rule: AgeGapRule) -> Self {
        self.rules.male = rule;
        self
    }

    /// Sets the rule for mothers.
    pub fn with_female_rule(mut self, rule: AgeGapRule) -> Self {
        self.rules.female = rule;
        self
    }

    /// Enables lineage-average limits.
    pub fn with_lineage_limits(mut self, limits: LineageLimits) -> Self {
        self.lineage_limits = Some(limits);
        self
    }

    /// Bounds every birth year to `[lo, hi]`.
    pub fn with_year_window(mut self, lo: i64, hi: i64) -> Self {
        self.year_window = Some((lo, hi));
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.rules.validate()?;
        if let Some(limits) = &self.lineage_limits {
            limits.validate()?;
        }
        if let Some((lo, hi)) = self.year_window {
            if lo > hi {
                return Err(ConfigurationError::InvalidYearWindow { lo, hi });
            }
        }
        Ok(())
    }
}
