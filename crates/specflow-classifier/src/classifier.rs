use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use specflow_config::ClassifierSettings;
use specflow_roles::RoleId;
use tracing::debug;

use crate::error::ClassifyError;
use crate::keywords::{CLAUSE_CONNECTIVES, DOMAIN_KEYWORDS, is_technical_term};

/// Complexity of a task, ordered from least to most complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
  Simple,
  Medium,
  Complex,
}

impl fmt::Display for ComplexityTier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ComplexityTier::Simple => "simple",
      ComplexityTier::Medium => "medium",
      ComplexityTier::Complex => "complex",
    };
    f.write_str(name)
  }
}

/// Result of classifying a task description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
  pub complexity_tier: ComplexityTier,
  pub domain_tags: BTreeSet<String>,
  /// Every known role, flagged true when the plan should include it.
  pub required_roles: BTreeMap<RoleId, bool>,
  /// Raw score the tier was derived from.
  pub score: u32,
}

impl Classification {
  /// Roles flagged as required.
  pub fn selected_roles(&self) -> BTreeSet<RoleId> {
    self
      .required_roles
      .iter()
      .filter(|(_, required)| **required)
      .map(|(role, _)| *role)
      .collect()
  }

  pub fn requires(&self, role: RoleId) -> bool {
    self.required_roles.get(&role).copied().unwrap_or(false)
  }
}

/// An incoming task: its text and the classification derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
  pub text: String,
  pub classification: Classification,
}

/// Keyword and heuristic task classifier.
#[derive(Debug, Clone, Default)]
pub struct TaskClassifier {
  settings: ClassifierSettings,
}

impl TaskClassifier {
  pub fn new(settings: ClassifierSettings) -> Self {
    Self { settings }
  }

  pub fn settings(&self) -> &ClassifierSettings {
    &self.settings
  }

  /// Classify a task, using the default core role set.
  pub fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
    let (tier, domain_tags, score) = self.score(text)?;

    let required_roles = RoleId::ALL
      .iter()
      .map(|role| {
        let required = match role {
          RoleId::SpecCoordination => tier == ComplexityTier::Complex,
          _ => RoleId::CORE.contains(role),
        };
        (*role, required)
      })
      .collect();

    Ok(Classification {
      complexity_tier: tier,
      domain_tags,
      required_roles,
      score,
    })
  }

  /// Classify a task when the caller supplied an explicit role list.
  ///
  /// Every explicit role stays required. The only role ever added is
  /// `spec-coordination`, for complex tasks that span more than one role.
  pub fn classify_with_roles(
    &self,
    text: &str,
    explicit: &[RoleId],
  ) -> Result<Classification, ClassifyError> {
    let (tier, domain_tags, score) = self.score(text)?;
    let explicit: BTreeSet<RoleId> = explicit.iter().copied().collect();

    let add_coordination = tier == ComplexityTier::Complex && explicit.len() > 1;
    let required_roles = RoleId::ALL
      .iter()
      .map(|role| {
        let required = explicit.contains(role)
          || (*role == RoleId::SpecCoordination && add_coordination);
        (*role, required)
      })
      .collect();

    Ok(Classification {
      complexity_tier: tier,
      domain_tags,
      required_roles,
      score,
    })
  }

  /// Build a task descriptor, honoring an explicit role list when given.
  pub fn describe(
    &self,
    text: &str,
    explicit: Option<&[RoleId]>,
  ) -> Result<TaskDescriptor, ClassifyError> {
    let classification = match explicit {
      Some(roles) => self.classify_with_roles(text, roles)?,
      None => self.classify(text)?,
    };

    Ok(TaskDescriptor {
      text: text.to_string(),
      classification,
    })
  }

  /// Compute tier, domain tags and raw score.
  fn score(&self, text: &str) -> Result<(ComplexityTier, BTreeSet<String>, u32), ClassifyError> {
    if text.trim().is_empty() {
      return Err(ClassifyError::InvalidInput(
        "task text must not be empty".to_string(),
      ));
    }

    let words = tokenize(text);

    let domain_tags: BTreeSet<String> = DOMAIN_KEYWORDS
      .iter()
      .filter(|(_, keywords)| words.iter().any(|w| keywords.contains(&w.as_str())))
      .map(|(tag, _)| tag.to_string())
      .collect();

    let technical_terms: BTreeSet<&str> = words
      .iter()
      .map(String::as_str)
      .filter(|w| is_technical_term(w))
      .collect();

    let separators = text.chars().filter(|c| matches!(c, ',' | ';')).count();
    let connectives = words
      .iter()
      .filter(|w| CLAUSE_CONNECTIVES.contains(&w.as_str()))
      .count();
    let extra_clauses = (separators + connectives) as u32;

    let score = 2 * technical_terms.len() as u32
      + 2 * domain_tags.len() as u32
      + words.len() as u32 / 10
      + extra_clauses;

    let tier = if score < self.settings.medium_threshold {
      ComplexityTier::Simple
    } else if score < self.settings.complex_threshold {
      ComplexityTier::Medium
    } else {
      ComplexityTier::Complex
    };

    debug!(
      score,
      tier = %tier,
      domains = ?domain_tags,
      technical_terms = technical_terms.len(),
      "task_classified"
    );

    Ok((tier, domain_tags, score))
  }
}

/// Lowercase words with punctuation stripped.
fn tokenize(text: &str) -> Vec<String> {
  text
    .split(|c: char| !c.is_alphanumeric())
    .filter(|w| !w.is_empty())
    .map(|w| w.to_lowercase())
    .collect()
}
