//! Composite-input dependency filtering
//!
//! Some SubPosts are composite questions: several inputs only make sense
//! together. A half-answered composite question must not leak a partial
//! emission total, so it is excluded (contributes 0) until every required
//! input and companion SubPost is answered.
//!
//! The required inputs per SubPost are policy data, kept in a declarative
//! `CompositeRules` table that configuration can override.
//!
//! Evaluation is per aggregation call; nothing is cached across calls.

use crate::emission::EmissionSource;
use crate::taxonomy::SubPost;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// SubPosts that only count in "with dependency" totals
///
/// Emissions attributable to third parties the organization does not control.
pub const DEPENDENCY_ONLY: &[SubPost] = &[SubPost::UseUnderDependency];

/// Whether `sub_post` is reported only in "with dependency" totals
pub fn is_dependency_only(sub_post: SubPost) -> bool {
    DEPENDENCY_ONLY.contains(&sub_post)
}

/// Whether `sub_post` participates given the dependency toggle
pub fn filter_with_dependencies(sub_post: SubPost, include_dependencies: bool) -> bool {
    include_dependencies || !is_dependency_only(sub_post)
}

/// Required companions of one composite SubPost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeRule {
    pub sub_post: SubPost,

    /// Input identifiers (see `EmissionSource::input`) that must all be answered
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Sibling SubPosts that must each have at least one answered source
    #[serde(default)]
    pub companions: Vec<SubPost>,
}

impl CompositeRule {
    pub fn new(sub_post: SubPost, inputs: &[&str], companions: &[SubPost]) -> Self {
        Self {
            sub_post,
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            companions: companions.to_vec(),
        }
    }
}

static BUILTIN_RULES: Lazy<CompositeRules> = Lazy::new(|| {
    CompositeRules::from_rules(vec![
        CompositeRule::new(SubPost::Newsletters, &["recipient_count", "issues_per_year"], &[]),
        CompositeRule::new(SubPost::OrdinaryWaste, &["bin_volume", "collection_frequency"], &[]),
        CompositeRule::new(SubPost::AudienceTravel, &["short_distance_share", "long_distance_share"], &[]),
        CompositeRule::new(SubPost::ProjectionEquipment, &["projector_count", "projector_lifetime"], &[]),
        CompositeRule::new(SubPost::TeamMeals, &["meals_per_day", "shooting_days"], &[]),
        CompositeRule::new(SubPost::Previews, &[], &[SubPost::Tours]),
    ])
});

/// Table of composite rules keyed by SubPost
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeRules {
    rules: BTreeMap<SubPost, CompositeRule>,
}

impl CompositeRules {
    /// Process-wide default table
    pub fn builtin() -> &'static CompositeRules {
        &BUILTIN_RULES
    }

    /// Table from explicit rules; a later rule for the same SubPost wins
    pub fn from_rules(rules: impl IntoIterator<Item = CompositeRule>) -> Self {
        Self {
            rules: rules.into_iter().map(|r| (r.sub_post, r)).collect(),
        }
    }

    /// Copy of this table with `overrides` replacing rules per SubPost
    ///
    /// A rule with no inputs and no companions turns the SubPost back into a
    /// plain (non-composite) one.
    pub fn merged_with(&self, overrides: impl IntoIterator<Item = CompositeRule>) -> Self {
        let mut rules = self.rules.clone();
        for rule in overrides {
            if rule.inputs.is_empty() && rule.companions.is_empty() {
                tracing::debug!("Composite rule for {:?} removed by override", rule.sub_post);
                rules.remove(&rule.sub_post);
            } else {
                tracing::debug!("Composite rule for {:?} overridden: {:?}", rule.sub_post, rule.inputs);
                rules.insert(rule.sub_post, rule);
            }
        }
        Self { rules }
    }

    pub fn rule(&self, sub_post: SubPost) -> Option<&CompositeRule> {
        self.rules.get(&sub_post)
    }

    pub fn is_composite(&self, sub_post: SubPost) -> bool {
        self.rules.contains_key(&sub_post)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompositeRule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Why a SubPost contributes 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum Exclusion {
    /// Dependency-only SubPost in a "without dependency" aggregation
    DependencyOnly,
    /// Composite inputs left unanswered
    MissingInputs { inputs: Vec<String> },
    /// Companion SubPosts left unanswered
    MissingCompanions { companions: Vec<SubPost> },
}

/// Outcome of evaluating one SubPost
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inclusion {
    Included,
    Excluded(Exclusion),
}

impl Inclusion {
    pub fn is_included(&self) -> bool {
        matches!(self, Inclusion::Included)
    }
}

/// Answered inputs of the situation being aggregated
///
/// A source counts as answered when it carries a finite, non-negative value
/// (0 included).
#[derive(Debug, Clone, Default)]
pub struct AnsweredInputs {
    inputs: HashSet<(SubPost, String)>,
    sub_posts: HashSet<SubPost>,
}

impl AnsweredInputs {
    pub fn from_sources<'a>(sources: impl IntoIterator<Item = &'a EmissionSource>) -> Self {
        let mut answered = Self::default();
        for source in sources.into_iter().filter(|s| s.is_answered()) {
            answered.sub_posts.insert(source.sub_post);
            if let Some(input) = &source.input {
                answered.inputs.insert((source.sub_post, input.clone()));
            }
        }
        answered
    }

    pub fn has_input(&self, sub_post: SubPost, input: &str) -> bool {
        self.inputs.contains(&(sub_post, input.to_string()))
    }

    pub fn has_sub_post(&self, sub_post: SubPost) -> bool {
        self.sub_posts.contains(&sub_post)
    }
}

/// Decides whether a SubPost contributes its value or is treated as unanswered
#[derive(Debug, Clone, Copy)]
pub struct DependencyFilter<'a> {
    rules: &'a CompositeRules,
    include_dependencies: bool,
}

impl<'a> DependencyFilter<'a> {
    pub fn new(rules: &'a CompositeRules, include_dependencies: bool) -> Self {
        Self {
            rules,
            include_dependencies,
        }
    }

    /// Evaluate `sub_post` against the answered inputs of the situation
    pub fn evaluate(&self, sub_post: SubPost, answered: &AnsweredInputs) -> Inclusion {
        if !filter_with_dependencies(sub_post, self.include_dependencies) {
            return Inclusion::Excluded(Exclusion::DependencyOnly);
        }

        let Some(rule) = self.rules.rule(sub_post) else {
            return Inclusion::Included;
        };

        let missing_inputs: Vec<String> = rule
            .inputs
            .iter()
            .filter(|input| !answered.has_input(sub_post, input))
            .cloned()
            .collect();
        if !missing_inputs.is_empty() {
            return Inclusion::Excluded(Exclusion::MissingInputs { inputs: missing_inputs });
        }

        let missing_companions: Vec<SubPost> = rule
            .companions
            .iter()
            .copied()
            .filter(|companion| !answered.has_sub_post(*companion))
            .collect();
        if !missing_companions.is_empty() {
            return Inclusion::Excluded(Exclusion::MissingCompanions {
                companions: missing_companions,
            });
        }

        Inclusion::Included
    }
}
