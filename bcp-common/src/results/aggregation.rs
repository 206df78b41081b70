//! Aggregation of emission sources into the result tree

use super::{ResultCategory, ResultNode};
use crate::dependency::{AnsweredInputs, CompositeRules, DependencyFilter, Inclusion};
use crate::emission::{EmissionSource, StudySite};
use crate::error::{Error, Result};
use crate::taxonomy::{taxonomy, Environment, SubPost};
use std::collections::HashMap;
use tracing::{debug, info};

/// Policy switches of one aggregation call
#[derive(Debug, Clone)]
pub struct AggregationOptions {
    pub environment: Environment,
    pub study_site: StudySite,
    /// Count dependency-only SubPosts ("with dependency" totals)
    pub include_dependencies: bool,
    /// Discard sources not marked validated
    pub validated_only: bool,
    /// Composite rules; `None` uses the builtin table
    pub composite_rules: Option<CompositeRules>,
}

impl AggregationOptions {
    /// All sites, with dependencies, validated or not, builtin rules
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            study_site: StudySite::All,
            include_dependencies: true,
            validated_only: false,
            composite_rules: None,
        }
    }

    pub fn study_site(mut self, study_site: StudySite) -> Self {
        self.study_site = study_site;
        self
    }

    pub fn include_dependencies(mut self, include_dependencies: bool) -> Self {
        self.include_dependencies = include_dependencies;
        self
    }

    pub fn validated_only(mut self, validated_only: bool) -> Self {
        self.validated_only = validated_only;
        self
    }

    pub fn composite_rules(mut self, rules: CompositeRules) -> Self {
        self.composite_rules = Some(rules);
        self
    }

    pub fn rules(&self) -> &CompositeRules {
        self.composite_rules
            .as_ref()
            .unwrap_or_else(|| CompositeRules::builtin())
    }
}

/// Roll emission sources up into a `Total` → Post → SubPost → source tree
///
/// # Algorithm
/// 1. Keep sources of the selected study site (and validated ones only, if asked)
/// 2. Resolve every source's Post through the environment taxonomy
/// 3. Group by SubPost and run the dependency filter on each group; an
///    excluded group keeps its leaves at value 0 so its count stays visible
/// 4. Build SubPost, Post and Total nodes; values, counts and uncertainty
///    come from children
///
/// Every post the environment exposes appears, in display order, with every
/// SubPost mapped to it, even when nothing was recorded there.
///
/// # Errors
/// `Error::UnknownSubPost` when a retained source's SubPost is not part of
/// the environment. Nothing is silently dropped.
pub fn compute_results_by_post(sources: &[EmissionSource], options: &AggregationOptions) -> Result<ResultNode> {
    let taxonomy = taxonomy(options.environment);

    let retained: Vec<&EmissionSource> = sources
        .iter()
        .filter(|s| options.study_site.includes(s))
        .filter(|s| !options.validated_only || s.validated)
        .collect();

    let mut by_sub_post: HashMap<SubPost, Vec<&EmissionSource>> = HashMap::new();
    for source in retained.iter().copied() {
        taxonomy.post(source.sub_post)?;
        by_sub_post.entry(source.sub_post).or_default().push(source);
    }

    let answered = AnsweredInputs::from_sources(retained.iter().copied());
    let filter = DependencyFilter::new(options.rules(), options.include_dependencies);

    let posts: Vec<ResultNode> = taxonomy
        .posts()
        .iter()
        .map(|post| {
            let sub_posts = taxonomy
                .sub_posts(*post)
                .into_iter()
                .map(|sub_post| {
                    let group = by_sub_post.get(&sub_post).map(Vec::as_slice).unwrap_or(&[]);
                    sub_post_node(sub_post, group, &filter, &answered)
                })
                .collect();
            ResultNode::branch(ResultCategory::Post(*post), post.display_name(), sub_posts, None)
        })
        .collect();

    let total = ResultNode::branch(ResultCategory::Total, "Total", posts, None);

    if total.number_of_emission_source != retained.len() {
        return Err(Error::Config(format!(
            "{} taxonomy maps SubPosts to posts it does not expose ({} of {} sources placed)",
            options.environment,
            total.number_of_emission_source,
            retained.len()
        )));
    }

    info!(
        "Aggregated {} of {} emission sources for {}: {:.3} kgCO2e",
        retained.len(),
        sources.len(),
        options.environment,
        total.value
    );

    Ok(total)
}

fn sub_post_node(
    sub_post: SubPost,
    group: &[&EmissionSource],
    filter: &DependencyFilter<'_>,
    answered: &AnsweredInputs,
) -> ResultNode {
    if group.is_empty() {
        return ResultNode::branch(ResultCategory::SubPost(sub_post), sub_post.display_name(), Vec::new(), None);
    }

    let exclusion = match filter.evaluate(sub_post, answered) {
        Inclusion::Included => None,
        Inclusion::Excluded(exclusion) => {
            debug!(
                "{:?} excluded ({} sources counted at 0): {:?}",
                sub_post,
                group.len(),
                exclusion
            );
            Some(exclusion)
        }
    };

    let leaves = group
        .iter()
        .map(|source| ResultNode::leaf(source, exclusion.clone()))
        .collect();

    ResultNode::branch(ResultCategory::SubPost(sub_post), sub_post.display_name(), leaves, exclusion)
}
