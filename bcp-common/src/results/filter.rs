//! Re-aggregating filters over a built result tree
//!
//! Filtering is not masking: rejected leaves are removed and every ancestor
//! is rebuilt from its retained children, so the filtered tree satisfies the
//! same sum and count invariants as the unfiltered one.

use super::{ResultCategory, ResultNode, SourceDetails};
use crate::dependency::is_dependency_only;
use crate::emission::EmissionSourceId;
use std::collections::HashSet;

/// Predicate over emission source leaves
#[derive(Debug, Clone, PartialEq)]
pub enum LeafFilter {
    /// Keep validated sources only
    ValidatedOnly,
    /// Keep sources carrying at least one of the tags
    WithTags(Vec<String>),
    /// Drop sources carrying any of the tags
    WithoutTags(Vec<String>),
    /// Keep only the listed sources
    AllowList(HashSet<EmissionSourceId>),
    /// Drop sources of dependency-only SubPosts
    WithoutDependencies,
}

impl LeafFilter {
    pub fn matches(&self, id: EmissionSourceId, details: &SourceDetails) -> bool {
        match self {
            LeafFilter::ValidatedOnly => details.validated,
            LeafFilter::WithTags(tags) => details.tags.iter().any(|t| tags.contains(t)),
            LeafFilter::WithoutTags(tags) => !details.tags.iter().any(|t| tags.contains(t)),
            LeafFilter::AllowList(ids) => ids.contains(&id),
            LeafFilter::WithoutDependencies => !is_dependency_only(details.sub_post),
        }
    }
}

/// Narrow `tree` to the leaves passing every filter and re-aggregate
///
/// SubPost and Post nodes left without children are dropped; the `Total`
/// node is always kept.
pub fn filter_results(tree: &ResultNode, filters: &[LeafFilter]) -> ResultNode {
    match rebuild(tree, filters) {
        Some(node) => node,
        None => ResultNode::branch(tree.category.clone(), tree.label.clone(), Vec::new(), tree.exclusion.clone()),
    }
}

fn rebuild(node: &ResultNode, filters: &[LeafFilter]) -> Option<ResultNode> {
    if let ResultCategory::EmissionSource(id) = node.category {
        let details = node.source.as_ref()?;
        return filters
            .iter()
            .all(|f| f.matches(id, details))
            .then(|| node.clone());
    }

    let children: Vec<ResultNode> = node.children.iter().filter_map(|c| rebuild(c, filters)).collect();
    if children.is_empty() && node.category != ResultCategory::Total {
        return None;
    }

    Some(ResultNode::branch(
        node.category.clone(),
        node.label.clone(),
        children,
        node.exclusion.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emission::EmissionSource;
    use crate::results::{compute_results_by_post, AggregationOptions};
    use crate::taxonomy::{Environment, Post, SubPost};

    fn situation() -> Vec<EmissionSource> {
        vec![
            EmissionSource::new(SubPost::Posters, Some(40.0)).validated(true).with_tag("print"),
            EmissionSource::new(SubPost::Posters, Some(60.0)).with_tag("festival"),
            EmissionSource::new(SubPost::Concessions, Some(25.0)).validated(true),
        ]
    }

    fn tree(sources: &[EmissionSource]) -> ResultNode {
        compute_results_by_post(sources, &AggregationOptions::new(Environment::Cut)).unwrap()
    }

    #[test]
    fn test_validated_only() {
        let filtered = filter_results(&tree(&situation()), &[LeafFilter::ValidatedOnly]);
        assert_eq!(filtered.value, 65.0);
        assert_eq!(filtered.number_of_emission_source, 2);
        assert_eq!(filtered.number_of_validated_emission_source, 2);
    }

    #[test]
    fn test_with_and_without_tags() {
        let base = tree(&situation());

        let print = filter_results(&base, &[LeafFilter::WithTags(vec!["print".to_string()])]);
        assert_eq!(print.value, 40.0);
        assert_eq!(print.children.len(), 1);

        let no_festival = filter_results(&base, &[LeafFilter::WithoutTags(vec!["festival".to_string()])]);
        assert_eq!(no_festival.value, 65.0);
    }

    #[test]
    fn test_empty_posts_are_dropped() {
        let filtered = filter_results(&tree(&situation()), &[]);
        let posts: Vec<&ResultCategory> = filtered.children.iter().map(|c| &c.category).collect();
        assert_eq!(
            posts,
            vec![
                &ResultCategory::Post(Post::ConcessionsAndDrinks),
                &ResultCategory::Post(Post::TicketingAndCommunication)
            ]
        );
        assert_eq!(filtered.value, 125.0);
    }

    #[test]
    fn test_total_survives_when_everything_is_filtered() {
        let filtered = filter_results(&tree(&situation()), &[LeafFilter::AllowList(HashSet::new())]);
        assert_eq!(filtered.category, ResultCategory::Total);
        assert_eq!(filtered.value, 0.0);
        assert_eq!(filtered.number_of_emission_source, 0);
        assert!(filtered.children.is_empty());
    }

    #[test]
    fn test_without_dependencies() {
        let sources = vec![
            EmissionSource::new(SubPost::UseUnderDependency, Some(500.0)),
            EmissionSource::new(SubPost::Electricity, Some(100.0)),
        ];
        let base = compute_results_by_post(&sources, &AggregationOptions::new(Environment::BilanCarbone)).unwrap();
        let filtered = filter_results(&base, &[LeafFilter::WithoutDependencies]);
        assert_eq!(filtered.value, 100.0);
        assert!(filtered.find(&ResultCategory::Post(Post::UseAndDependency)).is_none());
    }

    #[test]
    fn test_filters_combine() {
        let filtered = filter_results(
            &tree(&situation()),
            &[LeafFilter::ValidatedOnly, LeafFilter::WithTags(vec!["print".to_string()])],
        );
        assert_eq!(filtered.value, 40.0);
        assert_eq!(filtered.number_of_emission_source, 1);
    }
}
