//! Result tree
//!
//! `Total` → Post → SubPost → one leaf per emission source. Every branch
//! node's value, counts and uncertainty are derived from its children when
//! the node is built, so the sum and count invariants hold by construction.

mod aggregation;
mod filter;

pub use aggregation::{compute_results_by_post, AggregationOptions};
pub use filter::{filter_results, LeafFilter};

use crate::dependency::Exclusion;
use crate::emission::{EmissionSource, EmissionSourceId};
use crate::taxonomy::{Post, SubPost};
use crate::uncertainty::{self, ConfidenceInterval};
use serde::{Deserialize, Serialize};

/// What a result node aggregates
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultCategory {
    Total,
    Post(Post),
    SubPost(SubPost),
    EmissionSource(EmissionSourceId),
}

/// Leaf-only details of the emission source behind a leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDetails {
    pub sub_post: SubPost,
    /// Value as recorded, before coercion and exclusion
    pub raw_value: Option<f64>,
    pub validated: bool,
    pub tags: Vec<String>,
    pub input: Option<String>,
}

/// Computed aggregate, in kgCO2e
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultNode {
    pub category: ResultCategory,
    pub label: String,
    pub value: f64,
    pub children: Vec<ResultNode>,
    pub number_of_emission_source: usize,
    pub number_of_validated_emission_source: usize,

    /// Combined standard deviation factor; omitted when any contributing
    /// leaf has no computable uncertainty
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub uncertainty: Option<f64>,

    /// Set when the dependency filter zeroed this SubPost (and its leaves)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub exclusion: Option<Exclusion>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<SourceDetails>,
}

impl ResultNode {
    fn leaf(source: &EmissionSource, exclusion: Option<Exclusion>) -> Self {
        let value = if exclusion.is_some() { 0.0 } else { source.contribution() };
        Self {
            category: ResultCategory::EmissionSource(source.id),
            label: source.input.clone().unwrap_or_else(|| source.id.to_string()),
            value,
            children: Vec::new(),
            number_of_emission_source: 1,
            number_of_validated_emission_source: usize::from(source.validated),
            uncertainty: uncertainty::source_uncertainty(source),
            exclusion,
            source: Some(SourceDetails {
                sub_post: source.sub_post,
                raw_value: source.value,
                validated: source.validated,
                tags: source.tags.clone(),
                input: source.input.clone(),
            }),
        }
    }

    /// Branch whose value, counts and uncertainty come from `children`
    fn branch(
        category: ResultCategory,
        label: impl Into<String>,
        children: Vec<ResultNode>,
        exclusion: Option<Exclusion>,
    ) -> Self {
        // fold from +0.0: an empty f64 sum is -0.0
        let value = children.iter().fold(0.0, |acc, c| acc + c.value);
        let number_of_emission_source = children.iter().map(|c| c.number_of_emission_source).sum();
        let number_of_validated_emission_source =
            children.iter().map(|c| c.number_of_validated_emission_source).sum();
        let uncertainty = combined_uncertainty(&children);

        Self {
            category,
            label: label.into(),
            value,
            children,
            number_of_emission_source,
            number_of_validated_emission_source,
            uncertainty,
            exclusion,
            source: None,
        }
    }

    /// Emission source leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self.category, ResultCategory::EmissionSource(_))
    }

    /// Whether any emission source beneath actually contributes its value
    pub fn contributes(&self) -> bool {
        if self.is_leaf() {
            self.exclusion.is_none()
        } else {
            self.children.iter().any(ResultNode::contributes)
        }
    }

    /// 1–5 quality rating of this node's uncertainty
    pub fn quality_rating(&self) -> Option<u8> {
        self.uncertainty.map(uncertainty::rating)
    }

    /// 95% confidence interval of this node's value
    pub fn confidence_interval(&self) -> Option<ConfidenceInterval> {
        self.uncertainty
            .map(|sd| uncertainty::confidence_interval(self.value, sd))
    }

    /// First node (depth-first) with `category`
    pub fn find(&self, category: &ResultCategory) -> Option<&ResultNode> {
        if &self.category == category {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(category))
    }

    /// Emission source leaves beneath this node, in tree order
    pub fn leaves(&self) -> Vec<&ResultNode> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a ResultNode>) {
        if self.is_leaf() {
            leaves.push(self);
        }
        for child in &self.children {
            child.collect_leaves(leaves);
        }
    }

    /// Depth-first flattening for tabular presentation
    pub fn rows(&self) -> Vec<ResultRow> {
        let mut rows = Vec::new();
        self.collect_rows(0, &mut rows);
        rows
    }

    fn collect_rows(&self, depth: usize, rows: &mut Vec<ResultRow>) {
        rows.push(ResultRow {
            depth,
            category: self.category.clone(),
            label: self.label.clone(),
            value: self.value,
            uncertainty: self.uncertainty,
            number_of_emission_source: self.number_of_emission_source,
            number_of_validated_emission_source: self.number_of_validated_emission_source,
            excluded: self.exclusion.is_some(),
        });
        for child in &self.children {
            child.collect_rows(depth + 1, rows);
        }
    }
}

/// One line of a flattened result tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub depth: usize,
    pub category: ResultCategory,
    pub label: String,
    pub value: f64,
    pub uncertainty: Option<f64>,
    pub number_of_emission_source: usize,
    pub number_of_validated_emission_source: usize,
    pub excluded: bool,
}

/// Uncertainty of the sum of `children`
///
/// Only contributing children take part. Omitted when nothing contributes or
/// when a contributing child has no uncertainty of its own.
fn combined_uncertainty(children: &[ResultNode]) -> Option<f64> {
    let contributing: Vec<(f64, f64)> = children
        .iter()
        .filter(|c| c.contributes())
        .map(|c| c.uncertainty.map(|sd| (c.value, sd)))
        .collect::<Option<_>>()?;
    uncertainty::combine_standard_deviations(&contributing)
}
