//! Emission source model
//!
//! An emission source is an already-priced leaf fact: its `value` in kgCO2e
//! was resolved by the caller (activity data × emission factor). The engine
//! only rolls these up.

use crate::quality::QualityRatings;
use crate::taxonomy::SubPost;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emission source identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmissionSourceId(pub Uuid);

impl EmissionSourceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EmissionSourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EmissionSourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Single recorded activity-to-emissions fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionSource {
    pub id: EmissionSourceId,
    pub sub_post: SubPost,

    /// kgCO2e; `None` until computed
    #[serde(default)]
    pub value: Option<f64>,

    #[serde(default)]
    pub validated: bool,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Ratings recorded on the source itself
    #[serde(default)]
    pub quality: QualityRatings,

    /// Ratings of the referenced emission factor (per-dimension fallback)
    #[serde(default)]
    pub factor_quality: Option<QualityRatings>,

    /// Study site the source was recorded for
    #[serde(default)]
    pub site: Option<String>,

    /// Question of a composite SubPost this source answers
    #[serde(default)]
    pub input: Option<String>,
}

impl EmissionSource {
    /// Unvalidated, unrated source with a fresh identifier
    pub fn new(sub_post: SubPost, value: Option<f64>) -> Self {
        Self {
            id: EmissionSourceId::new(),
            sub_post,
            value,
            validated: false,
            tags: Vec::new(),
            quality: QualityRatings::default(),
            factor_quality: None,
            site: None,
            input: None,
        }
    }

    pub fn validated(mut self, validated: bool) -> Self {
        self.validated = validated;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_quality(mut self, quality: QualityRatings) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_factor_quality(mut self, quality: QualityRatings) -> Self {
        self.factor_quality = Some(quality);
        self
    }

    pub fn at_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    pub fn answering(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Value used for summation
    ///
    /// Missing, non-finite and negative values all count as 0 ("not yet
    /// computed"); an emission is never negative.
    pub fn contribution(&self) -> f64 {
        match self.value {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => 0.0,
        }
    }

    /// Whether the source carries a computed value (0 included)
    ///
    /// Negative values stand for "not yet computed", like missing ones.
    pub fn is_answered(&self) -> bool {
        matches!(self.value, Some(v) if v.is_finite() && v >= 0.0)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Study site selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudySite {
    #[default]
    All,
    Site(String),
}

impl StudySite {
    pub fn includes(&self, source: &EmissionSource) -> bool {
        match self {
            StudySite::All => true,
            StudySite::Site(site) => source.site.as_deref() == Some(site.as_str()),
        }
    }
}
