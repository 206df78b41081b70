//! Situation snapshot
//!
//! The persistence layer hands the engine a flat snapshot of a study's
//! emission sources. Sources arrive already priced (value in kgCO2e).

use crate::emission::EmissionSource;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Emission sources of one study, in no particular order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Situation {
    #[serde(default)]
    pub sources: Vec<EmissionSource>,
}

impl Situation {
    pub fn new(sources: Vec<EmissionSource>) -> Self {
        Self { sources }
    }

    /// Decode a snapshot from JSON
    ///
    /// Accepts either `{"sources": [...]}` or a bare array of sources. The
    /// shape is picked from the first token so decode errors keep their
    /// position.
    pub fn from_json_str(json: &str) -> Result<Self> {
        if json.trim_start().starts_with('[') {
            let sources: Vec<EmissionSource> = serde_json::from_str(json)?;
            Ok(Situation::new(sources))
        } else {
            Ok(serde_json::from_str(json)?)
        }
    }

    /// Read and decode a snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let situation = Self::from_json_str(&json)?;
        info!("Loaded {} emission sources from {}", situation.sources.len(), path.display());
        Ok(situation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::taxonomy::SubPost;

    const SOURCE: &str = r#"{
        "id": "4d9d4c2a-7f7e-4f0a-8c7e-0b5d7b8f3a21",
        "subPost": "Newsletters",
        "value": 12.5,
        "validated": true,
        "tags": ["communication"],
        "quality": {"reliability": 4, "completeness": 2},
        "factorQuality": {"technical_representativeness": 3},
        "site": "lyon",
        "input": "recipient_count"
    }"#;

    #[test]
    fn test_wrapped_snapshot() {
        let situation = Situation::from_json_str(&format!(r#"{{"sources": [{}]}}"#, SOURCE)).unwrap();
        assert_eq!(situation.sources.len(), 1);
        let source = &situation.sources[0];
        assert_eq!(source.sub_post, SubPost::Newsletters);
        assert_eq!(source.quality.reliability, Some(4.0));
        assert_eq!(
            source.factor_quality.as_ref().unwrap().technical_representativeness,
            Some(3.0)
        );
        assert_eq!(source.input.as_deref(), Some("recipient_count"));
    }

    #[test]
    fn test_bare_array_snapshot() {
        let situation = Situation::from_json_str(&format!("[{}]", SOURCE)).unwrap();
        assert_eq!(situation.sources.len(), 1);
        assert!(situation.sources[0].validated);
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(Situation::from_json_str("{}").unwrap().sources.is_empty());
        assert!(Situation::from_json_str("[]").unwrap().sources.is_empty());
    }

    #[test]
    fn test_invalid_snapshot() {
        assert!(matches!(Situation::from_json_str("{\"sources\": 3}"), Err(Error::Json(_))));
        assert!(matches!(Situation::from_json_str("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_camel_case_ratings_are_kept() {
        let json = r#"[{
            "id": "4d9d4c2a-7f7e-4f0a-8c7e-0b5d7b8f3a22",
            "subPost": "Posters",
            "value": 40.0,
            "quality": {"technicalRepresentativeness": 1, "temporalRepresentativeness": 1}
        }]"#;
        let situation = Situation::from_json_str(json).unwrap();
        let source = &situation.sources[0];
        assert_eq!(source.quality.technical_representativeness, Some(1.0));
        assert!(crate::uncertainty::source_uncertainty(source).is_some());
        assert!(crate::uncertainty::standard_deviation(source) > 1.0);
    }

    #[test]
    fn test_unknown_quality_dimension_fails() {
        let json = r#"{"sources": [{
            "id": "4d9d4c2a-7f7e-4f0a-8c7e-0b5d7b8f3a23",
            "subPost": "Posters",
            "quality": {"precision": 2}
        }]}"#;
        match Situation::from_json_str(json) {
            Err(Error::Json(e)) => assert!(e.to_string().contains("Unknown quality dimension: precision"), "{}", e),
            other => panic!("expected JSON error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_rating_does_not_fail_load() {
        let json = r#"[{
            "id": "4d9d4c2a-7f7e-4f0a-8c7e-0b5d7b8f3a24",
            "subPost": "Posters",
            "value": 40.0,
            "quality": {"reliability": "high", "completeness": 2}
        }]"#;
        let source = &Situation::from_json_str(json).unwrap().sources[0];
        assert_eq!(source.quality.reliability, None);
        assert_eq!(source.quality.completeness, Some(2.0));
    }

    #[test]
    fn test_decode_error_keeps_location() {
        let err = Situation::from_json_str("{\"sources\": [{\"id\": 3}]}").unwrap_err();
        let message = err.to_string();
        assert!(!message.contains("did not match any variant"), "{}", message);
        assert!(message.contains("line 1"), "{}", message);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Situation::load(Path::new("/nonexistent/situation.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
