//! JSON input documents: a sequence, a trace tree and optional settings.

use featview_core::{PartialSettings, Result, Sequence, Trace, TraceModel, ViewerError};
use serde::Deserialize;
use std::path::Path;

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    /// Residues as a string or list, or a bare length
    #[serde(default)]
    pub sequence: Option<Sequence>,
    #[serde(default)]
    pub traces: Vec<Trace>,
    #[serde(default)]
    pub settings: PartialSettings,
}

impl Document {
    pub fn from_json(text: &str) -> Result<Self> {
        let document: Document = serde_json::from_str(text)?;
        if document.sequence.is_none() && document.traces.is_empty() {
            return Err(ViewerError::invalid_document("document has neither a sequence nor traces"));
        }
        Ok(document)
    }

    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Err(CliError::file_not_found(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let document = Self::from_json(&text)?;
        log::info!(
            "Loaded {} root traces from {}",
            document.traces.len(),
            path.display()
        );
        Ok(document)
    }

    /// The document's sequence, or a bare length covering every feature
    /// when none was given.
    pub fn sequence_or_extent(&self) -> Sequence {
        if let Some(sequence) = &self.sequence {
            return sequence.clone();
        }
        let model = TraceModel::from_traces(self.traces.clone());
        let extent = model
            .features()
            .map(|(_, feature)| feature.span().end - 0.5)
            .fold(0.0_f64, f64::max);
        Sequence::from_length(extent.max(0.0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let document = Document::from_json(
            r#"{
                "sequence": "MKTAYIAK",
                "traces": [{"label": "domains", "features": [{"type": "locus", "start": 2, "end": 4}]}],
                "settings": {"line-height": 40}
            }"#,
        )
        .unwrap();
        assert_eq!(document.sequence_or_extent().len(), 8);
        assert_eq!(document.traces[0].features.len(), 1);
        assert_eq!(document.settings.line_height, Some(40.0));
    }

    #[test]
    fn test_extent_without_sequence() {
        let document = Document::from_json(
            r#"{"traces": [{"label": "a", "features": [
                {"type": "pin", "position": 12},
                {"type": "continuous", "values": [1, 2, 3]}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(document.sequence_or_extent().len(), 12);
        assert!(!document.sequence_or_extent().has_residues());
    }

    #[test]
    fn test_empty_document_is_invalid() {
        let err = Document::from_json("{}").unwrap_err();
        assert!(matches!(err, ViewerError::InvalidDocument { .. }));
        let err = Document::from_json("{\"traces\": 3}").unwrap_err();
        assert!(matches!(err, ViewerError::Json(_)));
    }
}
