use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;
use wildtrack_shared::parser;
use wildtrack_shared::timeline::Timeline;
use wildtrack_shared::utm::UtmZone;

/// What the tracks file served under `/data` contains.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub file: String,
    pub points: usize,
    pub individuals: usize,
    pub rejected: usize,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
}

impl DatasetSummary {
    pub fn empty(file: &str) -> Self {
        Self {
            file: file.to_string(),
            points: 0,
            individuals: 0,
            rejected: 0,
            first: None,
            last: None,
        }
    }

    /// Parse the tracks file once so bad exports show up in the server log.
    pub fn load(path: &Path, zone: UtmZone) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let parsed = parser::parse_tracks(&text, zone)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

        let individuals = parsed
            .points
            .iter()
            .map(|p| p.tag_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let timeline = Timeline::new(parsed.points.iter().map(|p| p.timestamp).collect());
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let summary = Self {
            file,
            points: parsed.points.len(),
            individuals,
            rejected: parsed.rejected.len(),
            first: timeline.first(),
            last: timeline.last(),
        };
        tracing::info!(
            file = %summary.file,
            points = summary.points,
            individuals = summary.individuals,
            rejected = summary.rejected,
            "Loaded tracking dataset"
        );
        Ok(summary)
    }
}
