//! Per-piece outcome listing handed to exporters.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of one requested piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PieceStatus {
    /// Every solid of the piece was produced.
    Ok,
    /// The piece failed; it contributes no solids.
    Failed,
}

impl PieceStatus {
    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PieceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManifestEntry {
    /// Piece name, e.g. `pauldron_right`.
    pub piece: String,
    /// Outcome.
    pub status: PieceStatus,
    /// Failure reason, for failed pieces.
    pub reason: Option<String>,
    /// Names of the solids produced for the piece, in output order.
    pub parts: Vec<String>,
}

impl ManifestEntry {
    /// A successful piece and its output solids.
    #[must_use]
    pub fn ok(piece: impl Into<String>, parts: Vec<String>) -> Self {
        Self {
            piece: piece.into(),
            status: PieceStatus::Ok,
            reason: None,
            parts,
        }
    }

    /// A failed piece.
    #[must_use]
    pub fn failed(piece: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            piece: piece.into(),
            status: PieceStatus::Failed,
            reason: Some(reason.into()),
            parts: Vec::new(),
        }
    }
}

/// Outcome of every requested piece, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Manifest {
    /// Color-scheme identifier from the request.
    pub color_scheme: String,
    /// One entry per requested piece.
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// An empty manifest.
    #[must_use]
    pub fn new(color_scheme: impl Into<String>) -> Self {
        Self {
            color_scheme: color_scheme.into(),
            entries: Vec::new(),
        }
    }

    /// Entry for a piece name.
    #[must_use]
    pub fn entry(&self, piece: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.piece == piece)
    }

    /// Number of pieces that succeeded.
    #[must_use]
    pub fn ok_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == PieceStatus::Ok)
            .count()
    }

    /// Entries of failed pieces.
    pub fn failures(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries
            .iter()
            .filter(|e| e.status == PieceStatus::Failed)
    }

    /// Whether every piece succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "color scheme: {}", self.color_scheme)?;
        for entry in &self.entries {
            match &entry.reason {
                Some(reason) => writeln!(f, "{} {} ({reason})", entry.piece, entry.status)?,
                None => writeln!(
                    f,
                    "{} {} [{}]",
                    entry.piece,
                    entry.status,
                    entry.parts.join(", ")
                )?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_lookup() {
        let mut manifest = Manifest::new("kholin_blue");
        manifest
            .entries
            .push(ManifestEntry::ok("helmet", vec!["helmet".to_string()]));
        manifest
            .entries
            .push(ManifestEntry::failed("cuirass", "wall thickness violation"));

        assert_eq!(manifest.ok_count(), 1);
        assert!(!manifest.is_complete());
        let failed: Vec<&str> = manifest.failures().map(|e| e.piece.as_str()).collect();
        assert_eq!(failed, ["cuirass"]);
        assert_eq!(
            manifest.entry("cuirass").unwrap().reason.as_deref(),
            Some("wall thickness violation")
        );
        assert!(manifest.entry("gorget").is_none());

        let text = manifest.to_string();
        assert!(text.starts_with("color scheme: kholin_blue"));
        assert!(text.contains("cuirass failed (wall thickness violation)"));
        assert!(text.contains("helmet ok [helmet]"));
    }
}
