//! The ordered narrative text shown in a session.

use serde::{Deserialize, Serialize};

/// Every line of narrative emitted since the session started or was last
/// reloaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines, oldest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no text has been shown.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Replace the whole transcript.
    pub fn replace(&mut self, lines: Vec<String>) {
        self.lines = lines;
    }

    /// Append lines after the existing ones.
    pub fn extend(&mut self, lines: Vec<String>) {
        self.lines.extend(lines);
    }

    /// Export as markdown, one paragraph per line.
    pub fn export_markdown(&self, title: &str) -> String {
        let mut out = format!("# {title}\n\n");
        for line in &self.lines {
            out.push_str(line);
            out.push_str("\n\n");
        }
        out
    }

    /// Export as plain text, one line per line.
    pub fn export_text(&self) -> String {
        self.lines.join("\n")
    }
}
