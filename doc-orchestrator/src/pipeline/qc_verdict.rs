//! Parser for the reviewer's textual verdict.
//!
//! The reviewer is asked to answer in this layout:
//!
//! ```text
//! APPROVED: yes/no
//! ISSUES:
//! - [list specific issues]
//! FEEDBACK:
//! [detailed feedback]
//! ```
//!
//! Models do not always follow it, so every rule has a fallback:
//! - approval defaults to "not approved" when no marker matches
//! - a missing `ISSUES:` block yields no issues
//! - a rejection without a `FEEDBACK:` block uses the whole response as feedback

use serde::{Deserialize, Serialize};

use crate::pipeline::types::QcFeedback;

const APPROVED_MARKER: &str = "approved:";
const ISSUES_MARKER: &str = "ISSUES:";
const FEEDBACK_MARKER: &str = "FEEDBACK:";

/// How the approval marker is recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMatch {
    /// `approved: yes` anywhere in the response, ignoring case
    #[default]
    Substring,
    /// A line that starts with `APPROVED:` followed by `yes`, ignoring case
    /// and leading markdown emphasis
    LineAnchored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QcVerdictParser {
    approval: ApprovalMatch,
}

impl QcVerdictParser {
    pub fn new(approval: ApprovalMatch) -> Self {
        Self { approval }
    }

    pub fn approval_match(&self) -> ApprovalMatch {
        self.approval
    }

    /// Turn a raw reviewer response into a verdict.
    pub fn parse(&self, response: &str) -> QcFeedback {
        let approved = self.is_approved(response);
        let issues = parse_issues(response);

        let feedback = if approved {
            None
        } else {
            Some(
                feedback_section(response)
                    .filter(|text| !text.is_empty())
                    .unwrap_or(response)
                    .to_string(),
            )
        };

        QcFeedback {
            approved,
            feedback,
            issues,
            forced_approval: false,
        }
    }

    fn is_approved(&self, response: &str) -> bool {
        match self.approval {
            ApprovalMatch::Substring => response.to_lowercase().contains("approved: yes"),
            ApprovalMatch::LineAnchored => response.lines().any(|line| {
                let line = line
                    .trim()
                    .trim_start_matches(|c: char| c == '*' || c == '#' || c == '_')
                    .to_lowercase();
                line.strip_prefix(APPROVED_MARKER)
                    .map(|rest| {
                        rest.trim_start_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
                            .starts_with("yes")
                    })
                    .unwrap_or(false)
            }),
        }
    }
}

/// Text after the first `FEEDBACK:` marker, trimmed
fn feedback_section(response: &str) -> Option<&str> {
    response
        .split_once(FEEDBACK_MARKER)
        .map(|(_, rest)| rest.trim())
}

/// Bullet lines between `ISSUES:` and `FEEDBACK:`
fn parse_issues(response: &str) -> Vec<String> {
    let Some((_, after)) = response.split_once(ISSUES_MARKER) else {
        return Vec::new();
    };
    let section = after
        .split_once(FEEDBACK_MARKER)
        .map(|(issues, _)| issues)
        .unwrap_or(after);

    section
        .lines()
        .map(|line| line.trim().trim_start_matches(|c: char| c == '-' || c == ' '))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
