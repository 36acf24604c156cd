//! Annotation categories.

use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// Classification of an annotation. Only affects the icon and badge shown for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationCategory {
    Finding,
    Recommendation,
    #[default]
    Note,
    Question,
}

impl AnnotationCategory {
    /// Get the display name for this category.
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationCategory::Finding => "Finding",
            AnnotationCategory::Recommendation => "Recommendation",
            AnnotationCategory::Note => "Note",
            AnnotationCategory::Question => "Question",
        }
    }

    /// Icon identifier used by the host UI for markers and list entries.
    pub fn icon(&self) -> &'static str {
        match self {
            AnnotationCategory::Finding => "brain",
            AnnotationCategory::Recommendation => "message-square",
            AnnotationCategory::Note | AnnotationCategory::Question => "info",
        }
    }

    /// RGB badge color.
    pub fn color(&self) -> [u8; 3] {
        match self {
            AnnotationCategory::Finding => [37, 99, 235],
            AnnotationCategory::Recommendation => [22, 163, 74],
            AnnotationCategory::Note => [75, 85, 99],
            AnnotationCategory::Question => [217, 119, 6],
        }
    }

    /// Get all categories.
    pub fn all() -> &'static [AnnotationCategory] {
        &[
            AnnotationCategory::Finding,
            AnnotationCategory::Recommendation,
            AnnotationCategory::Note,
            AnnotationCategory::Question,
        ]
    }
}

impl std::str::FromStr for AnnotationCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "finding" => Ok(AnnotationCategory::Finding),
            "recommendation" => Ok(AnnotationCategory::Recommendation),
            "note" => Ok(AnnotationCategory::Note),
            "question" => Ok(AnnotationCategory::Question),
            _ => Err(ParseEnumError::new("annotation category", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!("Finding".parse(), Ok(AnnotationCategory::Finding));
        assert_eq!(" question ".parse(), Ok(AnnotationCategory::Question));
        assert!("diagnosis".parse::<AnnotationCategory>().is_err());
    }

    #[test]
    fn test_note_and_question_share_icon() {
        assert_eq!(AnnotationCategory::Note.icon(), AnnotationCategory::Question.icon());
        assert_ne!(AnnotationCategory::Finding.icon(), AnnotationCategory::Recommendation.icon());
    }
}
