//! Learning supports and struggle-keyword detection.

use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// Support types
// ============================================================================

/// The kind of help a learning support offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportType {
    /// Breaking a problem into smaller pieces.
    Decomposition,
    /// Asking-for-help scripts and strategies.
    HelpSeeking,
    /// Re-reading and re-stating strategies for lost understanding.
    Comprehension,
    /// Persistence and frustration-management strategies.
    Perseverance,
}

/// Phrases in entry text that signal struggle, with the kind of
/// support each one calls for.
pub const STRUGGLE_KEYWORDS: &[(&str, SupportType)] = &[
    ("confused", SupportType::Comprehension),
    ("don't get", SupportType::Comprehension),
    ("don't understand", SupportType::Comprehension),
    ("lost", SupportType::Comprehension),
    ("stuck", SupportType::Decomposition),
    ("too hard", SupportType::Decomposition),
    ("help", SupportType::HelpSeeking),
    ("give up", SupportType::Perseverance),
    ("can't do", SupportType::Perseverance),
    ("frustrating", SupportType::Perseverance),
];

/// The first struggle keyword found in the text, case-insensitive.
pub fn matched_struggle_keyword(text: &str) -> Option<(&'static str, SupportType)> {
    let lowered = text.to_lowercase();
    STRUGGLE_KEYWORDS
        .iter()
        .find(|(kw, _)| lowered.contains(kw))
        .copied()
}

// ============================================================================
// Supports
// ============================================================================

/// A concrete piece of help offered when an entry signals struggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningSupport {
    pub id: String,
    pub title: String,
    pub support_type: SupportType,
    /// The main strategy, written for the child.
    pub content: String,
    /// Description of an optional visual aid.
    pub visual_aid: Option<String>,
    /// A worked example of the strategy.
    pub example: Option<String>,
    /// A short activity to try the strategy out.
    pub practice_activity: Option<String>,
}

impl LearningSupport {
    fn new(id: &str, title: &str, support_type: SupportType, content: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            support_type,
            content: content.to_string(),
            visual_aid: None,
            example: None,
            practice_activity: None,
        }
    }

    fn with_example(mut self, example: &str) -> Self {
        self.example = Some(example.to_string());
        self
    }

    fn with_visual_aid(mut self, visual_aid: &str) -> Self {
        self.visual_aid = Some(visual_aid.to_string());
        self
    }

    fn with_practice_activity(mut self, activity: &str) -> Self {
        self.practice_activity = Some(activity.to_string());
        self
    }
}

lazy_static! {
    /// Built-in support catalog.
    pub static ref SUPPORT_CATALOG: Vec<LearningSupport> = vec![
        LearningSupport::new(
            "decomp-chunk-it",
            "Chunk It Down",
            SupportType::Decomposition,
            "When a problem feels too big, split it into the smallest piece you can actually do, and start there.",
        )
        .with_example(
            "A big book report becomes: pick the book, read one chapter, write one sentence about it.",
        )
        .with_practice_activity(
            "Take one thing that feels stuck right now and write down its three smallest pieces.",
        ),
        LearningSupport::new(
            "decomp-first-step",
            "Just the First Step",
            SupportType::Decomposition,
            "You don't have to see the whole path. Find only the very first step and take it.",
        )
        .with_visual_aid("A staircase where only the bottom step is lit."),
        LearningSupport::new(
            "help-ask-well",
            "Asking Good Questions",
            SupportType::HelpSeeking,
            "Asking for help works best when you say what you tried first. Try: 'I tried X, and I got stuck at Y.'",
        )
        .with_example("Instead of 'I can't do this', try 'I multiplied both sides but now I don't know what to do with the 3.'"),
        LearningSupport::new(
            "comp-say-it-back",
            "Say It Back",
            SupportType::Comprehension,
            "When something is confusing, read it again slowly and then say it back in your own words, even if your words feel too simple.",
        )
        .with_practice_activity(
            "Pick the most confusing sentence from today and rewrite it the way you would say it to a friend.",
        ),
        LearningSupport::new(
            "comp-find-the-edge",
            "Find the Edge",
            SupportType::Comprehension,
            "Feeling lost usually means there is one exact spot where things stopped making sense. Go back and find that spot.",
        )
        .with_example("'I understood the example with apples, but lost it when letters replaced the numbers.'"),
        LearningSupport::new(
            "persist-not-yet",
            "The Power of Yet",
            SupportType::Perseverance,
            "'I can't do this' usually means 'I can't do this yet.' Hard things shrink every time you come back to them.",
        )
        .with_practice_activity(
            "Write down one thing you couldn't do a year ago that feels easy now.",
        ),
    ];
}

/// Pick a support matching the detected struggle type, falling back to
/// any catalog entry when no type-specific one exists.
pub fn select_support_with_rng<R: Rng>(
    support_type: SupportType,
    rng: &mut R,
) -> Option<LearningSupport> {
    let matching: Vec<&LearningSupport> = SUPPORT_CATALOG
        .iter()
        .filter(|s| s.support_type == support_type)
        .collect();
    if let Some(choice) = matching.choose(rng) {
        return Some((*choice).clone());
    }
    SUPPORT_CATALOG.choose(rng).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_keyword_detection_case_insensitive() {
        let m = matched_struggle_keyword("I was SO CONFUSED by fractions").unwrap();
        assert_eq!(m.0, "confused");
        assert_eq!(m.1, SupportType::Comprehension);
    }

    #[test]
    fn test_keyword_detection_none() {
        assert!(matched_struggle_keyword("Today was a great day").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        // "confused" precedes "stuck" in the table.
        let m = matched_struggle_keyword("stuck and confused").unwrap();
        assert_eq!(m.0, "confused");
    }

    #[test]
    fn test_selection_matches_type() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let s = select_support_with_rng(SupportType::Decomposition, &mut rng).unwrap();
            assert_eq!(s.support_type, SupportType::Decomposition);
        }
    }
}
