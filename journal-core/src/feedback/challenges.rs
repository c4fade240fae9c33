//! Metacognitive challenges and the tiered challenge catalog.

use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// ============================================================================
// Difficulty tiers
// ============================================================================

/// Challenge difficulty, keyed off how much feedback a child has received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChallengeDifficulty {
    Starter,
    Explorer,
    Practitioner,
    Expert,
    Master,
}

impl ChallengeDifficulty {
    /// Map a lifetime feedback count onto a difficulty tier.
    pub fn for_feedback_count(count: u32) -> Self {
        match count {
            0..=5 => ChallengeDifficulty::Starter,
            6..=15 => ChallengeDifficulty::Explorer,
            16..=30 => ChallengeDifficulty::Practitioner,
            31..=50 => ChallengeDifficulty::Expert,
            _ => ChallengeDifficulty::Master,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChallengeDifficulty::Starter => "Starter",
            ChallengeDifficulty::Explorer => "Explorer",
            ChallengeDifficulty::Practitioner => "Practitioner",
            ChallengeDifficulty::Expert => "Expert",
            ChallengeDifficulty::Master => "Master",
        }
    }
}

impl fmt::Display for ChallengeDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Target skills
// ============================================================================

/// The reflective skill a challenge exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetSkill {
    SelfAwareness,
    Planning,
    Monitoring,
    Evaluation,
    EmotionalRegulation,
}

impl TargetSkill {
    pub fn name(&self) -> &'static str {
        match self {
            TargetSkill::SelfAwareness => "Self-Awareness",
            TargetSkill::Planning => "Planning",
            TargetSkill::Monitoring => "Monitoring",
            TargetSkill::Evaluation => "Evaluation",
            TargetSkill::EmotionalRegulation => "Emotional Regulation",
        }
    }
}

// ============================================================================
// Challenges
// ============================================================================

/// A small reflective exercise attached to feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetacognitiveChallenge {
    /// Stable identifier, used to track completion.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Ordered steps to work through, possibly empty for one-shot
    /// challenges.
    #[serde(default)]
    pub steps: Vec<String>,
    pub difficulty: ChallengeDifficulty,
    pub target_skill: TargetSkill,
    pub estimated_time_minutes: u32,
    /// Question the child answers to mark the challenge done.
    pub completion_prompt: String,
}

impl MetacognitiveChallenge {
    fn new(
        id: &str,
        title: &str,
        description: &str,
        difficulty: ChallengeDifficulty,
        target_skill: TargetSkill,
        estimated_time_minutes: u32,
        completion_prompt: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            steps: Vec::new(),
            difficulty,
            target_skill,
            estimated_time_minutes,
            completion_prompt: completion_prompt.to_string(),
        }
    }

    fn with_steps(mut self, steps: &[&str]) -> Self {
        self.steps = steps.iter().map(|s| s.to_string()).collect();
        self
    }
}

lazy_static! {
    /// The built-in challenge catalog, a few entries per tier.
    pub static ref CHALLENGE_CATALOG: Vec<MetacognitiveChallenge> = vec![
        // Starter
        MetacognitiveChallenge::new(
            "starter-feeling-check",
            "Feeling Check",
            "Before your next journal entry, pause and name one feeling you have about today's work.",
            ChallengeDifficulty::Starter,
            TargetSkill::SelfAwareness,
            2,
            "What feeling did you notice, and what do you think caused it?",
        ),
        MetacognitiveChallenge::new(
            "starter-one-thing-learned",
            "One Thing I Learned",
            "Write down one new thing you learned today, in your own words.",
            ChallengeDifficulty::Starter,
            TargetSkill::Monitoring,
            3,
            "What was the one thing, and how did you learn it?",
        ),
        MetacognitiveChallenge::new(
            "starter-tomorrow-plan",
            "Tiny Plan",
            "Pick one small thing you want to try tomorrow and write it down.",
            ChallengeDifficulty::Starter,
            TargetSkill::Planning,
            2,
            "What did you pick, and why that one?",
        ),
        // Explorer
        MetacognitiveChallenge::new(
            "explorer-strategy-spotting",
            "Strategy Spotting",
            "Think of something that went well this week and describe the strategy you used to make it work.",
            ChallengeDifficulty::Explorer,
            TargetSkill::Monitoring,
            5,
            "What strategy did you spot, and where else could you use it?",
        ),
        MetacognitiveChallenge::new(
            "explorer-emotion-map",
            "Emotion Map",
            "Draw or list the feelings you had during one school day, from morning to afternoon.",
            ChallengeDifficulty::Explorer,
            TargetSkill::EmotionalRegulation,
            7,
            "When did your feelings change the most, and what was happening then?",
        ),
        MetacognitiveChallenge::new(
            "explorer-before-after",
            "Before and After",
            "Before starting a task, predict how hard it will be. Afterwards, compare your prediction with what happened.",
            ChallengeDifficulty::Explorer,
            TargetSkill::Evaluation,
            6,
            "Was the task harder or easier than you predicted? What surprised you?",
        ),
        // Practitioner
        MetacognitiveChallenge::new(
            "practitioner-stuck-playbook",
            "Stuck Playbook",
            "Write your personal list of three things to try the next time you get stuck on a problem.",
            ChallengeDifficulty::Practitioner,
            TargetSkill::Planning,
            8,
            "Which of your three moves do you think will help most, and why?",
        ),
        MetacognitiveChallenge::new(
            "practitioner-thinking-replay",
            "Thinking Replay",
            "Pick a problem you solved recently and replay your thinking step by step, writing each step down.",
            ChallengeDifficulty::Practitioner,
            TargetSkill::Monitoring,
            10,
            "Which step mattered most? Where did your thinking change direction?",
        )
        .with_steps(&[
            "Pick a problem you solved in the last few days.",
            "Write down the first thing you tried.",
            "Write each next step until you reach the solution.",
            "Circle the step where things started to click.",
        ]),
        MetacognitiveChallenge::new(
            "practitioner-mistake-detective",
            "Mistake Detective",
            "Find one mistake you made this week and trace back to where your thinking went off track.",
            ChallengeDifficulty::Practitioner,
            TargetSkill::Evaluation,
            10,
            "What was the moment your thinking went off track, and what would you do differently?",
        ),
        // Expert
        MetacognitiveChallenge::new(
            "expert-teach-it-back",
            "Teach It Back",
            "Explain something you recently learned to someone else (or write it as if teaching), then note what was hard to explain.",
            ChallengeDifficulty::Expert,
            TargetSkill::Evaluation,
            15,
            "What part was hardest to explain, and what does that tell you about your understanding?",
        ),
        MetacognitiveChallenge::new(
            "expert-week-review",
            "Week in Review",
            "Review your journal entries from the past week and write about a pattern you notice in how you learn.",
            ChallengeDifficulty::Expert,
            TargetSkill::SelfAwareness,
            15,
            "What pattern did you find, and is it helping or holding you back?",
        ),
        // Master
        MetacognitiveChallenge::new(
            "master-learning-experiment",
            "Learning Experiment",
            "Design a small experiment on yourself: change one thing about how you study for a week and track what happens.",
            ChallengeDifficulty::Master,
            TargetSkill::Planning,
            20,
            "What did you change, what did you observe, and what will you keep doing?",
        )
        .with_steps(&[
            "Choose one study habit to change for a week.",
            "Decide how you will tell if it worked.",
            "Run the week and jot a sentence each day.",
            "Compare the week with a normal one and write your conclusion.",
        ]),
        MetacognitiveChallenge::new(
            "master-mind-manual",
            "Manual for My Mind",
            "Write a short guide to how your mind works best: when you focus well, what trips you up, and what resets you.",
            ChallengeDifficulty::Master,
            TargetSkill::SelfAwareness,
            25,
            "What is the most important rule in your manual, and how did you discover it?",
        ),
    ];
}

/// Pick a challenge appropriate to the child's tier, skipping completed
/// ones. Falls back to any uncompleted challenge when the tier is
/// exhausted; returns `None` only when the whole catalog is done.
pub fn select_challenge_with_rng<R: Rng>(
    feedback_count: u32,
    completed: &HashSet<String>,
    rng: &mut R,
) -> Option<MetacognitiveChallenge> {
    let tier = ChallengeDifficulty::for_feedback_count(feedback_count);
    let in_tier: Vec<&MetacognitiveChallenge> = CHALLENGE_CATALOG
        .iter()
        .filter(|c| c.difficulty == tier && !completed.contains(&c.id))
        .collect();
    if let Some(choice) = in_tier.choose(rng) {
        return Some((*choice).clone());
    }

    let any: Vec<&MetacognitiveChallenge> = CHALLENGE_CATALOG
        .iter()
        .filter(|c| !completed.contains(&c.id))
        .collect();
    any.choose(rng).map(|c| (*c).clone())
}
