//! Adaptive feedback: categories, templates, catalogs, and the policy
//! engine that ties them together.

pub mod challenges;
pub mod engine;
pub mod support;
pub mod templates;
pub mod types;

pub use challenges::{
    select_challenge_with_rng, ChallengeDifficulty, MetacognitiveChallenge, TargetSkill,
    CHALLENGE_CATALOG,
};
pub use engine::{FeedbackError, FeedbackPolicyEngine};
pub use support::{
    matched_struggle_keyword, select_support_with_rng, LearningSupport, SupportType,
    SUPPORT_CATALOG,
};
pub use types::{AdaptiveFeedback, FeedbackId, FeedbackType};
