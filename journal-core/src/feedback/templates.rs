//! Message templates, rendered per developmental mode.
//!
//! Templates interpolate `{emotion}` with the entry's emotional state
//! and `{topic}` with its subject.

use crate::entry::DevelopmentalMode;
use crate::feedback::types::FeedbackType;
use rand::seq::SliceRandom;
use rand::Rng;

/// One message template with a variant per developmental mode.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackTemplate {
    pub feedback_type: FeedbackType,
    pub early: &'static str,
    pub middle: &'static str,
    pub adolescent: &'static str,
}

impl FeedbackTemplate {
    /// Render the template for a mode, filling in placeholders.
    pub fn render(&self, mode: DevelopmentalMode, emotion: &str, topic: &str) -> String {
        let raw = match mode {
            DevelopmentalMode::EarlyChildhood => self.early,
            DevelopmentalMode::MiddleChildhood => self.middle,
            DevelopmentalMode::Adolescent => self.adolescent,
        };
        raw.replace("{emotion}", emotion).replace("{topic}", topic)
    }
}

static TEMPLATES: &[FeedbackTemplate] = &[
    // Encouragement
    FeedbackTemplate {
        feedback_type: FeedbackType::Encouragement,
        early: "You wrote about {topic} all by yourself! That makes your thinking muscles stronger every time.",
        middle: "Writing about {topic} like this shows real effort. Keep noticing what you're learning!",
        adolescent: "The way you engaged with {topic} here shows genuine intellectual effort. That habit compounds.",
    },
    FeedbackTemplate {
        feedback_type: FeedbackType::Encouragement,
        early: "Wow, you're thinking about your thinking! That's a superpower.",
        middle: "You took the time to reflect on {topic}, and that's exactly how strong learners are built.",
        adolescent: "Reflection like this is what separates doing the work from actually learning from it. Well done.",
    },
    // Metacognitive insight
    FeedbackTemplate {
        feedback_type: FeedbackType::MetacognitiveInsight,
        early: "You noticed how your brain was working on {topic}! Noticing is the first step to learning.",
        middle: "You're paying attention to *how* you think about {topic}, not just what you think. That's a big deal.",
        adolescent: "You're observing your own thinking process around {topic}. That kind of metacognition is what lets you improve deliberately.",
    },
    FeedbackTemplate {
        feedback_type: FeedbackType::MetacognitiveInsight,
        early: "Your brain did some big work on {topic} today. What did it do first?",
        middle: "There's a strategy hiding in how you approached {topic}. Naming it makes it yours to reuse.",
        adolescent: "Notice the strategy embedded in how you worked through {topic}. Once you can name it, you can apply it anywhere.",
    },
    // Emotional awareness
    FeedbackTemplate {
        feedback_type: FeedbackType::EmotionalAwareness,
        early: "You felt {emotion} about {topic}, and that's okay! Feelings help us understand ourselves.",
        middle: "Feeling {emotion} about {topic} makes sense. Noticing your feelings while you learn is a real skill.",
        adolescent: "You identified feeling {emotion} about {topic}. Recognizing the emotion is what lets you work with it instead of against it.",
    },
    FeedbackTemplate {
        feedback_type: FeedbackType::EmotionalAwareness,
        early: "Your feelings about {topic} are like weather. You noticed the weather today, and that's great!",
        middle: "Being {emotion} while working on {topic} tells you something. What do you think it's telling you?",
        adolescent: "That {emotion} feeling around {topic} is information. Emotions flag what matters to you in your learning.",
    },
    // Growth opportunity
    FeedbackTemplate {
        feedback_type: FeedbackType::GrowthOpportunity,
        early: "Tricky things like {topic} help your brain grow the most. You're growing right now!",
        middle: "When {topic} feels hard, that's your brain stretching. What's one small next step you could try?",
        adolescent: "The difficulty you're hitting with {topic} is exactly where growth happens. Consider what a deliberate next attempt would look like.",
    },
    FeedbackTemplate {
        feedback_type: FeedbackType::GrowthOpportunity,
        early: "You found a hard part in {topic}! Hard parts are where superheroes train.",
        middle: "This part of {topic} is challenging you, which means it's worth your attention. Challenges are how you level up.",
        adolescent: "You've located a genuine edge of your ability in {topic}. Working right at that edge is the fastest way to improve.",
    },
    // Celebration of progress
    FeedbackTemplate {
        feedback_type: FeedbackType::CelebrationOfProgress,
        early: "Look how much journaling you've done! Your thinking is getting bigger and bigger.",
        middle: "You've built a real reflection habit around {topic} and everything else. That consistency is worth celebrating!",
        adolescent: "The consistency you've shown in reflecting on your learning is a milestone in itself. That discipline pays off everywhere.",
    },
    FeedbackTemplate {
        feedback_type: FeedbackType::CelebrationOfProgress,
        early: "You keep coming back to write in your journal. That's amazing! High five!",
        middle: "Milestone reached! Keeping up your journaling takes real commitment, and you've shown it.",
        adolescent: "You've sustained this practice long enough that it's becoming part of how you learn. That's worth marking.",
    },
    // Reflection prompt
    FeedbackTemplate {
        feedback_type: FeedbackType::ReflectionPrompt,
        early: "Here's a wondering question about {topic}: what was your favorite part, and why?",
        middle: "Something to think about: what would you tell a friend who was about to start {topic}?",
        adolescent: "A question worth sitting with: what assumption did you bring to {topic}, and did it hold up?",
    },
    FeedbackTemplate {
        feedback_type: FeedbackType::ReflectionPrompt,
        early: "If {topic} were an animal, what animal would it be? Why do you think so?",
        middle: "What's one thing about {topic} you understand now that you didn't before? How did that change happen?",
        adolescent: "Looking back at your work on {topic}, where did your understanding actually shift, and what triggered it?",
    },
    // Supportive intervention
    FeedbackTemplate {
        feedback_type: FeedbackType::SupportiveIntervention,
        early: "It sounds like {topic} felt hard today. That's okay! Here's something that might help.",
        middle: "Getting stuck on {topic} happens to everyone. Here's a strategy that can help you get unstuck.",
        adolescent: "You've hit real resistance with {topic}. That's a normal part of learning, and there are concrete strategies for it.",
    },
    FeedbackTemplate {
        feedback_type: FeedbackType::SupportiveIntervention,
        early: "Hard parts in {topic} are like puzzles. Let's find a smaller puzzle piece to start with.",
        middle: "When {topic} feels too big, shrinking the problem is a real skill. Let's try it.",
        adolescent: "Feeling stuck on {topic} usually means the problem needs restructuring, not more brute force. Try the approach below.",
    },
    // Skill building
    FeedbackTemplate {
        feedback_type: FeedbackType::SkillBuilding,
        early: "Let's play a thinking game about {topic}! Games make your brain stronger.",
        middle: "Here's a short exercise to sharpen how you think about things like {topic}.",
        adolescent: "A targeted exercise: practicing this skill deliberately will change how you approach {topic} and beyond.",
    },
    FeedbackTemplate {
        feedback_type: FeedbackType::SkillBuilding,
        early: "Your brain loves practice! Here's a tiny practice about {topic}.",
        middle: "Strong thinkers train on purpose. This exercise builds a skill you can use on {topic} and everywhere else.",
        adolescent: "Skills like planning and self-monitoring respond to deliberate practice. This exercise targets one of them directly.",
    },
];

/// All templates for a category.
pub fn templates_for(feedback_type: FeedbackType) -> Vec<&'static FeedbackTemplate> {
    TEMPLATES
        .iter()
        .filter(|t| t.feedback_type == feedback_type)
        .collect()
}

/// Warm openers prepended to encouragement messages.
pub fn encouragement_prefixes(mode: DevelopmentalMode) -> &'static [&'static str] {
    match mode {
        DevelopmentalMode::EarlyChildhood => &["Wow! ", "Amazing! ", "Great job! "],
        DevelopmentalMode::MiddleChildhood => &["Nice work! ", "Well done! ", "Impressive! "],
        DevelopmentalMode::Adolescent => &["Strong work. ", "Well done. ", "Solid reflection. "],
    }
}

/// Pick a random encouragement opener for a mode.
pub fn encouragement_prefix_with_rng<R: Rng>(mode: DevelopmentalMode, rng: &mut R) -> &'static str {
    // Non-empty by construction.
    encouragement_prefixes(mode).choose(rng).copied().unwrap_or("")
}

/// Fixed follow-up prompts for a category.
pub fn follow_up_prompts(feedback_type: FeedbackType) -> [&'static str; 3] {
    match feedback_type {
        FeedbackType::Encouragement => [
            "What part are you most proud of?",
            "What would you like to try next?",
            "Who would you like to share this with?",
        ],
        FeedbackType::MetacognitiveInsight => [
            "What did you do first when you started?",
            "What strategy helped you the most?",
            "Would you do anything differently next time?",
        ],
        FeedbackType::EmotionalAwareness => [
            "When did that feeling start?",
            "What helps when you feel that way?",
            "Has that feeling changed since you wrote this?",
        ],
        FeedbackType::GrowthOpportunity => [
            "What's the smallest next step you could take?",
            "What would make this feel a little easier?",
            "Who or what could help you with the hard part?",
        ],
        FeedbackType::CelebrationOfProgress => [
            "What's changed since you started journaling?",
            "What are you better at now than before?",
            "What goal would you like to reach next?",
        ],
        FeedbackType::ReflectionPrompt => [
            "What surprised you the most?",
            "What questions do you still have?",
            "How does this connect to something else you know?",
        ],
        FeedbackType::SupportiveIntervention => [
            "What have you already tried?",
            "What's the exact spot where things got hard?",
            "What's one small piece you could start with?",
        ],
        FeedbackType::SkillBuilding => [
            "When could you practice this skill tomorrow?",
            "Where else might this skill be useful?",
            "How will you know the skill is getting stronger?",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_category_has_two_templates() {
        let all = [
            FeedbackType::Encouragement,
            FeedbackType::MetacognitiveInsight,
            FeedbackType::EmotionalAwareness,
            FeedbackType::GrowthOpportunity,
            FeedbackType::CelebrationOfProgress,
            FeedbackType::ReflectionPrompt,
            FeedbackType::SupportiveIntervention,
            FeedbackType::SkillBuilding,
        ];
        for feedback_type in all {
            assert_eq!(templates_for(feedback_type).len(), 2, "{feedback_type}");
        }
    }

    #[test]
    fn test_render_interpolates_placeholders() {
        let template = templates_for(FeedbackType::EmotionalAwareness)[0];
        let rendered = template.render(DevelopmentalMode::MiddleChildhood, "frustrated", "Math");
        assert!(rendered.contains("frustrated"));
        assert!(rendered.contains("Math"));
        assert!(!rendered.contains("{emotion}"));
        assert!(!rendered.contains("{topic}"));
    }

    #[test]
    fn test_modes_render_differently() {
        let template = templates_for(FeedbackType::Encouragement)[0];
        let early = template.render(DevelopmentalMode::EarlyChildhood, "happy", "Art");
        let adolescent = template.render(DevelopmentalMode::Adolescent, "happy", "Art");
        assert_ne!(early, adolescent);
    }

    #[test]
    fn test_prefix_comes_from_mode_list() {
        let mut rng = StdRng::seed_from_u64(5);
        let prefix = encouragement_prefix_with_rng(DevelopmentalMode::EarlyChildhood, &mut rng);
        assert!(encouragement_prefixes(DevelopmentalMode::EarlyChildhood).contains(&prefix));
    }
}
