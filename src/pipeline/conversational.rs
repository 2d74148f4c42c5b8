// Small-talk and trivia matcher
//
// Rule tables are tried in a fixed priority order; the first table with a
// matching rule wins, and the reply is drawn at random from that rule's
// response set so repeated greetings do not read like a broken record.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::sync::Mutex;

struct Rule {
    pattern: Regex,
    responses: &'static [&'static str],
}

fn rule(pattern: &str, responses: &'static [&'static str]) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("invalid rule pattern"),
        responses,
    }
}

// Greeting patterns are anchored to the whole message so a greeting prefix
// on a substantive question ("hello, I think I'm having a heart attack")
// falls through to the later stages.
static GREETING_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(
            r"^(hi|hii+|hello|hey|heya|howdy|good morning|good afternoon|good evening)[\s!.,]*$",
            &[
                "Hello! How can I help you with your health questions today?",
                "Hi there! What health topic can I help you with?",
                "Hello! I'm here to help with general health information. What's on your mind?",
            ],
        ),
        rule(
            r"^how are you( doing| today)?[\s!.,?]*$",
            &[
                "I'm doing well, thank you for asking! How can I help you today?",
                "All good here! What health question can I help you with?",
            ],
        ),
        rule(
            r"^(thanks|thank you|thanks a lot|thank you so much|thx)[\s!.,]*$",
            &[
                "You're welcome! Let me know if you have any other health questions.",
                "Happy to help! Is there anything else you'd like to know?",
                "Anytime! Take care of yourself.",
            ],
        ),
        rule(
            r"^(bye|goodbye|good night|see you( later)?)[\s!.,]*$",
            &[
                "Goodbye! Take care and stay healthy.",
                "Take care! Remember to reach out to your care team if anything comes up.",
            ],
        ),
        rule(
            r"^(who are you|what are you|what can you do)[\s?!.]*$",
            &[
                "I'm the portal's health assistant. I can share general health information and point you to the right resources, though I can't diagnose or prescribe.",
                "I'm a health information assistant. Ask me general questions about wellness, medications, or symptoms, and I'll do my best to help.",
            ],
        ),
    ]
});

// Body trivia gets answered from fixed facts rather than burning an
// upstream call on them.
static HEALTH_TRIVIA_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(
            r"how many bones",
            &[
                "An adult human body has 206 bones, while babies are born with around 300 that fuse as they grow.",
                "Adults have 206 bones. More than half of them are in the hands and feet!",
            ],
        ),
        rule(
            r"how (fast|many times).*heart.*beat",
            &[
                "A resting heart typically beats 60 to 100 times per minute, which adds up to about 100,000 beats every day.",
                "The average heart beats around 100,000 times a day, pumping roughly 2,000 gallons of blood.",
            ],
        ),
        rule(
            r"(largest|biggest) organ",
            &[
                "The skin is the body's largest organ, covering about 20 square feet in adults.",
                "That would be the skin! It weighs around 8 pounds and is your first line of defense against infection.",
            ],
        ),
        rule(
            r"how much (of the body|of your body)? ?is water",
            &[
                "The human body is about 60% water, which is why staying hydrated matters so much.",
            ],
        ),
    ]
});

static GENERAL_TRIVIA_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(
            r"(fun fact|tell me something interesting|did you know)",
            &[
                "Here's one: your body produces about 25 million new cells every second.",
                "Fun fact: the human brain uses roughly 20% of the body's energy despite being only 2% of its weight.",
                "Did you know? Your stomach gets a new lining every few days so it doesn't digest itself.",
            ],
        ),
        rule(
            r"tell me a joke",
            &[
                "Why did the skeleton go to the party alone? He had no body to go with him.",
                "I told my doctor I broke my arm in two places. He told me to stop going to those places.",
            ],
        ),
    ]
});

/// First pipeline stage: canned replies for small talk and trivia
///
/// `reply` returns `None` for anything substantive, handing the message to
/// the rest of the pipeline.
pub struct ConversationalMatcher {
    rng: Mutex<StdRng>,
}

impl ConversationalMatcher {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Seeded constructor so tests can pin the response draw
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn reply(&self, message: &str) -> Option<String> {
        let normalized = message.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        let tables: [&[Rule]; 3] = [
            &GREETING_RULES,
            &HEALTH_TRIVIA_RULES,
            &GENERAL_TRIVIA_RULES,
        ];

        for table in tables {
            for rule in table {
                if rule.pattern.is_match(&normalized) {
                    return Some(self.pick(rule.responses));
                }
            }
        }

        None
    }

    fn pick(&self, responses: &[&str]) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let idx = rng.gen_range(0..responses.len());
        responses[idx].to_string()
    }
}

impl Default for ConversationalMatcher {
    fn default() -> Self {
        Self::new()
    }
}
