// Scripted educational responses, used when the upstream model is
// unavailable or unconfigured

use std::collections::HashSet;

/// Suffix appended to every scripted reply
pub const DISCLAIMER: &str = "This is general health information and not a substitute for \
professional medical advice. Please consult your healthcare provider about your specific \
situation.";

struct TopicBucket {
    topic: &'static str,
    keywords: &'static [&'static str],
    responses: &'static [&'static str],
}

// Buckets are tried in this order; the first bucket sharing a keyword with
// the message wins.
static TOPIC_BUCKETS: &[TopicBucket] = &[
    TopicBucket {
        topic: "symptoms",
        keywords: &[
            "symptom", "symptoms", "fever", "cough", "coughing", "pain", "ache", "aches",
            "sore", "nausea", "dizzy", "tired", "fatigue",
        ],
        responses: &[
            "Tracking your symptoms helps your care team: note when they started, how severe \
             they are, and anything that makes them better or worse. If symptoms are severe or \
             getting worse quickly, contact your provider promptly.",
            "Common symptoms like fever, cough, or aches often improve with rest and fluids, \
             but symptoms lasting more than a few days, or any that worry you, deserve a call \
             to your healthcare provider.",
            "When describing symptoms to your provider, include when they began, how often they \
             occur, and what you have already tried. That context makes visits much more \
             productive.",
        ],
    },
    TopicBucket {
        topic: "headache",
        keywords: &["headache", "headaches", "migraine", "migraines"],
        responses: &[
            "For occasional headaches, rest, hydration, and over-the-counter pain relievers \
             often help. A headache that is sudden and severe, or comes with vision changes or \
             weakness, needs urgent medical attention.",
            "Common headache triggers include stress, dehydration, skipped meals, and poor \
             sleep. Keeping a simple headache diary can help you and your provider spot \
             patterns.",
        ],
    },
    TopicBucket {
        topic: "medication",
        keywords: &[
            "medication", "medications", "medicine", "medicines", "prescription",
            "prescriptions", "drug", "drugs", "dose", "dosage", "pill", "pills", "refill",
        ],
        responses: &[
            "Take medications exactly as prescribed, at the same times each day. If you miss a \
             dose, check the label or ask your pharmacist rather than doubling up.",
            "Keep an up-to-date list of every medication you take, including over-the-counter \
             products and supplements, and share it at every appointment so interactions can be \
             caught early.",
            "Never stop a prescribed medication on your own, even if you feel better. Talk with \
             your provider first so you can taper or switch safely.",
        ],
    },
    TopicBucket {
        topic: "prevention",
        keywords: &[
            "prevent", "prevention", "avoid", "vaccine", "vaccines", "vaccination", "checkup",
            "checkups", "screening", "screenings", "immunization",
        ],
        responses: &[
            "Prevention basics go a long way: regular checkups, recommended screenings, staying \
             current on vaccinations, and not smoking.",
            "Annual checkups are one of the best prevention tools available. They catch issues \
             like high blood pressure early, when they are easiest to treat.",
        ],
    },
    TopicBucket {
        topic: "sleep",
        keywords: &["sleep", "sleeping", "insomnia", "awake", "snoring"],
        responses: &[
            "Most adults need 7 to 9 hours of sleep. A consistent schedule, a dark cool room, \
             and putting screens away before bed all improve sleep quality.",
            "Trouble sleeping now and then is normal, but ongoing insomnia is worth discussing \
             with your provider, since sleep affects nearly every part of your health.",
        ],
    },
    TopicBucket {
        topic: "mental-health",
        keywords: &[
            "stress", "stressed", "anxiety", "anxious", "depression", "depressed", "worried",
            "overwhelmed", "lonely",
        ],
        responses: &[
            "Mental health is health. Regular exercise, enough sleep, and staying connected \
             with people you trust all help manage stress and anxiety.",
            "If feelings of anxiety or low mood last more than a couple of weeks or interfere \
             with daily life, reach out to your provider. Effective treatments are available.",
        ],
    },
    TopicBucket {
        topic: "nutrition",
        keywords: &[
            "diet", "diets", "nutrition", "food", "foods", "eating", "weight", "exercise",
            "vitamin", "vitamins", "diabetes", "cholesterol",
        ],
        responses: &[
            "A balanced diet built on vegetables, fruits, whole grains, and lean protein \
             supports nearly every aspect of health. Small consistent changes beat drastic \
             ones.",
            "Good nutrition does not require perfection. Start by limiting sugary drinks and \
             heavily processed foods, and add one vegetable to each meal.",
            "For conditions like diabetes or high cholesterol, diet matters enormously. A \
             registered dietitian can build an eating plan around foods you actually enjoy.",
        ],
    },
];

static GENERAL_RESPONSES: &[&str] = &[
    "I'm having trouble reaching the full assistant service right now, but I'm happy to share \
     general health information. Could you tell me a bit more about what you'd like to know?",
    "I can't give a detailed answer at the moment. For personal medical concerns, your \
     healthcare provider or the portal's messaging feature is the best route.",
    "That's a good question. While I can only offer general information right now, your care \
     team can give advice tailored to your health history.",
];

/// Last pipeline stage: keyword-bucketed scripted replies
///
/// Selection within a bucket is `message length mod response count`, not
/// random. The same message always gets the same reply, which keeps the
/// degraded path reproducible; the cheap pseudo-variety across different
/// messages is all this path needs.
#[derive(Default)]
pub struct FallbackResponder;

impl FallbackResponder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, message: &str) -> String {
        let tokens = significant_tokens(message);
        let index_basis = message.len();

        for bucket in TOPIC_BUCKETS {
            if bucket.keywords.iter().any(|k| tokens.contains(*k)) {
                tracing::debug!(topic = bucket.topic, "Fallback bucket selected");
                let reply = bucket.responses[index_basis % bucket.responses.len()];
                return with_disclaimer(reply);
            }
        }

        tracing::debug!("No fallback bucket matched, using general response");
        let reply = GENERAL_RESPONSES[index_basis % GENERAL_RESPONSES.len()];
        with_disclaimer(reply)
    }
}

fn with_disclaimer(reply: &str) -> String {
    format!("{}\n\n{}", reply, DISCLAIMER)
}

/// Lowercase words longer than three characters, the crude significance
/// filter the bucket keywords are matched against
fn significant_tokens(message: &str) -> HashSet<String> {
    message
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.len() > 3)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_message_same_reply() {
        let responder = FallbackResponder::new();
        let message = "what should I eat for diabetes";

        assert_eq!(responder.build(message), responder.build(message));
    }

    #[test]
    fn test_reply_index_derived_from_message_length() {
        let responder = FallbackResponder::new();

        let message = "headache"; // len 8
        let bucket = &TOPIC_BUCKETS[1];
        assert_eq!(bucket.topic, "headache");

        let expected = with_disclaimer(bucket.responses[message.len() % bucket.responses.len()]);
        assert_eq!(responder.build(message), expected);
    }

    #[test]
    fn test_diabetes_question_hits_nutrition_bucket() {
        let responder = FallbackResponder::new();

        let reply = responder.build("what should I eat for diabetes");
        let nutrition = TOPIC_BUCKETS
            .iter()
            .find(|b| b.topic == "nutrition")
            .unwrap();
        assert!(nutrition.responses.iter().any(|r| reply.starts_with(r)));
    }

    #[test]
    fn test_bucket_order_breaks_keyword_ties() {
        let responder = FallbackResponder::new();

        // "tired" (symptoms) and "sleep" (sleep) both match; symptoms is
        // listed first and wins
        let reply = responder.build("I'm tired and can't sleep");
        let symptoms = &TOPIC_BUCKETS[0];
        assert!(symptoms.responses.iter().any(|r| reply.starts_with(r)));
    }

    #[test]
    fn test_short_words_are_not_keywords() {
        let responder = FallbackResponder::new();

        // "eat now" has no token longer than three characters
        let reply = responder.build("eat now");
        assert!(GENERAL_RESPONSES.iter().any(|r| reply.starts_with(r)));
    }

    #[test]
    fn test_disclaimer_always_appended() {
        let responder = FallbackResponder::new();

        for message in ["headache", "what should I eat for diabetes", "ok", ""] {
            let reply = responder.build(message);
            assert!(reply.ends_with(DISCLAIMER));
            assert!(reply.contains("This is general health information"));
        }
    }
}
