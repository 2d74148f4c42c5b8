// Emergency phrase screening

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Fixed advisory returned for every detected emergency. Deliberately not
/// randomized: the safety message must be identical across calls so it can
/// be audited and asserted on.
const EMERGENCY_WARNING: &str = "\
If you are experiencing a medical emergency, call 911 or your local emergency services immediately. \
Do not wait for an online response.\n\n\
Seek emergency care right away for any of these warning signs:\n\
- Chest pain or pressure\n\
- Difficulty breathing or shortness of breath\n\
- Sudden weakness, numbness, or slurred speech\n\
- Severe bleeding that will not stop\n\
- Loss of consciousness\n\n\
If you are in crisis or having thoughts of harming yourself, call or text 988 \
(Suicide & Crisis Lifeline) to talk with someone now.";

/// Emergency vocabulary, grouped by category
///
/// The groups only matter for logging and for keeping the override file
/// readable; detection treats them as one flat list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyKeywords {
    pub cardiac: Vec<String>,
    pub neurological: Vec<String>,
    pub respiratory: Vec<String>,
    pub trauma: Vec<String>,
    pub self_harm: Vec<String>,
    pub distress: Vec<String>,
}

impl Default for EmergencyKeywords {
    fn default() -> Self {
        fn list(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }

        Self {
            cardiac: list(&["heart attack", "chest pain", "chest pressure", "heart is racing"]),
            neurological: list(&[
                "stroke",
                "seizure",
                "face drooping",
                "slurred speech",
                "unconscious",
                "passed out",
            ]),
            respiratory: list(&[
                "can't breathe",
                "cannot breathe",
                "can not breathe",
                "trouble breathing",
                "difficulty breathing",
                "choking",
            ]),
            trauma: list(&[
                "severe bleeding",
                "bleeding won't stop",
                "head injury",
                "overdose",
                "poisoning",
            ]),
            self_harm: list(&[
                "suicide",
                "suicidal",
                "kill myself",
                "hurt myself",
                "end my life",
                "self harm",
                "want to die",
                "end it all",
                "don't want to live",
                "do not want to live",
                "no reason to live",
            ]),
            distress: list(&["emergency", "dying", "call 911", "call an ambulance"]),
        }
    }
}

/// Second pipeline stage: screens for emergency phrases
///
/// Matching is plain lowercase substring containment with no word-boundary
/// checks. That over-triggers ("my plant is dying" fires the distress list)
/// and that is the intended bias: a false positive shows a safety message,
/// a false negative hides one.
pub struct EmergencyDetector {
    keywords: EmergencyKeywords,
}

impl EmergencyDetector {
    pub fn new() -> Self {
        Self::with_keywords(EmergencyKeywords::default())
    }

    /// Build a detector from a keyword table, normalizing it to lowercase
    /// once so per-message checks don't re-lowercase the vocabulary
    pub fn with_keywords(mut keywords: EmergencyKeywords) -> Self {
        for group in [
            &mut keywords.cardiac,
            &mut keywords.neurological,
            &mut keywords.respiratory,
            &mut keywords.trauma,
            &mut keywords.self_harm,
            &mut keywords.distress,
        ] {
            for keyword in group.iter_mut() {
                *keyword = keyword.to_lowercase();
            }
        }

        Self { keywords }
    }

    /// Load an emergency keyword table from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("Failed to read emergency keywords file: {}", path.display())
        })?;

        let keywords: EmergencyKeywords =
            serde_json::from_str(&contents).context("Failed to parse emergency keywords file")?;

        Ok(Self::with_keywords(keywords))
    }

    /// Check whether the message contains any emergency phrase
    pub fn is_emergency(&self, message: &str) -> bool {
        let message_lower = message.to_lowercase();

        for (category, keywords) in self.categories() {
            for keyword in keywords {
                if message_lower.contains(keyword.as_str()) {
                    tracing::warn!("Emergency detected: {} keyword '{}'", category, keyword);
                    return true;
                }
            }
        }

        false
    }

    /// The fixed safety advisory shown when detection fires
    pub fn warning(&self) -> &'static str {
        EMERGENCY_WARNING
    }

    fn categories(&self) -> [(&'static str, &Vec<String>); 6] {
        [
            ("cardiac", &self.keywords.cardiac),
            ("neurological", &self.keywords.neurological),
            ("respiratory", &self.keywords.respiratory),
            ("trauma", &self.keywords.trauma),
            ("self-harm", &self.keywords.self_harm),
            ("distress", &self.keywords.distress),
        ]
    }
}

impl Default for EmergencyDetector {
    fn default() -> Self {
        Self::new()
    }
}
