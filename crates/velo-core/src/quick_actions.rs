use serde::{Deserialize, Serialize};

/// A labelled canned prompt, submitted as if the user had typed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickAction {
    pub label: String,
    pub prompt: String,
}

impl QuickAction {
    pub fn new(label: &str, prompt: &str) -> Self {
        Self {
            label: label.to_string(),
            prompt: prompt.to_string(),
        }
    }

    pub fn builtin() -> Vec<QuickAction> {
        vec![
            QuickAction::new(
                "Mountainbike",
                "Ich suche ein Mountainbike. Worauf sollte ich achten?",
            ),
            QuickAction::new(
                "E-Bike zur Arbeit",
                "Welches E-Bike eignet sich für meinen täglichen Arbeitsweg?",
            ),
            QuickAction::new(
                "Rahmengröße",
                "Wie finde ich die richtige Rahmengröße für mich?",
            ),
            QuickAction::new(
                "Trekkingrad",
                "Welche Trekkingräder habt ihr im Angebot?",
            ),
        ]
    }
}
