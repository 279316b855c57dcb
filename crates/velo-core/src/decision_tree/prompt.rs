use super::wizard::Selection;

pub const DEFAULT_PREAMBLE: &str = "Ich suche ein neues Fahrrad. Hier sind meine Angaben:";
pub const DEFAULT_CLOSING: &str = "Welche Fahrräder aus dem Sortiment kannst du mir empfehlen?";

/// Preamble, one `question: label` line per selection, closing sentence.
pub fn compose_prompt(preamble: &str, selections: &[Selection], closing: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(preamble);
    prompt.push_str("\n\n");

    for selection in selections {
        prompt.push_str(&format!("{}: {}\n", selection.question, selection.label));
    }

    prompt.push('\n');
    prompt.push_str(closing);

    prompt
}
