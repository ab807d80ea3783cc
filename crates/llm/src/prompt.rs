//! Prompt construction for outline generation.

/// Instructions sent before the user's text.
const INSTRUCTIONS: &str = r#"You turn source text into a slide deck outline.
Split the text into slides with a logical flow. Use section slides to separate
major topics, open with a title slide and close with a conclusion when the text
supports it. Keep bullet points short and concrete; never invent facts that are
not in the text.

Respond with JSON only, in exactly this shape:
{
  "title": "Presentation title",
  "slides": [
    {
      "title": "Slide title",
      "content": ["Bullet point", "Bullet point"],
      "slide_type": "title|section|content|comparison|conclusion",
      "speaking_notes": "What the presenter should say"
    }
  ]
}"#;

/// Build the single user prompt for the given text and optional guidance.
///
/// Guidance steers tone and structure (for example "investor pitch" or
/// "technical deep dive") and is omitted when blank.
pub fn build_prompt(text: &str, guidance: Option<&str>) -> String {
    let mut prompt = String::with_capacity(INSTRUCTIONS.len() + text.len() + 128);
    prompt.push_str(INSTRUCTIONS);

    if let Some(guidance) = guidance.map(str::trim).filter(|g| !g.is_empty()) {
        prompt.push_str("\n\nGuidance for tone and structure: ");
        prompt.push_str(guidance);
    }

    prompt.push_str("\n\nText:\n");
    prompt.push_str(text);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_text_and_guidance() {
        let prompt = build_prompt("Sales rose 12%.", Some("  investor pitch "));
        assert!(prompt.contains("\"slides\""));
        assert!(prompt.contains("Guidance for tone and structure: investor pitch"));
        assert!(prompt.ends_with("Text:\nSales rose 12%."));
    }

    #[test]
    fn test_blank_guidance_is_omitted() {
        for guidance in [None, Some(""), Some("   ")] {
            assert!(!build_prompt("x", guidance).contains("Guidance"));
        }
    }
}
