//! Post-generation filter that keeps structured output away from the player.

use tracing::warn;

/// Returned instead of narration that looks like a leaked tool call.
pub const APOLOGY: &str =
    "The narrator hesitates for a moment... Rephrase your request so I can better guide you in the adventure.";

const MARKERS: &[&str] = &["{\"name\"", "\"parameters\""];

/// Whether the text contains a structured tool-call marker.
pub fn looks_structured(text: &str) -> bool {
    MARKERS.iter().any(|marker| text.contains(marker))
}

/// Return the narration unchanged, or [`APOLOGY`] if it looks structured.
pub fn filter(text: String) -> String {
    if looks_structured(&text) {
        warn!("narration blocked by structured-output filter");
        APOLOGY.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_prose_passes() {
        assert_eq!(filter("You see a goblin.".to_string()), "You see a goblin.");

        let prose = "A goblin leaps out, dagger in hand! What do you do?".to_string();
        assert_eq!(filter(prose.clone()), prose);
    }

    #[test]
    fn test_leaked_call_is_replaced() {
        assert_eq!(filter(r#"{"name": "x", "parameters": {}}"#.to_string()), APOLOGY);
    }

    #[test]
    fn test_tool_call_shapes_are_blocked() {
        assert_eq!(filter(r#"{"name": "describeScene"}"#.to_string()), APOLOGY);
        assert_eq!(
            filter(r#"call {"tool": "x", "parameters": {}}"#.to_string()),
            APOLOGY
        );
    }

    #[test]
    fn test_markers_need_exact_quoting() {
        // A space after the brace does not match the marker.
        assert!(!looks_structured(r#"{ "name": "x" }"#));
        assert!(!looks_structured("the name of the parameters"));
    }
}
