//! crates/style_discovery_core/src/narrative.rs
//!
//! Template assembly for the session narrative. Output is a pure function of
//! the ranked styles and the decisiveness score.

/// Narrative used when the client liked nothing at all.
pub const EXPLORATORY: &str = "No clear visual preferences were established during this session. \
This suggests a highly eclectic taste or a need for a broader visual exploration.";

/// Narrative used when likes exist but no liked style resolved to a catalog name.
pub const BASELINE: &str = "A visual baseline is still being established.";

const INSTINCTIVE_TONE: &str = "Your selections were remarkably instinctive, suggesting a deeply \
refined and unwavering aesthetic intuition.";
const CONSISTENT_TONE: &str = "There is a consistent and clear vision emerging, showing a strong \
pull toward cohesive textures and forms.";
const THOUGHTFUL_TONE: &str = "Your selections reflect a thoughtful, multi-faceted approach, \
balancing diverse visual influences into a unique personal vocabulary.";

fn tone(decisiveness: f64) -> &'static str {
    if decisiveness > 0.85 {
        INSTINCTIVE_TONE
    } else if decisiveness > 0.6 {
        CONSISTENT_TONE
    } else {
        THOUGHTFUL_TONE
    }
}

pub fn compose(primary: &[String], secondary: &[String], decisiveness: f64) -> String {
    let main = match primary {
        [] => return BASELINE.to_string(),
        [only] => format!("a definitive preference for {only} design"),
        [first, second, ..] => format!("a sophisticated blend of {first} and {second}"),
    };

    let support = if secondary.is_empty() {
        String::new()
    } else {
        format!(", nuanced by subtle {} undertones", secondary.join(" and "))
    };

    format!("The analysis identifies {main}{support}. {}", tone(decisiveness))
}
