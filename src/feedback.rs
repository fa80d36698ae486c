//! Coaching text composition.
//!
//! Deterministic templating: an assessment and encouragement pair chosen by
//! accuracy band, up to two issue bullets, and on the session's final frame
//! a trimester-specific closing. Never produces an empty string.

use crate::diagnoser::Issue;
use crate::registry::{ReferencePose, Trimester};

/// Issues rendered in the suggestion list.
const MAX_SUGGESTIONS: usize = 2;

/// Compose the feedback paragraph for one frame.
#[must_use]
pub fn compose(
    reference: &ReferencePose,
    accuracy: f32,
    issues: &[Issue],
    trimester: Trimester,
    is_final_frame: bool,
) -> String {
    let title = reference.title;
    let (assessment, encouragement) = if accuracy < 40.0 {
        (
            format!("Your {title} needs some adjustments for better alignment."),
            "Take your time and listen to your body's signals.",
        )
    } else if accuracy < 70.0 {
        (
            format!("Your {title} is developing well with good basic form."),
            "Continue with mindful breathing and gentle adjustments.",
        )
    } else {
        (
            format!("Your {title} shows excellent alignment and awareness."),
            "Maintain this quality of presence in your practice.",
        )
    };

    let mut feedback = assessment;
    feedback.push_str("\n\n");

    if !issues.is_empty() {
        feedback.push_str("Suggestions:\n\u{2022} ");
        let bullets: Vec<&str> = issues
            .iter()
            .take(MAX_SUGGESTIONS)
            .map(|i| i.description.as_str())
            .collect();
        feedback.push_str(&bullets.join("\n\u{2022} "));
        feedback.push_str("\n\n");
    }

    feedback.push_str(encouragement);

    if is_final_frame {
        feedback.push_str(closing(trimester));
        feedback.push_str(
            "\n\nRemember that consistency is more important than perfection during pregnancy. \
             Honor your changing body and practice with mindfulness.",
        );
    }

    feedback
}

const fn closing(trimester: Trimester) -> &'static str {
    match trimester {
        Trimester::First => {
            "\n\nIn the first trimester, focus on establishing a mindful practice. \
             Stay well-hydrated and listen to your body's changing needs."
        }
        Trimester::Second => {
            "\n\nIn the second trimester, continue modifying poses as your center of gravity shifts. \
             Use props like blocks or chairs for support as needed."
        }
        Trimester::Third => {
            "\n\nIn the third trimester, prioritize stability and use wider stances. \
             Props are essential now - don't hesitate to modify extensively for comfort."
        }
    }
}
