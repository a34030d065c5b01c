//! Rule-based replies — a fixed keyword table checked before the model.

/// Trigger substring -> canned reply. Order matters: the first hit wins.
pub const KEYWORD_RESPONSES: &[(&str, &str)] = &[
    (
        "symptom",
        "It seems like you're experiencing symptoms. Please consult a doctor for accurate advice.",
    ),
    (
        "appointment",
        "Would you like me to schedule an appointment with a doctor?",
    ),
    (
        "medication",
        "It's important to take your prescribed medications regularly. If you have concerns, consult your doctor.",
    ),
    (
        "emergency",
        "If this is an emergency, please call emergency services immediately!",
    ),
    (
        "prescription",
        "For prescriptions, it's best to follow your doctor\u{2019}s advice. Let me know if you need general information.",
    ),
];

/// Case-insensitive substring lookup against `KEYWORD_RESPONSES`.
pub fn match_keyword(input: &str) -> Option<&'static str> {
    let lowered = input.to_lowercase();
    KEYWORD_RESPONSES
        .iter()
        .find(|(keyword, _)| lowered.contains(*keyword))
        .map(|(_, response)| *response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_for(keyword: &str) -> &'static str {
        KEYWORD_RESPONSES
            .iter()
            .find(|(k, _)| *k == keyword)
            .map(|(_, r)| *r)
            .unwrap()
    }

    #[test]
    fn test_each_keyword_hits() {
        for (keyword, response) in KEYWORD_RESPONSES {
            let input = format!("I have a question about {}", keyword);
            assert_eq!(match_keyword(&input), Some(*response));
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            match_keyword("EMERGENCY! help"),
            Some(response_for("emergency"))
        );
    }

    #[test]
    fn test_substring_not_word_match() {
        assert_eq!(
            match_keyword("I've been asymptomatic for days"),
            Some(response_for("symptom"))
        );
        assert_eq!(
            match_keyword("my medications ran out"),
            Some(response_for("medication"))
        );
    }

    #[test]
    fn test_table_order_breaks_ties() {
        // "appointment" precedes "emergency" in the table
        assert_eq!(
            match_keyword("emergency appointment please"),
            Some(response_for("appointment"))
        );
        // "symptom" precedes everything
        assert_eq!(
            match_keyword("prescription for my symptoms"),
            Some(response_for("symptom"))
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(match_keyword("What is the capital of France?"), None);
        assert_eq!(match_keyword(""), None);
    }
}
