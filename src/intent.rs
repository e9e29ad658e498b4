/// The classified purpose of one user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// An arithmetic request carrying the expression payload.
    Calculate(String),
    /// Open the todo panel instead of replying in chat.
    ShowTodoList,
    /// Open the voice dictation panel instead of replying in chat.
    ShowVoiceToText,
    /// A web lookup carrying the query payload.
    Search(String),
    /// Ordinary chit-chat with no recognized command.
    SmallTalk,
}

/// Classify raw input text into exactly one [`Intent`].
///
/// This is a pure function of the text: the same input always yields the
/// same intent. Checks run in a fixed priority order so overlapping keyword
/// matches resolve deterministically; the todo and voice checks run before
/// the arithmetic heuristic because command phrases often contain digits
/// ("todo: buy 2 apples" stays a todo command).
pub fn classify(input: &str) -> Intent {
    let lower = input.trim().to_lowercase();

    if lower.contains("todo") || lower.contains("task") {
        return Intent::ShowTodoList;
    }

    if lower.contains("voice to text") || lower.contains("speech") {
        return Intent::ShowVoiceToText;
    }

    if lower.contains("search") {
        return Intent::Search(strip_search_phrase(&lower));
    }

    if lower.contains("calculate") || lower.contains("math") || looks_like_expression(&lower) {
        return Intent::Calculate(strip_calc_keywords(&lower));
    }

    Intent::SmallTalk
}

/// Drop a leading "search" / "search for" phrase, keeping the rest as the
/// query. "search" buried mid-sentence keeps everything after it.
fn strip_search_phrase(lower: &str) -> String {
    let rest = match lower.find("search") {
        Some(pos) => &lower[pos + "search".len()..],
        None => lower,
    };
    let rest = rest.trim_start();
    let rest = match rest.strip_prefix("for ") {
        Some(stripped) => stripped.trim_start(),
        None if rest == "for" => "",
        None => rest,
    };
    rest.trim().trim_end_matches(['?', '!', '.']).trim().to_string()
}

/// Remove the literal command words, leaving the expression payload.
fn strip_calc_keywords(lower: &str) -> String {
    lower
        .replace("calculate", " ")
        .replace("math", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

const FUNCTION_CALLS: [&str; 6] = ["sqrt(", "sin(", "cos(", "tan(", "log(", "ln("];

/// Heuristic test for "this text is a math expression".
///
/// The text qualifies when it is made entirely of expression characters,
/// names one of the known functions, or mixes a digit with an operator.
/// Plain sentences that merely mention numbers ("I have 2 cats") do not
/// qualify, so they fall through to the chat fallback.
fn looks_like_expression(lower: &str) -> bool {
    if lower.is_empty() {
        return false;
    }

    if lower
        .chars()
        .all(|c| c.is_ascii_digit() || "+-*/^().%$, \t".contains(c))
    {
        return true;
    }

    if FUNCTION_CALLS.iter().any(|f| lower.contains(f)) {
        return true;
    }

    lower.chars().any(|c| c.is_ascii_digit()) && lower.chars().any(|c| "+-*/^".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_keywords() {
        assert_eq!(classify("show my todo list"), Intent::ShowTodoList);
        assert_eq!(classify("add a task for me"), Intent::ShowTodoList);
    }

    #[test]
    fn test_todo_wins_over_digits() {
        // Priority: the todo check runs before the arithmetic heuristic.
        assert_eq!(classify("todo: buy 2 apples"), Intent::ShowTodoList);
    }

    #[test]
    fn test_voice_keywords() {
        assert_eq!(classify("start voice to text"), Intent::ShowVoiceToText);
        assert_eq!(classify("can you do speech recognition?"), Intent::ShowVoiceToText);
    }

    #[test]
    fn test_search_payload() {
        assert_eq!(
            classify("search for rust programming"),
            Intent::Search("rust programming".to_string())
        );
        assert_eq!(
            classify("Search the weather in Lisbon"),
            Intent::Search("the weather in lisbon".to_string())
        );
    }

    #[test]
    fn test_calculate_keyword_stripped() {
        assert_eq!(
            classify("Calculate 15% tip on $45"),
            Intent::Calculate("15% tip on $45".to_string())
        );
        assert_eq!(classify("math 2+2"), Intent::Calculate("2+2".to_string()));
    }

    #[test]
    fn test_bare_expression() {
        assert_eq!(classify("2 + 3"), Intent::Calculate("2 + 3".to_string()));
        assert_eq!(
            classify("sqrt(16) * 2"),
            Intent::Calculate("sqrt(16) * 2".to_string())
        );
    }

    #[test]
    fn test_small_talk_falls_through() {
        assert_eq!(classify("hello there"), Intent::SmallTalk);
        assert_eq!(classify("how are you doing?"), Intent::SmallTalk);
        // Mentions a number but is not expression-shaped.
        assert_eq!(classify("I have 2 cats"), Intent::SmallTalk);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let input = "search for rust programming";
        assert_eq!(classify(input), classify(input));
    }
}
