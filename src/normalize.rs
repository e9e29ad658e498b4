/// Rewrite a human-friendly expression into parser-ready text.
///
/// The substitutions are ordered so that no later step re-matches the
/// output of an earlier one, which makes the whole pipeline idempotent:
/// running `normalize` on already-normalized text is a no-op.
///
/// Function names and the constants `pi` / `e` are deliberately left
/// untouched here; the tokenizer recognizes them as whole identifiers, so
/// an `e` inside an ordinary word is never mangled.
pub fn normalize(raw: &str) -> String {
    let mut text = raw.trim().to_lowercase();

    // Unicode operator aliases typed or pasted from elsewhere.
    text = text.replace('×', "*").replace('÷', "/").replace('−', "-");

    // Accept both exponent spellings; the parser takes `^`.
    text = text.replace("**", "^");

    text = strip_number_decorations(&text);
    rewrite_percents(&text)
}

/// Drop `$` signs and thousands separators so "$1,250 * 2" parses.
/// A comma is only removed when digits sit on both sides of it.
fn strip_number_decorations(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '$' => {}
            ',' => {
                let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
                let next_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
                if !(prev_digit && next_digit) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Rewrite percent literals: `15%` becomes `(15/100)`. The output contains
/// no `%`, so a second pass leaves it alone.
fn rewrite_percents(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut number = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
        } else if c == '%' && !number.is_empty() {
            out.push('(');
            out.push_str(&number);
            out.push_str("/100)");
            number.clear();
        } else {
            out.push_str(&number);
            number.clear();
            out.push(c);
        }
    }
    out.push_str(&number);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponent_alias() {
        assert_eq!(normalize("2**3"), "2^3");
        assert_eq!(normalize("2^3"), "2^3");
    }

    #[test]
    fn test_unicode_operators() {
        assert_eq!(normalize("6×7"), "6*7");
        assert_eq!(normalize("10÷4"), "10/4");
        assert_eq!(normalize("5−2"), "5-2");
    }

    #[test]
    fn test_currency_and_thousands() {
        assert_eq!(normalize("$1,250 * 2"), "1250 * 2");
        assert_eq!(normalize("$45"), "45");
    }

    #[test]
    fn test_comma_kept_outside_numbers() {
        assert_eq!(normalize("max, min"), "max, min");
    }

    #[test]
    fn test_percent_literal() {
        assert_eq!(normalize("15% * 200"), "(15/100) * 200");
        assert_eq!(normalize("2.5%"), "(2.5/100)");
    }

    #[test]
    fn test_idempotent_on_normalized_text() {
        for expr in ["2+3", "sqrt(16)", "(15/100) * 200", "1250 * 2", "2^3"] {
            assert_eq!(normalize(expr), expr);
            assert_eq!(normalize(&normalize(expr)), normalize(expr));
        }
    }

    #[test]
    fn test_functions_and_constants_untouched() {
        assert_eq!(normalize("sqrt(16) + pi"), "sqrt(16) + pi");
        assert_eq!(normalize("ln(e)"), "ln(e)");
    }
}
