//! Turns a stack of dead ends into the final multi-line error message: intro
//! sentence, the offending source line with a caret underneath, a plain
//! English explanation, and worked examples where we have them.

use crate::parser::{Context, DeadEnd, Problem};

impl Context {
    /// The intro sentence naming the construct that could not be parsed.
    pub fn intro(self) -> &'static str {
        match self {
            Context::Value => "Cannot parse this value.",
            Context::Object => "Cannot parse this object.",
            Context::ObjectKey => "Cannot parse this object key.",
            Context::ObjectValue => "Cannot parse this object value.",
            Context::Array => "Cannot parse this array.",
            Context::ArrayValue => "Cannot parse this array value.",
            Context::String => "Cannot parse this string.",
            Context::Number => "Cannot parse this number.",
            Context::Exponent => "Cannot parse the exponent in this number.",
            Context::Fraction => "Cannot parse the fraction in this number.",
            Context::Unicode => "Cannot parse the unicode hex in this string.",
        }
    }
}

impl Problem {
    /// The plain-English statement of the expectation that was not met.
    pub fn explanation(self) -> &'static str {
        match self {
            Problem::ExpectedBool => "Expected a boolean value.",
            Problem::ExpectedNull => "Expected a null value.",
            Problem::ExpectedNumber => "Expected a number.",
            Problem::ExpectedDigit => "Expected a digit.",
            Problem::ExpectedSign => "Expected a sign: '+' or '-'.",
            Problem::ExpectedExponentE => "Expected an exponent.",
            Problem::ExpectedDecimalSeparator => "Expected a decimal separator.",
            Problem::ExpectedString => "Expected a string.",
            Problem::ExpectedDoubleQuote => "Expected a double quote: \".",
            Problem::ExpectedChar => "Expected a character.",
            Problem::ExpectedUnicodeU => "Expected a unicode 'u'.",
            Problem::ExpectedUnicodeHex => "Expected a unicode hex.",
            Problem::ExpectedEscapedCharacter => "Expected an escaped character.",
            Problem::ExpectedObject => "Expected an object.",
            Problem::ExpectedArray => "Expected an array.",
            Problem::ExpectedLeftBrace => "Expected a left brace: '{'.",
            Problem::ExpectedRightBrace => "Expected a right brace: '}'.",
            Problem::ExpectedObjectSeparator => "Expected an object separator: ','.",
            Problem::ExpectedKeyValueSeparator => "Expected a key value separator: ':'.",
            Problem::ExpectedLeftBracket => "Expected a left bracket: '['.",
            Problem::ExpectedRightBracket => "Expected a right bracket: ']'.",
            Problem::ExpectedArraySeparator => "Expected an array separator: ','.",
            Problem::ExceededMaxNesting => "Exceeded the maximum nesting depth.",
        }
    }
}

/// Worked examples for a (context, problem) pair. A failure while parsing an
/// object key always gets the key/value examples, whatever the low-level
/// problem was; unmatched combinations get none.
fn tips(context: Context, problem: Problem) -> &'static [&'static str] {
    if context == Context::ObjectKey {
        return &[r#""key": value"#, r#""name": "John Doe""#, r#""age": 42"#];
    }

    match problem {
        Problem::ExpectedBool => &["true", "false"],
        Problem::ExpectedNull => &["null"],
        Problem::ExpectedNumber => &["42", "3.14", "-1", "-3.14", "0.1", "1e3", "1e-3"],
        Problem::ExpectedDigit => &["0", "1", "2", "..."],
        Problem::ExpectedSign => &["+", "-"],
        Problem::ExpectedExponentE => &["1e3", "1E-3"],
        Problem::ExpectedDecimalSeparator => &["1.0", "1.11234", "1.2865", "..."],
        Problem::ExpectedString => &[r#""hello""#, r#""world""#, r#""foo""#, r#""bar""#],
        Problem::ExpectedChar => &[r#""a""#, r#""b""#, r#""c""#, r#""d""#, "..."],
        Problem::ExpectedUnicodeU => &[
            r#""\u1234""#,
            r#""\uabcd""#,
            r#""\uABCD""#,
            r#""\u1234ABCD""#,
            r#""\u1234abcd""#,
        ],
        _ => &[],
    }
}

/// Renders the first (most specific) dead end against the source it came
/// from. Returns `None` when the stack is empty, which is how a successful
/// parse looks.
pub fn render_diagnostic(src: &str, dead_ends: &[DeadEnd]) -> Option<String> {
    let dead_end = dead_ends.first()?;

    // Innermost open context, or Value when nothing was pushed.
    let context = dead_end
        .context_stack
        .last()
        .copied()
        .unwrap_or(Context::Value);

    let faulty_line = src.split('\n').nth(dead_end.row as usize - 1).unwrap_or("");

    Some(compose(
        context.intro(),
        faulty_line,
        dead_end.row,
        dead_end.col,
        dead_end.problem.explanation(),
        tips(context, dead_end.problem),
    ))
}

fn compose(
    intro: &str,
    faulty_line: &str,
    row: u32,
    col: u32,
    explanation: &str,
    tips: &[&str],
) -> String {
    let prefix = format!("{row}|    ");
    let caret = format!("{}^", " ".repeat(prefix.len() + col as usize - 1));

    let mut lines = vec![
        intro.to_string(),
        String::new(),
        format!("{prefix}{faulty_line}"),
        caret,
    ];

    if tips.is_empty() {
        lines.push(explanation.to_string());
    } else {
        lines.push(format!("{explanation} Here are some examples:"));
        lines.push(String::new());
        lines.extend(tips.iter().map(|tip| format!("    {tip}")));
    }

    lines.join("\n")
}
