//! The JSON grammar: one production per construct, each tagging its failures
//! with the grammatical context it was parsing and the expectation that was
//! not met. The diagnostic tables in [`crate::diagnostics`] are keyed on
//! these two enums.

use indexmap::IndexMap;

use crate::combinators::{self, in_context, one_of, optional, sequence, Delimited, Trailing};
use crate::value::Value;

/// What the parser was doing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Value,
    Object,
    ObjectKey,
    ObjectValue,
    Array,
    /// Declared for completeness; array elements re-enter the composite
    /// value production, whose own context supersedes this one.
    ArrayValue,
    /// Declared for completeness; see [`string`] for why string failures
    /// surface in the enclosing context instead.
    String,
    Number,
    Exponent,
    Fraction,
    Unicode,
}

/// The low-level expectation that was not met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    ExpectedBool,
    ExpectedNull,
    ExpectedNumber,
    ExpectedDigit,
    ExpectedSign,
    ExpectedExponentE,
    ExpectedDecimalSeparator,
    ExpectedString,
    ExpectedDoubleQuote,
    ExpectedChar,
    ExpectedUnicodeU,
    ExpectedUnicodeHex,
    ExpectedEscapedCharacter,
    ExpectedObject,
    ExpectedArray,
    ExpectedLeftBrace,
    ExpectedRightBrace,
    ExpectedObjectSeparator,
    ExpectedKeyValueSeparator,
    ExpectedLeftBracket,
    ExpectedRightBracket,
    ExpectedArraySeparator,
    ExceededMaxNesting,
}

/// Upper bound on the open-context stack before a parse is rejected. Each
/// nesting level of the input keeps two to four contexts open, so this allows
/// somewhat over a hundred levels of nesting while staying well clear of the
/// call stack limit.
const MAX_NESTING: usize = 500;

pub type Cursor<'a> = combinators::Cursor<'a, Context>;
pub type DeadEnd = combinators::DeadEnd<Context, Problem>;
pub type Failure = combinators::Failure<Context, Problem>;
pub type PResult<T> = combinators::PResult<T, Context, Problem>;

/// Parses a JSON value from `src`.
///
/// On failure the dead ends are ordered first attempt first; the first entry
/// is the one [`crate::render_diagnostic`] reports. Trailing text after a
/// complete value is left unconsumed rather than rejected.
pub fn parse(src: &str) -> Result<Value, Vec<DeadEnd>> {
    let mut cur = Cursor::new(src);
    value(&mut cur).map_err(|failure| failure.dead_ends)
}

/// Zero or more spaces, newlines, carriage returns and tabs.
pub fn whitespace(cur: &mut Cursor<'_>) {
    cur.chomp_while(|c| matches!(c, ' ' | '\n' | '\r' | '\t'));
}

/// Any JSON value, surrounded by optional whitespace (context: Value).
///
/// The first characters of the six alternatives are disjoint, so the order
/// only matters for which dead end ends up first when all of them fail.
pub fn value(cur: &mut Cursor<'_>) -> PResult<Value> {
    in_context(cur, Context::Value, |cur| {
        // Pathologically nested input fails like any other parse error
        // instead of exhausting the call stack.
        if cur.context_depth() > MAX_NESTING {
            return Err(Failure {
                committed: true,
                dead_ends: vec![cur.dead_end(Problem::ExceededMaxNesting)],
            });
        }
        let start = cur.offset();
        whitespace(cur);
        let value = one_of(
            cur,
            &[
                null_value,
                bool_value,
                number_value,
                string_value,
                object_value,
                array_value,
            ],
        )
        .map_err(|failure| failure.committed_if(cur.offset() > start))?;
        whitespace(cur);
        Ok(value)
    })
}

fn null_value(cur: &mut Cursor<'_>) -> PResult<Value> {
    cur.token("null", Problem::ExpectedNull)?;
    Ok(Value::Null)
}

fn bool_value(cur: &mut Cursor<'_>) -> PResult<Value> {
    one_of(cur, &[true_value, false_value])
}

fn true_value(cur: &mut Cursor<'_>) -> PResult<Value> {
    cur.token("true", Problem::ExpectedBool)?;
    Ok(Value::Bool(true))
}

fn false_value(cur: &mut Cursor<'_>) -> PResult<Value> {
    cur.token("false", Problem::ExpectedBool)?;
    Ok(Value::Bool(false))
}

fn number_value(cur: &mut Cursor<'_>) -> PResult<Value> {
    number(cur).map(Value::Number)
}

fn string_value(cur: &mut Cursor<'_>) -> PResult<Value> {
    string(cur).map(Value::String)
}

fn object_value(cur: &mut Cursor<'_>) -> PResult<Value> {
    object(cur).map(Value::Object)
}

fn array_value(cur: &mut Cursor<'_>) -> PResult<Value> {
    array(cur).map(Value::Array)
}

/// `sign? digits fraction? exponent?` (context: Number).
///
/// The sign is a separate optional step before the mandatory digits, so `-x`
/// reports ExpectedDigit inside the Number context rather than
/// ExpectedNumber.
pub fn number(cur: &mut Cursor<'_>) -> PResult<f64> {
    in_context(cur, Context::Number, |cur| {
        let start = cur.offset();
        let sign = match cur.chomp_if(|c| c == '-', Problem::ExpectedNumber) {
            Ok(_) => -1.0,
            Err(_) => 1.0,
        };
        let integer = digits(cur).map_err(|f| f.committed_if(cur.offset() > start))?;
        let fraction = optional(cur, fraction)?.unwrap_or(0.0);
        let exponent = optional(cur, exponent)?.unwrap_or(1.0);
        Ok(sign * (integer + fraction) * exponent)
    })
}

fn digits(cur: &mut Cursor<'_>) -> PResult<f64> {
    let chomped = cur.chomp_while1(Problem::ExpectedDigit, |c| c.is_ascii_digit())?;
    // A digit-only slice always parses; overflow saturates to infinity.
    Ok(chomped.parse().unwrap())
}

/// `'.' digits`, valued as the digit string over 10^count (context: Fraction).
fn fraction(cur: &mut Cursor<'_>) -> PResult<f64> {
    in_context(cur, Context::Fraction, |cur| {
        let start = cur.offset();
        cur.token(".", Problem::ExpectedDecimalSeparator)?;
        let chomped = cur
            .chomp_while1(Problem::ExpectedDigit, |c| c.is_ascii_digit())
            .map_err(|f| f.committed_if(cur.offset() > start))?;
        let digits: f64 = chomped.parse().unwrap();
        Ok(digits / 10f64.powi(chomped.len() as i32))
    })
}

/// `('e'|'E') sign? digits`, valued as the 10^(sign * digits) multiplier
/// (context: Exponent).
fn exponent(cur: &mut Cursor<'_>) -> PResult<f64> {
    in_context(cur, Context::Exponent, |cur| {
        let start = cur.offset();
        cur.chomp_if(|c| c == 'e' || c == 'E', Problem::ExpectedExponentE)?;
        let sign = match cur.chomp_if(|c| c == '+' || c == '-', Problem::ExpectedSign) {
            Ok('-') => -1.0,
            _ => 1.0,
        };
        let digits = digits(cur).map_err(|f| f.committed_if(cur.offset() > start))?;
        Ok(10f64.powf(sign * digits))
    })
}

/// `'"' character* '"'`.
///
/// The delimiting quotes and the characters sit outside the String context on
/// purpose: an unterminated string is reported against the construct that
/// needed it (object key, array element, plain value), which is where the fix
/// belongs.
pub fn string(cur: &mut Cursor<'_>) -> PResult<String> {
    let start = cur.offset();
    cur.token("\"", Problem::ExpectedDoubleQuote)?;
    let mut text = String::new();
    loop {
        let mark = cur.mark();
        match character(cur) {
            Ok(c) => text.push(c),
            Err(failure) if failure.committed => return Err(failure),
            Err(_) => {
                cur.rewind(mark);
                break;
            }
        }
    }
    cur.token("\"", Problem::ExpectedDoubleQuote)
        .map_err(|f| f.committed_if(cur.offset() > start))?;
    Ok(text)
}

fn character(cur: &mut Cursor<'_>) -> PResult<char> {
    one_of(cur, &[escape, raw_char])
}

// Any code point from U+0020 up, except the string delimiter and the escape
// introducer.
fn raw_char(cur: &mut Cursor<'_>) -> PResult<char> {
    cur.chomp_if(
        |c| c != '"' && c != '\\' && c >= '\u{0020}',
        Problem::ExpectedChar,
    )
}

fn escape(cur: &mut Cursor<'_>) -> PResult<char> {
    cur.token("\\", Problem::ExpectedEscapedCharacter)?;
    if cur.rest().starts_with('u') {
        return unicode(cur).map_err(|f| f.committed_if(true));
    }
    cur.chomp_if(
        |c| matches!(c, 'n' | 'r' | '\\' | 'b' | 'f' | 't' | '/' | '"'),
        Problem::ExpectedEscapedCharacter,
    )
    .map(|c| match c {
        'n' => '\n',
        'r' => '\r',
        'b' => '\u{0008}',
        'f' => '\u{000C}',
        't' => '\t',
        other => other,
    })
    .map_err(|f| f.committed_if(true))
}

/// `'u'` followed by exactly four hex digits (context: Unicode).
fn unicode(cur: &mut Cursor<'_>) -> PResult<char> {
    in_context(cur, Context::Unicode, |cur| {
        let start = cur.offset();
        cur.token("u", Problem::ExpectedUnicodeU)?;
        let mut code_point = 0u32;
        for _ in 0..4 {
            let digit = cur
                .chomp_if(|c| c.is_ascii_hexdigit(), Problem::ExpectedUnicodeHex)
                .map_err(|f| f.committed_if(cur.offset() > start))?;
            code_point = code_point * 16 + digit.to_digit(16).unwrap();
        }
        // Lone surrogates are not scalar values; substitute U+FFFD.
        Ok(char::from_u32(code_point).unwrap_or('\u{FFFD}'))
    })
}

/// `'{' (entry (',' entry)*)? '}'` with no trailing comma (context: Object).
/// Duplicate keys keep the first occurrence's position, last value wins.
pub fn object(cur: &mut Cursor<'_>) -> PResult<IndexMap<String, Value>> {
    in_context(cur, Context::Object, |cur| {
        let entries = sequence(
            cur,
            &Delimited {
                start: ("{", Problem::ExpectedLeftBrace),
                separator: (",", Problem::ExpectedObjectSeparator),
                end: ("}", Problem::ExpectedRightBrace),
                trailing: Trailing::Forbidden,
            },
            whitespace,
            object_entry,
        )?;
        let mut object = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            object.insert(key, value);
        }
        Ok(object)
    })
}

fn object_entry(cur: &mut Cursor<'_>) -> PResult<(String, Value)> {
    let start = cur.offset();
    whitespace(cur);
    let key = in_context(cur, Context::ObjectKey, string)
        .map_err(|f| f.committed_if(cur.offset() > start))?;
    whitespace(cur);
    cur.token(":", Problem::ExpectedKeyValueSeparator)
        .map_err(|f| f.committed_if(cur.offset() > start))?;
    whitespace(cur);
    let value = in_context(cur, Context::ObjectValue, value)
        .map_err(|f| f.committed_if(cur.offset() > start))?;
    Ok((key, value))
}

/// `'[' (value (',' value)*)? ']'` with no trailing comma (context: Array).
pub fn array(cur: &mut Cursor<'_>) -> PResult<Vec<Value>> {
    in_context(cur, Context::Array, |cur| {
        sequence(
            cur,
            &Delimited {
                start: ("[", Problem::ExpectedLeftBracket),
                separator: (",", Problem::ExpectedArraySeparator),
                end: ("]", Problem::ExpectedRightBracket),
                trailing: Trailing::Forbidden,
            },
            whitespace,
            value,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(src: &str) -> DeadEnd {
        parse(src).unwrap_err().remove(0)
    }

    fn expect_number(src: &str, expected: f64) {
        match parse(src) {
            Ok(Value::Number(n)) => {
                assert!(
                    (n - expected).abs() <= expected.abs() * 1e-12,
                    "{src:?} parsed to {n}, expected {expected}"
                );
            }
            other => panic!("{src:?} parsed to {other:?}"),
        }
    }

    #[test]
    fn parses_literals() {
        assert_eq!(parse("null"), Ok(Value::Null));
        assert_eq!(parse("true"), Ok(Value::Bool(true)));
        assert_eq!(parse(" false "), Ok(Value::Bool(false)));
    }

    #[test]
    fn parses_integers() {
        assert_eq!(parse("0"), Ok(Value::Number(0.0)));
        assert_eq!(parse("42"), Ok(Value::Number(42.0)));
        assert_eq!(parse("-7"), Ok(Value::Number(-7.0)));
        // The grammar takes digits greedily, leading zeros included.
        assert_eq!(parse("0042"), Ok(Value::Number(42.0)));
    }

    #[test]
    fn parses_fractions_and_exponents() {
        expect_number("3.14", 3.14);
        expect_number("-3.14", -3.14);
        expect_number("0.25", 0.25);
        expect_number("1e3", 1000.0);
        expect_number("1E-3", 0.001);
        expect_number("2e+2", 200.0);
        expect_number("1.5e2", 150.0);
    }

    #[test]
    fn parses_strings_and_escapes() {
        assert_eq!(parse(r#""""#), Ok(Value::String(String::new())));
        assert_eq!(parse(r#""hello""#), Ok(Value::String("hello".into())));
        assert_eq!(
            parse(r#""a\n\t\"\\\/b""#),
            Ok(Value::String("a\n\t\"\\/b".into()))
        );
        assert_eq!(parse(r#""A""#), Ok(Value::String("A".into())));
        assert_eq!(parse(r#""é""#), Ok(Value::String("é".into())));
    }

    #[test]
    fn lone_surrogate_decodes_to_replacement_character() {
        assert_eq!(parse(r#""\ud800""#), Ok(Value::String("\u{FFFD}".into())));
    }

    #[test]
    fn parses_arrays() {
        assert_eq!(parse("[]"), Ok(Value::Array(vec![])));
        assert_eq!(
            parse("[1, [true], []]"),
            Ok(Value::Array(vec![
                Value::Number(1.0),
                Value::Array(vec![Value::Bool(true)]),
                Value::Array(vec![]),
            ]))
        );
    }

    #[test]
    fn parses_objects_in_source_order() {
        let object = match parse(r#"{ "b" : 1 , "a" : 2 }"#) {
            Ok(Value::Object(object)) => object,
            other => panic!("expected an object, got {other:?}"),
        };
        let keys: Vec<_> = object.keys().cloned().collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn duplicate_keys_keep_position_and_take_last_value() {
        let object = match parse(r#"{"a": 1, "b": 2, "a": 3}"#) {
            Ok(Value::Object(object)) => object,
            other => panic!("expected an object, got {other:?}"),
        };
        let entries: Vec<_> = object
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        assert_eq!(
            entries,
            [("a", Value::Number(3.0)), ("b", Value::Number(2.0))]
        );
    }

    #[test]
    fn trailing_text_is_left_unconsumed() {
        // The entry point does not demand end-of-input.
        assert_eq!(parse("12x"), Ok(Value::Number(12.0)));
    }

    #[test]
    fn pathological_nesting_fails_instead_of_overflowing() {
        let mut src = String::new();
        src.extend(std::iter::repeat('[').take(100_000));
        src.extend(std::iter::repeat(']').take(100_000));
        let dead_end = parse(&src).unwrap_err().remove(0);
        assert_eq!(dead_end.problem, Problem::ExceededMaxNesting);
    }

    #[test]
    fn moderate_nesting_still_parses() {
        let mut src = String::new();
        src.extend(std::iter::repeat('[').take(100));
        src.push('1');
        src.extend(std::iter::repeat(']').take(100));
        assert!(parse(&src).is_ok());
    }

    #[test]
    fn empty_input_fails_in_value_context() {
        let dead_end = first("");
        assert_eq!(dead_end.context_stack, [Context::Value]);
        assert_eq!((dead_end.row, dead_end.col), (1, 1));
    }

    #[test]
    fn unknown_token_aggregates_all_value_alternatives() {
        let dead_ends = parse("?").unwrap_err();
        assert_eq!(dead_ends[0].problem, Problem::ExpectedNull);
        assert_eq!(dead_ends[0].context_stack, [Context::Value]);
        let problems: Vec<_> = dead_ends.iter().map(|d| d.problem).collect();
        assert!(problems.contains(&Problem::ExpectedLeftBrace));
        assert!(problems.contains(&Problem::ExpectedLeftBracket));
    }

    #[test]
    fn missing_closing_quote_reports_double_quote() {
        let dead_end = first(r#""abc"#);
        assert_eq!(dead_end.problem, Problem::ExpectedDoubleQuote);
        assert_eq!(dead_end.context_stack, [Context::Value]);
        assert_eq!(dead_end.col, 5);
    }

    #[test]
    fn missing_key_value_separator_reports_in_object_context() {
        let dead_end = first(r#"{"a" 1}"#);
        assert_eq!(dead_end.problem, Problem::ExpectedKeyValueSeparator);
        assert_eq!(dead_end.context_stack.last(), Some(&Context::Object));
    }

    #[test]
    fn bad_array_separator_reports_in_array_context() {
        let dead_end = first("[12m]");
        assert_eq!(dead_end.problem, Problem::ExpectedArraySeparator);
        assert_eq!(dead_end.context_stack.last(), Some(&Context::Array));
        assert_eq!(dead_end.col, 4);
    }

    #[test]
    fn sign_without_digits_reports_digit_in_number_context() {
        let dead_end = first("-x");
        assert_eq!(dead_end.problem, Problem::ExpectedDigit);
        assert_eq!(dead_end.context_stack, [Context::Value, Context::Number]);
    }

    #[test]
    fn bare_fraction_dot_reports_in_fraction_context() {
        let dead_end = first("1.x");
        assert_eq!(dead_end.problem, Problem::ExpectedDigit);
        assert_eq!(
            dead_end.context_stack,
            [Context::Value, Context::Number, Context::Fraction]
        );
    }

    #[test]
    fn exponent_without_digits_reports_in_exponent_context() {
        let dead_end = first("1e");
        assert_eq!(dead_end.problem, Problem::ExpectedDigit);
        assert_eq!(
            dead_end.context_stack,
            [Context::Value, Context::Number, Context::Exponent]
        );
    }

    #[test]
    fn unknown_escape_reports_escaped_character() {
        let dead_end = first(r#""a\q""#);
        assert_eq!(dead_end.problem, Problem::ExpectedEscapedCharacter);
        assert_eq!(dead_end.col, 4);
    }

    #[test]
    fn short_unicode_escape_reports_in_unicode_context() {
        let dead_end = first(r#""\u12""#);
        assert_eq!(dead_end.problem, Problem::ExpectedUnicodeHex);
        assert_eq!(dead_end.context_stack.last(), Some(&Context::Unicode));
    }

    #[test]
    fn trailing_comma_in_object_reports_the_missing_key() {
        let dead_end = first(r#"{"a": 1,}"#);
        assert_eq!(dead_end.problem, Problem::ExpectedDoubleQuote);
        assert_eq!(dead_end.context_stack.last(), Some(&Context::ObjectKey));
    }

    #[test]
    fn unterminated_string_inside_object_reports_at_line_end() {
        let dead_end = first("{\n  \"a\": \"b\n}");
        assert_eq!(dead_end.problem, Problem::ExpectedDoubleQuote);
        assert_eq!((dead_end.row, dead_end.col), (2, 10));
        // The string production keeps its failures in the enclosing value's
        // context.
        assert_eq!(dead_end.context_stack.last(), Some(&Context::Value));
    }
}
