//! Value coercion shared by the adapter, the overlay layer, and the rules.
//!
//! Every boolean-ish or numeric-looking value in a record goes through this
//! module; nothing else interprets raw JSON scalars.

use serde_json::Value;

use super::Numeric;

/// Interpret a JSON value as a capability flag.
///
/// | Input | Result |
/// |-------|--------|
/// | `true` / `false` | itself |
/// | number `1` | `true` |
/// | any other number | `false` |
/// | string `yes`, `y`, `true`, `1` (trimmed, any case) | `true` |
/// | any other string (including `no`, `n`, `false`, `0`) | `false` |
/// | `null`, array, object | `false` |
pub fn to_bool_flag(value: &Value) -> bool {
  match value {
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64() == Some(1.0),
    Value::String(s) => is_truthy_str(s),
    Value::Null | Value::Array(_) | Value::Object(_) => false,
  }
}

/// The string half of [`to_bool_flag`].
pub fn is_truthy_str(s: &str) -> bool {
  matches!(
    s.trim().to_ascii_lowercase().as_str(),
    "yes" | "y" | "true" | "1"
  )
}

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// `true` when a length is written in millimetres.
pub fn is_millimetres(raw: &str) -> bool { raw.to_ascii_lowercase().contains("mm") }

/// Parse the leading number out of a human-entered string.
///
/// Leading whitespace and a `$` are skipped and thousands separators are
/// dropped, so `2.5" OD` gives `2.5`, `.156` gives `0.156` and `$1,200` gives
/// `1200`. Fractions are read as written: `3/16"` gives `0.1875`, and both
/// `1-3/4"` and `1 3/4"` give `1.75`.
///
/// Returns `None` when the number is followed directly by more digits, a dot,
/// or a slash (`1.2.3`, `3/16/2`), since any value read from it would be a
/// misreading.
pub fn leading_number(s: &str) -> Option<f64> {
  let text = s.trim_start().trim_start_matches('$').trim_start();
  let b = text.as_bytes();
  let (whole, mut end, had_dot) = scan_decimal(b)?;
  let mut value = whole;

  if !had_dot {
    match b.get(end) {
      Some(b'/') => {
        let (den, after) = scan_integer(b, end + 1)?;
        if den == 0.0 {
          return None;
        }
        value = whole / den;
        end = after;
      }
      Some(b'-' | b' ') => {
        if let Some((fraction, after)) = scan_fraction(b, end + 1) {
          value = whole + fraction;
          end = after;
        }
      }
      _ => {}
    }
  }

  match b.get(end) {
    Some(b'0'..=b'9' | b'.' | b'/') => None,
    _ => Some(value),
  }
}

/// Digits with at most one `.`; a `,` is skipped when it sits between
/// digits. Returns the value, the end offset, and whether a dot was seen.
fn scan_decimal(b: &[u8]) -> Option<(f64, usize, bool)> {
  let mut digits = String::new();
  let mut seen_dot = false;
  let mut seen_digit = false;
  let mut i = 0;

  while let Some(&ch) = b.get(i) {
    match ch {
      b'0'..=b'9' => {
        seen_digit = true;
        digits.push(char::from(ch));
      }
      b'.' if !seen_dot => {
        seen_dot = true;
        digits.push('.');
      }
      b',' if seen_digit
        && !seen_dot
        && b.get(i + 1).is_some_and(u8::is_ascii_digit) => {}
      _ => break,
    }
    i += 1;
  }

  if !seen_digit {
    return None;
  }
  let value = digits.trim_end_matches('.').parse().ok()?;
  Some((value, i, seen_dot))
}

/// A run of plain digits starting at `start`.
fn scan_integer(b: &[u8], start: usize) -> Option<(f64, usize)> {
  let end = start
    + b[start.min(b.len())..]
      .iter()
      .take_while(|c| c.is_ascii_digit())
      .count();
  if end == start {
    return None;
  }
  let digits = std::str::from_utf8(&b[start..end]).ok()?;
  Some((digits.parse().ok()?, end))
}

/// `N/D` starting at `start`, with a non-zero denominator.
fn scan_fraction(b: &[u8], start: usize) -> Option<(f64, usize)> {
  let (num, slash) = scan_integer(b, start)?;
  if b.get(slash) != Some(&b'/') {
    return None;
  }
  let (den, end) = scan_integer(b, slash + 1)?;
  (den != 0.0).then(|| (num / den, end))
}

/// Coerce a record value into a [`Numeric`].
///
/// Returns `None` for absent values (`null` or a blank string). Values that are
/// present but not numeric come back as [`Numeric::Invalid`] with their raw
/// text.
pub fn to_numeric(value: &Value) -> Option<Numeric> {
  match value {
    Value::Null => None,
    Value::Number(n) => Some(match n.as_f64() {
      Some(f) if f.is_finite() => Numeric::Parsed(f),
      _ => Numeric::Invalid(n.to_string()),
    }),
    Value::String(s) if s.trim().is_empty() => None,
    Value::String(s) => Some(match leading_number(s) {
      Some(f) => Numeric::Parsed(f),
      None => Numeric::Invalid(s.clone()),
    }),
    other => Some(Numeric::Invalid(other.to_string())),
  }
}

/// Coerce a record value into a trimmed, non-empty string.
///
/// Numbers and booleans are rendered as text; arrays and objects are not
/// strings and yield `None`.
pub fn to_text(value: &Value) -> Option<String> {
  let s = match value {
    Value::String(s) => s.trim().to_owned(),
    Value::Number(n) => n.to_string(),
    Value::Bool(b) => b.to_string(),
    Value::Null | Value::Array(_) | Value::Object(_) => return None,
  };
  (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn bool_flag_truth_table() {
    let cases = [
      (json!(true), true),
      (json!(false), false),
      (json!(1), true),
      (json!(1.0), true),
      (json!(0), false),
      (json!(2), false),
      (json!(-1), false),
      (json!("yes"), true),
      (json!("Y"), true),
      (json!(" TRUE "), true),
      (json!("1"), true),
      (json!("no"), false),
      (json!("n"), false),
      (json!("false"), false),
      (json!("0"), false),
      (json!("available"), false),
      (json!(""), false),
      (json!(null), false),
      (json!(["yes"]), false),
      (json!({ "value": true }), false),
    ];
    for (input, expected) in cases {
      assert_eq!(to_bool_flag(&input), expected, "input: {input}");
    }
  }

  #[test]
  fn leading_number_handles_units_and_separators() {
    assert_eq!(leading_number("2.5\" OD"), Some(2.5));
    assert_eq!(leading_number(".156"), Some(0.156));
    assert_eq!(leading_number("$1,200"), Some(1200.0));
    assert_eq!(leading_number("  195°"), Some(195.0));
    assert_eq!(leading_number("3."), Some(3.0));
    assert_eq!(leading_number("$1,200 "), Some(1200.0));
    assert_eq!(leading_number("about 2"), None);
    assert_eq!(leading_number("."), None);
    assert_eq!(leading_number(""), None);
  }

  #[test]
  fn leading_number_reads_fractions() {
    assert_eq!(leading_number("3/16\""), Some(0.1875));
    assert_eq!(leading_number("1-3/4\" OD"), Some(1.75));
    assert_eq!(leading_number("1 3/4\""), Some(1.75));
    assert_eq!(leading_number("2 inches"), Some(2.0));
    assert_eq!(leading_number("1000-1500"), Some(1000.0));
  }

  #[test]
  fn leading_number_rejects_ambiguous_tails() {
    assert_eq!(leading_number("1.2.3"), None);
    assert_eq!(leading_number("3/16/2"), None);
    assert_eq!(leading_number("3/0"), None);
    assert_eq!(leading_number("3/"), None);
    assert_eq!(leading_number("1.5/2"), None);
    assert_eq!(
      to_numeric(&json!("3/16/2")),
      Some(Numeric::Invalid("3/16/2".into()))
    );
  }

  #[test]
  fn to_numeric_keeps_raw_text_of_invalid_values() {
    assert_eq!(to_numeric(&json!(195)), Some(Numeric::Parsed(195.0)));
    assert_eq!(to_numeric(&json!(".156")), Some(Numeric::Parsed(0.156)));
    assert_eq!(to_numeric(&json!("   ")), None);
    assert_eq!(to_numeric(&json!(null)), None);
    assert_eq!(
      to_numeric(&json!("lots")),
      Some(Numeric::Invalid("lots".into()))
    );
    assert_eq!(
      to_numeric(&json!(true)),
      Some(Numeric::Invalid("true".into()))
    );
  }

  #[test]
  fn to_text_trims_and_drops_blanks() {
    assert_eq!(to_text(&json!("  Available ")), Some("Available".into()));
    assert_eq!(to_text(&json!("")), None);
    assert_eq!(to_text(&json!(3)), Some("3".into()));
    assert_eq!(to_text(&json!([1])), None);
  }
}
