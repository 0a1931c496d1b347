//! UI-facing state derived from interpreter variables.

use serde::Serialize;
use tale_core::{Story, VarValue};

use crate::config::SessionConfig;

/// Values republished from the interpreter after every advancement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedState {
    /// The coin counter.
    pub coins: i64,
    /// Labels of the inventory flags that are set, in configured order.
    pub inventory: Vec<String>,
}

impl DerivedState {
    /// Read the configured variables from a story.
    pub fn from_story<S: Story>(story: &S, config: &SessionConfig) -> Self {
        let coins = coerce_int(story.variable(&config.coin_variable).as_ref());
        let inventory = config
            .inventory
            .iter()
            .filter(|item| story.variable(&item.flag).is_some_and(|v| v.is_truthy()))
            .map(|item| item.label.clone())
            .collect();
        Self { coins, inventory }
    }
}

/// Read a variable as an integer without failing.
///
/// Numbers are used directly (floats truncated); anything else is parsed
/// from its text form, and unparsable or absent values become 0.
pub fn coerce_int(value: Option<&VarValue>) -> i64 {
    match value {
        None => 0,
        Some(VarValue::Int(n)) => *n,
        Some(VarValue::Float(n)) if n.is_finite() => n.trunc() as i64,
        Some(VarValue::Float(_)) => 0,
        Some(other) => parse_leading_int(&other.to_string()),
    }
}

/// Parse the integer at the start of `text`: optional whitespace, an
/// optional sign, then digits. Trailing text is ignored; no digits gives 0.
/// Values beyond the `i64` range saturate.
pub fn parse_leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    for d in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(d - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }
    value
}
