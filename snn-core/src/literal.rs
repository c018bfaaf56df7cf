//! C literal formatting for generated kernels

/// Format `x` as a C `double` literal that parses back to the same value.
/// Returns `None` for NaN and infinities, which have no portable literal.
pub fn c_double(x: f64) -> Option<String> {
    if !x.is_finite() {
        return None;
    }
    // Debug output is the shortest round-trip form and always has a '.' or an exponent.
    Some(format!("{:?}", x))
}

#[inline]
pub fn c_flag(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

/// Brace initializer; `{0}` for an empty list since C forbids `{}`.
pub fn c_initializer<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from("{");
    let mut empty = true;
    for item in items {
        if !empty {
            out.push_str(", ");
        }
        out.push_str(item.as_ref());
        empty = false;
    }
    if empty {
        out.push('0');
    }
    out.push('}');
    out
}
