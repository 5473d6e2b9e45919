//! Small text helpers shared by the renderers.

/// Format an integer with comma thousands separators.
///
/// # Examples
///
/// ```
/// use pulse_report::format::format_thousands;
///
/// assert_eq!(format_thousands(1234567), "1,234,567");
/// assert_eq!(format_thousands(-4200), "-4,200");
/// assert_eq!(format_thousands(999), "999");
/// ```
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Capitalize the first letter of every word and lowercase the rest.
///
/// # Examples
///
/// ```
/// use pulse_report::format::title_case;
///
/// assert_eq!(title_case("tiktok"), "Tiktok");
/// assert_eq!(title_case("YOUTUBE shorts"), "Youtube Shorts");
/// assert_eq!(title_case("x"), "X");
/// ```
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Escape text for inclusion in HTML element content or attribute values.
///
/// # Examples
///
/// ```
/// use pulse_report::format::escape_html;
///
/// assert_eq!(escape_html("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_boundaries() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(100000), "100,000");
        assert_eq!(format_thousands(-1), "-1");
        assert_eq!(format_thousands(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn title_case_splits_on_punctuation() {
        assert_eq!(title_case("x-twitter"), "X-Twitter");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn escape_html_leaves_plain_text() {
        assert_eq!(escape_html("https://example.com/p?id=1"), "https://example.com/p?id=1");
        assert_eq!(escape_html("it's"), "it&#39;s");
    }
}
