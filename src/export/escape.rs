//! HTML escaping and file naming

/// Replace the five HTML-significant characters with entities
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Download name for a casino: word characters of its name + `_profile.html`
pub fn export_file_name(casino_name: &str) -> String {
    let stem: String = casino_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if stem.is_empty() {
        "casino_profile.html".to_string()
    } else {
        format!("{}_profile.html", stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("Lucky Star Casino!"), "LuckyStarCasino_profile.html");
        assert_eq!(export_file_name("joy_casino-2"), "joy_casino2_profile.html");
        assert_eq!(export_file_name("Казино"), "casino_profile.html");
        assert_eq!(export_file_name(""), "casino_profile.html");
    }
}
