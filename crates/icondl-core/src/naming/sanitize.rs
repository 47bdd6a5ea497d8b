//! Filesystem-safe name sanitization.

/// Longest stem we emit; leaves room for a `.png` extension under NAME_MAX.
const STEM_MAX: usize = 251;

/// Sanitizes a candidate file or folder stem for safe use on Linux.
///
/// - Replaces NUL, `/`, `\`, and control characters with `_`
/// - Collapses runs of whitespace into a single space
/// - Trims leading/trailing spaces, dots and underscores
/// - Limits length to 251 bytes so `<stem>.png` fits in NAME_MAX
pub fn sanitize_stem(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_sep: Option<char> = None;

    for c in name.chars() {
        let replacement = if c == '\0' || c == '/' || c == '\\' || (c.is_control() && c != '\t') {
            '_'
        } else if c.is_whitespace() {
            ' '
        } else {
            c
        };

        if replacement == '_' || replacement == ' ' {
            if prev_sep != Some(replacement) {
                out.push(replacement);
            }
            prev_sep = Some(replacement);
        } else {
            out.push(replacement);
            prev_sep = None;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');

    if trimmed.len() > STEM_MAX {
        let mut take = STEM_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_slash_and_backslash() {
        assert_eq!(sanitize_stem("a/b\\c"), "a_b_c");
    }

    #[test]
    fn keeps_inner_spaces() {
        assert_eq!(sanitize_stem("Partly  Cloudy\tDay"), "Partly Cloudy Day");
    }

    #[test]
    fn trims_dots_and_spaces() {
        assert_eq!(sanitize_stem("  ..  Leaf  ..  "), "Leaf");
        assert_eq!(sanitize_stem(".."), "");
    }

    #[test]
    fn control_chars() {
        assert_eq!(sanitize_stem("sun\x00rise"), "sun_rise");
    }

    #[test]
    fn long_names_truncated_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_stem(&long);
        assert!(out.len() <= 251);
        assert!(out.chars().all(|c| c == 'é'));
    }
}
