// Helper functions for safe logging, file names and SQL identifiers

use unicode_normalization::UnicodeNormalization;

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```ignore
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 && !parts[0].is_empty() {
            let first: String = parts[0].chars().take(1).collect();
            format!("{}***@{}", first, parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Reduces a client-supplied file name to a safe, flat, ASCII-only name.
///
/// Accented letters are decomposed (NFKD) so `é` keeps its `e`. Path
/// separators become spaces, runs of whitespace become a single `_`,
/// anything outside `[A-Za-z0-9_.-]` is dropped, and leading or trailing
/// dots and underscores are stripped. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Quotes an SQL identifier for SQLite (`"name"`, embedded quotes doubled)
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Lower-case extension of a file name, without the dot
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() && ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_email_log() {
        assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
        assert_eq!(safe_email_log("abc"), "***@***.***");
        assert_eq!(safe_email_log("not-an-email"), "***@***.***");
    }

    #[test]
    fn test_secure_filename_flattens_paths() {
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("My Resume (final).pdf"), "My_Resume_final.pdf");
        assert_eq!(secure_filename("C:\\Users\\me\\cv.docx"), "C_Users_me_cv.docx");
    }

    #[test]
    fn test_secure_filename_strips_unicode_and_edges() {
        assert_eq!(secure_filename("résumé.pdf"), "resume.pdf");
        assert_eq!(secure_filename("Ångström ﬁle.pdf"), "Angstrom_file.pdf");
        assert_eq!(secure_filename("履歴書.pdf"), "pdf");
        assert_eq!(secure_filename("._hidden_."), "hidden");
        assert_eq!(secure_filename("..."), "");
        assert_eq!(secure_filename("jane.doe@example.com"), "jane.doeexample.com");
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("email"), "\"email\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("cv.PDF"), Some("pdf".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("noext"), None);
    }
}
