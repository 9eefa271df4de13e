//! Extract Google resource ids from the URLs stored in the group registry.
//!
//! The registry carries full browser URLs (spreadsheet edit links, Drive
//! folder links); the APIs want bare ids. Bare ids are accepted as-is.

use regex::Regex;
use std::sync::OnceLock;

fn spreadsheet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").expect("spreadsheet regex"))
}

fn folder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"folders/([a-zA-Z0-9_-]+)").expect("folder regex"))
}

fn bare_id(locator: &str) -> Option<String> {
    (!locator.is_empty() && locator.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .then(|| locator.to_string())
}

/// Spreadsheet id from an edit URL or a bare id.
pub fn spreadsheet_id(locator: &str) -> Option<String> {
    spreadsheet_re()
        .captures(locator)
        .map(|c| c[1].to_string())
        .or_else(|| bare_id(locator))
}

/// Drive folder id from a folder URL or a bare id.
pub fn folder_id(locator: &str) -> Option<String> {
    folder_re()
        .captures(locator)
        .map(|c| c[1].to_string())
        .or_else(|| bare_id(locator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_spreadsheet_id_from_edit_url() {
        let url = "https://docs.google.com/spreadsheets/d/1O_qJx2uDsKhLvBvsZbak-ms1RGX7/edit#gid=0";
        assert_eq!(
            spreadsheet_id(url).as_deref(),
            Some("1O_qJx2uDsKhLvBvsZbak-ms1RGX7")
        );
    }

    #[test]
    fn accepts_bare_spreadsheet_id() {
        assert_eq!(spreadsheet_id("abc_DEF-123").as_deref(), Some("abc_DEF-123"));
    }

    #[test]
    fn extracts_folder_id_from_drive_url() {
        let url = "https://drive.google.com/drive/folders/1a2B-3c_4d?usp=sharing";
        assert_eq!(folder_id(url).as_deref(), Some("1a2B-3c_4d"));
    }

    #[test]
    fn rejects_unrelated_urls() {
        assert_eq!(spreadsheet_id("https://example.com/nothing/here"), None);
        assert_eq!(folder_id("https://example.com/nothing/here"), None);
        assert_eq!(spreadsheet_id(""), None);
    }
}
