use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating file extensions from the allow-list and from uploads
    /// Lowercase alphanumeric, 1 to 10 characters
    /// - Valid: "pdf", "xlsx", "p7m"
    /// - Invalid: "", ".pdf", "PDF", "tar.gz"
    pub static ref EXTENSION_REGEX: Regex = Regex::new(r"^[a-z0-9]{1,10}$").unwrap();

    /// Regex for validating pay period labels
    /// Free text without control characters, 1 to 100 characters
    /// - Valid: "2024-03", "March 2024", "Q1 2024 / Bonus"
    /// - Invalid: "", "line\nbreak"
    pub static ref PAY_PERIOD_REGEX: Regex = Regex::new(r"^[^\x00-\x1F\x7F]{1,100}$").unwrap();

    /// Regex for generated storage names
    /// - Valid: "payroll_0190a1b2-c3d4-7e5f-8a9b-0c1d2e3f4a5b.pdf"
    /// - Invalid: "../etc/passwd", "payroll_x.pdf"
    pub static ref STORED_NAME_REGEX: Regex = Regex::new(
        r"^payroll_[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\.[a-z0-9]{1,10}$"
    )
    .unwrap();
}

/// Lowercased extension of an uploaded filename, if it has one
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    EXTENSION_REGEX.is_match(&ext).then_some(ext)
}
