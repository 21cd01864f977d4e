use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Full name: at least two alphabetic words separated by single spaces
    /// - Valid: "Ravi Kumar", "Anna Maria Lopez"
    /// - Invalid: "Ravi", "Ravi  Kumar", "R2 D2", "Mary-Jane Smith"
    pub static ref FULL_NAME_REGEX: Regex = Regex::new(r"^[A-Za-z]+(?: [A-Za-z]+)+$").unwrap();

    /// Institutional email: 10 hex characters followed by the college domain
    /// - Valid: "24691f00e3@mits.ac.in"
    /// - Invalid: "24691f00e@mits.ac.in", "24691g00e3@mits.ac.in", "24691f00e3@gmail.com"
    pub static ref COLLEGE_EMAIL_REGEX: Regex =
        Regex::new(r"(?i)^[a-f0-9]{10}@mits\.ac\.in$").unwrap();

    /// Registration email: a Gmail address (compared after lowercasing)
    /// - Valid: "ravi.kumar+portal@gmail.com"
    /// - Invalid: "ravi@yahoo.com", "ravi@gmail.co"
    pub static ref PERSONAL_EMAIL_REGEX: Regex = Regex::new(r"^[\w.+-]+@gmail\.com$").unwrap();
}

/// Trim and lowercase an email before comparison or storage
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_full_name(name: &str) -> bool {
    FULL_NAME_REGEX.is_match(name.trim())
}

pub fn is_college_email(email: &str) -> bool {
    COLLEGE_EMAIL_REGEX.is_match(email.trim())
}

pub fn is_personal_email(email: &str) -> bool {
    PERSONAL_EMAIL_REGEX.is_match(&normalize_email(email))
}
