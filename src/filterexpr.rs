use std::fmt;

use regex::RegexBuilder;

/// A filter the user typed. Plain text is a case-insensitive substring
/// match, `=text` matches the whole value, `~pattern` is a regex.
#[derive(Debug, Clone)]
pub enum Predicate {
    Substring(String),
    Equals(String),
    Regex(regex::Regex),
}

#[derive(Debug)]
pub struct FilterSyntaxError {
    pub message: String,
}

impl fmt::Display for FilterSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FilterSyntaxError {}

impl Predicate {
    pub fn parse(text: &str) -> Result<Predicate, FilterSyntaxError> {
        if let Some(pattern) = text.strip_prefix('~') {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|err| FilterSyntaxError {
                    message: err.to_string(),
                })?;
            Ok(Predicate::Regex(regex))
        } else if let Some(exact) = text.strip_prefix('=') {
            Ok(Predicate::Equals(exact.to_lowercase()))
        } else {
            Ok(Predicate::Substring(text.to_lowercase()))
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Predicate::Substring(needle) => value.to_lowercase().contains(needle.as_str()),
            Predicate::Equals(expected) => value.to_lowercase() == *expected,
            Predicate::Regex(regex) => regex.is_match(value),
        }
    }
}

/// A committed predicate together with the text it was parsed from, so the
/// edit box can be refilled and the footer can show it.
#[derive(Debug, Clone)]
pub struct Filter {
    pub text: String,
    pub predicate: Predicate,
}

impl Filter {
    pub fn parse(text: &str) -> Result<Filter, FilterSyntaxError> {
        Ok(Filter {
            text: text.to_string(),
            predicate: Predicate::parse(text)?,
        })
    }
}
