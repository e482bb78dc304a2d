//! Lexical URL features
//!
//! Cheap signals computed from the URL text alone. Neither classification
//! strategy consults them; they are exposed through the `features` command.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref LEADING_IPV4: Regex = Regex::new(r"^\d+\.\d+\.\d+\.\d+").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UrlFeatures {
    pub has_ip: bool,
    pub length: usize,
    pub has_https: bool,
    pub count_dots: usize,
    pub count_at: usize,
    pub count_dash: usize,
    pub count_slash: usize,
    pub count_percent: usize,
    pub count_question: usize,
}

impl UrlFeatures {
    /// Features as a flat numeric vector, in declaration order.
    pub fn to_vector(&self) -> [usize; 9] {
        [
            self.has_ip as usize,
            self.length,
            self.has_https as usize,
            self.count_dots,
            self.count_at,
            self.count_dash,
            self.count_slash,
            self.count_percent,
            self.count_question,
        ]
    }
}

pub fn extract_features(url: &str) -> UrlFeatures {
    let count = |c: char| url.matches(c).count();

    UrlFeatures {
        has_ip: LEADING_IPV4.is_match(url),
        length: url.chars().count(),
        has_https: url.starts_with("https"),
        count_dots: count('.'),
        count_at: count('@'),
        count_dash: count('-'),
        count_slash: count('/'),
        count_percent: count('%'),
        count_question: count('?'),
    }
}
