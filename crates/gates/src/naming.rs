// SPDX-License-Identifier: MIT

//! Built-in file-naming convention checks, with a regex fallback for any
//! convention string the built-ins don't recognize.

use regex::Regex;

pub fn check_convention(stem: &str, convention: &str) -> bool {
    match convention {
        "kebab-case" => regex_is_match(r"^[a-z0-9]+(-[a-z0-9]+)*$", stem),
        "camelCase" => regex_is_match(r"^[a-z][a-zA-Z0-9]*$", stem),
        "PascalCase" => regex_is_match(r"^[A-Z][a-zA-Z0-9]*$", stem),
        "snake_case" => regex_is_match(r"^[a-z0-9]+(_[a-z0-9]+)*$", stem),
        "SCREAMING_SNAKE_CASE" => regex_is_match(r"^[A-Z0-9]+(_[A-Z0-9]+)*$", stem),
        other => Regex::new(other).map(|re| re.is_match(stem)).unwrap_or(false),
    }
}

fn regex_is_match(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).map(|re| re.is_match(value)).unwrap_or(false)
}
