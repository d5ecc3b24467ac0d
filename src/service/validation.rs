//! Query-string validation from per-parameter rules.

use crate::error::AppError;
use crate::query::RawParams;
use regex::Regex;

/// Format checks understood by [`ParamRule::format`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Uuid,
    DateTime,
    Boolean,
}

/// Constraint on one query parameter. An absent parameter passes unless `required`.
#[derive(Clone, Debug, Default)]
pub struct ParamRule {
    pub required: bool,
    pub format: Option<Format>,
    pub pattern: Option<&'static str>,
    pub allowed: Option<&'static [&'static str]>,
}

impl ParamRule {
    pub fn format(format: Format) -> Self {
        ParamRule { format: Some(format), ..Default::default() }
    }

    pub fn pattern(pattern: &'static str) -> Self {
        ParamRule { pattern: Some(pattern), ..Default::default() }
    }

    pub fn one_of(allowed: &'static [&'static str]) -> Self {
        ParamRule { allowed: Some(allowed), ..Default::default() }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

pub const LISTING_CATEGORIES: &[&str] = &[
    "FOOD",
    "ART",
    "ADVENTURE",
    "CULTURE",
    "PHOTOGRAPHY",
    "NIGHTLIFE",
    "NATURE",
    "ARCHITECTURE",
    "SHOPPING",
    "FAMILY",
    "SPORTS",
    "HISTORY",
];
pub const LISTING_STATUSES: &[&str] = &["DRAFT", "ACTIVE", "INACTIVE", "BLOCKED"];
pub const FEE_TYPES: &[&str] = &["PER_PERSON", "PER_GROUP"];
pub const BOOKING_STATUSES: &[&str] = &["PENDING", "ACCEPTED", "DECLINED", "PAID", "COMPLETED", "CANCELLED"];
pub const ROLES: &[&str] = &["TOURIST", "GUIDE", "ADMIN"];
pub const SORT_ORDERS: &[&str] = &["asc", "desc"];
pub const BOOLEANS: &[&str] = &["true", "false"];

pub struct QueryValidator;

impl QueryValidator {
    /// Check every present parameter that has a rule. Parameters without a rule are not inspected.
    pub fn validate(params: &RawParams, rules: &[(&str, ParamRule)]) -> Result<(), AppError> {
        for (name, rule) in rules {
            match params.get(*name).filter(|v| !v.is_empty()) {
                Some(v) => validate_param(name, v, rule)?,
                None if rule.required => return Err(AppError::Validation(format!("{} is required", name))),
                None => {}
            }
        }
        Ok(())
    }
}

fn validate_param(name: &str, v: &str, rule: &ParamRule) -> Result<(), AppError> {
    if let Some(format) = rule.format {
        validate_format(name, v, format)?;
    }
    if let Some(pattern) = rule.pattern {
        let re = Regex::new(pattern).map_err(|_| AppError::Validation(format!("invalid pattern for {}", name)))?;
        if !re.is_match(v) {
            return Err(AppError::Validation(format!("{} does not match required pattern", name)));
        }
    }
    if let Some(allowed) = rule.allowed {
        if !allowed.contains(&v) {
            return Err(AppError::Validation(format!("{} must be one of: {}", name, allowed.join(", "))));
        }
    }
    Ok(())
}

fn validate_format(name: &str, v: &str, format: Format) -> Result<(), AppError> {
    let ok = match format {
        Format::Uuid => uuid::Uuid::parse_str(v).is_ok(),
        Format::DateTime => chrono::DateTime::parse_from_rfc3339(v).is_ok(),
        Format::Boolean => BOOLEANS.contains(&v),
    };
    if ok {
        Ok(())
    } else {
        let what = match format {
            Format::Uuid => "a valid UUID",
            Format::DateTime => "a valid ISO 8601 datetime",
            Format::Boolean => "true or false",
        };
        Err(AppError::Validation(format!("{} must be {}", name, what)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> RawParams {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn absent_params_pass() {
        let rules = [("category", ParamRule::one_of(LISTING_CATEGORIES))];
        assert!(QueryValidator::validate(&params(&[]), &rules).is_ok());
    }

    #[test]
    fn enum_values_are_checked() {
        let rules = [("status", ParamRule::one_of(BOOKING_STATUSES))];
        assert!(QueryValidator::validate(&params(&[("status", "PAID")]), &rules).is_ok());
        let err = QueryValidator::validate(&params(&[("status", "paid")]), &rules).unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m.starts_with("status must be one of")));
    }

    #[test]
    fn formats_and_patterns() {
        let rules = [
            ("guideId", ParamRule::format(Format::Uuid)),
            ("date", ParamRule::format(Format::DateTime)),
            ("dayOfWeek", ParamRule::pattern("^[0-6]$")),
        ];
        let ok = params(&[
            ("guideId", "5f0c7f2e-2b7a-4c1e-9d59-0a7f3e1c2b11"),
            ("date", "2026-05-01T10:00:00Z"),
            ("dayOfWeek", "6"),
        ]);
        assert!(QueryValidator::validate(&ok, &rules).is_ok());
        assert!(QueryValidator::validate(&params(&[("guideId", "nope")]), &rules).is_err());
        assert!(QueryValidator::validate(&params(&[("date", "tomorrow")]), &rules).is_err());
        assert!(QueryValidator::validate(&params(&[("dayOfWeek", "7")]), &rules).is_err());
    }

    #[test]
    fn required_params_must_be_present() {
        let rules = [("guideId", ParamRule::format(Format::Uuid).required())];
        let err = QueryValidator::validate(&params(&[]), &rules).unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "guideId is required"));
        assert!(QueryValidator::validate(&params(&[("guideId", "")]), &rules).is_err());
        assert!(QueryValidator::validate(&params(&[("guideId", "5f0c7f2e-2b7a-4c1e-9d59-0a7f3e1c2b11")]), &rules).is_ok());
    }

    #[test]
    fn unruled_params_are_ignored() {
        let rules = [("read", ParamRule::format(Format::Boolean))];
        assert!(QueryValidator::validate(&params(&[("anything", "goes")]), &rules).is_ok());
        assert!(QueryValidator::validate(&params(&[("read", "yes")]), &rules).is_err());
    }
}
