//! Case-insensitive matching helpers shared by the condition checks

use lead_router_config::{MatchMode, SetFilter};

pub(crate) fn eq_ci(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Whether `value` (if present) equals any entry of `set`
pub(crate) fn in_set(set: &[String], value: Option<&str>) -> bool {
    value.map_or(false, |v| set.iter().any(|s| eq_ci(s, v)))
}

/// Apply an include/exclude filter to the values a person carries
///
/// Excluded values always fail. With no includes the filter passes. ANY
/// needs one included value present, ALL needs every one.
pub(crate) fn set_filter_matches(filter: &SetFilter, values: &[&str]) -> Result<(), String> {
    let has = |needle: &str| values.iter().any(|v| eq_ci(v, needle));

    if let Some(excluded) = filter.exclude.iter().find(|e| has(e)) {
        return Err(format!("'{}' is excluded", excluded));
    }

    if filter.include.is_empty() {
        return Ok(());
    }

    match filter.match_mode {
        MatchMode::Any => {
            if filter.include.iter().any(|i| has(i)) {
                Ok(())
            } else {
                Err(format!("none of [{}] present", filter.include.join(", ")))
            }
        }
        MatchMode::All => match filter.include.iter().find(|i| !has(i)) {
            Some(missing) => Err(format!("'{}' missing", missing)),
            None => Ok(()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(include: &[&str], exclude: &[&str], match_mode: MatchMode) -> SetFilter {
        SetFilter {
            include: include.iter().map(|s| s.to_string()).collect(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
            match_mode,
        }
    }

    #[test]
    fn test_eq_ci() {
        assert!(eq_ci("Hispanic", "hispanic"));
        assert!(eq_ci(" TX ", "tx"));
        assert!(eq_ci("ÉCOLE", "école"));
        assert!(!eq_ci("austin", "dallas"));
    }

    #[test]
    fn test_in_set() {
        let set = vec!["Austin".to_string(), "Dallas".to_string()];
        assert!(in_set(&set, Some("austin")));
        assert!(!in_set(&set, Some("houston")));
        assert!(!in_set(&set, None));
    }

    #[test]
    fn test_any_mode() {
        let f = filter(&["spanish", "english"], &[], MatchMode::Any);
        assert!(set_filter_matches(&f, &["English"]).is_ok());
        assert!(set_filter_matches(&f, &["french"]).is_err());
        assert!(set_filter_matches(&f, &[]).is_err());
    }

    #[test]
    fn test_all_mode() {
        let f = filter(&["vip", "investor"], &[], MatchMode::All);
        assert!(set_filter_matches(&f, &["VIP", "Investor", "repeat"]).is_ok());
        assert_eq!(
            set_filter_matches(&f, &["vip"]),
            Err("'investor' missing".to_string())
        );
    }

    #[test]
    fn test_exclude_wins() {
        let f = filter(&["vip"], &["do-not-contact"], MatchMode::Any);
        assert!(set_filter_matches(&f, &["vip", "Do-Not-Contact"]).is_err());

        let exclude_only = filter(&[], &["spam"], MatchMode::Any);
        assert!(set_filter_matches(&exclude_only, &[]).is_ok());
        assert!(set_filter_matches(&exclude_only, &["spam"]).is_err());
    }
}
