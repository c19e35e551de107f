//! Ordered URL pattern rules and first-match lookup.

use crate::error::{Error, Result};
use crate::options::OptionSet;
use regex::Regex;
use url::Url;

/// One `pattern -> default options` entry.
///
/// Patterns are regular expressions implicitly anchored at the start of the
/// URL (prefix semantics). A pattern may still use internal anchors,
/// including `$` for a full-string match.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pattern: String,
    regex: Regex,
    options: OptionSet,
}

impl PatternRule {
    /// Compile a rule. Fails with [`Error::Pattern`] on invalid regex syntax.
    pub fn new(pattern: impl Into<String>, options: OptionSet) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&format!(r"\A(?:{pattern})")).map_err(|source| Error::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        Ok(PatternRule {
            pattern,
            regex,
            options,
        })
    }

    /// The pattern as configured, without the implicit anchor.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The default options this rule applies.
    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    /// Test the rule against an absolute URL string.
    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }
}

/// An ordered list of [`PatternRule`]s with first-match-wins semantics.
///
/// Order is significant and preserved exactly as configured: it is the
/// tie-break for overlapping patterns, so more specific patterns must be
/// listed before more general ones (`.*/foo-bar` before `.*`).
///
/// # Examples
///
/// ```
/// use scoped_http::{OptionSet, Params, RuleSet};
///
/// let rules = RuleSet::new(vec![
///     (".*/foo-bar".to_string(), OptionSet::new().with_query(Params::from_pairs([("abc", "def")]))),
///     (".*".to_string(), OptionSet::new().with_query(Params::from_pairs([("abc", "ydp")]))),
/// ]).unwrap();
///
/// let rule = rules.first_match("http://example.com/foo-bar").unwrap();
/// assert_eq!(rule.pattern(), ".*/foo-bar");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<PatternRule>,
    fallback: Option<usize>,
}

impl RuleSet {
    /// Compile an ordered `(pattern, options)` list.
    pub fn new(entries: Vec<(String, OptionSet)>) -> Result<Self> {
        let mut rules = Vec::with_capacity(entries.len());
        for (pattern, options) in entries {
            rules.push(PatternRule::new(pattern, options)?);
        }
        Ok(RuleSet {
            rules,
            fallback: None,
        })
    }

    /// Designate an existing rule, by its pattern, as the fallback used when
    /// a relative URL has no usable base.
    ///
    /// Fails with a configuration error when no rule carries that pattern.
    pub fn with_fallback(mut self, pattern: &str) -> Result<Self> {
        match self.rules.iter().position(|r| r.pattern() == pattern) {
            Some(index) => {
                self.fallback = Some(index);
                Ok(self)
            }
            None => Err(Error::config(vec![format!(
                "no options are mapped to the '{pattern}' fallback pattern"
            )])),
        }
    }

    /// Build a single-rule set scoped to a literal base URL.
    ///
    /// The pattern is the base resolved against `"."` (normalizing trailing
    /// path segments the way URL joining does) and regex-escaped, so it
    /// matches exactly the URLs living under that base. The rule carries
    /// `base_uri` and is designated the fallback, so relative request URLs
    /// adopt it wholesale.
    pub fn for_base_uri(base_uri: &str, defaults: OptionSet) -> Result<Self> {
        let base = Url::parse(base_uri).map_err(|source| Error::UrlParse {
            url: base_uri.to_string(),
            source,
        })?;
        let prefix = base.join(".").map_err(|source| Error::UrlParse {
            url: base_uri.to_string(),
            source,
        })?;
        let pattern = regex::escape(prefix.as_str());
        let defaults = defaults.with_base_uri(base_uri);
        RuleSet::new(vec![(pattern.clone(), defaults)])?.with_fallback(&pattern)
    }

    /// Return the first rule matching `url`, scanning in configured order.
    pub fn first_match(&self, url: &str) -> Option<&PatternRule> {
        self.rules.iter().find(|rule| rule.matches(url))
    }

    /// The designated fallback rule, when one was configured.
    pub fn fallback(&self) -> Option<&PatternRule> {
        self.fallback.map(|index| &self.rules[index])
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no rules are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Params;

    fn query(pairs: &[(&str, &str)]) -> OptionSet {
        OptionSet::new().with_query(Params::from_pairs(pairs.iter().copied()))
    }

    #[test]
    fn test_first_match_wins_over_later_general_pattern() {
        let rules = RuleSet::new(vec![
            (".*/foo-bar".to_string(), query(&[("abc", "def")])),
            (".*".to_string(), query(&[("abc", "ydp")])),
        ])
        .unwrap();

        let rule = rules.first_match("http://example.com/foo-bar").unwrap();
        assert_eq!(rule.pattern(), ".*/foo-bar");
        assert_eq!(rule.options().query.as_ref().unwrap().get("abc"), Some("def"));

        let rule = rules.first_match("http://example.com/bar-foo").unwrap();
        assert_eq!(rule.pattern(), ".*");
    }

    #[test]
    fn test_patterns_are_anchored_at_start() {
        let rules = RuleSet::new(vec![(
            "https://api\\.example\\.com/".to_string(),
            OptionSet::new(),
        )])
        .unwrap();
        assert!(rules.first_match("https://api.example.com/v1").is_some());
        // The pattern occurs mid-string; the implicit anchor must reject it.
        assert!(rules
            .first_match("https://evil.test/?https://api.example.com/")
            .is_none());
    }

    #[test]
    fn test_internal_end_anchor_is_honored() {
        let rules = RuleSet::new(vec![("https://example\\.com/$".to_string(), OptionSet::new())])
            .unwrap();
        assert!(rules.first_match("https://example.com/").is_some());
        assert!(rules.first_match("https://example.com/deeper").is_none());
    }

    #[test]
    fn test_no_match_returns_none() {
        let rules = RuleSet::new(vec![(".*/only-this".to_string(), OptionSet::new())]).unwrap();
        assert!(rules.first_match("http://example.com/other").is_none());
    }

    #[test]
    fn test_invalid_pattern_is_a_construction_error() {
        let err = RuleSet::new(vec![("[unclosed".to_string(), OptionSet::new())]).unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
    }

    #[test]
    fn test_unknown_fallback_pattern_is_a_construction_error() {
        let err = RuleSet::new(vec![(".*".to_string(), OptionSet::new())])
            .unwrap()
            .with_fallback(".*/nope")
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_for_base_uri_scopes_to_prefix() {
        let rules =
            RuleSet::for_base_uri("https://api.example.com/v2/", OptionSet::new()).unwrap();
        assert!(rules
            .first_match("https://api.example.com/v2/users")
            .is_some());
        assert!(rules.first_match("https://other.example.com/v2/").is_none());
        let fallback = rules.fallback().unwrap();
        assert_eq!(
            fallback.options().base_uri.as_deref(),
            Some("https://api.example.com/v2/")
        );
    }

    #[test]
    fn test_for_base_uri_escapes_regex_metacharacters() {
        let rules = RuleSet::for_base_uri("https://api.example.com/", OptionSet::new()).unwrap();
        // An unescaped '.' would also match this URL.
        assert!(rules.first_match("https://apixexample.com/").is_none());
    }
}
