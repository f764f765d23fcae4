use std::path::Path;

use serde::Deserialize;

use crate::align::Aligner;
use crate::error::{Result, SearchError};

const BUILTIN_DEFAULT: &str = include_str!("../../../profiles/default.json");
const BUILTIN_LOOSE: &str = include_str!("../../../profiles/loose.json");

pub const BUILTIN_PROFILES: &[&str] = &["default", "loose"];

/// Tunable policy for combining per-field alignment scores.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringProfile {
    name: String,
    description: Option<String>,
    weights: FieldWeights,
    bonuses: Bonuses,
    qualify: QualifyPolicy,
    prune: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldWeights {
    pub host: f64,
    pub url: f64,
    pub title: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            host: 6.0,
            url: 2.0,
            title: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bonuses {
    /// Added once per token that qualifies in the host group.
    pub domain_match: f64,
    /// Added when the whole query is a literal substring of a field.
    pub whole_query_substring: f64,
    /// Multiplier applied to `whole_query_substring` for the host group.
    pub host_substring_multiplier: f64,
}

impl Default for Bonuses {
    fn default() -> Self {
        Self {
            domain_match: 60.0,
            whole_query_substring: 200.0,
            host_substring_multiplier: 2.0,
        }
    }
}

/// When a token's alignment against a field counts as a match.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QualifyPolicy {
    /// Any alignment qualifies.
    AnyMatch,
    /// The aligned score must reach `k * token_chars`.
    MinScorePerChar(f64),
}

impl Default for QualifyPolicy {
    fn default() -> Self {
        Self::MinScorePerChar(8.0)
    }
}

impl QualifyPolicy {
    #[must_use]
    pub fn qualifies(&self, score: f64, token_chars: usize) -> bool {
        match *self {
            Self::AnyMatch => true,
            Self::MinScorePerChar(k) => score >= k * token_chars as f64,
        }
    }
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            description: None,
            weights: FieldWeights::default(),
            bonuses: Bonuses::default(),
            qualify: QualifyPolicy::default(),
            prune: true,
        }
    }
}

impl ScoringProfile {
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "default" => Self::from_bytes("default", BUILTIN_DEFAULT.as_bytes(), None).ok(),
            "loose" => Self::from_bytes("loose", BUILTIN_LOOSE.as_bytes(), Some("default")).ok(),
            _ => None,
        }
    }

    /// Resolves a builtin profile name, or else a path to a profile file.
    pub fn resolve(spec: &str) -> Result<Self> {
        if let Some(profile) = Self::builtin(spec) {
            return Ok(profile);
        }
        let path = Path::new(spec);
        if path.is_file() {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(spec);
            return Self::from_file(name, path);
        }
        Err(SearchError::UnknownProfile(spec.to_string()))
    }

    pub fn from_file(profile_name: &str, path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| SearchError::ReadProfile {
            path: path.to_path_buf(),
            source,
        })?;
        let base = if profile_name == "default" {
            None
        } else {
            Some("default")
        };
        Self::from_bytes(profile_name, &bytes, base)
    }

    pub fn from_bytes(profile_name: &str, bytes: &[u8], base: Option<&str>) -> Result<Self> {
        let raw = parse_raw(profile_name, bytes)?;
        let merged = match base {
            Some(base_name) => builtin_raw(base_name)?.overlay(raw),
            None => raw,
        };
        Self::from_raw(merged, profile_name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn weights(&self) -> &FieldWeights {
        &self.weights
    }

    #[must_use]
    pub const fn bonuses(&self) -> &Bonuses {
        &self.bonuses
    }

    #[must_use]
    pub const fn qualify(&self) -> QualifyPolicy {
        self.qualify
    }

    #[must_use]
    pub const fn aligner(&self) -> Aligner {
        Aligner::new(self.prune)
    }

    #[must_use]
    pub fn with_qualify(mut self, qualify: QualifyPolicy) -> Self {
        self.qualify = qualify;
        self
    }

    fn from_raw(raw: RawProfile, fallback_name: &str) -> Result<Self> {
        if let Some(schema_version) = raw.schema_version {
            if schema_version != 1 {
                return Err(SearchError::invalid(
                    fallback_name,
                    format!("schema_version {schema_version} is not supported (expected 1)"),
                ));
            }
        }

        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string());

        let defaults = Self::default();
        let weights = raw.weights.unwrap_or_default();
        let weights = FieldWeights {
            host: weights.host.unwrap_or(defaults.weights.host),
            url: weights.url.unwrap_or(defaults.weights.url),
            title: weights.title.unwrap_or(defaults.weights.title),
        };
        let bonuses = raw.bonuses.unwrap_or_default();
        let bonuses = Bonuses {
            domain_match: bonuses
                .domain_match
                .unwrap_or(defaults.bonuses.domain_match),
            whole_query_substring: bonuses
                .whole_query_substring
                .unwrap_or(defaults.bonuses.whole_query_substring),
            host_substring_multiplier: bonuses
                .host_substring_multiplier
                .unwrap_or(defaults.bonuses.host_substring_multiplier),
        };
        let qualify = qualify_from_raw(&name, raw.qualify.unwrap_or_default())?;
        let prune = raw
            .align
            .and_then(|align| align.prune)
            .unwrap_or(defaults.prune);

        let profile = Self {
            name,
            description: raw.description,
            weights,
            bonuses,
            qualify,
            prune,
        };
        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> Result<()> {
        let numbers = [
            ("weights.host", self.weights.host),
            ("weights.url", self.weights.url),
            ("weights.title", self.weights.title),
            ("bonuses.domain_match", self.bonuses.domain_match),
            ("bonuses.whole_query_substring", self.bonuses.whole_query_substring),
            (
                "bonuses.host_substring_multiplier",
                self.bonuses.host_substring_multiplier,
            ),
        ];
        for (path, value) in numbers {
            if !value.is_finite() || value < 0.0 {
                return Err(SearchError::invalid(
                    &self.name,
                    format!("{path} must be a finite, non-negative number (got {value})"),
                ));
            }
        }

        if self.weights.host < self.weights.url || self.weights.url < self.weights.title {
            return Err(SearchError::invalid(
                &self.name,
                format!(
                    "weights must satisfy host >= url >= title (got {} / {} / {})",
                    self.weights.host, self.weights.url, self.weights.title
                ),
            ));
        }
        Ok(())
    }
}

fn qualify_from_raw(name: &str, raw: RawQualify) -> Result<QualifyPolicy> {
    let default_k = match QualifyPolicy::default() {
        QualifyPolicy::MinScorePerChar(k) => k,
        QualifyPolicy::AnyMatch => 0.0,
    };
    match raw.policy.as_deref() {
        None | Some("min_score_per_char") => {
            let k = raw.min_score_per_char.unwrap_or(default_k);
            if !k.is_finite() || k < 0.0 {
                return Err(SearchError::invalid(
                    name,
                    format!("qualify.min_score_per_char must be a finite, non-negative number (got {k})"),
                ));
            }
            Ok(QualifyPolicy::MinScorePerChar(k))
        }
        Some("any_match") => Ok(QualifyPolicy::AnyMatch),
        Some(other) => Err(SearchError::invalid(
            name,
            format!("qualify.policy '{other}' is not one of: any_match, min_score_per_char"),
        )),
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawProfile {
    schema_version: Option<u32>,
    name: Option<String>,
    description: Option<String>,
    weights: Option<RawWeights>,
    bonuses: Option<RawBonuses>,
    qualify: Option<RawQualify>,
    align: Option<RawAlign>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
struct RawWeights {
    host: Option<f64>,
    url: Option<f64>,
    title: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
struct RawBonuses {
    domain_match: Option<f64>,
    whole_query_substring: Option<f64>,
    host_substring_multiplier: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawQualify {
    policy: Option<String>,
    min_score_per_char: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
struct RawAlign {
    prune: Option<bool>,
}

impl RawProfile {
    /// Fields set in `overlay` win; everything else comes from `self`. Identity
    /// (`name`, `description`) is never inherited.
    fn overlay(self, overlay: Self) -> Self {
        let weights = match (self.weights, overlay.weights) {
            (Some(base), Some(top)) => Some(RawWeights {
                host: top.host.or(base.host),
                url: top.url.or(base.url),
                title: top.title.or(base.title),
            }),
            (base, top) => top.or(base),
        };
        let bonuses = match (self.bonuses, overlay.bonuses) {
            (Some(base), Some(top)) => Some(RawBonuses {
                domain_match: top.domain_match.or(base.domain_match),
                whole_query_substring: top.whole_query_substring.or(base.whole_query_substring),
                host_substring_multiplier: top
                    .host_substring_multiplier
                    .or(base.host_substring_multiplier),
            }),
            (base, top) => top.or(base),
        };
        // A policy switch discards the base threshold along with the base policy.
        let qualify = match (self.qualify, overlay.qualify) {
            (Some(base), Some(top)) if top.policy.is_none() || top.policy == base.policy => {
                Some(RawQualify {
                    policy: base.policy,
                    min_score_per_char: top.min_score_per_char.or(base.min_score_per_char),
                })
            }
            (base, top) => top.or(base),
        };
        let align = match (self.align, overlay.align) {
            (Some(base), Some(top)) => Some(RawAlign {
                prune: top.prune.or(base.prune),
            }),
            (base, top) => top.or(base),
        };

        Self {
            schema_version: overlay.schema_version.or(self.schema_version),
            name: overlay.name,
            description: overlay.description,
            weights,
            bonuses,
            qualify,
            align,
        }
    }
}

fn builtin_raw(name: &str) -> Result<RawProfile> {
    match name {
        "default" => parse_raw(name, BUILTIN_DEFAULT.as_bytes()),
        "loose" => parse_raw(name, BUILTIN_LOOSE.as_bytes()),
        other => Err(SearchError::UnknownProfile(other.to_string())),
    }
}

fn parse_raw(name: &str, bytes: &[u8]) -> Result<RawProfile> {
    let parse_error = |reason: String| SearchError::ParseProfile {
        name: name.to_string(),
        reason,
    };

    let value: serde_json::Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(json_err) => {
            let utf8 =
                std::str::from_utf8(bytes).map_err(|err| parse_error(format!("{json_err}; {err}")))?;
            let toml_value: toml::Value = toml::from_str(utf8)
                .map_err(|toml_err| parse_error(format!("{json_err}; TOML: {toml_err}")))?;
            serde_json::to_value(toml_value).map_err(|err| parse_error(err.to_string()))?
        }
    };

    validate_profile_keys(name, &value)?;
    serde_json::from_value(value).map_err(|err| parse_error(err.to_string()))
}

fn validate_profile_keys(name: &str, value: &serde_json::Value) -> Result<()> {
    fn validate_object_keys(
        unknown: &mut Vec<String>,
        obj: &serde_json::Map<String, serde_json::Value>,
        base: &str,
        allowed: &[&str],
    ) {
        for key in obj.keys() {
            if !allowed.iter().any(|a| a == &key.as_str()) {
                if base.is_empty() {
                    unknown.push(key.clone());
                } else {
                    unknown.push(format!("{base}.{key}"));
                }
            }
        }
    }

    let serde_json::Value::Object(root) = value else {
        return Err(SearchError::ParseProfile {
            name: name.to_string(),
            reason: "profile must be an object".to_string(),
        });
    };

    let mut unknown = Vec::new();
    validate_object_keys(
        &mut unknown,
        root,
        "",
        &[
            "schema_version",
            "name",
            "description",
            "weights",
            "bonuses",
            "qualify",
            "align",
        ],
    );

    let sections: [(&str, &[&str]); 4] = [
        ("weights", &["host", "url", "title"]),
        (
            "bonuses",
            &[
                "domain_match",
                "whole_query_substring",
                "host_substring_multiplier",
            ],
        ),
        ("qualify", &["policy", "min_score_per_char"]),
        ("align", &["prune"]),
    ];
    for (section, allowed) in sections {
        if let Some(serde_json::Value::Object(obj)) = root.get(section) {
            validate_object_keys(&mut unknown, obj, section, allowed);
        }
    }

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(SearchError::UnknownFields {
            name: name.to_string(),
            fields: unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn builtin_default_matches_code_defaults() {
        let profile = ScoringProfile::builtin("default").unwrap();
        assert_eq!(profile.name(), "default");
        assert_eq!(profile.weights(), &FieldWeights::default());
        assert_eq!(profile.bonuses(), &Bonuses::default());
        assert_eq!(profile.qualify(), QualifyPolicy::MinScorePerChar(8.0));
        assert!(profile.aligner().prunes());
    }

    #[test]
    fn loose_overlays_default() {
        let profile = ScoringProfile::builtin("loose").unwrap();
        assert_eq!(profile.name(), "loose");
        assert_eq!(profile.qualify(), QualifyPolicy::AnyMatch);
        assert_eq!(profile.weights(), &FieldWeights::default());
    }

    #[test]
    fn every_listed_builtin_parses() {
        for name in BUILTIN_PROFILES {
            assert!(ScoringProfile::builtin(name).is_some(), "{name}");
        }
        assert!(ScoringProfile::builtin("nope").is_none());
    }

    #[test]
    fn qualify_policy_thresholds() {
        let strict = QualifyPolicy::MinScorePerChar(8.0);
        assert!(strict.qualifies(24.0, 3));
        assert!(!strict.qualifies(23.9, 3));
        assert!(QualifyPolicy::AnyMatch.qualifies(-4.0, 3));
    }

    #[test]
    fn rejects_unknown_fields_with_paths() {
        let err = ScoringProfile::from_bytes(
            "bad",
            br#"{"weights": {"host": 5.0, "hots": 1.0}, "extra": true}"#,
            Some("default"),
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("weights.hots"), "{message}");
        assert!(message.contains("extra"), "{message}");
    }

    #[test]
    fn rejects_broken_field_dominance() {
        let err = ScoringProfile::from_bytes(
            "bad",
            br#"{"weights": {"title": 4.0}}"#,
            Some("default"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("host >= url >= title"));
    }

    #[test]
    fn rejects_negative_bonus_and_unknown_policy() {
        let err = ScoringProfile::from_bytes(
            "bad",
            br#"{"bonuses": {"domain_match": -1}}"#,
            Some("default"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("bonuses.domain_match"));

        let err = ScoringProfile::from_bytes(
            "bad",
            br#"{"qualify": {"policy": "vibes"}}"#,
            Some("default"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("vibes"));
    }

    #[test]
    fn rejects_unsupported_schema_version() {
        let err = ScoringProfile::from_bytes("v2", br#"{"schema_version": 2}"#, Some("default"))
            .unwrap_err();
        assert!(err.to_string().contains("schema_version 2"));
    }

    #[test]
    fn overlay_keeps_unset_values_from_base() {
        let profile = ScoringProfile::from_bytes(
            "tuned",
            br#"{"weights": {"host": 5.0}, "qualify": {"min_score_per_char": 6.0}}"#,
            Some("default"),
        )
        .unwrap();
        assert_eq!(profile.name(), "tuned");
        assert_eq!(
            profile.weights(),
            &FieldWeights {
                host: 5.0,
                url: 2.0,
                title: 1.0
            }
        );
        assert_eq!(profile.qualify(), QualifyPolicy::MinScorePerChar(6.0));
    }

    #[test]
    fn loads_toml_profile_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "schema_version = 1\n[align]\nprune = false\n[qualify]\npolicy = \"any_match\""
        )
        .unwrap();

        let profile = ScoringProfile::from_file("mine", file.path()).unwrap();
        assert_eq!(profile.name(), "mine");
        assert!(!profile.aligner().prunes());
        assert_eq!(profile.qualify(), QualifyPolicy::AnyMatch);
    }

    #[test]
    fn resolve_reports_unknown_names() {
        let err = ScoringProfile::resolve("no-such-profile").unwrap_err();
        assert!(matches!(err, SearchError::UnknownProfile(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ScoringProfile::from_file("x", Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, SearchError::ReadProfile { .. }));
    }
}
