//! Key-shortening substitution for script payloads
//!
//! A [`RenameMapping`] is an ordered table of `long -> short` literal
//! substitutions over a fixed property-access vocabulary, used to shrink
//! script payloads (and the wire format they read) before minification. The
//! table is static configuration injected by the caller, never module-level
//! state, so tests and alternate deployments can substitute their own.
//!
//! Order is significant: when one entry's target is a substring of
//! another's, the longer entry must come first, or the shorter one rewrites
//! part of the longer target before its own rule runs and the substitution
//! cascades. [`RenameMapping::validate`] checks a table for that hazard.

use crate::diagnostics::{InlayError, InlayResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Ordered table of literal `long -> short` substitutions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenameMapping {
    entries: IndexMap<String, String>,
}

impl RenameMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Later entries are applied after earlier ones.
    pub fn insert(&mut self, long: impl Into<String>, short: impl Into<String>) {
        self.entries.insert(long.into(), short.into());
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in application order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The built-in vocabulary for the telemetry dashboard payloads.
    ///
    /// Shortens the client/tank/server property paths and the request-body
    /// literals the dashboard scripts exchange with the firmware. Entries
    /// with overlapping targets are ordered longest first.
    pub fn default_vocabulary() -> Self {
        let mut m = Self::new();
        m.insert("client.tanks", "client.ts");
        m.insert("client.client", "client.c");
        m.insert("client.site", "client.s");
        m.insert("client.label", "client.n");
        m.insert("client.tank", "client.k");
        m.insert("client.levelInches", "client.l");
        m.insert("client.percent", "client.p");
        m.insert("client.alarmType", "client.at");
        m.insert("client.alarm", "client.a");
        m.insert("client.lastUpdate", "client.u");
        m.insert("client.vinVoltage", "client.v");

        m.insert("tank.label", "tank.n");
        m.insert("tank.tank", "tank.k");
        m.insert("tank.levelInches", "tank.l");
        m.insert("tank.percent", "tank.p");
        m.insert("tank.alarmType", "tank.at");
        m.insert("tank.alarm", "tank.a");
        m.insert("tank.lastUpdate", "tank.u");

        m.insert("data.clients", "data.cs");
        m.insert("data.serverUid", "data.si");
        m.insert("data.server", "data.srv");
        m.insert("serverInfo.name", "serverInfo.n");
        m.insert("serverInfo.clientFleet", "serverInfo.cf");
        m.insert("data.nextDailyEmailEpoch", "data.nde");
        m.insert("data.lastSyncEpoch", "data.lse");
        m.insert("serverInfo.paused", "serverInfo.ps");
        m.insert("serverInfo.pinConfigured", "serverInfo.pc");

        // Request bodies are shortened as whole literals so only the wire
        // keys change, not local variable names.
        m.insert(
            "body: JSON.stringify({ client: clientUid })",
            "body: JSON.stringify({ c: clientUid })",
        );
        m.insert(
            "body: JSON.stringify({ paused: targetPaused, pin: state.pin || '' })",
            "body: JSON.stringify({ ps: targetPaused, pin: state.pin || '' })",
        );
        m.insert("state.paused = !!data.paused", "state.paused = !!data.ps");
        m
    }

    /// Apply the table to a script as sequential whole-token literal
    /// substitution. Must run before minification so multi-word targets are
    /// still intact.
    pub fn apply(&self, script: &str) -> String {
        let mut out = script.to_string();
        for (long, short) in &self.entries {
            out = out.replace(long.as_str(), short.as_str());
        }
        out
    }

    /// Check the table for cascading-substitution hazards.
    ///
    /// Rejects tables where an earlier entry's target is a substring of a
    /// later entry's target (the later entry can never match), or where an
    /// earlier entry's replacement contains a later entry's target (the
    /// replacement would be rewritten again).
    pub fn validate(&self) -> InlayResult<()> {
        let entries: Vec<(&String, &String)> = self.entries.iter().collect();
        let mut violations = Vec::new();

        for (i, (long_i, short_i)) in entries.iter().enumerate() {
            for (long_j, _) in entries.iter().skip(i + 1) {
                if long_j.contains(long_i.as_str()) {
                    violations.push(format!(
                        "`{long_i}` is applied before `{long_j}` and would consume it"
                    ));
                }
                if short_i.contains(long_j.as_str()) {
                    violations.push(format!(
                        "replacement `{short_i}` contains the later target `{long_j}`"
                    ));
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(InlayError::config(format!(
                "rename table has cascading entries: {}",
                violations.join("; ")
            )))
        }
    }

    /// Load a mapping from a JSON object file; key order in the file is the
    /// application order.
    pub fn load(path: impl AsRef<Path>) -> InlayResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InlayError::AssetNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let mapping: Self = serde_json::from_str(&text)?;
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary_validates() {
        RenameMapping::default_vocabulary().validate().unwrap();
    }

    #[test]
    fn test_apply_shortens_property_paths() {
        let mapping = RenameMapping::default_vocabulary();
        let js = "rows.push({ client: client.client, site: client.site });";
        assert_eq!(
            mapping.apply(js),
            "rows.push({ client: client.c, site: client.s });"
        );
    }

    #[test]
    fn test_overlapping_targets_do_not_cascade() {
        let mapping = RenameMapping::default_vocabulary();
        // `client.tanks` must survive as `client.ts`, not `client.ks`, and
        // `client.alarmType` as `client.at`, not a mangled `client.aType`.
        let js = "const tanks = client.tanks; const t = client.alarmType; const a = client.alarm;";
        assert_eq!(
            mapping.apply(js),
            "const tanks = client.ts; const t = client.at; const a = client.a;"
        );
    }

    #[test]
    fn test_request_body_literals() {
        let mapping = RenameMapping::default_vocabulary();
        let js = "body: JSON.stringify({ client: clientUid })";
        assert_eq!(mapping.apply(js), "body: JSON.stringify({ c: clientUid })");
    }

    #[test]
    fn test_validate_rejects_cascading_order() {
        let mut bad = RenameMapping::new();
        bad.insert("client.alarm", "client.a");
        bad.insert("client.alarmType", "client.at");
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_replacement_matching_later_target() {
        let mut bad = RenameMapping::new();
        bad.insert("state.value", "state.v2");
        bad.insert("state.v", "state.x");
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_load_from_json_preserves_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("vocab.json");
        fs::write(&path, r#"{"data.serverUid": "data.si", "data.server": "data.srv"}"#).unwrap();

        let mapping = RenameMapping::load(&path).unwrap();
        let entries: Vec<_> = mapping.entries().collect();
        assert_eq!(
            entries,
            vec![("data.serverUid", "data.si"), ("data.server", "data.srv")]
        );
        mapping.validate().unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let err = RenameMapping::load("no/such/vocab.json").unwrap_err();
        assert!(matches!(err, InlayError::AssetNotFound(_)));
    }
}
