//! Config validation: misspelt-key detection and calibration range checks.
//!
//! A deployment config edited over SSH on a Pi is easy to typo, and serde
//! silently ignores keys it does not recognize — so the raw TOML is parsed
//! into a `toml::Value` first, its key paths checked against the known
//! schema, and anything unrecognized logged with a "did you mean?" hint
//! before normal deserialization runs. Misspellings only ever warn; a
//! value that violates a calibration invariant is fatal before sampling
//! begins.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " — did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for MonitorConfig.
///
/// Maintained manually to match the struct hierarchy in monitor_config.rs.
/// Any new field added there must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [identity]
        "identity",
        "identity.device_id",
        "identity.machine_id",
        // [electrical]
        "electrical",
        "electrical.amplifier_gain",
        "electrical.ct_range_amps",
        "electrical.line_voltage",
        "electrical.phases",
        // [sampling]
        "sampling",
        "sampling.sample_rate_hz",
        "sampling.window_size",
        "sampling.pause_between_windows_s",
        // [thresholds]
        "thresholds",
        "thresholds.idle_amps",
        "thresholds.fault_amps",
        // [output]
        "output",
        "output.csv_path",
        "output.flush_interval",
        "output.max_records",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Collect every dotted key path present in a parsed TOML tree, tables
/// included (`[sampling] window_size = 20` yields both `sampling` and
/// `sampling.window_size`).
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Levenshtein edit distance, two-row rolling implementation.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_len = a.len();
    let b_len = b.len();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Pick the nearest known key as a correction hint. Anything further than
/// three edits away is assumed to be a genuinely new key, not a typo.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist <= 3 {
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((k, dist)),
            }
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Scan a raw TOML string for keys outside the known schema and return a
/// warning per hit. Never fails — an unrecognized key might be a field
/// from a newer clampmon, and old configs must keep loading.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // malformed TOML surfaces via serde instead
    };

    let known = known_config_keys();
    let found = walk_toml_keys(&value, "");
    let mut warnings = Vec::new();

    for key in &found {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(key, &known);
            warnings.push(ValidationWarning {
                field: key.clone(),
                message: format!("Unknown config key '{key}'"),
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Calibration Range Validation
// ============================================================================

/// Validate calibration invariants on a parsed MonitorConfig.
///
/// Returns hard errors only — any violation must prevent startup, since a
/// bad calibration silently corrupts every record written afterwards.
pub fn validate_ranges(config: &super::MonitorConfig) -> Vec<String> {
    let mut errors = Vec::new();

    let e = &config.electrical;
    check_positive_finite(e.amplifier_gain, "electrical.amplifier_gain", &mut errors);
    check_positive_finite(e.ct_range_amps, "electrical.ct_range_amps", &mut errors);
    check_positive_finite(e.line_voltage, "electrical.line_voltage", &mut errors);
    if e.phases == 0 {
        errors.push("electrical.phases must be >= 1".to_string());
    }

    let s = &config.sampling;
    check_positive_finite(s.sample_rate_hz, "sampling.sample_rate_hz", &mut errors);
    if s.window_size == 0 {
        errors.push("sampling.window_size must be >= 1".to_string());
    }
    if !s.pause_between_windows_s.is_finite() || s.pause_between_windows_s < 0.0 {
        errors.push(format!(
            "sampling.pause_between_windows_s = {} must be finite and >= 0",
            s.pause_between_windows_s
        ));
    }

    let t = &config.thresholds;
    if !t.idle_amps.is_finite() || !t.fault_amps.is_finite() {
        errors.push(format!(
            "thresholds must be finite (got idle_amps={}, fault_amps={})",
            t.idle_amps, t.fault_amps
        ));
    } else if t.fault_amps <= t.idle_amps {
        errors.push(format!(
            "thresholds.fault_amps ({:.3}) must be > thresholds.idle_amps ({:.3})",
            t.fault_amps, t.idle_amps
        ));
    }

    if config.output.flush_interval == 0 {
        errors.push("output.flush_interval must be >= 1".to_string());
    }

    errors
}

fn check_positive_finite(value: f64, name: &str, errors: &mut Vec<String>) {
    if !value.is_finite() || value <= 0.0 {
        errors.push(format!("{name} = {value} must be finite and > 0"));
    }
}

// ============================================================================
// Tests
// ============================================================================
