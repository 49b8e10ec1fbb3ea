use serde::Serialize;
use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// Human output is suppressed when ECOMDB_QUIET is `1` or `true`
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("ECOMDB_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Human }
    }

    pub fn is_human(&self) -> bool {
        *self == OutputMode::Human
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    ok: bool,
    command: &'a str,
    data: T,
}

/// Render a successful command result as a JSON document
pub fn success_json<T: Serialize>(command: &str, data: T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Envelope { ok: true, command, data })
}

/// Print a successful command result in JSON mode; no-op for human output
pub fn emit_success<T: Serialize>(mode: OutputMode, command: &str, data: T) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        println!("{}", success_json(command, data)?);
    }
    Ok(())
}

/// JSON error document for failures in JSON mode
pub fn error_json(command: &str, message: &str) -> String {
    serde_json::json!({
        "ok": false,
        "command": command,
        "error": message,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let text = success_json("stats", serde_json::json!({ "orders": 3 })).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["command"], "stats");
        assert_eq!(value["data"]["orders"], 3);
    }

    #[test]
    fn test_error_envelope() {
        let value: serde_json::Value = serde_json::from_str(&error_json("report", "Missing database: ecom.db")).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"], "Missing database: ecom.db");
    }

    #[test]
    fn test_mode_from_flag() {
        assert!(OutputMode::from_flag(false).is_human());
        assert!(!OutputMode::from_flag(true).is_human());
    }
}
