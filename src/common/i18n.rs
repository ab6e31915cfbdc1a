// src/common/i18n.rs
//! Translation lookup for user-facing messages
//!
//! Keys look like `admin/companies/message.create.success`: the part before
//! the first `.` names a language file (`lang/<locale>/admin/companies/message.json`),
//! the rest is a dotted path into that file. Placeholders are written `:name`.

use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// English lines compiled into the binary; files on disk override them.
const EMBEDDED_EN: &[(&str, &str)] = &[
    (
        "admin/companies/message",
        include_str!("../../lang/en/admin/companies/message.json"),
    ),
    ("validation", include_str!("../../lang/en/validation.json")),
];

#[derive(Debug, Clone)]
pub struct Translator {
    locale: String,
    lines: HashMap<String, String>,
}

impl Translator {
    /// Translator backed only by the built-in English lines
    pub fn embedded() -> Self {
        let mut translator = Self {
            locale: "en".to_string(),
            lines: HashMap::new(),
        };
        for (group, source) in EMBEDDED_EN {
            match serde_json::from_str::<Value>(source) {
                Ok(value) => translator.insert_group(group, &value),
                Err(e) => warn!(group = %group, error = %e, "Invalid embedded language file"),
            }
        }
        translator
    }

    /// Loads `<lang_dir>/<locale>/**/*.json` on top of the built-in lines.
    /// A missing directory is not an error.
    pub fn load(lang_dir: &Path, locale: &str) -> anyhow::Result<Self> {
        let mut translator = Self::embedded();
        translator.locale = locale.to_string();

        let root = lang_dir.join(locale);
        if !root.is_dir() {
            warn!(path = %root.display(), "Language directory not found, using built-in lines");
            return Ok(translator);
        }

        let mut pending = vec![root.clone()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }

                let group = path
                    .strip_prefix(&root)?
                    .with_extension("")
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                let value: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
                debug!(group = %group, "Loaded language file");
                translator.insert_group(&group, &value);
            }
        }

        Ok(translator)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    fn insert_group(&mut self, group: &str, value: &Value) {
        flatten(group, value, &mut self.lines);
    }

    #[cfg(test)]
    pub fn has(&self, key: &str) -> bool {
        self.lines.contains_key(key)
    }

    /// Resolves `key`, returning the key itself when no line exists.
    pub fn trans(&self, key: &str) -> String {
        self.trans_with(key, &[])
    }

    pub fn trans_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let Some(line) = self.lines.get(key) else {
            debug!(key = %key, locale = %self.locale, "Missing translation");
            return key.to_string();
        };

        // Longest names first so `:max` never clobbers `:maximum`.
        let mut params = params.to_vec();
        params.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        params.iter().fold(line.clone(), |acc, (name, value)| {
            acc.replace(&format!(":{}", name), value)
        })
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                flatten(&format!("{}.{}", prefix, k), v, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}
