use crate::utils::error::{Result, SmokeError};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// Variables read from a `.env` file.
///
/// The values are kept in this map and never exported into the process
/// environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DotEnv {
    vars: HashMap<String, String>,
}

impl DotEnv {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content).map_err(|e| match e {
            SmokeError::ConfigError { message } => SmokeError::ConfigError {
                message: format!("{}: {}", path.as_ref().display(), message),
            },
            other => other,
        })
    }

    /// Loads `path` if it exists, otherwise returns an empty set.
    pub fn from_optional_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().is_file() {
            tracing::info!(
                "📄 Loading environment variables from {}",
                path.as_ref().display()
            );
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let re = Regex::new(r"^\s*(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*?)\s*$").map_err(
            |e| SmokeError::ConfigError {
                message: e.to_string(),
            },
        )?;

        let mut vars = HashMap::new();
        for (number, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let caps = re.captures(line).ok_or_else(|| SmokeError::ConfigError {
                message: format!("line {}: expected KEY=VALUE", number + 1),
            })?;
            vars.insert(caps[1].to_string(), unquote(&caps[2]));
        }

        Ok(Self { vars })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

fn unquote(raw: &str) -> String {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return raw[1..raw.len() - 1].to_string();
        }
    }
    // 未加引號的值允許行尾註解
    match raw.find(" #") {
        Some(idx) => raw[..idx].trim_end().to_string(),
        None => raw.to_string(),
    }
}
