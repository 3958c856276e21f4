use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use serde::Deserialize;
use thiserror::Error;

/// Token in an argument template that is replaced by the code block body.
pub const CODE_PLACEHOLDER: &str = "$CODE";

static BUILTIN: LazyLock<LanguageTable> = LazyLock::new(|| {
    LanguageTable::from_toml(include_str!("languages.toml"))
        .expect("built-in language table is valid")
});

/// Errors that can occur while loading a language table
#[derive(Error, Debug)]
pub enum LanguageTableError {
    #[error("Unable to parse language table: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Template for `{language}` must contain `$CODE` exactly once, found {count}")]
    Placeholder { language: String, count: usize },
    #[error("Language `{0}` is defined more than once")]
    Duplicate(String),
}

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    program: String,
    args: Vec<String>,
    #[serde(default)]
    aliases: Vec<String>,
}

/// An executable plus the argument template used to run a code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: String,
    pub args: Vec<String>,
}

impl Interpreter {
    /// Substitute `code` into the first placeholder and append `trailing`.
    pub fn render(&self, code: &str, trailing: &[String]) -> Vec<String> {
        let mut substituted = false;
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                if !substituted && arg.contains(CODE_PLACEHOLDER) {
                    substituted = true;
                    arg.replacen(CODE_PLACEHOLDER, code, 1)
                } else {
                    arg.clone()
                }
            })
            .collect();
        args.extend(trailing.iter().cloned());
        args
    }
}

/// Immutable mapping from lower-cased language tag to [`Interpreter`].
#[derive(Debug, Clone, Default)]
pub struct LanguageTable {
    interpreters: HashMap<String, Interpreter>,
}

impl LanguageTable {
    /// The table shipped with the tool, parsed on first use.
    pub fn builtin() -> &'static LanguageTable {
        &BUILTIN
    }

    /// Load a table from TOML, one `[language]` section per interpreter.
    ///
    /// # Errors
    ///
    /// Returns `LanguageTableError` if the TOML is malformed, a template does not
    /// hold exactly one placeholder, or a language or alias repeats.
    pub fn from_toml(source: &str) -> Result<Self, LanguageTableError> {
        let entries: BTreeMap<String, LanguageEntry> = toml::from_str(source)?;
        let mut interpreters = HashMap::new();

        for (name, entry) in entries {
            let count: usize = entry
                .args
                .iter()
                .map(|arg| arg.matches(CODE_PLACEHOLDER).count())
                .sum();
            if count != 1 {
                return Err(LanguageTableError::Placeholder {
                    language: name,
                    count,
                });
            }

            let interpreter = Interpreter {
                program: entry.program,
                args: entry.args,
            };
            for tag in std::iter::once(name).chain(entry.aliases) {
                let tag = tag.to_lowercase();
                if interpreters.insert(tag.clone(), interpreter.clone()).is_some() {
                    return Err(LanguageTableError::Duplicate(tag));
                }
            }
        }

        Ok(LanguageTable { interpreters })
    }

    pub fn get(&self, language: &str) -> Option<&Interpreter> {
        self.interpreters.get(&language.to_lowercase())
    }

    pub fn contains(&self, language: &str) -> bool {
        self.get(language).is_some()
    }

    /// Known language tags, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.interpreters.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }
}
