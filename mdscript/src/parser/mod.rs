pub mod warning;
mod structural;

pub use warning::ParseWarning;

use crate::Script;
use crate::language::LanguageTable;

/// Parser entry point.
pub struct Parser<'t> {
    source: String,
    file_id: usize,
    languages: &'t LanguageTable,
    all_languages: bool,
}

impl<'t> Parser<'t> {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser {
            source,
            file_id,
            languages: LanguageTable::builtin(),
            all_languages: false,
        }
    }

    /// Decide which code blocks are runnable against `languages` instead of the built-in table.
    pub fn with_languages(mut self, languages: &'t LanguageTable) -> Self {
        self.languages = languages;
        self
    }

    /// Keep code blocks whose language has no interpreter.
    pub fn all_languages(mut self, all: bool) -> Self {
        self.all_languages = all;
        self
    }

    /// Parse the source Markdown into a command tree.
    pub fn parse(&self) -> Script {
        let (tree, warnings) = structural::build_tree(
            &self.source,
            self.file_id,
            self.languages,
            self.all_languages,
        );
        Script {
            tree,
            warnings,
            source_id: self.file_id,
        }
    }
}
