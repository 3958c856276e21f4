pub mod language;
pub mod locate;
pub mod parser;
pub mod tree;

use crate::parser::ParseWarning;
use crate::tree::CommandTree;

/// A parsed markdown script document.
#[derive(Debug, Clone)]
pub struct Script {
    /// Heading tree with the code blocks and env tables found under each heading.
    pub tree: CommandTree,
    /// Content that was recognised but left out of the tree.
    pub warnings: Vec<ParseWarning>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}
