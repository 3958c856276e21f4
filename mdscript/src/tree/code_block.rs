use std::ops::Range;

/// A fenced code block found directly under a heading.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// First word of the fence info string, lower-cased. Empty when untagged.
    pub language: String,
    /// Body exactly as written between the fences.
    pub content: String,
    /// Byte span of the whole fence in source.
    pub span: Range<usize>,
}

impl CodeBlock {
    /// The body without its trailing line break, as handed to an interpreter.
    pub fn code(&self) -> &str {
        self.content.trim_end_matches(['\n', '\r'])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_drops_trailing_newline_only() {
        let block = CodeBlock {
            language: "sh".to_string(),
            content: "  echo hi\n".to_string(),
            span: 0..0,
        };
        assert_eq!(block.code(), "  echo hi");
    }
}
