use std::ops::Range;

use pulldown_cmark::{
    CodeBlockKind, Event, HeadingLevel, Options, Parser as CmarkParser, Tag, TagEnd,
};

use crate::language::LanguageTable;
use crate::parser::warning::ParseWarning;
use crate::tree::{CodeBlock, CommandTree, NodeId};

type Events<'e> = [(Event<'e>, Range<usize>)];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reduce Markdown source text into a heading-nested command tree.
pub fn build_tree(
    source: &str,
    file_id: usize,
    languages: &LanguageTable,
    all_languages: bool,
) -> (CommandTree, Vec<ParseWarning>) {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let parser = CmarkParser::new_ext(source, options);
    let events: Vec<(Event<'_>, Range<usize>)> = parser.into_offset_iter().collect();

    let mut state = BuildState::new(file_id, languages, all_languages);
    state.process_events(&events);
    state.finalize(source.len())
}

// ---------------------------------------------------------------------------
// Build state
// ---------------------------------------------------------------------------

struct BuildState<'a> {
    file_id: usize,
    languages: &'a LanguageTable,
    all_languages: bool,
    tree: CommandTree,
    /// Current heading ancestry. Innermost = current scope.
    stack: Vec<NodeId>,
    /// Latest heading, whose span ends where the next heading starts.
    open: Option<NodeId>,
    warnings: Vec<ParseWarning>,
}

struct Table {
    headers: Vec<String>,
    rows: Vec<TableRow>,
}

struct TableRow {
    cells: Vec<String>,
    span: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum KeyColumn {
    First,
    Second,
}

impl<'a> BuildState<'a> {
    fn new(file_id: usize, languages: &'a LanguageTable, all_languages: bool) -> Self {
        BuildState {
            file_id,
            languages,
            all_languages,
            tree: CommandTree::new(),
            stack: Vec::new(),
            open: None,
            warnings: Vec::new(),
        }
    }

    fn process_events(&mut self, events: &Events<'_>) {
        let mut i = 0;

        while i < events.len() {
            let (ref ev, ref range) = events[i];

            match ev {
                Event::Start(Tag::Heading { level, .. }) => {
                    self.read_heading(events, &mut i, level, range.start);
                }

                Event::Start(Tag::Paragraph) => {
                    i += 1;
                    let text = collect_text_until(events, &mut i, |e| {
                        matches!(e, TagEnd::Paragraph)
                    });
                    self.attach_paragraph(&text);
                }

                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                    let language = fence_language(info);
                    let span = range.clone();
                    i += 1;
                    let content = collect_text_until(events, &mut i, |e| {
                        matches!(e, TagEnd::CodeBlock)
                    });
                    self.attach_code_block(CodeBlock {
                        language,
                        content,
                        span,
                    });
                }

                Event::Start(Tag::Table(_)) => {
                    let span = range.clone();
                    i += 1;
                    let table = collect_table(events, &mut i);
                    self.attach_table(table, span);
                }

                // Lists, blockquotes, indented code, HTML: nothing inside is
                // directly under the heading, but headings still count.
                Event::Start(_) => {
                    self.skip_container(events, &mut i);
                }

                _ => {
                    i += 1;
                }
            }
        }
    }

    /// Consume a heading starting at its Start event and open its node.
    fn read_heading(
        &mut self,
        events: &Events<'_>,
        i: &mut usize,
        level: &HeadingLevel,
        start: usize,
    ) {
        *i += 1;
        let text = collect_text_until(events, i, |e| matches!(e, TagEnd::Heading(_)));
        self.open_heading(normalize_heading(&text), heading_level_to_u8(level), start);
    }

    /// Step past a container element, starting at its Start event. Headings
    /// nested anywhere inside it are still opened.
    fn skip_container(&mut self, events: &Events<'_>, i: &mut usize) {
        let mut depth = 0usize;
        while *i < events.len() {
            let (ref ev, ref range) = events[*i];
            match ev {
                Event::Start(Tag::Heading { level, .. }) if depth > 0 => {
                    self.read_heading(events, i, level, range.start);
                    continue;
                }
                Event::Start(_) => depth += 1,
                Event::End(_) => depth = depth.saturating_sub(1),
                _ => {}
            }
            *i += 1;
            if depth == 0 {
                break;
            }
        }
    }

    fn open_heading(&mut self, heading: String, level: u8, start: usize) {
        self.close_span(start);

        // Close headings at the same or deeper level
        while self
            .stack
            .last()
            .is_some_and(|&top| self.tree[top].level >= level)
        {
            self.stack.pop();
        }

        let parent = self.stack.last().copied();
        let id = self.tree.push(parent, heading, level, start);
        self.stack.push(id);
        self.open = Some(id);
    }

    fn close_span(&mut self, end: usize) {
        if let Some(id) = self.open.take() {
            self.tree.node_mut(id).span.end = end;
        }
    }

    fn attach_paragraph(&mut self, text: &str) {
        let Some(&id) = self.stack.last() else {
            return;
        };
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let node = self.tree.node_mut(id);
        if node.description.is_none() && node.code_blocks.is_empty() {
            node.description = Some(text.to_string());
        }
    }

    fn attach_code_block(&mut self, block: CodeBlock) {
        let Some(&id) = self.stack.last() else {
            self.warnings.push(ParseWarning::warning(
                "code block before the first heading is ignored",
                block.span,
                self.file_id,
            ));
            return;
        };

        if !self.languages.contains(&block.language) {
            let label = language_label(&block.language);
            if !self.all_languages {
                self.warnings.push(
                    ParseWarning::note(
                        format!("skipping {label} code block: no interpreter for this language"),
                        block.span,
                        self.file_id,
                    )
                    .with_note("pass `--all` to keep code blocks in every language"),
                );
                return;
            }
            self.warnings.push(ParseWarning::warning(
                format!("no interpreter for {label} code block; running it will fail"),
                block.span.clone(),
                self.file_id,
            ));
        }

        self.tree.node_mut(id).code_blocks.push(block);
    }

    fn attach_table(&mut self, table: Table, span: Range<usize>) {
        let Some(column) = key_column(&table.headers) else {
            return;
        };
        let Some(&id) = self.stack.last() else {
            self.warnings.push(ParseWarning::warning(
                "key/value table before the first heading is ignored",
                span,
                self.file_id,
            ));
            return;
        };

        for row in table.rows {
            let (key, value) = match (column, row.cells.as_slice()) {
                (KeyColumn::First, [key, value, ..]) => (key, value),
                (KeyColumn::Second, [value, key, ..]) => (key, value),
                _ => continue,
            };
            let key = key.trim();
            if key.is_empty() {
                self.warnings.push(ParseWarning::warning(
                    "key/value row with an empty key is skipped",
                    row.span,
                    self.file_id,
                ));
                continue;
            }
            self.tree
                .node_mut(id)
                .env
                .insert(key.to_string(), value.trim().to_string());
        }
    }

    fn finalize(mut self, end: usize) -> (CommandTree, Vec<ParseWarning>) {
        self.close_span(end);
        (self.tree, self.warnings)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn heading_level_to_u8(level: &HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Strip leading/trailing whitespace, collapse interior whitespace.
fn normalize_heading(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First word of a fence info string, lower-cased.
fn fence_language(info: &str) -> String {
    info.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

fn language_label(language: &str) -> String {
    if language.is_empty() {
        "untagged".to_string()
    } else {
        format!("`{language}`")
    }
}

/// Which column of a two-column table holds the keys, judged by its header.
fn key_column(headers: &[String]) -> Option<KeyColumn> {
    let [first, second] = headers else {
        return None;
    };
    let first = first.trim().to_lowercase();
    let second = second.trim().to_lowercase();
    match (first.as_str(), second.as_str()) {
        ("key", "value") => Some(KeyColumn::First),
        ("value", "key") => Some(KeyColumn::Second),
        _ => None,
    }
}

/// Flatten text until a matching End tag. Inline code counts as text and
/// line breaks become `\n`.
fn collect_text_until(
    events: &Events<'_>,
    i: &mut usize,
    is_end: impl Fn(&TagEnd) -> bool,
) -> String {
    let mut text = String::new();
    while *i < events.len() {
        let (ref ev, _) = events[*i];
        match ev {
            Event::End(tag_end) if is_end(tag_end) => {
                *i += 1;
                break;
            }
            Event::Text(s) | Event::Code(s) => {
                text.push_str(s);
                *i += 1;
            }
            Event::SoftBreak | Event::HardBreak => {
                text.push('\n');
                *i += 1;
            }
            _ => {
                *i += 1;
            }
        }
    }
    text
}

/// Collect table headers and rows as flattened cell text.
fn collect_table(events: &Events<'_>, i: &mut usize) -> Table {
    let mut headers = Vec::new();
    let mut rows = Vec::new();
    let mut in_head = false;
    let mut current_row: Vec<String> = Vec::new();
    let mut row_span = 0..0;

    while *i < events.len() {
        let (ref ev, ref range) = events[*i];
        match ev {
            Event::End(TagEnd::Table) => {
                *i += 1;
                break;
            }
            Event::Start(Tag::TableHead) => {
                in_head = true;
                *i += 1;
            }
            Event::End(TagEnd::TableHead) => {
                in_head = false;
                headers = std::mem::take(&mut current_row);
                *i += 1;
            }
            Event::Start(Tag::TableRow) => {
                current_row = Vec::new();
                row_span = range.clone();
                *i += 1;
            }
            Event::End(TagEnd::TableRow) => {
                if !in_head {
                    rows.push(TableRow {
                        cells: std::mem::take(&mut current_row),
                        span: row_span.clone(),
                    });
                }
                *i += 1;
            }
            Event::Start(Tag::TableCell) => {
                *i += 1;
                let cell = collect_text_until(events, i, |e| matches!(e, TagEnd::TableCell));
                current_row.push(cell);
            }
            _ => {
                *i += 1;
            }
        }
    }

    Table { headers, rows }
}
