//! Tree view of the runnable headings, shown when no heading is given.
//!
//! Rendering takes two passes: every line of every root is laid out first so
//! that annotations can start in one column across all trees.

use std::fmt::Write;

use mdscript::tree::{CommandNode, CommandTree, NodeId};

struct HintLine {
    /// Tree glyphs plus heading text.
    branch: String,
    annotation: Option<String>,
}

pub fn render(tree: &CommandTree, verbose: bool) -> String {
    let mut lines = Vec::new();
    for &root in tree.roots() {
        if !is_runnable(tree, root) {
            continue;
        }
        lines.push(HintLine {
            branch: tree[root].heading.clone(),
            annotation: annotation(&tree[root], verbose),
        });
        collect_children(tree, root, "", verbose, &mut lines);
    }

    let width = lines
        .iter()
        .map(|line| line.branch.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for line in &lines {
        match &line.annotation {
            Some(annotation) => {
                let pad = width - line.branch.chars().count();
                let _ = writeln!(out, "{}{}  {}", line.branch, " ".repeat(pad), annotation);
            }
            None => {
                let _ = writeln!(out, "{}", line.branch);
            }
        }
    }
    out
}

fn collect_children(
    tree: &CommandTree,
    id: NodeId,
    prefix: &str,
    verbose: bool,
    lines: &mut Vec<HintLine>,
) {
    let children: Vec<NodeId> = tree
        .children(id)
        .iter()
        .copied()
        .filter(|&child| is_runnable(tree, child))
        .collect();

    for (index, &child) in children.iter().enumerate() {
        let last = index + 1 == children.len();
        let (glyph, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        lines.push(HintLine {
            branch: format!("{prefix}{glyph}{}", tree[child].heading),
            annotation: annotation(&tree[child], verbose),
        });
        collect_children(tree, child, &format!("{prefix}{indent}"), verbose, lines);
    }
}

/// A heading is worth listing if it, or something below it, has code.
fn is_runnable(tree: &CommandTree, id: NodeId) -> bool {
    !tree[id].code_blocks.is_empty()
        || tree
            .children(id)
            .iter()
            .any(|&child| is_runnable(tree, child))
}

fn annotation(node: &CommandNode, verbose: bool) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(first) = node.description.as_deref().and_then(|d| d.lines().next()) {
        parts.push(first.to_string());
    }

    if verbose {
        if !node.env.is_empty() {
            let env: Vec<String> = node
                .env
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            parts.push(format!("[{}]", env.join(" ")));
        }
        if !node.code_blocks.is_empty() {
            let code: Vec<String> = node
                .code_blocks
                .iter()
                .map(|block| {
                    let language = if block.language.is_empty() {
                        "?"
                    } else {
                        block.language.as_str()
                    };
                    let first = block.code().lines().next().unwrap_or_default().trim();
                    format!("{language}: {first}")
                })
                .collect();
            parts.push(format!("({})", code.join("; ")));
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("  "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdscript::parser::Parser;

    fn tree(source: &str) -> CommandTree {
        Parser::new(source.to_string(), 0).parse().tree
    }

    const PROJECT: &str = "# Project\n\nIntro text.\n\n## Build\n\nCompile everything.\n\n```sh\ncargo build\n```\n\n### Release\n\n```sh\ncargo build --release\n```\n\n## Notes\n\nNothing runnable.\n\n## Test\n\n```sh\ncargo test\n```\n";

    #[test]
    fn renders_runnable_branches_aligned() {
        let expected = [
            format!("Project{}Intro text.", " ".repeat(10)),
            format!("├── Build{}Compile everything.", " ".repeat(8)),
            "│   └── Release".to_string(),
            "└── Test".to_string(),
        ]
        .join("\n")
            + "\n";
        assert_eq!(render(&tree(PROJECT), false), expected);
    }

    #[test]
    fn verbose_adds_env_and_code_preview() {
        let source = "# Deploy\n\n| key | value |\n| --- | --- |\n| TARGET | prod |\n\n```sh\n./deploy.sh \"$TARGET\"\necho done\n```\n";
        assert_eq!(
            render(&tree(source), true),
            "Deploy  [TARGET=prod]  (sh: ./deploy.sh \"$TARGET\")\n"
        );
        assert_eq!(render(&tree(source), false), "Deploy\n");
    }

    #[test]
    fn width_is_shared_across_roots() {
        let source = "# A\n\nfirst\n\n```sh\ntrue\n```\n\n# Longer\n\nsecond\n\n```sh\ntrue\n```\n";
        assert_eq!(
            render(&tree(source), false),
            "A       first\nLonger  second\n"
        );
    }

    #[test]
    fn documents_without_code_render_nothing() {
        assert_eq!(render(&tree("# Readme\n\nProse only.\n\n## More\n"), false), "");
    }
}
