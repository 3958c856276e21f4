use std::collections::BTreeMap;
use std::process::{Command, Stdio};

use log::{debug, info, warn};
use mdscript::language::LanguageTable;
use mdscript::tree::{CodeBlock, CommandTree, NodeId};

use crate::environment::inherited_env;
use crate::error::RunError;

/// A fully resolved interpreter call for one code block.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Variables set on top of the inherited process environment.
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    /// Build the process with inherited stdio so interactive scripts keep
    /// their terminal.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(&self.env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        command
    }

    /// Spawn the interpreter and wait for it.
    ///
    /// # Errors
    ///
    /// Returns `RunError::Spawn` if the process could not be started, and
    /// `RunError::ExitStatus` or `RunError::Terminated` if it did not succeed.
    pub fn run(&self) -> Result<(), RunError> {
        let status = self.command().status().map_err(|source| RunError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if status.success() {
            return Ok(());
        }
        match status.code() {
            Some(code) => Err(RunError::ExitStatus {
                program: self.program.clone(),
                code,
            }),
            None => Err(RunError::Terminated {
                program: self.program.clone(),
            }),
        }
    }
}

/// Runs the code blocks of a heading with the environment it inherits.
pub struct Executor<'a> {
    tree: &'a CommandTree,
    languages: &'a LanguageTable,
    /// Variables set for every block, below anything the document defines.
    base_env: BTreeMap<String, String>,
}

impl<'a> Executor<'a> {
    pub fn new(tree: &'a CommandTree, languages: &'a LanguageTable) -> Self {
        Executor {
            tree,
            languages,
            base_env: BTreeMap::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_env.insert(key.into(), value.into());
        self
    }

    /// Case-insensitive heading lookup.
    pub fn resolve(&self, heading: &str) -> Result<NodeId, RunError> {
        self.tree
            .find(heading)
            .ok_or_else(|| RunError::HeadingNotFound(heading.to_string()))
    }

    /// Work out how `block` under `id` would be run, without running it.
    ///
    /// # Errors
    ///
    /// Returns `RunError::UnsupportedLanguage` if no interpreter handles the
    /// block's language.
    pub fn plan(
        &self,
        id: NodeId,
        block: &CodeBlock,
        trailing: &[String],
    ) -> Result<Invocation, RunError> {
        let interpreter =
            self.languages
                .get(&block.language)
                .ok_or_else(|| RunError::UnsupportedLanguage {
                    language: block.language.clone(),
                    span: block.span.clone(),
                })?;

        let mut env = self.base_env.clone();
        env.extend(inherited_env(self.tree, id));

        Ok(Invocation {
            program: interpreter.program.clone(),
            args: interpreter.render(block.code(), trailing),
            env,
        })
    }

    /// Run every code block under `id` in document order, stopping at the
    /// first one that fails.
    pub fn execute(&self, id: NodeId, trailing: &[String]) -> Result<(), RunError> {
        let node = &self.tree[id];
        if node.code_blocks.is_empty() {
            warn!("`{}` has no code blocks to run", node.heading);
            return Ok(());
        }

        let total = node.code_blocks.len();
        for (index, block) in node.code_blocks.iter().enumerate() {
            let invocation = self.plan(id, block, trailing)?;
            info!(
                "Running code block {}/{} of `{}` with {}",
                index + 1,
                total,
                node.heading,
                invocation.program
            );
            debug!("Arguments: {:?}", invocation.args);
            invocation.run()?;
        }
        Ok(())
    }
}
