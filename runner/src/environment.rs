use std::collections::BTreeMap;

use mdscript::tree::{CommandTree, NodeId};

/// Env bindings visible to `id`. Tables are applied from the root down to the
/// node itself, so a key defined nearer the node shadows one defined above it.
pub fn inherited_env(tree: &CommandTree, id: NodeId) -> BTreeMap<String, String> {
    let mut chain = tree.ancestors(id);
    chain.reverse();
    chain.push(id);

    let mut env = BTreeMap::new();
    for node in chain {
        env.extend(
            tree[node]
                .env
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
    }
    env
}
