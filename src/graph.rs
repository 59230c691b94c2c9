use crate::{
    compile::{compile, Branch},
    player::is_variable,
    script::Script,
};
use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::Bfs,
};
use std::collections::HashMap;

/// Guide finds the node of a conversation key
pub type Guide<'a> = HashMap<&'a str, NodeIndex>;

/// A story is a graph of conversation keys connected by the labels of their options.
/// Auto-followed options have empty labels. Options that exit or go through a variable key
/// have no edge.
pub type Story<'a> = DiGraph<&'a str, String>;

/// Option whose target key is defined nowhere
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Dangling<'a> {
    pub from: &'a str,
    pub branch: Branch,
}

struct Pending<'a> {
    from: NodeIndex,
    from_key: &'a str,
    branch: Branch,
}

fn node_pass<'a>(
    story: &mut Story<'a>,
    guide: &mut Guide<'a>,
    pending: &mut Vec<Pending<'a>>,
    script: &'a Script,
) {
    let mut entries: Vec<_> = script.iter().collect();
    entries.sort_unstable_by_key(|(key, _)| *key);
    for (key, body) in entries {
        let from = story.add_node(key);
        guide.insert(key, from);
        pending.extend(
            compile(body)
                .options
                .into_iter()
                .filter(|branch| !branch.target.is_empty() && !is_variable(&branch.target))
                .map(|branch| Pending {
                    from,
                    from_key: key,
                    branch,
                }),
        );
    }
}

fn edge_pass<'a>(
    story: &mut Story<'a>,
    guide: &Guide<'a>,
    pending: Vec<Pending<'a>>,
    dangling: &mut Vec<Dangling<'a>>,
) {
    for Pending {
        from,
        from_key,
        branch,
    } in pending
    {
        if let Some(to) = guide.get(branch.target.as_str()) {
            story.add_edge(from, *to, branch.label);
        } else {
            dangling.push(Dangling {
                from: from_key,
                branch,
            });
        }
    }
}

fn from_script(script: &Script) -> (Guide, Story, Vec<Dangling>) {
    let mut story = Story::new();
    let mut guide = Guide::new();
    let mut pending = Vec::new();
    let mut dangling = Vec::new();
    node_pass(&mut story, &mut guide, &mut pending, script);
    edge_pass(&mut story, &guide, pending, &mut dangling);
    (guide, story, dangling)
}

/// Compile every entry of `script` to create a graph
#[must_use]
pub fn read(script: &Script) -> (Guide, Story) {
    let (guide, story, _) = from_script(script);
    (guide, story)
}

/// Options of `script` pointing at keys it doesn't define, ordered by the key they belong to
#[must_use]
pub fn dangling(script: &Script) -> Vec<Dangling> {
    from_script(script).2
}

/// Keys reachable from `start` through options with a fixed target, `start` first.
/// Empty if `start` isn't in the guide.
#[must_use]
pub fn reachable<'a>(guide: &Guide<'a>, story: &Story<'a>, start: &str) -> Vec<&'a str> {
    let Some(start) = guide.get(start) else {
        return Vec::new();
    };
    let mut bfs = Bfs::new(story, *start);
    let mut keys = Vec::new();
    while let Some(index) = bfs.next(story) {
        keys.push(story[index]);
    }
    keys
}
