//! Discovery of the data keys a template refers to.
//!
//! Only the first segment of a field reference is reported: `.Author.Name`
//! needs the key `Author`. Keys come back in first-occurrence order.

use indexmap::IndexSet;
use log::debug;

use crate::config::FileDescriptor;
use crate::error::Result;
use crate::template::ast::{Arg, Branch, List, Node, Pipeline};
use crate::template::{Delimiters, Template};

/// Insertion-ordered, duplicate-free set of key names.
pub type KeySet = IndexSet<String>;

/// Parses `text` under `delims` and lists the top-level keys it references.
///
/// Function names are not resolved, so unknown functions do not fail
/// extraction. Only parse errors are reported.
pub fn extract_keys(text: &str, delims: &Delimiters) -> Result<Vec<String>> {
    let template = Template::parse("extract", text, delims)?;
    let mut keys = KeySet::new();
    collect_list(&template.tree().root, &mut keys);
    Ok(keys.into_iter().collect())
}

/// Keys of every descriptor, contents before path, merged in descriptor order.
pub fn collect_config_keys(descriptors: &[FileDescriptor]) -> Result<KeySet> {
    let mut keys = KeySet::new();
    for descriptor in descriptors {
        for text in [&descriptor.contents, &descriptor.path] {
            keys.extend(extract_keys(text, &descriptor.delimiters)?);
        }
    }
    debug!("Discovered {} variable(s): {:?}", keys.len(), keys);
    Ok(keys)
}

fn collect_list(list: &List, keys: &mut KeySet) {
    for node in &list.nodes {
        collect_node(node, keys);
    }
}

fn collect_node(node: &Node, keys: &mut KeySet) {
    match node {
        Node::Action(pipe) => collect_pipeline(pipe, keys),
        Node::If(branch) | Node::Range(branch) | Node::With(branch) => collect_branch(branch, keys),
        Node::Text(_) | Node::Comment(_) | Node::Break | Node::Continue => {}
    }
}

fn collect_branch(branch: &Branch, keys: &mut KeySet) {
    collect_pipeline(&branch.pipe, keys);
    collect_list(&branch.list, keys);
    if let Some(else_list) = &branch.else_list {
        collect_list(else_list, keys);
    }
}

fn collect_pipeline(pipe: &Pipeline, keys: &mut KeySet) {
    for cmd in &pipe.cmds {
        for arg in &cmd.args {
            collect_arg(arg, keys);
        }
    }
}

fn collect_arg(arg: &Arg, keys: &mut KeySet) {
    match arg {
        Arg::Field(path) => {
            if let Some(first) = path.first() {
                keys.insert(first.clone());
            }
        }
        Arg::Pipe(pipe) => collect_pipeline(pipe, keys),
        // (pipeline).A contributes nothing, inner pipeline included.
        Arg::Chain { .. }
        | Arg::Variable(_)
        | Arg::Identifier(_)
        | Arg::Dot
        | Arg::Nil
        | Arg::Bool(_)
        | Arg::Int(_)
        | Arg::Float(_)
        | Arg::Str(_) => {}
    }
}
