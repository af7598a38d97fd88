//! Renderers for downstream proxy clients.
//!
//! Both are pure functions over an already filtered and deduplicated record list.

pub mod clash;
pub mod singbox;

pub use clash::render_clash;
pub use singbox::render_singbox;

use crate::constants::COLLISION_SUFFIX;
use crate::node::NodeRecord;
use std::collections::HashSet;

/// Client-side names for `nodes`, in order: unique, and never one of `reserved`.
/// A taken name gets `-2` appended until it is free.
pub(crate) fn unique_tags(nodes: &[NodeRecord], reserved: &[&str]) -> Vec<String> {
    let mut taken: HashSet<String> = reserved.iter().map(|tag| tag.to_string()).collect();
    nodes
        .iter()
        .map(|node| {
            let mut tag = node.name.clone();
            while taken.contains(&tag) {
                tag.push_str(COLLISION_SUFFIX);
            }
            taken.insert(tag.clone());
            tag
        })
        .collect()
}

/// A SIP003 plugin string split into its name and `;`-separated options,
/// e.g. `obfs-local;obfs=http;obfs-host=example.com`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PluginSpec<'a> {
    pub name: &'a str,
    pub options: &'a str,
}

impl<'a> PluginSpec<'a> {
    pub(crate) fn parse(raw: &'a str) -> Self {
        let (name, options) = raw.split_once(';').unwrap_or((raw, ""));
        PluginSpec {
            name: name.trim(),
            options: options.trim(),
        }
    }

    fn entries(&self) -> impl Iterator<Item = &'a str> {
        self.options
            .split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
    }

    /// Value of `key=value`; empty values count as absent.
    pub(crate) fn option(&self, key: &str) -> Option<&'a str> {
        self.entries()
            .filter_map(|entry| entry.split_once('='))
            .find(|(k, _)| k.trim() == key)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// True when `key` appears as a bare flag.
    pub(crate) fn has_flag(&self, key: &str) -> bool {
        self.entries().any(|entry| entry == key)
    }
}
