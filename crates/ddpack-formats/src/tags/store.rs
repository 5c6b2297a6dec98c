//! In-memory tag store and its JSON document

use crate::tags::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tag to resources and set to tags mappings
///
/// Tags and sets are only removed by [`delete_tag`](Self::delete_tag) and
/// [`delete_set`](Self::delete_set). Removing the last member leaves an
/// empty entry behind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStore {
    #[serde(default)]
    tags: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    sets: BTreeMap<String, BTreeSet<String>>,
}

impl TagStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a sidecar document
    ///
    /// Both top-level keys are optional.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Build a sidecar document
    pub fn build(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Add resources to a tag, creating the tag if needed
    pub fn tag<I, S>(&mut self, tag: &str, resources: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .entry(tag.to_string())
            .or_default()
            .extend(resources.into_iter().map(Into::into));
    }

    /// Remove resources from a tag
    ///
    /// Returns how many were actually members.
    pub fn untag<I, S>(&mut self, tag: &str, resources: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(members) = self.tags.get_mut(tag) else {
            return 0;
        };
        resources
            .into_iter()
            .filter(|resource| members.remove(resource.as_ref()))
            .count()
    }

    /// Replace every tag membership of one resource
    ///
    /// Afterwards the resource belongs to exactly the given tags.
    pub fn retag<I, S>(&mut self, resource: &str, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let wanted: BTreeSet<String> = tags.into_iter().map(Into::into).collect();

        for (name, members) in &mut self.tags {
            if !wanted.contains(name) {
                members.remove(resource);
            }
        }
        for name in wanted {
            self.tags
                .entry(name)
                .or_default()
                .insert(resource.to_string());
        }
    }

    /// Add tags to a set, creating the set if needed
    pub fn add_tag_to_set<I, S>(&mut self, set: &str, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sets
            .entry(set.to_string())
            .or_default()
            .extend(tags.into_iter().map(Into::into));
    }

    /// Remove tags from a set
    ///
    /// Returns how many were actually members.
    pub fn remove_tag_from_set<I, S>(&mut self, set: &str, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(members) = self.sets.get_mut(set) else {
            return 0;
        };
        tags.into_iter()
            .filter(|tag| members.remove(tag.as_ref()))
            .count()
    }

    /// Delete a tag regardless of its members
    ///
    /// The tag is also dropped from every set that lists it.
    pub fn delete_tag(&mut self, tag: &str) -> bool {
        for members in self.sets.values_mut() {
            members.remove(tag);
        }
        self.tags.remove(tag).is_some()
    }

    /// Delete a set regardless of its members
    pub fn delete_set(&mut self, set: &str) -> bool {
        self.sets.remove(set).is_some()
    }

    /// Tags shared by all given resources
    ///
    /// An empty list yields an empty result.
    pub fn tags_for<S: AsRef<str>>(&self, resources: &[S]) -> BTreeSet<String> {
        if resources.is_empty() {
            return BTreeSet::new();
        }
        self.tags
            .iter()
            .filter(|(_, members)| {
                resources
                    .iter()
                    .all(|resource| members.contains(resource.as_ref()))
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// All tags and their resources
    pub fn tags(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.tags
    }

    /// All sets and their tags
    pub fn sets(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.sets
    }

    /// Resources carrying a tag
    pub fn resources(&self, tag: &str) -> Option<&BTreeSet<String>> {
        self.tags.get(tag)
    }

    /// Tags grouped under a set
    pub fn set(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.sets.get(name)
    }

    /// No tags and no sets
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.sets.is_empty()
    }
}
