//! Ordered talk storage with keyed lookup.
//!
//! Talks keep the order in which their ids were first seen; the id map only
//! points into that sequence. Re-inserting an id replaces the talk in place.

use std::collections::HashMap;

use recordings_shared::{Talk, TalkId};

/// Talks in first-seen order plus an id → position index.
#[derive(Debug, Clone, Default)]
pub struct TalkIndex {
    talks: Vec<Talk>,
    positions: HashMap<TalkId, usize>,
}

impl TalkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a talk. An existing talk with the same id is replaced and returned;
    /// the replacement keeps the original position.
    pub fn insert(&mut self, talk: Talk) -> Option<Talk> {
        match self.positions.get(&talk.id) {
            Some(&pos) => Some(std::mem::replace(&mut self.talks[pos], talk)),
            None => {
                self.positions.insert(talk.id, self.talks.len());
                self.talks.push(talk);
                None
            }
        }
    }

    pub fn get(&self, id: TalkId) -> Option<&Talk> {
        self.positions.get(&id).map(|&pos| &self.talks[pos])
    }

    pub fn get_mut(&mut self, id: TalkId) -> Option<&mut Talk> {
        self.positions.get(&id).map(|&pos| &mut self.talks[pos])
    }

    /// Append a file reference to the talk with `id`. Returns `false` if no such talk.
    pub fn attach_file(&mut self, id: TalkId, file: String) -> bool {
        match self.get_mut(id) {
            Some(talk) => {
                talk.files.push(file);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.talks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.talks.is_empty()
    }

    /// Talks in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Talk> {
        self.talks.iter()
    }

    /// Drop the index and keep the ordered talks.
    pub fn into_talks(self) -> Vec<Talk> {
        self.talks
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn talk(id: TalkId, title: &str) -> Talk {
        let mut talk = Talk::new(id, Arc::default());
        talk.title = title.into();
        talk
    }

    #[test]
    fn keeps_insertion_order_not_key_order() {
        let mut index = TalkIndex::new();
        for (id, title) in [(30, "c"), (10, "a"), (20, "b")] {
            assert!(index.insert(talk(id, title)).is_none());
        }

        let ids: Vec<TalkId> = index.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
        assert_eq!(index.get(10).map(|t| t.title.as_str()), Some("a"));
    }

    #[test]
    fn duplicate_replaces_in_place() {
        let mut index = TalkIndex::new();
        index.insert(talk(5, "first"));
        index.insert(talk(6, "other"));

        let replaced = index.insert(talk(5, "second"));
        assert_eq!(replaced.map(|t| t.title), Some("first".to_string()));
        assert_eq!(index.len(), 2);

        let talks = index.into_talks();
        assert_eq!(talks[0].id, 5);
        assert_eq!(talks[0].title, "second");
        assert_eq!(talks[1].id, 6);
    }

    #[test]
    fn attach_file_only_to_known_ids() {
        let mut index = TalkIndex::new();
        index.insert(talk(1, "one"));

        assert!(index.attach_file(1, "media/one.mp4".into()));
        assert!(index.attach_file(1, "media/one.webm".into()));
        assert!(!index.attach_file(9, "media/nine.mp4".into()));

        let one = index.get(1).expect("talk 1");
        assert_eq!(one.files, vec!["media/one.mp4", "media/one.webm"]);
        assert!(one.has_media());
    }
}
