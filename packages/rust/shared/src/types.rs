//! Core domain types for conference schedules and their recordings.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

/// Talk identifier. Unique within its owning event only.
pub type TalkId = i64;

// ---------------------------------------------------------------------------
// ConferenceMetadata
// ---------------------------------------------------------------------------

/// The `<conference>` block of a schedule. Absent fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConferenceMetadata {
    pub title: String,
    pub subtitle: String,
    pub venue: String,
    pub city: String,
}

impl ConferenceMetadata {
    /// Write every field into `metadata`, overwriting same-named keys.
    pub fn merge_into(&self, metadata: &mut BTreeMap<String, String>) {
        for (key, value) in self.fields() {
            metadata.insert(key.to_string(), value.to_string());
        }
    }

    fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("title", self.title.as_str()),
            ("subtitle", self.subtitle.as_str()),
            ("venue", self.venue.as_str()),
            ("city", self.city.as_str()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

/// A speaker. The id comes straight from the source and is neither numeric nor unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Talk
// ---------------------------------------------------------------------------

/// One scheduled session of an event, optionally annotated with recordings.
#[derive(Debug, Clone, Serialize)]
pub struct Talk {
    /// Identifier, unique within the owning event.
    pub id: TalkId,
    /// Conference metadata of the owning event.
    #[serde(skip)]
    pub conference: Arc<ConferenceMetadata>,
    pub title: String,
    pub subtitle: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub description: String,
    pub track: String,
    pub room: String,
    /// Speakers in document order.
    pub persons: Vec<Person>,
    /// Media file references in listing order.
    pub files: Vec<String>,
}

impl Talk {
    /// Create a talk with empty fields.
    pub fn new(id: TalkId, conference: Arc<ConferenceMetadata>) -> Self {
        Self {
            id,
            conference,
            title: String::new(),
            subtitle: String::new(),
            abstract_text: String::new(),
            description: String::new(),
            track: String::new(),
            room: String::new(),
            persons: Vec::new(),
            files: Vec::new(),
        }
    }

    /// True iff at least one media file is attached.
    pub fn has_media(&self) -> bool {
        !self.files.is_empty()
    }

    /// Speaker names joined for display, e.g. `"Alice, Bob"`.
    pub fn person_names(&self) -> String {
        self.persons
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overwrites_conference_keys_only() {
        let conference = ConferenceMetadata {
            title: "Chaos Communication Camp".into(),
            subtitle: String::new(),
            venue: "Ziegeleipark Mildenberg".into(),
            city: "Zehdenick".into(),
        };

        let mut metadata = BTreeMap::from([
            ("title".to_string(), "placeholder".to_string()),
            ("hashtag".to_string(), "#cccamp15".to_string()),
        ]);
        conference.merge_into(&mut metadata);

        assert_eq!(metadata["title"], "Chaos Communication Camp");
        assert_eq!(metadata["subtitle"], "");
        assert_eq!(metadata["city"], "Zehdenick");
        assert_eq!(metadata["hashtag"], "#cccamp15");
        assert_eq!(metadata.len(), 5);
    }

    #[test]
    fn has_media_follows_files() {
        let mut talk = Talk::new(7, Arc::default());
        assert!(!talk.has_media());

        talk.files.push("https://cdn.example.com/talk-7.mp4".into());
        assert!(talk.has_media());
    }

    #[test]
    fn person_names_preserve_order() {
        let mut talk = Talk::new(1, Arc::default());
        talk.persons = vec![
            Person { id: "12".into(), name: "Alice".into() },
            Person { id: String::new(), name: "Bob".into() },
        ];
        assert_eq!(talk.person_names(), "Alice, Bob");
    }

    #[test]
    fn talk_serializes_abstract_key() {
        let mut talk = Talk::new(3, Arc::default());
        talk.abstract_text = "short".into();
        let json = serde_json::to_value(&talk).expect("serialize");
        assert_eq!(json["abstract"], "short");
        assert!(json.get("conference").is_none());
    }
}
