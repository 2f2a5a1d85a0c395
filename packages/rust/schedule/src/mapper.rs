//! Pentabarf-style schedule XML mapper.
//!
//! Expected shape:
//! - Root `<schedule>` with one `<conference>` block
//!   (`title`, `subtitle`, `venue`, `city`)
//! - Any number of `<event id="…">` elements anywhere below the root, each with
//!   `title`, `subtitle`, `abstract`, `description`, `track`, `room` and
//!   `persons/person[@id]` children
//!
//! Missing fields become empty strings. Only unparseable XML is an error.

use std::sync::Arc;

use recordings_shared::{ConferenceMetadata, Person, RecordingsError, Result, Talk, TalkId};
use roxmltree::{Document, Node, ParsingOptions};
use tracing::{debug, warn};

use crate::index::TalkIndex;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Result of mapping one schedule document.
#[derive(Debug, Clone)]
pub struct MappedSchedule {
    /// The `<conference>` block; shared with every talk.
    pub conference: Arc<ConferenceMetadata>,
    /// Talks keyed by id, in document order.
    pub talks: TalkIndex,
    /// Ids that occurred more than once (later record kept).
    pub duplicate_ids: Vec<TalkId>,
    /// `<event>` records whose id is missing or not a plain integer, keyed by
    /// [`leading_talk_id`] instead.
    pub coerced_ids: usize,
}

// ---------------------------------------------------------------------------
// Mapper
// ---------------------------------------------------------------------------

/// Map a schedule document into conference metadata and keyed talks.
pub fn map_schedule(xml: &str) -> Result<MappedSchedule> {
    let opts = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, opts)
        .map_err(|e| RecordingsError::parse(format!("malformed schedule XML: {e}")))?;

    let conference = Arc::new(read_conference(&doc));

    let mut talks = TalkIndex::new();
    let mut duplicate_ids = Vec::new();
    let mut coerced_ids = 0;

    for node in doc.descendants().filter(|n| n.has_tag_name("event")) {
        let raw = node.attribute("id").unwrap_or("");
        let id = match raw.trim().parse() {
            Ok(id) => id,
            Err(_) => {
                let id = leading_talk_id(raw);
                warn!(
                    raw,
                    id,
                    line = doc.text_pos_at(node.range().start).row,
                    "talk record without a numeric id"
                );
                coerced_ids += 1;
                id
            }
        };

        let talk = read_talk(node, id, &conference);
        if talks.insert(talk).is_some() {
            warn!(id, "duplicate talk id, later record wins");
            duplicate_ids.push(id);
        }
    }

    debug!(
        title = %conference.title,
        talks = talks.len(),
        duplicates = duplicate_ids.len(),
        coerced = coerced_ids,
        "schedule mapped"
    );

    Ok(MappedSchedule {
        conference,
        talks,
        duplicate_ids,
        coerced_ids,
    })
}

/// Read `/schedule/conference`. Any other root leaves every field empty.
fn read_conference(doc: &Document<'_>) -> ConferenceMetadata {
    let root = doc.root_element();
    if !root.has_tag_name("schedule") {
        return ConferenceMetadata::default();
    }

    match child(root, "conference") {
        Some(conference) => ConferenceMetadata {
            title: child_text(conference, "title"),
            subtitle: child_text(conference, "subtitle"),
            venue: child_text(conference, "venue"),
            city: child_text(conference, "city"),
        },
        None => ConferenceMetadata::default(),
    }
}

fn read_talk(node: Node<'_, '_>, id: TalkId, conference: &Arc<ConferenceMetadata>) -> Talk {
    let persons = child(node, "persons")
        .map(|persons| {
            persons
                .children()
                .filter(|n| n.has_tag_name("person"))
                .map(|person| Person {
                    id: person.attribute("id").unwrap_or_default().to_string(),
                    name: text_of(person),
                })
                .collect()
        })
        .unwrap_or_default();

    Talk {
        title: child_text(node, "title"),
        subtitle: child_text(node, "subtitle"),
        abstract_text: child_text(node, "abstract"),
        description: child_text(node, "description"),
        track: child_text(node, "track"),
        room: child_text(node, "room"),
        persons,
        ..Talk::new(id, Arc::clone(conference))
    }
}

/// Key for an id that is not a plain integer: its leading digits (with an
/// optional sign) after whitespace, or `0` when there are none.
pub fn leading_talk_id(raw: &str) -> TalkId {
    let raw = raw.trim_start();
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let value: TalkId = rest[..digits].parse().unwrap_or(0);
    if negative { -value } else { value }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// First direct child element named `name`.
fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

/// Text content of the first direct child named `name`, or empty.
fn child_text(node: Node<'_, '_>, name: &str) -> String {
    child(node, name).map(text_of).unwrap_or_default()
}

/// All descendant text of an element, concatenated.
fn text_of(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEDULE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<schedule>
  <conference>
    <title>FrOSCon 2015</title>
    <subtitle>Free and Open Source Conference</subtitle>
    <venue>Hochschule Bonn-Rhein-Sieg</venue>
    <city>Sankt Augustin</city>
  </conference>
  <day index="1" date="2015-08-22">
    <room name="HS1">
      <event id="1580">
        <room>HS1</room>
        <title>Opening</title>
        <subtitle></subtitle>
        <track>Main</track>
        <abstract>Welcome.</abstract>
        <description>Welcome to <b>FrOSCon</b>.</description>
        <persons>
          <person id="42">Alice</person>
          <person>Bob</person>
        </persons>
      </event>
      <event id="1581">
        <title>No abstract here</title>
      </event>
    </room>
  </day>
</schedule>"#;

    #[test]
    fn maps_conference_block() {
        let mapped = map_schedule(SCHEDULE).unwrap();
        assert_eq!(mapped.conference.title, "FrOSCon 2015");
        assert_eq!(mapped.conference.subtitle, "Free and Open Source Conference");
        assert_eq!(mapped.conference.venue, "Hochschule Bonn-Rhein-Sieg");
        assert_eq!(mapped.conference.city, "Sankt Augustin");
    }

    #[test]
    fn maps_talks_in_document_order() {
        let mapped = map_schedule(SCHEDULE).unwrap();
        let ids: Vec<TalkId> = mapped.talks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1580, 1581]);

        let opening = mapped.talks.get(1580).unwrap();
        assert_eq!(opening.title, "Opening");
        assert_eq!(opening.track, "Main");
        assert_eq!(opening.room, "HS1");
        assert_eq!(opening.abstract_text, "Welcome.");
        assert_eq!(opening.description, "Welcome to FrOSCon.");
        assert!(!opening.has_media());
        assert!(Arc::ptr_eq(&opening.conference, &mapped.conference));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let mapped = map_schedule(SCHEDULE).unwrap();
        let talk = mapped.talks.get(1581).unwrap();
        assert_eq!(talk.abstract_text, "");
        assert_eq!(talk.subtitle, "");
        assert_eq!(talk.room, "");
        assert!(talk.persons.is_empty());
    }

    #[test]
    fn person_without_id_keeps_empty_id() {
        let mapped = map_schedule(SCHEDULE).unwrap();
        let persons = &mapped.talks.get(1580).unwrap().persons;
        assert_eq!(persons.len(), 2);
        assert_eq!(persons[0], Person { id: "42".into(), name: "Alice".into() });
        assert_eq!(persons[1], Person { id: String::new(), name: "Bob".into() });
    }

    #[test]
    fn duplicate_ids_later_record_wins() {
        let xml = r#"<schedule>
            <event id="5"><title>first</title><track>A</track></event>
            <event id="7"><title>between</title></event>
            <event id="5"><title>second</title></event>
        </schedule>"#;
        let mapped = map_schedule(xml).unwrap();

        assert_eq!(mapped.talks.len(), 2);
        assert_eq!(mapped.duplicate_ids, vec![5]);

        let five = mapped.talks.get(5).unwrap();
        assert_eq!(five.title, "second");
        // Overwrite, not merge.
        assert_eq!(five.track, "");

        let ids: Vec<TalkId> = mapped.talks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![5, 7]);
    }

    #[test]
    fn missing_conference_block_yields_empty_metadata() {
        let mapped = map_schedule(r#"<schedule><event id="1"/></schedule>"#).unwrap();
        assert_eq!(*mapped.conference, ConferenceMetadata::default());
        assert_eq!(mapped.talks.len(), 1);
    }

    #[test]
    fn records_without_numeric_id_are_kept() {
        let xml = r#"<schedule>
            <event><title>no id</title></event>
            <event id="12abc"><title>suffixed</title></event>
            <event id=" 40 "><title>padded</title></event>
        </schedule>"#;
        let mapped = map_schedule(xml).unwrap();

        assert_eq!(mapped.coerced_ids, 2);
        let ids: Vec<TalkId> = mapped.talks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 12, 40]);
        assert_eq!(mapped.talks.get(0).map(|t| t.title.as_str()), Some("no id"));
        assert_eq!(mapped.talks.get(12).map(|t| t.title.as_str()), Some("suffixed"));
    }

    #[test]
    fn word_ids_collide_on_zero() {
        let xml = r#"<schedule>
            <event id="abc"><title>first</title></event>
            <event id="xyz"><title>second</title></event>
        </schedule>"#;
        let mapped = map_schedule(xml).unwrap();
        assert_eq!(mapped.talks.len(), 1);
        assert_eq!(mapped.duplicate_ids, vec![0]);
        assert_eq!(mapped.talks.get(0).unwrap().title, "second");
    }

    #[test]
    fn leading_talk_id_reads_digit_prefix() {
        assert_eq!(leading_talk_id("12abc"), 12);
        assert_eq!(leading_talk_id("  -7x"), -7);
        assert_eq!(leading_talk_id("+3"), 3);
        assert_eq!(leading_talk_id("abc"), 0);
        assert_eq!(leading_talk_id(""), 0);
        assert_eq!(leading_talk_id("-"), 0);
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = map_schedule("<schedule><conference>").unwrap_err();
        assert!(matches!(err, RecordingsError::Parse { .. }));

        assert!(map_schedule("").is_err());
        assert!(map_schedule("not xml at all").is_err());
    }

    #[test]
    fn empty_schedule_has_no_talks() {
        let mapped = map_schedule("<schedule/>").unwrap();
        assert!(mapped.talks.is_empty());
    }
}
