//! Schedule XML mapping.
//!
//! Turns a published conference schedule (Pentabarf-style XML) into
//! [`ConferenceMetadata`](recordings_shared::ConferenceMetadata) plus a
//! [`TalkIndex`]: talks in document order with O(1) lookup by id, ready for
//! media files to be attached.

mod index;
mod mapper;

pub use index::TalkIndex;
pub use mapper::{MappedSchedule, leading_talk_id, map_schedule};

#[cfg(test)]
mod tests {
    use super::*;

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/schedule/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    #[test]
    fn maps_camp_fixture() {
        let mapped = map_schedule(&load_fixture("camp2015.xml")).unwrap();

        assert_eq!(mapped.conference.title, "Chaos Communication Camp 2015");
        assert_eq!(mapped.conference.city, "Zehdenick");
        assert_eq!(mapped.talks.len(), 4);
        assert!(mapped.duplicate_ids.is_empty());

        // Talks span two days and rooms; order follows the document.
        let ids: Vec<_> = mapped.talks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![6608, 6694, 6537, 6701]);

        let keynote = mapped.talks.get(6608).unwrap();
        assert_eq!(keynote.title, "Opening Event");
        assert_eq!(keynote.person_names(), "Tim Pritlove");
        assert_eq!(keynote.room, "Project 2501");
    }

    #[test]
    fn maps_fixture_with_dtd() {
        let mapped = map_schedule(&load_fixture("with-doctype.xml")).unwrap();
        assert_eq!(mapped.conference.title, "DTD Conference");
        assert_eq!(mapped.talks.len(), 1);
    }
}
