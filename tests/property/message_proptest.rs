//! Message paging helpers and body validation

use conduit::shared::messaging::message::{next_cursor, validate_contents, MAX_MESSAGE_CHARS};
use conduit::shared::Message;
use proptest::prelude::*;

fn page(timestamps: Vec<i64>) -> Vec<Message> {
    timestamps
        .into_iter()
        .map(|timestamp| Message {
            contents: "m".to_string(),
            timestamp,
            read_at: 0,
            sent_by_viewer: false,
        })
        .collect()
}

proptest! {
    #[test]
    fn test_cursor_is_newest_timestamp(mut timestamps in prop::collection::vec(1i64..1_000_000, 0..10)) {
        timestamps.sort_unstable();
        let expected = timestamps.last().copied();
        prop_assert_eq!(next_cursor(&page(timestamps)), expected);
    }

    #[test]
    fn test_blank_bodies_are_rejected(body in "[ \t\n]{0,20}") {
        prop_assert!(validate_contents(&body).is_err());
    }

    #[test]
    fn test_body_length_limit(len in 1usize..(MAX_MESSAGE_CHARS * 2)) {
        let body = "é".repeat(len);
        prop_assert_eq!(validate_contents(&body).is_ok(), len <= MAX_MESSAGE_CHARS);
    }
}
