//! Command tag parsing

use conduit::shared::CommandTag;
use proptest::prelude::*;

fn tag() -> impl Strategy<Value = CommandTag> {
    prop::sample::select(CommandTag::ALL.to_vec())
}

proptest! {
    #[test]
    fn test_padding_does_not_change_tag(
        tag in tag(),
        before in "[ \n]{0,3}",
        after in "[ \n]{0,3}",
    ) {
        let frame = format!("{}{}{}", before, tag.as_str(), after);
        prop_assert_eq!(CommandTag::parse(&frame), Some(tag));
    }

    #[test]
    fn test_unknown_words_are_not_tags(word in "[a-z]{1,12}") {
        let known = CommandTag::ALL.iter().any(|t| t.as_str() == word);
        prop_assert_eq!(CommandTag::parse(&word).is_some(), known);
    }
}
