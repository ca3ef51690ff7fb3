#![no_main]

use libfuzzer_sys::fuzz_target;
use urnlog_core::types::VOTE_CATEGORY;
use urnlog_ingest::parse_line;

fuzz_target!(|data: &[u8]| {
    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    if let Ok(draft) = parse_line(data, "fuzz.logjez") {
        assert!(!draft.vote_confirmed() || draft.category == VOTE_CATEGORY);
        assert_eq!(draft.category.trim(), draft.category);
        assert!(!draft.message.contains('\t'));
        assert!(draft.hash.as_deref().is_none_or(|h| !h.is_empty()));
    }
});
