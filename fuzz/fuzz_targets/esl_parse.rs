#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(lists) = sbaudit::formats::esl::parse(data) {
        let consumed: usize = lists.iter().map(|l| l.list_size()).sum();
        assert_eq!(consumed, data.len());
    }
});
