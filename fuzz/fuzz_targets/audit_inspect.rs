#![no_main]
use libfuzzer_sys::fuzz_target;

use sbaudit::{Auditor, DatabaseKind, PolicyThresholds};

fuzz_target!(|data: &[u8]| {
    let Ok(auditor) = Auditor::new(PolicyThresholds::default()) else {
        return;
    };
    let now = chrono::DateTime::from_timestamp(1_790_000_000, 0).unwrap_or_default();
    for kind in DatabaseKind::ALL {
        let _ = auditor.inspect(kind, data, now);
    }
});
