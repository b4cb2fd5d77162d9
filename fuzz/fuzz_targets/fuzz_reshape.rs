#![no_main]

use libfuzzer_sys::fuzz_target;
use vprikol_client::reshape::{pivot_keyed_records, reshape_field};

fuzz_target!(|data: &[u8]| {
    let Ok(mut value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    let records = pivot_keyed_records(&value, "username");
    assert!(records.iter().all(|r| r.get("username").is_some()));

    reshape_field(&mut value, "players", "username");
});
