#![no_main]

use libfuzzer_sys::fuzz_target;
use vprikol_client::{Envelope, ErrorBody, HttpResponse, PlayerInfo};

fuzz_target!(|data: &[u8]| {
    // Error bodies never fail to classify.
    let body = ErrorBody::parse(data);
    let _ = body.error_code();

    // Success and error paths of the envelope, for the untagged player payload.
    for status in [200, 400, 502] {
        let response = HttpResponse::new(status, data.to_vec());
        if let Ok(envelope) = Envelope::<PlayerInfo>::decode(&response) {
            let _ = envelope.into_result();
        }
    }
});
