#![no_main]

use buildprof::ingest::compute_records;
use buildprof::profile::BuildProfile;
use buildprof::self_time::NestingStrategy;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding and self-time computation must return errors, never panic
    if let Ok(profile) = BuildProfile::from_bytes(data) {
        let _ = compute_records(profile.trace_events.clone(), NestingStrategy::ArrivalOrder);
        let _ = compute_records(profile.trace_events, NestingStrategy::StartTimeStack);
    }
});
