#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let response = String::from_utf8_lossy(data);
    if let Ok(info) = seismo_poll::protocol::parse_info(&response) {
        let _ = info.has_new_data();
    }
});
