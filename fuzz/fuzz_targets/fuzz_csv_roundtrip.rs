#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Records read from any input must serialize and read back without panicking.
        if let Ok(records) = pca_export::pca::from_csv(s) {
            let csv = pca_export::pca::to_csv(&records);
            let _ = pca_export::pca::from_csv(&csv);
            let _ = pca_export::pca::check_widths(&records);
        }
    }
});
