#![no_main]

use libfuzzer_sys::fuzz_target;
use pca_export::core::{OrderNumber, format_order_number};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(number) = s.parse::<OrderNumber>() {
            assert_eq!(format_order_number(number.year(), number.sequence()), s);
        }
    }
});
