//! Tests for the deduplicating warning facility.

use marmot_common::warning::{has_warned, set_printing, warn_once};

#[test]
fn test_warning_is_recorded() {
    set_printing(false);
    warn_once("Test", "recorded warning");
    assert!(has_warned("Test", "recorded warning"));
}

#[test]
fn test_warning_is_keyed_by_component() {
    set_printing(false);
    warn_once("Tokenizer", "keyed warning");
    assert!(has_warned("Tokenizer", "keyed warning"));
    assert!(!has_warned("Parser", "keyed warning"));
}

#[test]
fn test_repeated_warning_is_harmless() {
    set_printing(false);
    warn_once("Test", "repeated warning");
    warn_once("Test", "repeated warning");
    assert!(has_warned("Test", "repeated warning"));
}
