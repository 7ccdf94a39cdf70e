// Host-side tests for the secret key-sequence detector.
// The main crate is wasm-only, so we include the pure core module directly.

#![allow(dead_code)]
mod secret {
    include!("../src/core/secret.rs");
}

use secret::SecretCodeDetector;

fn feed(d: &mut SecretCodeDetector, keys: &str) -> usize {
    keys.chars()
        .filter(|c| d.push(&c.to_string()))
        .count()
}

#[test]
fn exact_sequence_fires_exactly_once() {
    let mut d = SecretCodeDetector::new("dance");
    assert_eq!(feed(&mut d, "dance"), 1);
}

#[test]
fn match_is_case_insensitive() {
    let mut d = SecretCodeDetector::new("dance");
    assert_eq!(feed(&mut d, "DaNcE"), 1);
    let mut d = SecretCodeDetector::new("DANCE");
    assert_eq!(feed(&mut d, "dance"), 1);
}

#[test]
fn single_character_substitution_never_fires() {
    for i in 0..5 {
        let mut code: Vec<char> = "dance".chars().collect();
        code[i] = 'x';
        let garbled: String = code.iter().collect();
        let mut d = SecretCodeDetector::new("dance");
        assert_eq!(feed(&mut d, &garbled), 0, "fired on {garbled}");
    }
}

#[test]
fn sliding_buffer_recovers_after_garbage() {
    let mut d = SecretCodeDetector::new("dance");
    assert_eq!(feed(&mut d, "qqqdancqdance"), 1);
    // And again after a prior full match
    assert_eq!(feed(&mut d, "dance"), 1);
}

#[test]
fn code_embedded_in_a_longer_stream_fires() {
    let mut d = SecretCodeDetector::new("dance");
    assert_eq!(feed(&mut d, "xxdancexx"), 1);
}

#[test]
fn trailing_repeat_does_not_rapidly_refire() {
    let mut d = SecretCodeDetector::new("dance");
    assert_eq!(feed(&mut d, "dance"), 1);
    // Hammering the final character must not fire again
    assert_eq!(feed(&mut d, "eeeee"), 0);
}

#[test]
fn modifier_key_names_are_ignored() {
    let mut d = SecretCodeDetector::new("dance");
    assert!(!d.push("Shift"));
    assert!(!d.push("d"));
    assert!(!d.push("ArrowUp"));
    assert!(!d.push("a"));
    assert!(!d.push("n"));
    assert!(!d.push("Control"));
    assert!(!d.push("c"));
    assert!(d.push("e"), "modifier names must not disturb the buffer");
}
