use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use subsearch_core::normalize::{clean_subtitle, clean_text};

const SRT: &[u8] = b"1\r\n00:00:01,600 --> 00:00:04,200\r\n<font color=\"#ffff00\">Previously on</font>\r\n\r\n2\r\n00:00:05,900 --> 00:00:07,999\r\n- You're late.\r\n- I know!\r\n";

fn random_inputs(count: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(2024);
    let pieces: &[&[u8]] = &[
        b"00:01:02,345 --> 00:01:04,000",
        b"\r\n",
        b"<i>",
        b"</i>",
        b"hello",
        b" world ",
        b"\xe9\xff\x80",
        b"123",
        b"?!,.",
        b"\t\t",
    ];
    (0..count)
        .map(|_| {
            let len = rng.random_range(0..40);
            let mut out = Vec::new();
            for _ in 0..len {
                if rng.random_bool(0.3) {
                    out.push(rng.random::<u8>());
                } else {
                    out.extend_from_slice(pieces[rng.random_range(0..pieces.len())]);
                }
            }
            out
        })
        .collect()
}

#[test]
fn cleans_a_real_srt_block() {
    assert_eq!(clean_subtitle(SRT), "Previously on Youre late I know");
}

#[test]
fn output_is_letters_and_single_spaces() {
    let allowed = Regex::new("^[A-Za-z ]*$").unwrap();
    for input in random_inputs(500) {
        let out = clean_subtitle(&input);
        assert!(allowed.is_match(&out), "bad output {out:?}");
        assert!(!out.contains("  "));
        assert_eq!(out, out.trim());
    }
}

#[test]
fn timestamps_never_survive() {
    let stamp = Regex::new(r"\d{2}:\d{2}:\d{2},\d{3} --> \d{2}:\d{2}:\d{2},\d{3}").unwrap();
    for input in random_inputs(200) {
        assert!(!stamp.is_match(&clean_subtitle(&input)));
    }
    assert_eq!(clean_text("before 12:34:56,789 --> 12:34:58,000 after"), "before after");
}

#[test]
fn cleaning_is_idempotent() {
    for input in random_inputs(300) {
        let once = clean_subtitle(&input);
        assert_eq!(clean_text(&once), once);
        assert_eq!(clean_subtitle(once.as_bytes()), once);
    }
}

#[test]
fn cleaning_is_deterministic() {
    for input in random_inputs(50) {
        assert_eq!(clean_subtitle(&input), clean_subtitle(&input));
    }
}
