// tests/ingest_normalize.rs
use naija_grid_watch::ingest::normalize_text;

#[test]
fn empty_is_ok() {
    assert_eq!(normalize_text("", 300), "");
}

#[test]
fn strips_html_and_unescapes() {
    let s = "<p>Outage&nbsp;<b>notice</b> &ldquo;Ikeja GRA&rdquo;</p>";
    assert_eq!(normalize_text(s, 300), r#"Outage notice "Ikeja GRA""#);
}

#[test]
fn folds_whitespace_and_nbsp() {
    let s = "Ojota\u{00A0}\n\tKetu   Mile 12";
    assert_eq!(normalize_text(s, 300), "Ojota Ketu Mile 12");
}

#[test]
fn trailing_punctuation_dropped() {
    assert_eq!(normalize_text("Power restored!!", 300), "Power restored");
    assert_eq!(normalize_text("Supply resumes at 4 p.m.", 300), "Supply resumes at 4 p.m");
}

#[test]
fn length_cap_applies() {
    let s = "x".repeat(2_000);
    assert_eq!(normalize_text(&s, 1_500).chars().count(), 1_500);
}
