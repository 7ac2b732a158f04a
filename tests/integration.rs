use serde_json::json;

use chromos::api::normalize;
use chromos::export;
use chromos::model::{DiffMark, Luma, Settings, Swatch};
use chromos::session::{Event, Origin, Session};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn swatch(hex: &str) -> Swatch {
    Swatch {
        hex: Some(hex.to_string()),
        ..Swatch::default()
    }
}

fn luma_with(label: &str, hexes: &[&str]) -> Luma {
    Luma {
        label: label.to_string(),
        palette: hexes.iter().map(|h| swatch(h)).collect(),
        ..Luma::default()
    }
}

fn generated(seq: u64, origin: Origin, luma: Luma) -> Event {
    Event::Generated {
        seq,
        origin,
        prompt: luma.label.to_lowercase(),
        luma,
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

#[test]
fn generation_without_palette_is_an_error_not_a_partial_render() {
    let body = json!({ "label": "Dawn", "narrative": "..." });
    assert!(normalize::luma(&body).is_err());

    let body = json!({ "label": "Dawn", "palette": { "oops": "an object" } });
    assert!(normalize::luma(&body).is_err());
}

#[test]
fn missing_tags_render_as_an_empty_list() {
    let body = json!({ "palette": [{ "hex": "#123456" }] });
    let luma = normalize::luma(&body).unwrap();
    assert!(luma.tags.is_empty());
    assert_eq!(luma.palette.len(), 1);
}

#[test]
fn service_error_text_is_surfaced_verbatim() {
    let body = json!({ "error": "quota exceeded for this deployment" });
    assert_eq!(
        normalize::error_field(&body).as_deref(),
        Some("quota exceeded for this deployment")
    );
}

// ---------------------------------------------------------------------------
// Accessibility diff
// ---------------------------------------------------------------------------

#[test]
fn only_the_remediated_index_reports_changed() {
    let luma = Luma {
        original_palette: Some(vec![
            swatch("#000000"),
            swatch("#111111"),
            swatch("#ffffff"),
        ]),
        fixed_palette: Some(vec![
            swatch("#000000"),
            swatch("#222222"),
            swatch("#ffffff"),
        ]),
        ..Luma::default()
    };
    let diff = luma.compliance_diff().unwrap();
    assert_eq!(
        diff,
        vec![DiffMark::Unchanged, DiffMark::Changed, DiffMark::Unchanged]
    );
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_round_trip_is_structural_identity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(export::DEFAULT_EXPORT_FILE);

    let mut luma = luma_with("Highland Dawn", &["#ab4512", "#335522"]);
    luma.tags = vec!["sacred".into(), "solar".into()];
    luma.narrative = "A slow sunrise.".into();
    luma.apply_fix(vec![swatch("#ab4512"), swatch("#446633")]);

    export::write_to(&luma, &path).unwrap();
    let restored = export::read_from(&path).unwrap();
    assert_eq!(restored, luma);

    // The diff survives the round trip too.
    assert_eq!(
        restored.compliance_diff().unwrap(),
        vec![DiffMark::Unchanged, DiffMark::Changed]
    );
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[test]
fn settings_clamp_matches_the_control_bounds() {
    for raw in [0u8, 1, 2] {
        let s = Settings {
            palette_length: raw,
            ..Settings::default()
        };
        assert_eq!(s.clamped().palette_length, 3);
    }
    for raw in [11u8, 50, 255] {
        let s = Settings {
            palette_length: raw,
            ..Settings::default()
        };
        assert_eq!(s.clamped().palette_length, 10);
    }
}

// ---------------------------------------------------------------------------
// Session ordering
// ---------------------------------------------------------------------------

// A stale in-flight response must never overwrite state produced by a later
// request. These tests pin the sequence-number discard that guards against
// that ordering hazard.

#[test]
fn late_completion_of_a_superseded_request_is_discarded() {
    let mut session = Session::new();
    let seq_a = session.begin_request();
    let seq_b = session.begin_request();

    // B resolves first…
    session.apply(generated(seq_b, Origin::Root, luma_with("B", &["#222222"])));
    // …then A's response limps in and must not win.
    session.apply(generated(seq_a, Origin::Root, luma_with("A", &["#111111"])));

    assert_eq!(session.current().unwrap().luma.label, "B");
}

#[test]
fn new_top_level_prompt_resets_history_and_chat() {
    let mut session = Session::new();
    let seq = session.begin_request();
    session.apply(generated(seq, Origin::Root, luma_with("Dawn", &["#111111"])));

    let seq = session.begin_request();
    session.apply(generated(
        seq,
        Origin::Evolve(0),
        luma_with("Ember", &["#331111"]),
    ));
    assert_eq!(session.history.len(), 2);
    assert_eq!(session.history.get(1).unwrap().parent, Some(0));

    let seq = session.begin_request();
    session.apply(generated(seq, Origin::Root, luma_with("Tide", &["#113355"])));
    assert_eq!(session.history.len(), 1);
    assert!(session.transcript.is_empty());
}

#[test]
fn fix_event_reshapes_only_the_target_node() {
    let mut session = Session::new();
    let seq = session.begin_request();
    session.apply(generated(
        seq,
        Origin::Root,
        luma_with("Dawn", &["#111111", "#999999"]),
    ));

    let seq = session.begin_request();
    session.apply(Event::Fixed {
        seq,
        node: 0,
        fixed: vec![swatch("#222222"), swatch("#999999")],
    });

    let luma = &session.current().unwrap().luma;
    assert_eq!(luma.palette[0].hex.as_deref(), Some("#222222"));
    assert_eq!(
        luma.compliance_diff().unwrap(),
        vec![DiffMark::Changed, DiffMark::Unchanged]
    );
}
