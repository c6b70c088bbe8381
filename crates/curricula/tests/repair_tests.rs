//! Recovery of analysis records from messy model output.

use curricula::ai::{repair_analysis_response, AnalysisOutcome, NOT_AVAILABLE, UNPARSEABLE_MARKER};

struct RepairCase {
    name: &'static str,
    raw: &'static str,
    expect_parsed: bool,
}

const REPAIR_CASES: &[RepairCase] = &[
    RepairCase {
        name: "bare_json",
        raw: r#"{"report": "r", "csvData": {"score": 50}}"#,
        expect_parsed: true,
    },
    RepairCase {
        name: "fenced_with_tag",
        raw: "Sure!\n```json\n{\"report\": \"r\", \"csvData\": {\"score\": 50}}\n```\nThanks",
        expect_parsed: true,
    },
    RepairCase {
        name: "fenced_without_tag",
        raw: "```\n{\"report\": \"r\", \"csvData\": {\"score\": \"50\"}}\n```",
        expect_parsed: true,
    },
    RepairCase {
        name: "json_without_csv_data",
        raw: r#"{"report": "r"}"#,
        expect_parsed: false,
    },
    RepairCase {
        name: "non_numeric_score",
        raw: r#"{"report": "r", "csvData": {"score": "excellent"}}"#,
        expect_parsed: false,
    },
    RepairCase {
        name: "plain_prose",
        raw: "The candidate looks strong overall.",
        expect_parsed: false,
    },
];

#[test]
fn test_repair_cases() {
    for case in REPAIR_CASES {
        let outcome = repair_analysis_response(case.raw.as_bytes());
        assert_eq!(
            !outcome.is_degraded(),
            case.expect_parsed,
            "Case '{}': unexpected outcome {:?}",
            case.name,
            outcome
        );
    }
}

#[test]
fn test_literal_newline_inside_string_survives_repair() {
    let raw = "{\"report\": \"## Strengths\nStrong Go skills\", \
               \"csvData\": {\"score\": 72, \"name\": \"John Doe\", \
               \"incomplete_info\": \"No phone\nNo address\"}}";

    match repair_analysis_response(raw.as_bytes()) {
        AnalysisOutcome::Parsed(record) => {
            assert_eq!(record.report, "## Strengths\nStrong Go skills");
            assert_eq!(record.summary.incomplete_info, "No phone\nNo address");
            assert_eq!(record.summary.score, 72.0);
        }
        other => panic!("Expected parsed record, got {:?}", other),
    }
}

#[test]
fn test_fenced_block_wins_over_surrounding_prose() {
    let raw = "Here is my evaluation {not json}:\n\
               ```json\n\
               {\"report\": \"Fits well\", \"csvData\": {\"score\": 88, \"name\": \"Ana\"}}\n\
               ```\n\
               Let me know if you need more.";

    let outcome = repair_analysis_response(raw.as_bytes());
    let summary = outcome.summary().expect("fenced JSON should parse");
    assert_eq!(summary.name, "Ana");
    assert_eq!(summary.score, 88.0);
    assert_eq!(outcome.report(), "Fits well");
}

#[test]
fn test_prose_degrades_to_placeholder_record() {
    let raw = "I cannot produce JSON today.\nSorry.";

    match repair_analysis_response(raw.as_bytes()) {
        AnalysisOutcome::Degraded(degraded) => {
            assert_eq!(degraded.raw_text, raw);
            assert_eq!(degraded.error, UNPARSEABLE_MARKER);
        }
        other => panic!("Expected degraded record, got {:?}", other),
    }
    assert_eq!(NOT_AVAILABLE, "N/A");
}

#[test]
fn test_invalid_utf8_is_dropped_before_parsing() {
    let mut raw = br#"{"report": "ok", "csvData": {"score": 60, "name": "Jo"#.to_vec();
    raw.push(0xFF);
    raw.extend_from_slice(br#"se"}}"#);

    let outcome = repair_analysis_response(&raw);
    assert_eq!(outcome.summary().map(|s| s.name.as_str()), Some("Jose"));
}
