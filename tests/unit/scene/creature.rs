use super::*;

#[test]
fn parse_accepts_names_case_insensitively() {
    assert_eq!(CreatureKind::parse("wolf").unwrap(), CreatureKind::Wolf);
    assert_eq!(CreatureKind::parse("  SpIdEr ").unwrap(), CreatureKind::Spider);
    assert_eq!("lava".parse::<CreatureKind>().unwrap(), CreatureKind::Lava);
}

#[test]
fn parse_accepts_indices() {
    assert_eq!(CreatureKind::parse("2").unwrap(), CreatureKind::Mummy);
    assert_eq!(CreatureKind::parse("0").unwrap(), CreatureKind::Cat);
    assert_eq!(CreatureKind::parse("5").unwrap(), CreatureKind::Wolf);
    // Fractional indices floor.
    assert_eq!(CreatureKind::parse("4.9").unwrap(), CreatureKind::Spider);
}

#[test]
fn parse_rejects_unknown_and_out_of_range() {
    for bad in ["dragon", "", "   ", "6", "-1", "-0.5", "NaN", "inf", "wolves"] {
        let err = CreatureKind::parse(bad).unwrap_err();
        assert!(
            matches!(err, CardError::Validation(_)),
            "expected validation error for {bad:?}"
        );
    }
}

#[test]
fn as_str_round_trips_every_kind() {
    for (i, kind) in CreatureKind::ALL.into_iter().enumerate() {
        assert_eq!(CreatureKind::parse(kind.as_str()).unwrap(), kind);
        assert_eq!(CreatureKind::from_index(i), Some(kind));
        assert_eq!(kind.to_string(), kind.as_str());
    }
    assert_eq!(CreatureKind::from_index(6), None);
}

#[test]
fn coerce_score_never_rejects() {
    assert_eq!(coerce_score("450"), 450);
    assert_eq!(coerce_score(" 12 "), 12);
    assert_eq!(coerce_score("250.9"), 250);
    assert_eq!(coerce_score("-3.7"), -3);
    assert_eq!(coerce_score("1e3"), 1000);
    assert_eq!(coerce_score(""), 0);
    assert_eq!(coerce_score("abc"), 0);
    assert_eq!(coerce_score("Infinity"), 0);
    assert_eq!(coerce_score("NaN"), 0);
}

#[test]
fn total_sums_named_scores_only() {
    let mut s = ScoreSet::new(1, 2, 3, 4);
    s.reserved = 100;
    assert_eq!(s.total(), 10);
    assert_eq!(ScoreSet::default().total(), 0);
}

#[test]
fn from_raw_rejects_only_on_kind() {
    let raw = RawRequest {
        kind: "cat".to_string(),
        eye_score: "450".to_string(),
        brain_score: "garbage".to_string(),
        ..RawRequest::default()
    };
    let req = GenerationRequest::from_raw(&raw).unwrap();
    assert_eq!(req.kind, CreatureKind::Cat);
    assert_eq!(req.scores, ScoreSet::new(450, 0, 0, 0));

    let bad = RawRequest {
        kind: "dragon".to_string(),
        ..raw
    };
    assert!(GenerationRequest::from_raw(&bad).is_err());
}

#[test]
fn to_raw_validates_back_to_same_request() {
    let req = GenerationRequest::new(CreatureKind::Demon, ScoreSet::new(10, 250, 400, 7));
    assert_eq!(GenerationRequest::from_raw(&req.to_raw()).unwrap(), req);
}
