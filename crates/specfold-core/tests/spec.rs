use std::collections::HashSet;

use specfold_core::predicate::Op;
use specfold_core::spec::Spec;
use specfold_core::version::Version;
use specfold_util::errors::SpecError;

fn spec(s: &str) -> Spec {
    Spec::from_expression(s, None).unwrap()
}

#[test]
fn test_parse_name_and_predicates_in_order() {
    let s = spec("Django>=1.3,<1.4");
    assert_eq!(s.name(), "Django");
    assert_eq!(s.key(), "django");
    let ops: Vec<Op> = s.predicates().iter().map(|p| p.op).collect();
    assert_eq!(ops, vec![Op::Ge, Op::Lt]);
    assert!(s.source().is_none());
}

#[test]
fn test_parse_bare_name() {
    let s = spec("django-pipeline");
    assert!(s.is_bare());
    assert_eq!(s.to_string(), "django-pipeline");
}

#[test]
fn test_parse_with_whitespace() {
    let s = spec(" Django >= 1.3 , < 1.4 ");
    assert_eq!(s.to_string(), "django>=1.3,<1.4");
}

#[test]
fn test_parse_keeps_source() {
    let s = Spec::from_expression("foo", Some("bar==1.2.4")).unwrap();
    assert_eq!(s.source(), Some("bar==1.2.4"));
}

#[test]
fn test_parse_errors() {
    for bad in ["", ">=1.0", "Django~=1.3", "Django>=1.3,", "Django>=", "Django 1.3", "-foo"] {
        let err = Spec::from_expression(bad, None).unwrap_err();
        assert!(matches!(err, SpecError::Parse { .. }), "{bad}: {err}");
    }
}

#[test]
fn test_display_lowercases_and_keeps_predicate_order() {
    assert_eq!(spec("Django<1.4,>=1.3").to_string(), "django<1.4,>=1.3");
}

#[test]
fn test_from_str_parses() {
    let s: Spec = "Django==1.3".parse().unwrap();
    assert!(s.is_pinned());
    assert_eq!(s.pinned_version(), Some(&Version::parse("1.3").unwrap()));
}

#[test]
fn test_equality_is_structural() {
    assert_eq!(spec("Django>=1.3"), spec("django>=1.3"));
    assert_ne!(spec("Django>=1.3,<1.4"), spec("Django<1.4,>=1.3"));

    let with_source = Spec::from_expression("foo", Some("bar")).unwrap();
    assert_ne!(with_source, spec("foo"));

    let set: HashSet<Spec> = [spec("foo"), spec("FOO"), with_source].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_explode_yields_one_spec_per_predicate() {
    let s = Spec::from_expression("Django>=1.3,<1.4,!=1.3.5", Some("req.txt")).unwrap();
    let exploded: Vec<Spec> = s.explode().collect();
    assert_eq!(exploded.len(), 3);
    let rendered: Vec<String> = exploded.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["django>=1.3", "django<1.4", "django!=1.3.5"]);
    for part in &exploded {
        assert_eq!(part.predicates().len(), 1);
        assert_eq!(part.name(), "Django");
        assert_eq!(part.source(), Some("req.txt"));
    }
}

#[test]
fn test_explode_bare_yields_itself() {
    let s = spec("Django");
    let exploded: Vec<Spec> = s.explode().collect();
    assert_eq!(exploded, vec![s]);
}

#[test]
fn test_pinned_constructor_and_matches() {
    let pinned = Spec::pinned("Django", Version::parse("1.4.1").unwrap(), None);
    assert_eq!(pinned.to_string(), "django==1.4.1");
    assert!(pinned.matches(&Version::parse("1.4.1").unwrap()));
    assert!(!pinned.matches(&Version::parse("1.4.2").unwrap()));

    let range = spec("Django>=1.3,<1.4");
    assert!(!range.is_pinned());
    assert!(range.pinned_version().is_none());
    assert!(range.matches(&Version::parse("1.3.7").unwrap()));
    assert!(spec("Django").matches(&Version::parse("9.9").unwrap()));
}

#[test]
fn test_description_mentions_source() {
    let s = Spec::from_expression("Django<1.4", Some("requirements.txt")).unwrap();
    assert_eq!(s.description(), "django<1.4 (from requirements.txt)");
    assert_eq!(spec("Django<1.4").description(), "django<1.4");
}

#[test]
fn test_with_source_replaces_source() {
    let s = spec("Django<1.4").with_source(Some("qux".to_string()));
    assert_eq!(s.source(), Some("qux"));
}

#[test]
fn test_semver_scheme_spec() {
    let s = Spec::<semver::Version>::parse("serde>=1.0.100,<2.0.0", None).unwrap();
    assert_eq!(s.to_string(), "serde>=1.0.100,<2.0.0");
    assert!(Spec::<semver::Version>::parse("serde>=1.0", None).is_err());
}
