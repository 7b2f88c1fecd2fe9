use super::*;

fn words_of(input: &str) -> Vec<String> {
    read_words(1, input)
        .expect("input should be valid")
        .into_iter()
        .map(|w| w.text)
        .collect()
}

#[test]
fn test_empty_input() {
    assert_eq!(words_of(""), Vec::<String>::new());
    assert_eq!(words_of("  \t  "), Vec::<String>::new());
}

#[test]
fn test_comment_only() {
    assert_eq!(words_of("// LOOP count=3"), Vec::<String>::new());
    assert_eq!(words_of("   //"), Vec::<String>::new());
}

#[test]
fn test_equals_is_a_separator() {
    assert_eq!(words_of("START event_mode=5"), ["START", "event_mode", "5"]);
    assert_eq!(words_of("START event_mode = 5"), ["START", "event_mode", "5"]);
}

#[test]
fn test_tabs_separate_words() {
    assert_eq!(words_of("WAIT\tperiod=2\tms"), ["WAIT", "period", "2", "ms"]);
}

#[test]
fn test_trailing_comment() {
    assert_eq!(
        words_of("LOOP count=3 times // three times round"),
        ["LOOP", "count", "3", "times"]
    );
    assert_eq!(words_of("DO_LOOP// no space"), ["DO_LOOP"]);
}

#[test]
fn test_columns() {
    let words = read_words(1, "  INC event_tag=7").expect("input should be valid");
    let columns: Vec<usize> = words.iter().map(|w| w.column).collect();
    assert_eq!(columns, [3, 7, 17]);
}

#[test]
fn test_lone_solidus_is_an_error() {
    match read_words(4, "WAIT 5 / comment") {
        Err(CompileError::SyntaxError { line, column, .. }) => {
            assert_eq!(line, 4);
            assert_eq!(column, Some(8));
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn test_starts_with_digit() {
    let words = read_words(1, "START 5 event_mode").expect("input should be valid");
    assert!(!words[0].starts_with_digit());
    assert!(words[1].starts_with_digit());
    assert!(!words[2].starts_with_digit());
}
