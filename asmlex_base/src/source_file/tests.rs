use super::TextSource;

#[test]
fn test_get_line_byte_positions() {
    let text = "Hello\nworld\r\n!\rtes";
    let byte_positions = super::get_line_byte_positions(text);
    assert_eq!(byte_positions, vec![0..6, 6..13, 13..15, 15..18]);
}

#[test]
fn test_trailing_terminator() {
    assert_eq!(super::get_line_byte_positions("nop\n"), vec![0..4]);
    assert_eq!(super::get_line_byte_positions(""), vec![0..0]);
}

#[test]
fn test_mapped_file() {
    const TEST_FILE: &str = "test file";
    let source_file = super::SourceFile::temp(TEST_FILE).unwrap();
    assert_eq!(source_file.content(), TEST_FILE);
}

#[test]
fn test_get_line_strips_terminators() {
    let source_file = super::SourceFile::temp("ld a, 1\r\nret\rnop\n").unwrap();

    assert_eq!(source_file.line_count(), 3);
    assert_eq!(source_file.get_line(0), None);
    assert_eq!(source_file.get_line(1), Some("ld a, 1"));
    assert_eq!(source_file.get_line(2), Some("ret"));
    assert_eq!(source_file.get_line(3), Some("nop"));
    assert_eq!(source_file.get_line(4), None);
}

#[test]
fn test_lines_text_source() {
    let source_file = super::SourceFile::temp("first\nsecond").unwrap();
    let mut lines = source_file.lines();

    assert!(!lines.is_at_end());
    assert_eq!(lines.read_line().as_deref(), Some("first"));
    assert!(!lines.is_at_end());
    assert_eq!(lines.read_line().as_deref(), Some("second"));
    assert!(lines.is_at_end());
    assert_eq!(lines.read_line(), None);
}
