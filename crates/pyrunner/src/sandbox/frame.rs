//! Input injection and output framing
//!
//! Wraps a snippet into a self-contained program that feeds at most one input
//! value to `input()`, captures everything the snippet prints, and emits the
//! capture between two sentinel lines once the snippet finishes (including
//! when it raises).

/// Line printed before the captured output
pub const OUTPUT_BEGIN: &str = "===PYRUNNER_OUTPUT_BEGIN===";

/// Line printed after the captured output
pub const OUTPUT_END: &str = "===PYRUNNER_OUTPUT_END===";

const INDENT: &str = "    ";

// `{pending}` is replaced with a list literal holding zero or one input value.
const PRELUDE: &str = "\
import io as _pyrunner_io
import sys as _pyrunner_sys

_pyrunner_pending = {pending}


def input(prompt=''):
    if _pyrunner_pending:
        return _pyrunner_pending.pop()
    return ''


_pyrunner_buffer = _pyrunner_io.StringIO()
_pyrunner_stdout = _pyrunner_sys.stdout
_pyrunner_sys.stdout = _pyrunner_buffer
try:
    pass
";

const EPILOGUE: &str = "\
finally:
    _pyrunner_sys.stdout = _pyrunner_stdout
    print('===PYRUNNER_OUTPUT_BEGIN===')
    print(_pyrunner_buffer.getvalue().rstrip())
    print('===PYRUNNER_OUTPUT_END===')
    _pyrunner_sys.stdout.flush()
";

/// Build the program executed for one run
///
/// Every line of `code` is indented into a `try` block whose `finally`
/// restores stdout before printing the markers, so the markers never end up
/// in the capture.
pub fn frame(code: &str, input: Option<&str>) -> String {
    let pending = match input {
        // A JSON string literal is also a valid Python string literal
        Some(value) => format!("[{}]", serde_json::Value::String(value.to_owned())),
        None => "[]".to_owned(),
    };

    let mut program = String::with_capacity(PRELUDE.len() + EPILOGUE.len() + code.len() * 2);
    program.push_str(&PRELUDE.replace("{pending}", &pending));
    for line in code.lines() {
        if !line.is_empty() {
            program.push_str(INDENT);
        }
        program.push_str(line);
        program.push('\n');
    }
    program.push_str(EPILOGUE);
    program
}

/// Extract the captured output from a framed program's raw stdout
///
/// Returns `None` when the markers are missing, e.g. when the framed program
/// failed to compile or was killed before reaching its `finally` block.
pub fn extract_output(raw: &str) -> Option<&str> {
    let start = raw.find(OUTPUT_BEGIN)? + OUTPUT_BEGIN.len();
    let rest = &raw[start..];
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);
    let end = rest.rfind(OUTPUT_END)?;
    Some(rest[..end].trim_end_matches(['\r', '\n']))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_match_epilogue() {
        assert!(EPILOGUE.contains(&format!("print('{OUTPUT_BEGIN}')")));
        assert!(EPILOGUE.contains(&format!("print('{OUTPUT_END}')")));
    }

    #[test]
    fn frame_without_input_has_empty_queue() {
        let program = frame("print('hi')", None);
        assert!(program.contains("_pyrunner_pending = []\n"));
    }

    #[test]
    fn frame_with_input_quotes_value() {
        let program = frame("x = input()", Some("a \"quoted\" \\ value"));
        assert!(program.contains(r#"_pyrunner_pending = ["a \"quoted\" \\ value"]"#));
    }

    #[test]
    fn frame_escapes_newlines_in_input() {
        let program = frame("x = input()", Some("two\nlines"));
        assert!(program.contains(r#"_pyrunner_pending = ["two\nlines"]"#));
    }

    #[test]
    fn frame_indents_user_code_inside_try() {
        let program = frame("for i in range(2):\n    print(i)", None);
        assert!(program.contains("try:\n    pass\n    for i in range(2):\n        print(i)\nfinally:\n"));
    }

    #[test]
    fn frame_keeps_blank_lines_unindented() {
        let program = frame("a = 1\n\nb = 2", None);
        assert!(program.contains("    a = 1\n\n    b = 2\n"));
    }

    #[test]
    fn frame_normalizes_crlf() {
        let program = frame("a = 1\r\nb = 2\r\n", None);
        assert!(program.contains("    a = 1\n    b = 2\nfinally:"));
    }

    #[test]
    fn frame_of_empty_code_is_still_a_block() {
        let program = frame("", None);
        assert!(program.contains("try:\n    pass\nfinally:\n"));
    }

    #[test]
    fn extract_simple() {
        let raw = format!("{OUTPUT_BEGIN}\nhi\n{OUTPUT_END}\n");
        assert_eq!(extract_output(&raw), Some("hi"));
    }

    #[test]
    fn extract_multiline() {
        let raw = format!("{OUTPUT_BEGIN}\n1\n2\n3\n{OUTPUT_END}\n");
        assert_eq!(extract_output(&raw), Some("1\n2\n3"));
    }

    #[test]
    fn extract_empty_capture() {
        let raw = format!("{OUTPUT_BEGIN}\n\n{OUTPUT_END}\n");
        assert_eq!(extract_output(&raw), Some(""));
    }

    #[test]
    fn extract_ignores_noise_outside_markers() {
        let raw = format!("noise\n{OUTPUT_BEGIN}\nvalue\n{OUTPUT_END}\ntrailer\n");
        assert_eq!(extract_output(&raw), Some("value"));
    }

    #[test]
    fn extract_crlf() {
        let raw = format!("{OUTPUT_BEGIN}\r\nvalue\r\n{OUTPUT_END}\r\n");
        assert_eq!(extract_output(&raw), Some("value"));
    }

    #[test]
    fn extract_missing_markers() {
        assert_eq!(extract_output(""), None);
        assert_eq!(extract_output("plain output\n"), None);
        assert_eq!(extract_output(&format!("{OUTPUT_BEGIN}\npartial")), None);
    }

    #[test]
    fn extract_keeps_end_marker_text_printed_by_snippet() {
        // The snippet's own copy of the end marker stays inside the capture
        let raw = format!("{OUTPUT_BEGIN}\n{OUTPUT_END}\n{OUTPUT_END}\n");
        assert_eq!(extract_output(&raw), Some(OUTPUT_END));
    }
}
