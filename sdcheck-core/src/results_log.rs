pub const PASS_MARKER: &str = "PASS:";
pub const FAIL_MARKER: &str = "FAIL:";

/// Outcome counts the firmware logged to `results.txt`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultsSummary {
    pub pass_count: usize,
    pub fail_count: usize,
    /// Trimmed text of every line carrying a failure marker.
    pub failed_lines: Vec<String>,
}

fn count_ascii_ci(haystack: &str, needle: &str) -> usize {
    let h = haystack.to_ascii_uppercase();
    h.matches(&needle.to_ascii_uppercase()).count()
}

/// Count `PASS:`/`FAIL:` markers anywhere on each line, ignoring ASCII case.
pub fn scan_results(text: &str) -> ResultsSummary {
    let mut s = ResultsSummary::default();
    for line in text.lines() {
        s.pass_count += count_ascii_ci(line, PASS_MARKER);
        let fails = count_ascii_ci(line, FAIL_MARKER);
        if fails > 0 {
            s.fail_count += fails;
            s.failed_lines.push(line.trim().to_string());
        }
    }
    s
}

/// Same as `scan_results` for raw file contents; invalid UTF-8 is replaced.
pub fn scan_results_bytes(data: &[u8]) -> ResultsSummary {
    scan_results(&String::from_utf8_lossy(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_markers_and_keeps_fail_lines() {
        let text = "PASS: mount\nPASS: mkdir\n  FAIL: rename across dirs\nnoise\npass: lower\n";
        let s = scan_results(text);
        assert_eq!(s.pass_count, 3);
        assert_eq!(s.fail_count, 1);
        assert_eq!(s.failed_lines, vec!["FAIL: rename across dirs".to_string()]);
    }

    #[test]
    fn marker_anywhere_on_line() {
        let s = scan_results("[12.3] test 4 Fail: timeout\n");
        assert_eq!(s.fail_count, 1);
        assert_eq!(s.pass_count, 0);
    }

    #[test]
    fn empty_log() {
        assert_eq!(scan_results(""), ResultsSummary::default());
    }

    #[test]
    fn lossy_bytes() {
        let s = scan_results_bytes(b"PASS: a\n\xFF\xFEFAIL: b\n");
        assert_eq!(s.pass_count, 1);
        assert_eq!(s.fail_count, 1);
    }
}
