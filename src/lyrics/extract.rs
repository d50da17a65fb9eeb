const MIN_LINE_CHARS: usize = 10;
const MAX_LINE_CHARS: usize = 200;

/// Picks up to `max` lines of `lyrics` that read well as a standalone quote.
///
/// Lines are trimmed. Section annotations such as `[Chorus]`, bare numbers
/// and the `*******` disclaimer appended by some providers are skipped.
pub fn extract_quote_lines(lyrics: &str, max: usize) -> Vec<String> {
    lyrics
        .lines()
        .map(str::trim)
        .filter(|line| {
            let len = line.chars().count();
            len > MIN_LINE_CHARS
                && len < MAX_LINE_CHARS
                && !line.contains('[')
                && !line.contains(']')
                && !line.contains('*')
                && !is_numeric(line)
        })
        .take(max)
        .map(str::to_string)
        .collect()
}

fn is_numeric(line: &str) -> bool {
    let digits = line.trim_start_matches('(').trim_end_matches(')');
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
