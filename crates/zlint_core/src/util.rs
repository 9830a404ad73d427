//! Small helpers shared by the engine and the rules.

/// The contiguous block of `//` comment lines directly above `offset`,
/// returned as a single borrowed slice of the source.
///
/// This is a pure byte-level scan: walk backwards over whitespace, and as
/// long as the preceding line consists of nothing but a `//` comment, fold
/// it into the block. Rules use it for `SAFETY:`-style annotations.
pub fn comments_before(source: &str, offset: usize) -> Option<&str> {
    let offset = offset.min(source.len());
    let mut end = None;
    let mut start = 0;
    let mut cursor = offset;

    loop {
        let trimmed = source[..cursor].trim_end();
        if trimmed.len() == cursor && cursor != offset {
            // No whitespace between two comment lines means `cursor` sits
            // mid-line; the block ended one line up.
            break;
        }
        let cursor_at_line = trimmed.len();
        let line_start = source[..cursor_at_line]
            .rfind('\n')
            .map(|pos| pos + 1)
            .unwrap_or(0);
        let line = source[line_start..cursor_at_line].trim_start();
        if !line.starts_with("//") {
            break;
        }
        let comment_start = line_start + (source[line_start..cursor_at_line].len() - line.len());
        start = comment_start;
        if end.is_none() {
            end = Some(cursor_at_line);
        }
        cursor = line_start;
        if cursor == 0 {
            break;
        }
    }

    end.map(|end| &source[start..end])
}

/// Levenshtein-based "did you mean" lookup over candidate names.
pub fn find_best_match_for_name<'a>(
    candidates: impl Iterator<Item = &'a str>,
    name: &str,
    max_distance: Option<usize>,
) -> Option<&'a str> {
    let max_distance = max_distance.unwrap_or_else(|| std::cmp::max(name.len() / 3, 1));
    candidates
        .filter_map(|candidate| {
            let distance = levenshtein(candidate, name);
            if distance <= max_distance {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|&(_, distance)| distance)
        .map(|(candidate, _)| candidate)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_block_is_returned_whole() {
        let source = "const a = 1;\n// SAFETY: the file is pre-validated\n// so this cannot fail\nconst b = 2;\n";
        let offset = source.find("const b").unwrap();
        let block = comments_before(source, offset).unwrap();
        assert!(block.starts_with("// SAFETY:"));
        assert!(block.ends_with("cannot fail"));
    }

    #[test]
    fn code_lines_stop_the_scan() {
        let source = "const a = 1;\nconst b = 2;";
        let offset = source.find("const b").unwrap();
        assert_eq!(comments_before(source, offset), None);
    }

    #[test]
    fn trailing_comments_on_code_lines_do_not_count() {
        let source = "const a = 1; // note\nconst b = 2;";
        let offset = source.find("const b").unwrap();
        assert_eq!(comments_before(source, offset), None);
    }

    #[test]
    fn best_match_tolerates_small_typos() {
        let names = ["homeless-try", "unused-decls", "line-length"];
        assert_eq!(
            find_best_match_for_name(names.iter().copied(), "homeles-try", None),
            Some("homeless-try")
        );
        assert_eq!(
            find_best_match_for_name(names.iter().copied(), "completely-different", None),
            None
        );
    }
}
