use super::diagnostic::{DiagnosticKind, Diagnostics};
use super::error::RecordError;

/// Parse a span specification into an end-exclusive `(start, end)` range
///
/// Accepts `"start end"` or a discontinuous `"s1 e1;s2 e2;..."`. Fragmented
/// spans are collapsed to their enclosing range (minimum start, maximum end),
/// which loses the gaps, so a `MultiFragmentSpan` diagnostic is recorded.
pub fn parse_span(span: &str, diagnostics: &mut Diagnostics) -> Result<(usize, usize), RecordError> {
    let mut fragments = span.split(';').map(parse_fragment);
    // split always yields at least one item
    let (mut start, mut end) = fragments
        .next()
        .ok_or_else(|| RecordError::MalformedFragment(span.to_string()))??;

    let mut count = 1;
    for fragment in fragments {
        let (s, e) = fragment?;
        start = start.min(s);
        end = end.max(e);
        count += 1;
    }

    if count > 1 {
        diagnostics.warn(
            DiagnosticKind::MultiFragmentSpan,
            format!(
                "multi-span Textbound ({}), using max span ({} {})",
                span, start, end
            ),
        );
    }

    Ok((start, end))
}

fn parse_fragment(fragment: &str) -> Result<(usize, usize), RecordError> {
    let offsets: Vec<&str> = fragment.split(' ').collect();
    let [start, end] = offsets.as_slice() else {
        return Err(RecordError::MalformedFragment(fragment.to_string()));
    };
    let start = parse_offset(start)?;
    let end = parse_offset(end)?;
    if start > end {
        return Err(RecordError::InvertedSpan { start, end });
    }
    Ok((start, end))
}

fn parse_offset(value: &str) -> Result<usize, RecordError> {
    value
        .parse()
        .map_err(|_| RecordError::InvalidOffset(value.to_string()))
}

/// Whether two end-exclusive ranges share at least one boundary point
///
/// Inclusive at both ends: `(0, 5)` and `(5, 9)` overlap. Only checks whether
/// an endpoint of `b` lies inside `a`, so a `b` that strictly contains `a`
/// does not count.
pub fn spans_overlap(a: (usize, usize), b: (usize, usize)) -> bool {
    (a.0 <= b.0 && b.0 <= a.1) || (a.0 <= b.1 && b.1 <= a.1)
}
