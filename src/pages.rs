// src/pages.rs - Page range expression parsing
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid page range token '{0}'")]
    InvalidRange(String),
}

/// Parse a page-range expression such as `1-3,5` against a known page count.
///
/// Tokens are comma separated, each a single 1-based page number or an
/// inclusive `a-b` range with `a <= b`. `all` (or an empty expression) selects
/// every page. Overlaps are allowed; the result is ascending and free of
/// duplicates. Malformed tokens, pages outside `1..=total_pages`, and reversed
/// ranges fail with [`RangeError::InvalidRange`] carrying the offending token.
pub fn parse_page_range(expression: &str, total_pages: u32) -> Result<Vec<u32>, RangeError> {
    let expression = expression.trim();
    if expression.is_empty() || expression.eq_ignore_ascii_case("all") {
        return Ok((1..=total_pages).collect());
    }

    let mut pages = BTreeSet::new();
    for raw in expression.split(',') {
        let token = raw.trim();
        let (start, end) = match token.split_once('-') {
            Some((a, b)) => (parse_page(a, token)?, parse_page(b, token)?),
            None => {
                let page = parse_page(token, token)?;
                (page, page)
            }
        };
        if start == 0 || start > end || end > total_pages {
            return Err(RangeError::InvalidRange(token.to_string()));
        }
        pages.extend(start..=end);
    }

    Ok(pages.into_iter().collect())
}

fn parse_page(text: &str, token: &str) -> Result<u32, RangeError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| RangeError::InvalidRange(token.to_string()))
}
