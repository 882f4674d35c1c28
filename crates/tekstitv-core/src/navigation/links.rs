use std::sync::OnceLock;

use regex::Regex;

use crate::page::{PageId, PageResponse};

fn link_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Word-bounded so digit runs of other lengths ("2023", "45") never
    // produce page links
    RE.get_or_init(|| Regex::new(r"\b\d{3}\b").expect("link token regex"))
}

/// Candidate link targets for the link bar.
///
/// A non-empty favorites set replaces the generated list entirely; it is
/// returned verbatim (the settings layer keeps it sorted) and ignores the
/// loading flag. Otherwise the list is empty while a page load is in
/// flight, even though the previous response stays on screen under the
/// loading indicator. Once loaded, the page content is scanned for
/// 3-digit tokens in the valid page range, excluding the page on display,
/// deduplicated in first-occurrence order.
pub fn link_targets(
    page: PageId,
    response: Option<&PageResponse>,
    favorites: &[PageId],
    loading: bool,
) -> Vec<PageId> {
    if !favorites.is_empty() {
        return favorites.to_vec();
    }

    if loading {
        return Vec::new();
    }

    let Some(response) = response else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for line in &response.lines {
        for token in link_token_regex().find_iter(line) {
            let Some(target) = PageId::parse(token.as_str()) else {
                continue;
            };
            if target != page && !links.contains(&target) {
                links.push(target);
            }
        }
    }

    links
}
