// Pagination support for GitHub API list endpoints

/// Extract the `rel="next"` URL from a `Link` header.
///
/// GitHub returns Link headers like:
/// `<https://api.github.com/resource?page=2>; rel="next", <https://api.github.com/resource?page=5>; rel="last"`
///
/// Returns `None` when the header is absent or carries no `next` relation,
/// which marks the last page.
pub(crate) fn parse_link_header(link_header: Option<&str>) -> Option<String> {
    let header = link_header?;

    header.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let (Some(url), Some(rel)) = (parts.next(), parts.next()) else {
            return None;
        };

        let url = url.trim().trim_start_matches('<').trim_end_matches('>');
        let rel = rel.trim().trim_start_matches("rel=\"").trim_end_matches('"');

        (rel == "next").then(|| url.to_string())
    })
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
