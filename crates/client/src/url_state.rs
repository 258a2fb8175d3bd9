//! Query-string mirroring of the list position.

use reqwest::Url;

pub const FIRST_PARAM: &str = "first";
pub const LAST_PARAM: &str = "last";
pub const SEARCH_PARAM: &str = "search";
pub const PAGE_PARAM: &str = "page";

/// Filters and page carried by a deep link. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLocation {
    pub first: Option<String>,
    pub last: Option<String>,
    pub search: Option<String>,
    pub page: usize,
}

impl Default for ListLocation {
    fn default() -> Self {
        Self {
            first: None,
            last: None,
            search: None,
            page: 1,
        }
    }
}

impl ListLocation {
    /// Missing, unparseable or zero page numbers read as page 1.
    pub fn parse(url: &Url) -> Self {
        let param = |key: &str| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
                .filter(|v| !v.is_empty())
        };
        Self {
            first: param(FIRST_PARAM),
            last: param(LAST_PARAM),
            search: param(SEARCH_PARAM),
            page: param(PAGE_PARAM)
                .and_then(|p| p.trim().parse::<usize>().ok())
                .filter(|&p| p > 0)
                .unwrap_or(1),
        }
    }

    /// Zero-based page index.
    pub fn page_index(&self) -> usize {
        self.page.saturating_sub(1)
    }

    /// Writes this location into `url`. Page 1 is left implicit.
    pub fn apply_to(&self, url: &mut Url) {
        let page = (self.page > 1).then(|| self.page.to_string());
        set_search_params(
            url,
            [
                (FIRST_PARAM, self.first.as_deref()),
                (LAST_PARAM, self.last.as_deref()),
                (SEARCH_PARAM, self.search.as_deref()),
                (PAGE_PARAM, page.as_deref()),
            ],
        );
    }
}

/// Applies `updates` to the query string. `None` or empty values delete the
/// key; others replace the first occurrence in place or are appended.
/// Unrelated parameters keep their order.
pub fn set_search_params<'a, I>(url: &mut Url, updates: I)
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    for (key, value) in updates {
        match value.filter(|v| !v.is_empty()) {
            None => pairs.retain(|(k, _)| k != key),
            Some(value) => {
                let mut replaced = false;
                pairs.retain_mut(|(k, v)| {
                    if k != key {
                        return true;
                    }
                    if replaced {
                        return false;
                    }
                    *v = value.to_string();
                    replaced = true;
                    true
                });
                if !replaced {
                    pairs.push((key.to_string(), value.to_string()));
                }
            }
        }
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&pairs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_parses_filters_and_page() {
        let location = ListLocation::parse(&url(
            "https://admin.example.com/candidates?first=Jo&last=&page=3&search=dev%20ops",
        ));
        assert_eq!(location.first.as_deref(), Some("Jo"));
        assert_eq!(location.last, None);
        assert_eq!(location.search.as_deref(), Some("dev ops"));
        assert_eq!(location.page, 3);
        assert_eq!(location.page_index(), 2);
    }

    #[test]
    fn test_bad_pages_read_as_first() {
        for query in ["", "?page=0", "?page=abc", "?page=-2"] {
            let location = ListLocation::parse(&url(&format!("https://x.test/candidates{query}")));
            assert_eq!(location.page, 1, "query {query:?}");
        }
    }

    #[test]
    fn test_updates_replace_delete_and_append() {
        let mut u = url("https://x.test/candidates?tab=all&first=Jo&page=2");
        set_search_params(
            &mut u,
            [("first", Some("Ann")), ("page", None), ("last", Some("Lee")), ("search", Some(""))],
        );
        assert_eq!(u.query(), Some("tab=all&first=Ann&last=Lee"));
    }

    #[test]
    fn test_clearing_everything_drops_the_query() {
        let mut u = url("https://x.test/candidates?page=2");
        ListLocation::default().apply_to(&mut u);
        assert_eq!(u.as_str(), "https://x.test/candidates");
    }

    #[test]
    fn test_location_round_trips_through_url() {
        let location = ListLocation {
            first: Some("Jo".into()),
            last: None,
            search: Some("rust dev".into()),
            page: 4,
        };
        let mut u = url("https://x.test/candidates");
        location.apply_to(&mut u);
        assert_eq!(ListLocation::parse(&u), location);
    }
}
