use reqwest::Url;

/// Fixed resource paths on the catalogue origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiPath {
    Catalog,
    Categories,
}

impl ApiPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiPath::Catalog => "/catalog",
            ApiPath::Categories => "/categories",
        }
    }
}

/// Whether `path` addresses the catalogue resource.
pub fn is_catalog_path(path: &str) -> bool {
    path.starts_with(ApiPath::Catalog.as_str())
}

/// Turn a `next` locator into a request path on the catalogue origin.
///
/// Absolute URLs contribute their path and query. Paths starting with `/`
/// are used as-is. Anything else is a bare cursor under `/catalog/`.
pub fn resolve_locator(locator: &str) -> String {
    if let Ok(url) = Url::parse(locator) {
        if matches!(url.scheme(), "http" | "https") {
            return match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            };
        }
    }

    if locator.starts_with('/') {
        return locator.to_string();
    }

    format!("{}/{}", ApiPath::Catalog.as_str(), locator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_prefix() {
        assert!(is_catalog_path("/catalog"));
        assert!(is_catalog_path("/catalog/2"));
        assert!(!is_catalog_path("/categories"));
        assert!(!is_catalog_path("catalog"));
        assert!(!is_catalog_path("/p1"));
    }

    #[test]
    fn test_resolve_absolute_locator() {
        assert_eq!(
            resolve_locator("https://shop.example.com/catalog/2"),
            "/catalog/2"
        );
        assert_eq!(
            resolve_locator("https://shop.example.com/catalog?page=3"),
            "/catalog?page=3"
        );
    }

    #[test]
    fn test_resolve_relative_locators() {
        assert_eq!(resolve_locator("/catalog/p1"), "/catalog/p1");
        assert_eq!(resolve_locator("p1"), "/catalog/p1");
    }
}
