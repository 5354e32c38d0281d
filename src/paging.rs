use serde::{Deserialize, Serialize};

/// The standard list envelope returned by paginated endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> PagedResponse<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn map<U, F>(self, f: F) -> PagedResponse<U>
    where
        F: FnMut(T) -> U,
    {
        PagedResponse {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

impl<T> Default for PagedResponse<T> {
    fn default() -> Self {
        Self {
            count: None,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

impl<T> IntoIterator for PagedResponse<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

/// Cursor-paged listing backed by the edge key-value store. The cursor is
/// `last_evaluated_key`; `pages` holds the keys of the pages seen so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgePagedResponse<T> {
    #[serde(flatten)]
    pub page: PagedResponse<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_evaluated_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<Option<String>>>,
}

impl<T> EdgePagedResponse<T> {
    pub fn has_next(&self) -> bool {
        self.last_evaluated_key.is_some()
    }

    pub fn results(&self) -> &[T] {
        &self.page.results
    }
}

impl<T> IntoIterator for EdgePagedResponse<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.page.into_iter()
    }
}

/// Paged response proxied from the GitHub search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubPagedResponse<T> {
    #[serde(flatten)]
    pub page: PagedResponse<T>,
    pub incomplete_results: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubPaginatedRepos<T> {
    pub total_count: u64,
    pub repository_selection: String,
    pub results: Vec<T>,
}
