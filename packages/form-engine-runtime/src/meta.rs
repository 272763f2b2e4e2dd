use serde::Serialize;

/// Summary of a form's pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormMeta {
    pub form_title: String,
    pub page_count: usize,
    /// Titles of all pages; untitled pages read `Page N`
    pub page_titles: Vec<String>,
    pub current_page_index: usize,
    pub current_page_title: Option<String>,
}
