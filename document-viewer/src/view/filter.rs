use crate::models::Document;

/// Client-side lens over the current page.
///
/// Never sent to the server: it only narrows what is already loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    /// Case-sensitive substring of the issuer RUC.
    pub issuer_ruc: String,
    /// Exact `documentDate` string.
    pub document_date: String,
}

impl DocumentFilter {
    pub fn is_empty(&self) -> bool {
        self.issuer_ruc.is_empty() && self.document_date.is_empty()
    }

    /// An empty field matches everything.
    pub fn matches(&self, document: &Document) -> bool {
        let ruc_matches =
            self.issuer_ruc.is_empty() || document.issuer_ruc.contains(self.issuer_ruc.as_str());
        let date_matches =
            self.document_date.is_empty() || document.document_date == self.document_date;

        ruc_matches && date_matches
    }

    /// Matching documents in their original order.
    pub fn apply<'a>(&self, documents: &'a [Document]) -> Vec<&'a Document> {
        if self.is_empty() {
            return documents.iter().collect();
        }
        documents.iter().filter(|doc| self.matches(doc)).collect()
    }

    pub fn clear(&mut self) {
        self.issuer_ruc.clear();
        self.document_date.clear();
    }
}
