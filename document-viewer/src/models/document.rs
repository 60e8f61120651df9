use serde::{Deserialize, Serialize};

/// One scanned business record as the document API sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unset until the record is persisted server-side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub document_type: String,
    pub document_number: String,
    /// ISO calendar date, compared as a plain string.
    pub document_date: String,
    pub issuer_ruc: String,
    pub amount: f64,
    /// Either bare base64 or a complete data URI, depending on how it was ingested.
    pub image_base64: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_format() {
        let json = r#"{
            "id": 7,
            "documentType": "INVOICE",
            "documentNumber": "F001-00042",
            "documentDate": "2024-01-01",
            "issuerRuc": "20123456789",
            "amount": 118.5,
            "imageBase64": "iVBORw0KGgo="
        }"#;

        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, Some(7));
        assert_eq!(doc.document_number, "F001-00042");
        assert_eq!(doc.issuer_ruc, "20123456789");
        assert_eq!(doc.amount, 118.5);
    }

    #[test]
    fn test_missing_id_is_none() {
        let json = r#"{
            "documentType": "RECEIPT",
            "documentNumber": "B001-1",
            "documentDate": "2024-02-01",
            "issuerRuc": "10456",
            "amount": 10,
            "imageBase64": ""
        }"#;

        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, None);
        assert!(!serde_json::to_string(&doc).unwrap().contains("\"id\""));
    }
}
