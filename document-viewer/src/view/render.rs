use super::controller::DocumentListController;

/// Plain-text table of the filtered page, used by the headless binary.
pub fn render_table(controller: &DocumentListController) -> String {
    let rows = controller.filtered_documents();
    let mut out = String::new();

    out.push_str(&format!(
        "Page {}/{} ({} documents, showing {})\n",
        controller.current_page() + 1,
        controller.total_pages(),
        controller.total_items(),
        rows.len()
    ));
    out.push_str(&format!(
        "{:>6}  {:<12} {:<14} {:<10} {:<13} {:>12}\n",
        "ID", "TYPE", "NUMBER", "DATE", "ISSUER RUC", "AMOUNT"
    ));

    for doc in rows {
        let id = doc.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:>6}  {:<12} {:<14} {:<10} {:<13} {:>12.2}\n",
            id,
            doc.document_type,
            doc.document_number,
            doc.document_date,
            doc.issuer_ruc,
            doc.amount
        ));
    }

    out
}
