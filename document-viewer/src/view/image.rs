use std::borrow::Cow;

const DATA_URI_PREFIX: &str = "data:image";
const DEFAULT_PREFIX: &str = "data:image/jpeg;base64,";

/// Turn a document's image payload into a data URI.
///
/// The backend stores bare base64 on some ingestion paths and full data URIs on
/// others. Payloads that already carry an image data-URI prefix pass through; the
/// rest are assumed to be JPEG.
pub fn normalize_image_payload(raw: &str) -> Cow<'_, str> {
    if raw.starts_with(DATA_URI_PREFIX) {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(format!("{DEFAULT_PREFIX}{raw}"))
    }
}
