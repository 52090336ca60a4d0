use wasm_bindgen::prelude::*;

/// Render a JSON offer job to PDF bytes.
#[wasm_bindgen]
pub fn render_offer_pdf(json: &str) -> Result<Vec<u8>, JsValue> {
    crate::render_job_json(json)
        .map(|document| document.bytes)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The download name for a candidate's letter.
#[wasm_bindgen]
pub fn offer_filename(candidate_name: &str) -> String {
    crate::export_filename(candidate_name, "pdf")
}

/// Render a JSON offer job to a standalone HTML preview.
#[wasm_bindgen]
pub fn render_offer_preview(json: &str) -> Result<String, JsValue> {
    let job: crate::OfferJob =
        serde_json::from_str(json).map_err(|e| JsValue::from_str(&crate::OfferError::from(e).to_string()))?;
    crate::preview_job(&job).map_err(|e| JsValue::from_str(&e.to_string()))
}
