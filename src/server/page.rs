//! HTML for the upload form

use std::fmt::Write;

use super::form::{
    FIELD_DOCUMENTS, FIELD_MODE, FIELD_PDFS, FIELD_SOURCES_ARCHIVE, FIELD_TARGETS,
};
use crate::pipeline::AppendMode;

const STYLE: &str = "body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
fieldset { margin-bottom: 1rem; }
label { display: block; margin: 0.5rem 0 0.25rem; }
small { color: #555; }";

pub fn render_upload_page() -> String {
    let mut options = String::new();
    for mode in AppendMode::ALL {
        // Writing to a String cannot fail
        let _ = writeln!(
            options,
            "<option value=\"{label}\">{label}</option>",
            label = mode.label()
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Append PDFs to Word Documents</title>
<style>{STYLE}</style>
</head>
<body>
<h1>Append PDFs to Word Documents</h1>
<form action="/process" method="post" enctype="multipart/form-data">
<fieldset>
<legend>Documents to update</legend>
<label for="{FIELD_TARGETS}">ZIP file containing Word documents</label>
<input type="file" id="{FIELD_TARGETS}" name="{FIELD_TARGETS}" accept=".zip" required>
</fieldset>
<fieldset>
<legend>Content to append</legend>
<label for="{FIELD_MODE}">Append</label>
<select id="{FIELD_MODE}" name="{FIELD_MODE}">
{options}</select>
<label for="{FIELD_PDFS}">PDF files</label>
<input type="file" id="{FIELD_PDFS}" name="{FIELD_PDFS}" accept=".pdf" multiple>
<label for="{FIELD_DOCUMENTS}">Word documents</label>
<input type="file" id="{FIELD_DOCUMENTS}" name="{FIELD_DOCUMENTS}" accept=".docx" multiple>
<label for="{FIELD_SOURCES_ARCHIVE}">Or a ZIP of PDFs and Word documents</label>
<input type="file" id="{FIELD_SOURCES_ARCHIVE}" name="{FIELD_SOURCES_ARCHIVE}" accept=".zip">
<small>When a ZIP is given here, its contents are used instead of the files above.</small>
</fieldset>
<button type="submit">Process</button>
</form>
</body>
</html>
"#
    )
}
