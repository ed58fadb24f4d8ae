use pdf_sheets::escape_html;
use url::form_urlencoded;

use crate::models::StoredConversion;

pub const NO_TABULAR_DATA_MESSAGE: &str = "No tabular data found in the PDF.";

const PAGE_STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem;max-width:60rem}\
table{border-collapse:collapse;margin:1rem 0}th,td{border:1px solid #ccc;padding:.25rem .5rem}\
.table-striped tbody tr:nth-child(odd){background:#f4f4f4}";

pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>PDF tables to workbook</title>
</head>
<body>
<h1>PDF tables to workbook</h1>
<form method="post" enctype="multipart/form-data">
<p><label>PDF file <input type="file" name="pdf" accept=".pdf,application/pdf" required></label></p>
<p><label>Password <input type="password" name="password" autocomplete="off"></label></p>
<p><label>Pages <input type="text" name="pages" placeholder="1-3,5"></label></p>
<p>
<button type="submit" formaction="/api/v1/preview">Preview</button>
<button type="submit" formaction="/api/v1/convert">Download workbook</button>
</p>
</form>
</body>
</html>
"#;

pub fn download_path(handle: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("handle", handle)
        .finish();
    format!("/api/v1/download?{query}")
}

pub fn render_preview_page(stored: &StoredConversion) -> String {
    let mut body = format!(
        "<h1>{}</h1>\n<p>{} pages, {} sheets, {} rows.</p>\n",
        escape_html(&stored.file_name),
        stored.page_count,
        stored.sheets.len(),
        stored.row_count
    );

    body.push_str("<ul>\n");
    for sheet in &stored.sheets {
        body.push_str(&format!(
            "<li>{}: {} columns, {} rows</li>\n",
            escape_html(&sheet.name),
            sheet.columns,
            sheet.rows
        ));
    }
    body.push_str("</ul>\n");

    if let Some(preview) = &stored.preview_html {
        body.push_str(preview);
    }
    body.push_str(&format!(
        "<p><a href=\"{}\">Download {}</a></p>\n",
        escape_html(&download_path(&stored.handle)),
        escape_html(&stored.file_name)
    ));

    wrap_page("Preview", &body)
}

pub fn render_message_page(message: &str) -> String {
    wrap_page(
        "PDF tables to workbook",
        &format!("<p>{}</p>\n<p><a href=\"/\">Back</a></p>\n", escape_html(message)),
    )
}

fn wrap_page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{PAGE_STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}
