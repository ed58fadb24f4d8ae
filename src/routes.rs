use std::collections::HashMap;

use pdf_sheets::Conversion;
use worker::{Context, Env, FormEntry, Request, Response, Result, RouteContext, Router};

use crate::config::AppConfig;
use crate::conversion::{self, UploadRequest};
use crate::error::ApiError;
use crate::models::XLSX_CONTENT_TYPE;
use crate::pages;
use crate::upload;

const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
}

pub async fn handle(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    let state = AppState {
        config: AppConfig::from_env(&env),
    };

    Router::with_data(state)
        .get("/", index_route)
        .post_async("/api/v1/convert", convert_route)
        .post_async("/api/v1/preview", preview_upload_route)
        .get_async("/api/v1/preview", preview_handle_route)
        .get_async("/api/v1/download", download_route)
        .run(req, env)
        .await
}

fn index_route(_req: Request, _ctx: RouteContext<AppState>) -> Result<Response> {
    html_response(pages::INDEX_HTML.to_string())
}

async fn convert_route(mut req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match convert_response(&mut req, &ctx.data.config).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(),
    }
}

async fn preview_upload_route(mut req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match preview_upload_response(&mut req, &ctx.data.config).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(),
    }
}

async fn preview_handle_route(req: Request, _ctx: RouteContext<AppState>) -> Result<Response> {
    match preview_handle_response(&req).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(),
    }
}

async fn download_route(req: Request, _ctx: RouteContext<AppState>) -> Result<Response> {
    match download_response(&req).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(),
    }
}

async fn convert_response(req: &mut Request, config: &AppConfig) -> Result<Response, ApiError> {
    let upload = read_upload(req, config).await?;
    match conversion::convert_upload(&upload)? {
        Conversion::Converted { output, .. } => {
            workbook_response(output, &upload::download_file_name(&upload.file_name))
        }
        Conversion::NoTabularData(_) => Err(ApiError::NoTabularData(
            pages::NO_TABULAR_DATA_MESSAGE.to_string(),
        )),
    }
}

async fn preview_upload_response(
    req: &mut Request,
    config: &AppConfig,
) -> Result<Response, ApiError> {
    let upload = read_upload(req, config).await?;
    let (output, report, preview) = match conversion::convert_upload(&upload)? {
        Conversion::Converted {
            output,
            report,
            preview,
        } => (output, report, preview),
        Conversion::NoTabularData(_) => {
            return html_response(pages::render_message_page(pages::NO_TABULAR_DATA_MESSAGE))
                .map_err(ApiError::from);
        }
    };

    let stored = conversion::store_conversion(
        &upload.file_name,
        &output,
        &report,
        preview.as_ref(),
        config.preview_ttl_seconds,
    )
    .await?;
    Ok(html_response(pages::render_preview_page(&stored))?)
}

async fn preview_handle_response(req: &Request) -> Result<Response, ApiError> {
    let query = parse_query(req)?;
    let handle = parse_handle_query(&query)?;
    let stored = conversion::load_conversion(handle).await?;
    Ok(html_response(pages::render_preview_page(&stored))?)
}

async fn download_response(req: &Request) -> Result<Response, ApiError> {
    let query = parse_query(req)?;
    let handle = parse_handle_query(&query)?;
    let (stored, bytes) = conversion::load_workbook(handle).await?;
    workbook_response(bytes, &stored.file_name)
}

async fn read_upload(req: &mut Request, config: &AppConfig) -> Result<UploadRequest, ApiError> {
    if let Some(length) = req.headers().get("Content-Length")? {
        let declared = length.trim().parse::<usize>().unwrap_or(0);
        if declared > config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES) {
            return Err(ApiError::PayloadTooLarge(format!(
                "request body is {declared} bytes, the limit is {} bytes",
                config.max_upload_bytes
            )));
        }
    }

    let form = req
        .form_data()
        .await
        .map_err(|error| ApiError::BadRequest(format!("expected a multipart form: {error}")))?;

    let Some(FormEntry::File(file)) = form.get("pdf") else {
        return Err(ApiError::BadRequest(
            "missing `pdf` file field in the upload form".to_string(),
        ));
    };

    let file_name = file.name();
    upload::validate_upload(&file_name, file.size(), config.max_upload_bytes)?;

    Ok(UploadRequest {
        file_name,
        bytes: file.bytes().await?,
        password: upload::normalize_password(form_field(&form, "password").as_deref()),
        pages: form_field(&form, "pages"),
    })
}

fn form_field(form: &worker::FormData, name: &str) -> Option<String> {
    match form.get(name) {
        Some(FormEntry::Field(value)) => Some(value),
        _ => None,
    }
}

fn workbook_response(bytes: Vec<u8>, file_name: &str) -> Result<Response, ApiError> {
    let mut response = Response::from_bytes(bytes)?;
    response.headers_mut().set("Content-Type", XLSX_CONTENT_TYPE)?;
    response.headers_mut().set(
        "Content-Disposition",
        &format!("attachment; filename=\"{file_name}\""),
    )?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

fn html_response(html: String) -> Result<Response> {
    let mut response = Response::from_html(html)?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

fn parse_query(req: &Request) -> Result<HashMap<String, String>, ApiError> {
    let url = req.url()?;
    let query = url
        .query_pairs()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect::<HashMap<_, _>>();
    Ok(query)
}

pub fn parse_handle_query(query: &HashMap<String, String>) -> Result<&str, ApiError> {
    query
        .get("handle")
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing `handle` query parameter".to_string()))
}
