//! Static file serving module
//!
//! Maps request paths onto the served directory and answers with files,
//! redirects, listings or error pages.

use crate::config::AppState;
use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, FileHeaders, RangeParseResult, ResponseBody};
use crate::logger;
use hyper::{Response, StatusCode};
use percent_encoding::percent_decode_str;
use std::ffi::OsStr;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs::{self, File};
use tokio::io::AsyncSeekExt;

/// Translate a raw (percent-encoded) request path into a path relative to the
/// served root
///
/// Decoding is byte-wise, so names that are not UTF-8 still resolve. `.` and
/// empty segments are dropped and `..` pops a segment. Returns `None` when the
/// path would climb above the root or a segment cannot name a file.
pub fn translate_path(raw_path: &str) -> Option<PathBuf> {
    let decoded: Vec<u8> = percent_decode_str(raw_path).collect();
    let mut segments: Vec<&[u8]> = Vec::new();

    for segment in decoded.split(|&b| b == b'/') {
        match segment {
            [] | [b'.'] => {}
            [b'.', b'.'] => {
                segments.pop()?;
            }
            s if s.contains(&0) || (cfg!(windows) && s.contains(&b'\\')) => return None,
            s => segments.push(s),
        }
    }

    let mut path = PathBuf::new();
    for segment in segments {
        path.push(segment_os_str(segment)?);
    }
    Some(path)
}

#[cfg(unix)]
#[allow(clippy::unnecessary_wraps)]
fn segment_os_str(segment: &[u8]) -> Option<&OsStr> {
    use std::os::unix::ffi::OsStrExt;
    Some(OsStr::from_bytes(segment))
}

#[cfg(not(unix))]
fn segment_os_str(segment: &[u8]) -> Option<&OsStr> {
    std::str::from_utf8(segment).ok().map(OsStr::new)
}

/// Serve a GET or HEAD request from the root directory
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    let Some(relative) = translate_path(ctx.path) else {
        logger::log_warning(&format!("Path traversal attempt blocked: {}", ctx.path));
        return not_found(ctx);
    };
    let full_path = state.root.join(relative);

    // Missing files are routine, no log
    let Ok(metadata) = fs::metadata(&full_path).await else {
        return not_found(ctx);
    };

    // Symlinks may still point outside the root
    match fs::canonicalize(&full_path).await {
        Ok(canonical) if canonical.starts_with(&state.root) => {}
        Ok(canonical) => {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {} -> {}",
                ctx.path,
                canonical.display()
            ));
            return not_found(ctx);
        }
        Err(_) => return not_found(ctx),
    }

    if metadata.is_dir() {
        return serve_directory(ctx, state, &full_path).await;
    }

    if ctx.path.ends_with('/') {
        return not_found(ctx);
    }

    serve_file(ctx, &full_path).await
}

/// Directory: redirect to the slash form, then index file, then listing
async fn serve_directory(
    ctx: &RequestContext<'_>,
    state: &AppState,
    dir: &Path,
) -> Response<ResponseBody> {
    if !ctx.path.ends_with('/') {
        let location = match ctx.query {
            Some(q) => format!("{}/?{q}", ctx.path),
            None => format!("{}/", ctx.path),
        };
        return http::build_redirect_response(&location);
    }

    for index_file in &state.config.http.index_files {
        let index_path = dir.join(index_file);
        if fs::metadata(&index_path).await.is_ok_and(|m| m.is_file()) {
            return serve_file(ctx, &index_path).await;
        }
    }

    match listing::read_entries(dir).await {
        Ok(entries) => {
            let display_path = percent_decode_str(ctx.path).decode_utf8_lossy();
            let html = listing::render_listing(&display_path, &entries);
            http::build_html_response(html, ctx.is_head)
        }
        Err(e) => {
            logger::log_warning(&format!("Cannot list directory '{}': {e}", dir.display()));
            http::build_404_response("No permission to list directory", ctx.is_head)
        }
    }
}

/// Serve one regular file with validators, conditional and range support
///
/// The file is opened for every request so unreadable files answer 404 for
/// HEAD too, but its content is only read while streaming a GET body.
async fn serve_file(ctx: &RequestContext<'_>, path: &Path) -> Response<ResponseBody> {
    let (mut file, metadata) = match open_file(path).await {
        Ok(opened) => opened,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                logger::log_warning(&format!("Failed to open file '{}': {e}", path.display()));
            }
            return not_found(ctx);
        }
    };

    let total_size = metadata.len();
    let modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());
    let headers = FileHeaders {
        content_type: mime::content_type_for(path),
        etag: cache::generate_etag(total_size, modified),
        last_modified: cache::format_http_date(modified),
    };

    // If-None-Match takes precedence; If-Modified-Since is only consulted
    // when it is absent
    let fresh = match ctx.if_none_match {
        Some(_) => cache::check_etag_match(ctx.if_none_match, &headers.etag),
        None => cache::not_modified_since(ctx.if_modified_since, modified),
    };
    if fresh {
        return http::build_304_response(&headers);
    }

    match http::parse_range_header(ctx.range_header, total_size) {
        RangeParseResult::Satisfiable(range) => {
            let body = if ctx.is_head {
                http::empty_body()
            } else {
                if let Err(e) = file.seek(SeekFrom::Start(range.start)).await {
                    logger::log_error(&format!("Failed to seek '{}': {e}", path.display()));
                    return http::build_error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        None,
                        ctx.is_head,
                    );
                }
                http::file_body(file, range.content_length())
            };
            http::build_partial_response(body, &headers, range, total_size)
        }
        RangeParseResult::NotSatisfiable => http::build_416_response(total_size, ctx.is_head),
        RangeParseResult::Ignored => {
            let body = if ctx.is_head {
                http::empty_body()
            } else {
                http::file_body(file, total_size)
            };
            http::build_file_response(body, total_size, &headers)
        }
    }
}

async fn open_file(path: &Path) -> io::Result<(File, std::fs::Metadata)> {
    let file = File::open(path).await?;
    let metadata = file.metadata().await?;
    Ok((file, metadata))
}

fn not_found(ctx: &RequestContext<'_>) -> Response<ResponseBody> {
    http::build_404_response("File not found", ctx.is_head)
}
