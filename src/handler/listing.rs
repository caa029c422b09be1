//! Directory listing module
//!
//! Generates the HTML index served for directories without an index file.

use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;
use tokio::fs;

use crate::http::response::escape_html;

/// Characters left as-is in listing links: unreserved characters plus `/`
const LINK_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// One directory entry as shown in a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Name as stored on disk, not necessarily UTF-8
    pub name: OsString,
    /// Directory, or symlink to one
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl ListingEntry {
    /// Relative link target; directories keep a trailing slash
    ///
    /// Encodes the raw name bytes so the link resolves back to this exact
    /// file even when the name is not UTF-8.
    fn href(&self) -> String {
        let mut target = name_bytes(&self.name).into_owned();
        if self.is_dir {
            target.push(b'/');
        }
        percent_encode(&target, LINK_ENCODE_SET).to_string()
    }

    /// Visible name: `@` marks symlinks, `/` marks directories
    fn display_name(&self) -> String {
        let name = self.name.to_string_lossy();
        if self.is_symlink {
            format!("{name}@")
        } else if self.is_dir {
            format!("{name}/")
        } else {
            name.into_owned()
        }
    }
}

/// Read a directory into listing entries, sorted case-insensitively by name
pub async fn read_entries(dir: &Path) -> io::Result<Vec<ListingEntry>> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let is_symlink = entry
            .file_type()
            .await
            .is_ok_and(|t| t.is_symlink());
        // Follows symlinks, so a link to a directory lists as a directory
        let is_dir = fs::metadata(entry.path())
            .await
            .is_ok_and(|m| m.is_dir());

        entries.push(ListingEntry {
            name: entry.file_name(),
            is_dir,
            is_symlink,
        });
    }

    entries.sort_by_cached_key(|e| e.name.to_string_lossy().to_lowercase());
    Ok(entries)
}

#[cfg(unix)]
fn name_bytes(name: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(name.as_bytes())
}

#[cfg(not(unix))]
fn name_bytes(name: &OsStr) -> Cow<'_, [u8]> {
    match name.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

/// Render the listing page for `display_path` (the decoded request path)
pub fn render_listing(display_path: &str, entries: &[ListingEntry]) -> String {
    let title = format!("Directory listing for {}", escape_html(display_path));

    let items: String = entries
        .iter()
        .map(|e| {
            format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                e.href(),
                escape_html(&e.display_name())
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE HTML>
<html lang="en">
<head>
<meta charset="utf-8">
<style type="text/css">
:root {{
color-scheme: light dark;
}}
</style>
<title>{title}</title>
</head>
<body>
<h1>{title}</h1>
<hr>
<ul>
{items}</ul>
<hr>
</body>
</html>
"#
    )
}
