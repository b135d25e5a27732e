use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use url::Url;

use crate::error::CrawlError;
use crate::processor::PAGE_SEPARATOR;

fn output_error(path: &Path, source: std::io::Error) -> CrawlError {
    CrawlError::Output {
        path: path.to_path_buf(),
        source,
    }
}

/// `<host with . and - replaced by _>-<ddmmyy>.md`
pub fn default_file_name(start_url: &str, date: DateTime<Local>) -> String {
    let date_str = date.format("%d%m%y");
    match Url::parse(start_url)
        .ok()
        .and_then(|url| url.host_str().map(|host| (host.to_string(), url.port())))
    {
        Some((host, port)) => {
            let netloc = match port {
                Some(port) => format!("{}:{}", host, port),
                None => host,
            };
            format!("{}-{}.md", netloc.replace(['.', '-'], "_"), date_str)
        }
        None => format!("crawl_output-{}.md", date_str),
    }
}

/// Appends `suffix` to the full file name, so `out.md` becomes `out.md.tmp`.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Chooses the content file. Directories get the default file name.
pub fn resolve_content_path(output: &Path, start_url: &str, date: DateTime<Local>) -> PathBuf {
    let is_dir_hint = output.as_os_str().to_string_lossy().ends_with(['/', '\\']);
    if output.is_dir() || is_dir_hint {
        output.join(default_file_name(start_url, date))
    } else {
        output.to_path_buf()
    }
}

/// `<dir>/<stem>_stats.md` next to the content file.
pub fn stats_path(content_path: &Path) -> PathBuf {
    let stem = content_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "crawl_output".to_string());
    content_path.with_file_name(format!("{}_stats.md", stem))
}

pub fn progress_path(content_path: &Path) -> PathBuf {
    with_suffix(content_path, ".tmp")
}

/// Writes through a sibling temp file and renames it into place.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), CrawlError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| output_error(parent, e))?;
    }

    let temp_path = with_suffix(path, ".tmp");
    fs::write(&temp_path, contents).map_err(|e| output_error(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| output_error(path, e))?;
    tracing::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Appends each page to `<content>.tmp` while the crawl runs.
#[derive(Debug)]
pub struct ProgressFile {
    path: PathBuf,
    file: File,
    has_pages: bool,
}

impl ProgressFile {
    pub fn create(content_path: &Path) -> Result<Self, CrawlError> {
        let path = progress_path(content_path);
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| output_error(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| output_error(&path, e))?;

        Ok(Self {
            path,
            file,
            has_pages: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, markdown: &str) -> Result<(), CrawlError> {
        if markdown.is_empty() {
            return Ok(());
        }
        if self.has_pages {
            self.file
                .write_all(PAGE_SEPARATOR.as_bytes())
                .map_err(|e| output_error(&self.path, e))?;
        }
        self.file
            .write_all(markdown.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|e| output_error(&self.path, e))?;
        self.has_pages = true;
        Ok(())
    }

    /// Replaces the partial content with `contents` and moves it to `content_path`.
    pub fn finish(self, content_path: &Path, contents: &str) -> Result<(), CrawlError> {
        drop(self.file);
        write_atomic(content_path, contents)
    }
}
