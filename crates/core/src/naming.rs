//! Date-stamped names for remote and cached files.
//!
//! Every file is identified by a calendar day. The remote URL is the link
//! root, prefix, ISO date and `.xlsx` joined verbatim; the cache file is the
//! same name inside the cache directory.

use std::path::PathBuf;

use chrono::{Days, NaiveDate};

use crate::config::AppConfig;

/// Extension of every published file.
pub const FILE_EXTENSION: &str = "xlsx";

/// Remote and local location of the file for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocation {
    /// Day the file belongs to.
    pub date: NaiveDate,
    /// Days before the reference date (0 = today).
    pub offset: u32,
    /// Link the file is downloaded from.
    pub remote_url: String,
    /// Path of the cached copy.
    pub local_path: PathBuf,
}

/// Maps a reference date and day offset to a [`ResourceLocation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    url_root: String,
    prefix: String,
    cache_dir: PathBuf,
}

impl Naming {
    pub fn new(url_root: impl Into<String>, prefix: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self { url_root: url_root.into(), prefix: prefix.into(), cache_dir: cache_dir.into() }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.url_root, &config.filename_prefix, &config.cache_dir)
    }

    /// Location of the file published `offset` days before `reference`.
    ///
    /// `None` is the reference day itself. Never fails: an offset reaching
    /// past the earliest representable date clamps to it.
    pub fn location_for(&self, reference: NaiveDate, offset: Option<u32>) -> ResourceLocation {
        let offset = offset.unwrap_or(0);
        let date = reference
            .checked_sub_days(Days::new(u64::from(offset)))
            .unwrap_or(NaiveDate::MIN);

        let file_name = self.file_name(date);
        let remote_url = format!("{}{}", self.url_root, file_name);
        let local_path = self.cache_dir.join(&file_name);

        ResourceLocation { date, offset, remote_url, local_path }
    }

    /// `<prefix><YYYY-MM-DD>.xlsx`
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("{}{}.{}", self.prefix, date.format("%Y-%m-%d"), FILE_EXTENSION)
    }
}
