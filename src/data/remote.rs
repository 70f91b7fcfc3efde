use std::sync::OnceLock;

use regex::Regex;

use crate::data::loader::{parse_csv_bytes, LoadError, RawTable};

/// Published-spreadsheet export used as the URL tier until the user
/// changes it.
pub const DEFAULT_CSV_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vT03vitsRz5kTfx8GCLjMc6j6fzclnppE7z_nZ969EiOL-9MaNcavcRRChPVl27UOHVi2n26THw1zjU/pub?gid=0&single=true&output=csv";

/// Rewrite a Google Drive share link into its direct-download form.
///
/// Already-published spreadsheet exports pass through unchanged, as does
/// anything that carries no recognizable file id. Pure string rewriting,
/// no network.
pub fn normalize_drive_url(url: &str) -> String {
    static FILE_SEGMENT: OnceLock<Regex> = OnceLock::new();
    static ID_PARAM: OnceLock<Regex> = OnceLock::new();

    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    if url.contains("docs.google.com/spreadsheets") && url.contains("output=csv") {
        return url.to_string();
    }

    let file_re =
        FILE_SEGMENT.get_or_init(|| Regex::new(r"/file/d/([A-Za-z0-9_-]+)").unwrap());
    if let Some(caps) = file_re.captures(url) {
        return format!("https://drive.google.com/uc?export=download&id={}", &caps[1]);
    }

    let id_re = ID_PARAM.get_or_init(|| Regex::new(r"[?&]id=([A-Za-z0-9_-]+)").unwrap());
    if let Some(caps) = id_re.captures(url) {
        return format!("https://drive.google.com/uc?export=download&id={}", &caps[1]);
    }

    url.to_string()
}

/// Fetch a CSV resource over HTTP(S) and parse it. One blocking attempt,
/// meant to run on a worker thread; the caller converts failures into
/// source warnings.
pub fn fetch_csv(url: &str) -> Result<RawTable, LoadError> {
    let target = normalize_drive_url(url);
    let response = reqwest::blocking::get(&target)?.error_for_status()?;
    let bytes = response.bytes()?;
    parse_csv_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_path_segment_is_rewritten() {
        let url = "https://drive.google.com/file/d/1AbC_d-9xYz/view?usp=sharing";
        assert_eq!(
            normalize_drive_url(url),
            "https://drive.google.com/uc?export=download&id=1AbC_d-9xYz"
        );
    }

    #[test]
    fn id_query_parameter_is_rewritten() {
        let url = "https://drive.google.com/open?id=1AbC_d-9xYz";
        assert_eq!(
            normalize_drive_url(url),
            "https://drive.google.com/uc?export=download&id=1AbC_d-9xYz"
        );
        let url = "https://drive.google.com/uc?export=view&id=zz42";
        assert_eq!(
            normalize_drive_url(url),
            "https://drive.google.com/uc?export=download&id=zz42"
        );
    }

    #[test]
    fn published_spreadsheet_export_passes_through() {
        assert_eq!(normalize_drive_url(DEFAULT_CSV_URL), DEFAULT_CSV_URL);
    }

    #[test]
    fn unrecognized_urls_pass_through_trimmed() {
        assert_eq!(
            normalize_drive_url("  https://example.com/data.csv "),
            "https://example.com/data.csv"
        );
        assert_eq!(normalize_drive_url("   "), "");
    }
}
