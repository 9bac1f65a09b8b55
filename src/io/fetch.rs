use flate2::read::MultiGzDecoder;
use log::debug;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{DownloadFailure, LiftError, Result};

/// URL of a file in the UCSC liftOver tree of `build_from`.
///
/// # Example
///
/// ```
/// use chainlift::io::fetch::ucsc_url;
///
/// let url = ucsc_url("hgdownload.cse.ucsc.edu", "hg38", "hg38ToHg19.over.chain.gz");
/// assert_eq!(url, "http://hgdownload.cse.ucsc.edu/goldenPath/hg38/liftOver/hg38ToHg19.over.chain.gz");
/// ```
pub fn ucsc_url(host: &str, build_from: &str, file_name: &str) -> String {
    format!("http://{host}/goldenPath/{build_from}/liftOver/{file_name}")
}

/// Download `url` into a fresh file under `config.cache_dir`.
///
/// One attempt, no retry. A URL path ending in `.gz` is gunzipped on the fly,
/// so the cached file always holds plain chain text. The file is kept on
/// success and removed on failure.
///
/// # Returns
/// * The path of the cached file
pub fn download(url: &str, config: &Config) -> Result<PathBuf> {
    let failed = |reason: DownloadFailure| LiftError::Download {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url)
        .map_err(|e| LiftError::InvalidArgument(format!("invalid url {url:?}: {e}")))?;
    let gzipped = parsed.path().ends_with(".gz");

    let client = Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| failed(DownloadFailure::Transport(e.to_string())))?;

    debug!("downloading {url}");
    let mut response = client
        .get(parsed)
        .send()
        .map_err(|e| failed(DownloadFailure::Transport(e.to_string())))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return Err(failed(DownloadFailure::NotFound(status.as_u16())));
    }
    if !status.is_success() {
        return Err(failed(DownloadFailure::Status(status.as_u16())));
    }

    std::fs::create_dir_all(&config.cache_dir)
        .map_err(|e| failed(DownloadFailure::Cache(e.to_string())))?;
    let mut tmp = tempfile::Builder::new()
        .prefix("chain")
        .suffix(".over.chain")
        .tempfile_in(&config.cache_dir)
        .map_err(|e| failed(DownloadFailure::Cache(e.to_string())))?;

    let written = if gzipped {
        pump(&mut MultiGzDecoder::new(response), tmp.as_file_mut())
    } else {
        pump(&mut response, tmp.as_file_mut())
    }
    .map_err(failed)?;

    let (_, path) = tmp
        .keep()
        .map_err(|e| failed(DownloadFailure::Cache(e.error.to_string())))?;
    debug!("cached {written} bytes from {url} at {}", path.display());
    Ok(path)
}

/// Copy everything, telling read failures apart from local write failures.
fn pump<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
) -> std::result::Result<u64, DownloadFailure> {
    let mut buf = vec![0u8; 64 * 1024];
    let mut total: u64 = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(match e.kind() {
                    ErrorKind::InvalidData | ErrorKind::InvalidInput | ErrorKind::UnexpectedEof => {
                        DownloadFailure::Corrupt(e.to_string())
                    }
                    _ => DownloadFailure::Transport(e.to_string()),
                })
            }
        };
        writer
            .write_all(&buf[..n])
            .map_err(|e| DownloadFailure::Cache(e.to_string()))?;
        total += n as u64;
    }
    writer
        .flush()
        .map_err(|e| DownloadFailure::Cache(e.to_string()))?;
    Ok(total)
}
