//! Model downloading utilities.
//!
//! Fetches the MoveNet single-pose ONNX models when they are not found
//! locally, streaming to a temporary file with an atomic rename so a
//! partial download never masquerades as a usable model.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{PoseError, Result};

/// Default primary model filename.
pub const THUNDER_MODEL: &str = "movenet-thunder.onnx";

/// Default secondary model filename.
pub const LIGHTNING_MODEL: &str = "movenet-lightning.onnx";

/// URL for downloading the MoveNet Thunder model.
const THUNDER_MODEL_URL: &str =
    "https://huggingface.co/Xenova/movenet-singlepose-thunder/resolve/main/onnx/model.onnx";

/// URL for downloading the MoveNet Lightning model.
const LIGHTNING_MODEL_URL: &str =
    "https://huggingface.co/Xenova/movenet-singlepose-lightning/resolve/main/onnx/model.onnx";

/// Connection timeout in seconds.
const CONNECT_TIMEOUT: u64 = 30;

/// Read timeout in seconds.
const READ_TIMEOUT: u64 = 300;

/// Format bytes as human-readable string (e.g., "10.4MB").
fn format_bytes(bytes: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    if bytes >= GB {
        format!("{:.1}GB", bytes / GB)
    } else if bytes >= MB {
        format!("{:.1}MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.1}KB", bytes / KB)
    } else {
        format!("{bytes:.0}B")
    }
}

/// Format time duration.
fn format_time(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.1}s")
    } else if seconds < 3600.0 {
        let mins = (seconds / 60.0) as u32;
        let secs = seconds % 60.0;
        format!("{mins}:{secs:04.1}")
    } else {
        let hours = (seconds / 3600.0) as u32;
        let mins = ((seconds % 3600.0) / 60.0) as u32;
        let secs = seconds % 60.0;
        format!("{hours}:{mins:02}:{secs:04.1}")
    }
}

/// Generate progress bar string.
fn generate_bar(progress: f64, width: usize) -> String {
    let filled = (progress * width as f64) as usize;
    let partial = progress * width as f64 - filled as f64;

    let mut bar = "━".repeat(filled);
    if filled < width {
        if partial > 0.5 {
            bar.push('╸');
            bar.push_str(&"─".repeat(width - filled - 1));
        } else {
            bar.push_str(&"─".repeat(width - filled));
        }
    }
    bar
}

/// Download a file from URL to the specified path with progress bar.
///
/// Uses streaming download to a temporary file, then atomic rename to
/// prevent corrupted files from partial downloads.
fn download_file(url: &str, dest: &Path) -> Result<()> {
    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(Duration::from_secs(CONNECT_TIMEOUT)))
        .timeout_recv_body(Some(Duration::from_secs(READ_TIMEOUT)))
        .build();
    let agent = ureq::Agent::new_with_config(config);

    let response = agent.get(url).call().map_err(|e| {
        let msg = match &e {
            ureq::Error::Timeout(_) => format!("Connection timed out while downloading {url}"),
            ureq::Error::Io(io_err) => {
                format!("Network error downloading {url}: {io_err}")
            }
            _ => format!("Failed to download {url}: {e}"),
        };
        PoseError::Download(msg)
    })?;

    let content_length: Option<u64> = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s: &str| s.parse().ok());

    let total_size = content_length.unwrap_or(0);

    // Temp file in the same directory so the final rename is atomic.
    let temp_path = dest.with_extension("part");
    let _ = fs::remove_file(&temp_path);

    let temp_file = File::create(&temp_path).map_err(|e| {
        PoseError::Download(format!(
            "Failed to create temp file {}: {e}",
            temp_path.display()
        ))
    })?;
    let mut writer = BufWriter::new(temp_file);

    let mut reader = response.into_body().into_reader();
    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; 65536];
    let start_time = Instant::now();
    let mut last_update = Instant::now();

    const BAR_WIDTH: usize = 12;
    const MIN_UPDATE_INTERVAL: f64 = 0.1;

    let desc = format!("Downloading {} to '{}'", url, dest.display());

    let download_result: Result<()> = (|| {
        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .map_err(|e| PoseError::Download(format!("Failed to read from network: {e}")))?;

            if bytes_read == 0 {
                break;
            }

            writer
                .write_all(&buffer[..bytes_read])
                .map_err(|e| PoseError::Download(format!("Failed to write to temp file: {e}")))?;

            downloaded += bytes_read as u64;

            let now = Instant::now();
            if now.duration_since(last_update).as_secs_f64() < MIN_UPDATE_INTERVAL {
                continue;
            }
            last_update = now;

            let elapsed = start_time.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 {
                downloaded as f64 / elapsed
            } else {
                0.0
            };

            if total_size > 0 {
                let progress = (downloaded as f64 / total_size as f64).min(1.0);
                let percent = (progress * 100.0) as u8;
                let bar = generate_bar(progress, BAR_WIDTH);

                eprint!(
                    "\r\x1b[K{}: {}% {} {}/{} {}/s {}",
                    desc,
                    percent,
                    bar,
                    format_bytes(downloaded as f64),
                    format_bytes(total_size as f64),
                    format_bytes(rate),
                    format_time(elapsed)
                );
            } else {
                eprint!(
                    "\r\x1b[K{}: {} {}/s {}",
                    desc,
                    format_bytes(downloaded as f64),
                    format_bytes(rate),
                    format_time(elapsed)
                );
            }
            std::io::stderr().flush().ok();
        }

        writer
            .flush()
            .map_err(|e| PoseError::Download(format!("Failed to flush temp file: {e}")))?;

        Ok(())
    })();

    if let Err(e) = download_result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    let elapsed = start_time.elapsed().as_secs_f64();
    let rate = if elapsed > 0.0 {
        downloaded as f64 / elapsed
    } else {
        0.0
    };

    if total_size > 0 {
        let bar = generate_bar(1.0, BAR_WIDTH);
        eprintln!(
            "\r\x1b[K{}: 100% {} {} {}/s {}",
            desc,
            bar,
            format_bytes(total_size as f64),
            format_bytes(rate),
            format_time(elapsed)
        );
    } else {
        eprintln!(
            "\r\x1b[K{}: {} {}/s {}",
            desc,
            format_bytes(downloaded as f64),
            format_bytes(rate),
            format_time(elapsed)
        );
    }

    fs::rename(&temp_path, dest).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        PoseError::Download(format!(
            "Failed to move downloaded file to {}: {e}",
            dest.display()
        ))
    })?;

    Ok(())
}

/// Attempt to download a model if it matches a known downloadable model.
///
/// Currently supports:
/// - `movenet-thunder.onnx` - primary single-pose model
/// - `movenet-lightning.onnx` - faster secondary model
///
/// Downloads to the directory specified in the path (current working
/// directory when given a bare filename). Skips the download when the file
/// already exists.
///
/// # Errors
///
/// Returns an error when the filename is not a known model or the download
/// fails.
pub fn try_download_model<P: AsRef<Path>>(model_path: P) -> Result<PathBuf> {
    let path = model_path.as_ref();
    if path.exists() {
        return Ok(path.to_path_buf());
    }

    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let url = match filename {
        THUNDER_MODEL => THUNDER_MODEL_URL,
        LIGHTNING_MODEL => LIGHTNING_MODEL_URL,
        _ => {
            return Err(PoseError::Download(format!(
                "Model file not found: {}. Auto-download is supported for: {THUNDER_MODEL}, {LIGHTNING_MODEL}",
                path.display(),
            )));
        }
    };

    download_file(url, path)?;
    Ok(path.to_path_buf())
}
