//! Background channel logo loading.
//!
//! Worker threads take fetch jobs from a channel, download or read the logo,
//! decode and downscale it, and send the pixels back. The UI thread drains
//! the results once per frame, uploads them as textures and hands them to the
//! engine's logo cache, so the cache is only ever touched from the UI thread.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use image::imageops::FilterType;
use tracing::{debug, warn};

use crate::core::epg::Epg;
use crate::core::error::LogoFetchError;
use crate::core::image_cache::{LogoFetcher, LogoImage};

/// Number of concurrent fetches.
const WORKER_COUNT: usize = 4;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

impl LogoImage for TextureHandle {
    fn size(&self) -> (u32, u32) {
        let [width, height] = TextureHandle::size(self);
        (width as u32, height as u32)
    }
}

#[derive(Debug)]
struct LogoJob {
    key: String,
    width: u32,
    height: u32,
}

struct LogoResult {
    key: String,
    image: Result<ColorImage, LogoFetchError>,
}

/// Thread pool implementing [`LogoFetcher`] for the GUI.
pub struct LogoLoader {
    jobs: Sender<LogoJob>,
    results: Receiver<LogoResult>,
}

impl LogoLoader {
    /// Start the workers. They wake `ctx` whenever a logo is ready.
    pub fn new(ctx: &egui::Context) -> Self {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<LogoJob>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<LogoResult>();

        for index in 0..WORKER_COUNT {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let ctx = ctx.clone();
            let spawned = thread::Builder::new()
                .name(format!("logo-loader-{index}"))
                .spawn(move || run_worker(jobs, results, ctx));
            if let Err(e) = spawned {
                warn!("failed to start logo worker {index}: {e}");
            }
        }

        Self {
            jobs: job_tx,
            results: result_rx,
        }
    }

    /// Upload finished logos and pass them to `epg`. Returns whether any
    /// cache entry changed.
    pub fn drain(&self, ctx: &egui::Context, epg: &mut Epg<TextureHandle>) -> bool {
        let mut changed = false;
        for LogoResult { key, image } in self.results.try_iter() {
            let texture = image
                .map(|image| ctx.load_texture(format!("logo:{key}"), image, TextureOptions::LINEAR));
            changed |= epg.complete_logo(&key, texture);
        }
        if changed {
            let cache = epg.logo_cache();
            debug!(cached = cache.len(), pending = cache.pending_count(), "logos delivered");
        }
        changed
    }
}

impl LogoFetcher for LogoLoader {
    fn fetch(&self, key: &str, target_width: u32, target_height: u32) {
        let job = LogoJob {
            key: key.to_string(),
            width: target_width,
            height: target_height,
        };
        if self.jobs.send(job).is_err() {
            warn!(key, "logo workers are gone; logo will stay empty");
        }
    }
}

fn run_worker(jobs: Receiver<LogoJob>, results: Sender<LogoResult>, ctx: egui::Context) {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("tv-epg/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| e.to_string());

    for job in jobs.iter() {
        let image = read_logo_bytes(&client, &job.key)
            .and_then(|bytes| decode_logo(&job.key, &bytes, job.width, job.height));
        debug!(key = %job.key, ok = image.is_ok(), "logo fetched");

        if results
            .send(LogoResult {
                key: job.key,
                image,
            })
            .is_err()
        {
            break;
        }
        ctx.request_repaint();
    }
}

/// Download an http(s) logo or read a local file.
fn read_logo_bytes(
    client: &Result<reqwest::blocking::Client, String>,
    key: &str,
) -> Result<Vec<u8>, LogoFetchError> {
    if !(key.starts_with("http://") || key.starts_with("https://")) {
        return std::fs::read(key).map_err(|e| LogoFetchError::Io {
            key: key.to_string(),
            reason: e.to_string(),
        });
    }

    let http_error = |reason: String| LogoFetchError::Http {
        key: key.to_string(),
        reason,
    };
    let client = client.as_ref().map_err(|e| http_error(e.clone()))?;
    let response = client
        .get(key)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| http_error(e.to_string()))?;
    let bytes = response.bytes().map_err(|e| http_error(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Decode and downscale to fit within `width` x `height`, keeping the
/// aspect ratio.
fn decode_logo(
    key: &str,
    bytes: &[u8],
    width: u32,
    height: u32,
) -> Result<ColorImage, LogoFetchError> {
    let image = image::load_from_memory(bytes).map_err(|e| LogoFetchError::Decode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;

    let image = if image.width() > width || image.height() > height {
        image.resize(width.max(1), height.max(1), FilterType::Triangle)
    } else {
        image
    };
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}
