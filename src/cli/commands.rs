// CLI command implementations
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::cli::config::SampleFormat;
use crate::cli::output::{FileReport, OutputFormatter, PageRow};
use oggbridge::ogg::PageWalker;
use oggbridge::{scan, EncoderConfig, EncodingSession, TagEntry, ANALYSIS_SAMPLE_COUNT};

/// Options of the `encode` subcommand
pub struct EncodeOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub preset: Option<PathBuf>,
    pub channels: Option<u32>,
    pub rate: Option<u32>,
    pub quality: Option<f32>,
    pub tags: Vec<String>,
    pub sample_format: SampleFormat,
}

impl EncodeOptions {
    /// Preset (or defaults) with command-line overrides applied
    pub fn encoder_config(&self) -> Result<EncoderConfig> {
        let mut config = match &self.preset {
            Some(path) => EncoderConfig::from_json_file(path)
                .with_context(|| format!("loading preset {}", path.display()))?,
            None => EncoderConfig::default(),
        };
        if let Some(channels) = self.channels {
            config.channels = channels;
        }
        if let Some(rate) = self.rate {
            config.sample_rate = rate;
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        for tag in &self.tags {
            let tag: TagEntry = tag.parse().with_context(|| format!("--tag {}", tag))?;
            config.tags.push(tag);
        }
        Ok(config)
    }
}

/// Encode raw interleaved PCM into an Ogg Vorbis file
pub fn command_encode(options: &EncodeOptions, formatter: &OutputFormatter) -> Result<()> {
    let config = options.encoder_config()?;
    let mut session = EncodingSession::new(&config).context("starting encoder")?;

    let input = File::open(&options.input)
        .with_context(|| format!("opening {}", options.input.display()))?;
    let mut reader = BufReader::new(input);
    let output = File::create(&options.output)
        .with_context(|| format!("creating {}", options.output.display()))?;
    let mut writer = BufWriter::new(output);

    let frame_size = options.sample_format.sample_size() * config.channels as usize;
    let mut raw = vec![0u8; frame_size * ANALYSIS_SAMPLE_COUNT];
    let mut samples = Vec::with_capacity(config.channels as usize * ANALYSIS_SAMPLE_COUNT);
    let mut frames = 0usize;
    let mut written = 0usize;

    loop {
        let filled = read_full(&mut reader, &mut raw)
            .with_context(|| format!("reading {}", options.input.display()))?;
        let usable = filled - filled % frame_size;
        if usable < filled {
            log::warn!("dropping {} trailing byte(s) of a partial frame", filled - usable);
        }
        if usable > 0 {
            options.sample_format.decode(&raw[..usable], &mut samples);
            session.encode_interleaved(&samples)?;
            frames += usable / frame_size;
        }
        if let Some(data) = session.drain() {
            writer.write_all(&data)?;
            written += data.len();
        }
        if filled < raw.len() {
            break;
        }
    }

    session.finish()?;
    if let Some(data) = session.drain() {
        writer.write_all(&data)?;
        written += data.len();
    }
    writer.flush()?;
    let serial = session.serial();
    session.close();

    formatter.print_success(&format!(
        "{}: {} frame(s) encoded, {} byte(s), stream {:#010x}",
        options.output.display(),
        frames,
        written,
        serial
    ));
    Ok(())
}

/// Fill `buf` from `reader`, stopping early only at end of input
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Expand glob patterns; patterns matching nothing are kept as literal paths
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let matches: Vec<PathBuf> = glob::glob(pattern)
            .with_context(|| format!("invalid pattern {}", pattern))?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    log::warn!("skipping unreadable match: {}", e);
                    None
                }
            })
            .collect();
        if matches.is_empty() {
            paths.push(PathBuf::from(pattern));
        } else {
            paths.extend(matches);
        }
    }
    Ok(paths)
}

/// Read comment tags from files
pub fn command_tags(
    patterns: &[String],
    output: Option<&Path>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let files = expand_patterns(patterns)?;

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout()),
    };

    let mut failed = 0;
    for path in &files {
        let name = path.display().to_string();
        let result = std::fs::read(path)
            .with_context(|| format!("reading {}", name))
            .and_then(|data| scan(&data).with_context(|| name.clone()));
        match result {
            Ok(report) => {
                let report = FileReport {
                    file: &name,
                    report: &report,
                };
                formatter.output_report(&report, &mut writer)?;
            }
            Err(e) => {
                formatter.print_error(&format!("{:#}", e));
                failed += 1;
            }
        }
    }
    writer.flush()?;

    if failed > 0 {
        bail!("{} of {} file(s) could not be read", failed, files.len());
    }
    Ok(())
}

/// List the Ogg pages of a file
pub fn command_pages(file: &Path, formatter: &OutputFormatter) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let metadata = std::fs::metadata(file)?;

    let mut summary = vec![
        ("path".to_string(), file.display().to_string()),
        ("size".to_string(), metadata.len().to_string()),
    ];
    if let Ok(modified) = metadata.modified() {
        let modified: DateTime<Local> = modified.into();
        summary.push(("modified".to_string(), modified.to_rfc3339()));
    }

    let mut walker = PageWalker::new(&data);
    let pages: Vec<PageRow> = walker
        .by_ref()
        .map(|(offset, header)| PageRow::new(offset, &header))
        .collect();
    if pages.is_empty() {
        bail!("{}: no Ogg pages found", file.display());
    }
    if walker.position() < data.len() {
        log::warn!(
            "{}: {} byte(s) after the last complete page",
            file.display(),
            data.len() - walker.position()
        );
    }
    summary.push(("pages".to_string(), pages.len().to_string()));

    formatter.output_pages(&summary, &pages, &mut std::io::stdout())
}
