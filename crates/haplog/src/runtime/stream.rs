//! Stream — decode access log lines from files or stdin into JSON lines.

use std::time::Instant;

use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio_stream::wrappers::SplitStream;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::conf::HaplogConfig;
use crate::parser::metrics::{DecodeMetrics, MetricErrorType};
use crate::parser::{DecodeError, HaproxyDecoder, LogParser, LogRecord};

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Line {line}: {source}")]
    Rejected {
        line: u64,
        #[source]
        source: DecodeError,
    },
}

/// What to do with each decoded line.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub fail_fast: bool,
    pub emit_partial: bool,
    pub pretty: bool,
}

impl From<&HaplogConfig> for OutputOptions {
    fn from(config: &HaplogConfig) -> Self {
        Self {
            fail_fast: config.fail_fast,
            emit_partial: config.emit_partial,
            pretty: config.pretty,
        }
    }
}

/// Decode every line of `reader` and write one JSON record per line.
///
/// Rejected lines are logged and skipped unless `fail_fast` is set.
pub async fn decode_stream<R, W>(
    parser: &dyn LogParser,
    reader: R,
    writer: &mut W,
    options: OutputOptions,
    metrics: &DecodeMetrics,
) -> Result<(), StreamError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = SplitStream::new(reader.split(b'\n'));
    let mut line_no: u64 = 0;

    while let Some(raw) = lines.next().await {
        let raw = raw?;
        line_no += 1;
        if raw.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let start = Instant::now();
        let result = parser.parse(&raw);
        metrics.record_attempt(u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX));

        let err = match result {
            Ok(decoded) => match decoded.error {
                None => {
                    metrics.record_decoded(&decoded.record);
                    write_record(writer, &decoded.record, options.pretty).await?;
                    continue;
                }
                Some(err) => {
                    if options.emit_partial && !options.fail_fast {
                        debug!(line = line_no, "Emitting partial record");
                        write_record(writer, &decoded.record, options.pretty).await?;
                    }
                    err
                }
            },
            Err(err) => err,
        };

        metrics.record_error(MetricErrorType::from(&err));
        warn!(line = line_no, parser = parser.name(), "Rejected line: {}", err);
        if options.fail_fast {
            writer.flush().await?;
            return Err(StreamError::Rejected { line: line_no, source: err });
        }
    }

    writer.flush().await?;
    Ok(())
}

async fn write_record<W>(writer: &mut W, record: &LogRecord, pretty: bool) -> Result<(), StreamError>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = if pretty {
        serde_json::to_vec_pretty(record)?
    } else {
        serde_json::to_vec(record)?
    };
    buf.push(b'\n');
    writer.write_all(&buf).await?;
    Ok(())
}

/// Decode all configured inputs (stdin when none) to stdout.
pub async fn run(config: HaplogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let decoder = HaproxyDecoder::new(config.decoder_config());
    let metrics = DecodeMetrics::new();
    let options = OutputOptions::from(&config);
    let mut stdout = BufWriter::new(tokio::io::stdout());

    let result = if config.inputs.is_empty() {
        info!("Reading access log lines from stdin");
        let stdin = BufReader::new(tokio::io::stdin());
        decode_stream(&decoder, stdin, &mut stdout, options, &metrics).await
    } else {
        let mut result = Ok(());
        for path in &config.inputs {
            info!("Reading access log lines from: {}", path);
            let file = File::open(path).await.map_err(|e| {
                error!("Failed to open {}: {}", path, e);
                e
            })?;
            result = decode_stream(&decoder, BufReader::new(file), &mut stdout, options, &metrics).await;
            if result.is_err() {
                break;
            }
        }
        result
    };

    let snapshot = metrics.snapshot();
    info!(
        lines = snapshot.lines,
        decoded = snapshot.decoded,
        rejected = snapshot.rejected(),
        "Finished: {}",
        serde_json::to_string(&snapshot)?
    );

    result.map_err(|e| {
        error!("Decoding stopped: {}", e);
        e.into()
    })
}
