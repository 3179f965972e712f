//! Continuous scanning from a barcode reader's text output.
//!
//! Scanners (`zbarcam --raw`, `zbarcam`, USB keyboard-wedge readers) write
//! one decoded code per line. A camera held over a label decodes the same
//! code many times a second, so a code equal to the previous one is
//! ignored. A new code supersedes an in-flight lookup: its future is
//! dropped, cancelling its requests, and it never prints.

use futures::future::LocalBoxFuture;
use skuscan_core::{ComparisonResult, Identifier};
use skuscan_scraper::normalize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Symbology prefixes `zbarcam` puts in front of decoded data.
const ZBAR_SYMBOLOGIES: [&str; 16] = [
    "EAN-2", "EAN-5", "EAN-8", "EAN-13", "UPC-A", "UPC-E", "ISBN-10", "ISBN-13", "I2/5",
    "DataBar", "DataBar-Exp", "Codabar", "CODE-39", "CODE-93", "CODE-128", "QR-Code",
];

/// Extracts the code from one line of scanner output.
///
/// Accepts raw codes and zbar's `SYMBOLOGY:data` form. Blank lines (and a
/// symbology prefix with no data) yield `None`.
pub(crate) fn decode_scanner_line(line: &str) -> Option<String> {
    let line = line.trim();
    let data = match line.split_once(':') {
        Some((prefix, data))
            if ZBAR_SYMBOLOGIES
                .iter()
                .any(|s| s.eq_ignore_ascii_case(prefix.trim())) =>
        {
            data.trim()
        }
        _ => line,
    };
    (!data.is_empty()).then(|| data.to_owned())
}

/// Re-trigger guard: search only when `decoded` differs from the previous
/// identifier (compared normalized).
pub(crate) fn should_search(previous: Option<&str>, decoded: &str) -> bool {
    let decoded = normalize(decoded);
    !decoded.is_empty() && previous.is_none_or(|prev| normalize(prev) != decoded)
}

/// Reads scanner lines until EOF, running `search` for each new code and
/// handing finished results to `present`.
///
/// At EOF the last in-flight lookup is awaited rather than dropped.
///
/// # Errors
///
/// Returns an error if reading input or presenting a result fails.
pub(crate) async fn scan_loop<'a, R, S, P>(
    reader: R,
    search: S,
    mut present: P,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    S: Fn(Identifier) -> LocalBoxFuture<'a, ComparisonResult>,
    P: FnMut(&ComparisonResult) -> anyhow::Result<()>,
{
    let mut lines = reader.lines();
    let mut previous: Option<String> = None;
    let mut pending: Option<LocalBoxFuture<'a, ComparisonResult>> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let Some(code) = decode_scanner_line(&line) else {
                    continue;
                };
                if !should_search(previous.as_deref(), &code) {
                    tracing::debug!(code, "same code scanned again, ignoring");
                    continue;
                }
                let Ok(identifier) = Identifier::new(&code) else {
                    continue;
                };
                if pending.is_some() {
                    tracing::info!(
                        previous = previous.as_deref().unwrap_or_default(),
                        code,
                        "new code scanned, cancelling in-flight lookup"
                    );
                }
                tracing::info!(code, "looking up scanned code");
                pending = Some(search(identifier));
                previous = Some(code);
            }
            result = settle(&mut pending) => {
                pending = None;
                present(&result)?;
            }
        }
    }

    if let Some(lookup) = pending {
        present(&lookup.await)?;
    }
    Ok(())
}

/// Resolves with the in-flight lookup's result; never resolves when idle.
async fn settle(pending: &mut Option<LocalBoxFuture<'_, ComparisonResult>>) -> ComparisonResult {
    match pending.as_mut() {
        Some(lookup) => lookup.await,
        None => std::future::pending().await,
    }
}
