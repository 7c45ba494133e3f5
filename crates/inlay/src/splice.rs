//! Payload extraction and injection
//!
//! The round-trip half of the engine: pull a block's payload out of the host
//! text verbatim, and splice an edited payload back into the exact same
//! span. Injection preserves every byte outside the located span and is
//! idempotent.

use crate::diagnostics::InlayResult;
use crate::locator::{locate, Block, BlockSyntax};

/// Extract a named block's payload from the host text, verbatim.
///
/// Writing the payload to an asset file is the caller's concern.
pub fn extract(host: &str, syntax: &BlockSyntax, name: &str) -> InlayResult<String> {
    let block = locate(host, syntax, name)?;
    Ok(block.payload(host))
}

/// Inject a payload into a named block, returning the new host text.
///
/// The wrapped value span `[block.start, block.end)` is replaced with the
/// re-wrapped payload; everything outside it is untouched. Injecting the
/// same payload twice yields the same text as injecting it once.
pub fn inject(
    host: &str,
    syntax: &BlockSyntax,
    name: &str,
    payload: &str,
    chunk_size: Option<usize>,
) -> InlayResult<String> {
    let block = locate(host, syntax, name)?;
    let rewrapped = rewrap(&block, payload, chunk_size);

    let mut out = String::with_capacity(host.len() - (block.end - block.start) + rewrapped.len());
    out.push_str(&host[..block.start]);
    out.push_str(&rewrapped);
    out.push_str(&host[block.end..]);
    Ok(out)
}

/// Re-wrap a payload in a block's delimiters.
///
/// When `chunk_size` is set and the payload is longer, the value is emitted
/// as adjacent raw-string segments of `chunk_size` characters each (last one
/// shorter), separated by single spaces. Chunk boundaries are a pure
/// function of the payload, so re-wrapping an extracted chunked payload with
/// the same size reproduces the original text.
pub fn rewrap(block: &Block, payload: &str, chunk_size: Option<usize>) -> String {
    let open = block.open_delim();
    let close = block.close_delim();

    match chunk_size {
        Some(size) if size > 0 && payload.chars().count() > size => {
            let mut parts = Vec::new();
            let mut chunk = String::new();
            let mut count = 0;
            for c in payload.chars() {
                chunk.push(c);
                count += 1;
                if count == size {
                    parts.push(format!("{open}{chunk}{close}"));
                    chunk.clear();
                    count = 0;
                }
            }
            if !chunk.is_empty() {
                parts.push(format!("{open}{chunk}{close}"));
            }
            parts.join(" ")
        }
        _ => format!("{open}{payload}{close}"),
    }
}
