//! Replay of a newline-delimited JSON events file.
//!
//! Lines are read and decoded one at a time as the indexer pulls them, so a
//! replay holds a single event in memory regardless of file size.

use anyhow::{Context, Result};
use futures::{stream, Stream};
use plasma_common::{Address, ChainEvent};
use plasma_reducer::{IndexStats, Indexer};
use plasma_store::EntityStore;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::info;

/// Decode `reader` into a stream of events, skipping blank lines.
///
/// `origin` prefixes error messages, so a malformed line is reported as
/// `origin:line: malformed event`. The stream ends after the first error.
pub fn event_lines<R>(
    reader: R,
    origin: impl Into<String>,
) -> impl Stream<Item = Result<ChainEvent>>
where
    R: AsyncBufRead + Unpin,
{
    let origin = origin.into();
    stream::try_unfold((reader.lines(), 0usize), move |(lines, line_no)| {
        next_event(lines, line_no, origin.clone())
    })
}

async fn next_event<R>(
    mut lines: Lines<R>,
    mut line_no: usize,
    origin: String,
) -> Result<Option<(ChainEvent, (Lines<R>, usize))>>
where
    R: AsyncBufRead + Unpin,
{
    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| format!("{origin}: failed to read line {}", line_no + 1))?
    {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let event = ChainEvent::from_json_line(&line)
            .with_context(|| format!("{origin}:{line_no}: malformed event"))?;
        return Ok(Some((event, (lines, line_no))));
    }
    Ok(None)
}

/// Reduce every event of `events` into `store`, in stream order.
pub async fn replay<S, St>(
    store: S,
    events: St,
    source: Option<Address>,
) -> Result<(IndexStats, S)>
where
    S: EntityStore,
    St: Stream<Item = Result<ChainEvent>>,
{
    let mut indexer = Indexer::new(store).with_source(source);
    let stats = indexer.index_stream(events).await?.clone();

    info!(
        applied = stats.applied,
        redeliveries = stats.redeliveries,
        campaigns = stats.campaigns_created,
        edges = stats.edges_created,
        "Replay complete"
    );
    Ok((stats, indexer.into_store()))
}
