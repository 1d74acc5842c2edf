//! Micro-batch streams.

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// A stream of datasets arriving as micro-batches.
///
/// Each item is one complete batch dataset; the broker drains the stream and
/// runs partition bodies over each batch in arrival order. The stream ends
/// when the producing side is dropped.
pub type MicroBatchStream<D> = ReceiverStream<D>;

/// Create a bounded micro-batch channel.
///
/// The sender side is held by the batch source; `capacity` bounds how many
/// undelivered batches may queue before the source is backpressured.
pub fn micro_batch_channel<D>(capacity: usize) -> (mpsc::Sender<D>, MicroBatchStream<D>) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, ReceiverStream::new(rx))
}
