//! End-to-end tests driving a [`DistributedContext`] over the in-memory
//! cluster and the in-process engine.

use gridlink::{
    ContextBuilder, ContextError, ContextRegistry, ContextResult, Dataset, DistributedContext,
    PartitionIter, ScanConfig, ScanMapper, UserIter, micro_batch_channel,
};
use gridlink_client::mem::{
    MemAsyncClient, MemCluster, MemConnector, MemRow, MemScanCursor, MemSyncClient,
};
use gridlink_engine::local::{MemReadAdapter, VecDataset};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

const ADDR: &str = "mem-master:7051";

fn context(
    cluster: &Arc<MemCluster>,
    registry: &ContextRegistry,
) -> Arc<DistributedContext<MemConnector>> {
    ContextBuilder::new(MemConnector::new(cluster.clone()))
        .master_addr(ADDR)
        .build_with_registry(registry)
        .unwrap()
}

fn numbers() -> VecDataset<u64> {
    VecDataset::new(vec![vec![1, 2], vec![3, 4], vec![5], vec![6, 7, 8]])
}

#[test]
fn for_each_writes_reach_the_cluster() {
    let cluster = MemCluster::new();
    cluster.create_table("facts");
    let context = context(&cluster, &ContextRegistry::new());

    context
        .for_each_partition(numbers(), |records, sync, _asynchronous| {
            for n in records {
                sync.insert("facts", MemRow::new([("n", n.to_string())]))?;
            }
            Ok(())
        })
        .unwrap();

    let mut written: Vec<u64> = cluster
        .table_rows("facts")
        .unwrap()
        .iter()
        .map(|row| row.get("n").unwrap().parse().unwrap())
        .collect();
    written.sort_unstable();
    assert_eq!(written, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn clients_are_constructed_once_per_process() {
    let cluster = MemCluster::new();
    let context = context(&cluster, &ContextRegistry::new());

    // Four partitions, each handed both resolved handles.
    context
        .for_each_partition(numbers(), |records, _sync, _asynchronous| {
            records.for_each(drop);
            Ok(())
        })
        .unwrap();

    assert_eq!(cluster.sync_connects(), 1);
    assert_eq!(cluster.async_connects(), 1);
}

#[test]
fn transient_connect_failure_does_not_disable_the_worker() {
    let cluster = MemCluster::new();
    let context = context(&cluster, &ContextRegistry::new());
    cluster.fail_next_connects(1);

    // Exactly one partition observes the injected failure while resolving
    // its clients.
    let result = context.for_each_partition(numbers(), |records, _sync, _asynchronous| {
        records.for_each(drop);
        Ok(())
    });
    assert!(result.is_err());

    // The cache retried on the surviving partitions or retries now.
    context
        .for_each_partition(numbers(), |records, _sync, _asynchronous| {
            records.for_each(drop);
            Ok(())
        })
        .unwrap();
    assert_eq!(cluster.sync_connects(), 1);
}

#[test]
fn map_partitions_preserves_partitioning() {
    let cluster = MemCluster::new();
    let context = context(&cluster, &ContextRegistry::new());

    let doubled = context
        .map_partitions(numbers(), |records, _sync, _asynchronous| {
            Ok(Box::new(records.map(|n| Ok(n * 2))) as UserIter<u64>)
        })
        .unwrap();

    assert_eq!(doubled.partition_count(), 4);
    assert_eq!(doubled.into_elements(), vec![2, 4, 6, 8, 10, 12, 14, 16]);
}

#[test]
fn user_error_reaches_the_driver_unchanged() {
    #[derive(Debug, thiserror::Error)]
    #[error("record 5 is malformed")]
    struct Malformed;

    let cluster = MemCluster::new();
    let context = context(&cluster, &ContextRegistry::new());

    let err = context
        .for_each_partition(numbers(), |records, _sync, _asynchronous| {
            for n in records {
                if n == 5 {
                    return Err(ContextError::user(Malformed));
                }
            }
            Ok(())
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "record 5 is malformed");
}

#[test]
fn scan_mapper_joins_records_against_their_tables() {
    let cluster = MemCluster::new();
    for region in ["east", "west"] {
        cluster.create_table_with(
            format!("orders_{region}"),
            (0..3).map(|i| MemRow::new([("id", format!("{region}-{i}"))])).collect(),
        );
    }
    let context = context(&cluster, &ContextRegistry::new());

    let mapper = ScanMapper::new(
        |region: &String,
         sync: &MemSyncClient,
         _asynchronous: &MemAsyncClient|
         -> ContextResult<MemScanCursor> {
            Ok(sync.open_scanner(&ScanConfig::new(ADDR, format!("orders_{region}")))?)
        },
        |batch: Vec<MemRow>| -> Vec<String> {
            batch
                .into_iter()
                .map(|row| row.get("id").unwrap_or_default().to_owned())
                .collect()
        },
    );

    let regions = VecDataset::new(vec![vec!["east".to_owned()], vec!["west".to_owned()]]);
    let joined = context.map_partitions(regions, mapper.into_partition_fn()).unwrap();

    assert_eq!(joined.partition_count(), 2);
    assert_eq!(
        joined.into_elements(),
        vec!["east-0", "east-1", "east-2", "west-0", "west-1", "west-2"]
    );
    assert_eq!(cluster.sync_connects(), 1);
}

#[test]
fn read_table_hands_the_adapter_a_full_scan_config() {
    let cluster = MemCluster::new();
    let context = context(&cluster, &ContextRegistry::new());
    let adapter = MemReadAdapter::new(vec![vec![10u64, 20], vec![30]]);

    let dataset = context.read_table(&adapter, "orders").unwrap();
    assert_eq!(dataset.partition_count(), 2);
    assert_eq!(dataset.into_elements(), vec![10, 20, 30]);

    let config = adapter.last_config().unwrap();
    assert_eq!(config.master_address.as_str(), ADDR);
    assert_eq!(config.table_name, "orders");
    assert!(config.column_projection.is_none());
}

#[test]
fn read_table_with_projection() {
    let cluster = MemCluster::new();
    let context = context(&cluster, &ContextRegistry::new());
    let adapter = MemReadAdapter::new(vec![vec![MemRow::new([("id", "1")])]]);

    let config = ScanConfig::new(ADDR, "orders").with_projection(["id", "total"]);
    context.read_table_with(&adapter, config).unwrap();

    let seen = adapter.last_config().unwrap();
    assert_eq!(seen.column_projection.as_deref(), Some(&["id".to_owned(), "total".to_owned()][..]));
}

#[test]
fn latest_context_is_recoverable_from_the_global_registry() {
    let cluster = MemCluster::new();
    let context = ContextBuilder::new(MemConnector::new(cluster))
        .master_addr("global:7051")
        .build()
        .unwrap();

    let latest =
        ContextRegistry::global().latest::<DistributedContext<MemConnector>>().unwrap();
    assert!(Arc::ptr_eq(&latest, &context));
    assert_eq!(ContextRegistry::global().latest_addr().unwrap().as_str(), "global:7051");

    ContextRegistry::global().clear();
}

#[tokio::test]
async fn streaming_for_each_processes_batches_in_arrival_order() {
    let cluster = MemCluster::new();
    let context = context(&cluster, &ContextRegistry::new());

    let (tx, stream) = micro_batch_channel(8);
    for batch in 0..3u64 {
        tx.send(VecDataset::new(vec![vec![batch], vec![batch]])).await.unwrap();
    }
    drop(tx);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    context
        .stream_for_each_partition(stream, move |records, _sync, _asynchronous| {
            sink.lock().extend(records);
            Ok(())
        })
        .await
        .unwrap();

    // Two partitions per batch; batches never interleave.
    assert_eq!(*seen.lock(), vec![0, 0, 1, 1, 2, 2]);
}

#[tokio::test]
async fn cancelled_stream_runs_no_more_bodies() {
    let cluster = MemCluster::new();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let context = ContextBuilder::new(MemConnector::new(cluster))
        .master_addr(ADDR)
        .cancel_token(cancel)
        .build_with_registry(&ContextRegistry::new())
        .unwrap();

    let (tx, stream) = micro_batch_channel(8);
    tx.send(VecDataset::new(vec![vec![1u64]])).await.unwrap();

    let ran = Arc::new(Mutex::new(0u32));
    let sink = ran.clone();
    context
        .stream_for_each_partition(
            stream,
            move |_records: PartitionIter<u64>, _sync, _asynchronous| {
                *sink.lock() += 1;
                Ok(())
            },
        )
        .await
        .unwrap();
    assert_eq!(*ran.lock(), 0);
}

#[tokio::test]
async fn streaming_map_yields_one_dataset_per_batch() {
    let cluster = MemCluster::new();
    let context = context(&cluster, &ContextRegistry::new());

    let (tx, stream) = micro_batch_channel(8);
    for batch in 1..=3u64 {
        tx.send(VecDataset::new(vec![vec![batch, batch * 10]])).await.unwrap();
    }
    drop(tx);

    let mapped: Vec<ContextResult<VecDataset<u64>>> = context
        .stream_map_partitions(stream, |records, _sync, _asynchronous| {
            Ok(Box::new(records.map(|n| Ok(n + 1))) as UserIter<u64>)
        })
        .collect()
        .await;

    let elements: Vec<Vec<u64>> =
        mapped.into_iter().map(|d| d.unwrap().into_elements()).collect();
    assert_eq!(elements, vec![vec![2, 11], vec![3, 21], vec![4, 31]]);
}
