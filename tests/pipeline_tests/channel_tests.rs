//! Tests for writes routed through a write channel

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use cqlpipe::session::{
    BatchStatement, Connector, PreparedStatement, RecordingSession, Session, SessionEvent,
};
use cqlpipe::{Config, ConnectionSetting, CqlPipeError, EntityPipeline};

use crate::common::*;

fn channel_pipeline() -> (Arc<cqlpipe::session::RecordingConnector>, EntityPipeline) {
    let (connector, pipeline) = setup_pipeline_with(Config::builder().write_channel("db").build());
    pipeline.add_entity(page_define()).unwrap();
    pipeline.add_entity(link_define()).unwrap();
    pipeline.init().unwrap();
    connector.session().clear_events();
    (connector, pipeline)
}

#[test]
fn test_channel_write_returns_count() {
    let (connector, pipeline) = channel_pipeline();

    let written = pipeline
        .process::<Page, _>("Page", Some(vec![Page::new("a"), Page::new("b")]))
        .unwrap();

    assert_eq!(written, 2);
    assert_eq!(connector.session().batches().len(), 1);
}

#[test]
fn test_channel_propagates_batch_failure() {
    let (connector, pipeline) = channel_pipeline();
    connector.session().fail_batches();

    let err = pipeline
        .process::<Page, _>("Page", Some(vec![Page::new("a")]))
        .unwrap_err();

    assert!(matches!(err, CqlPipeError::Driver(_)));
}

#[test]
fn test_concurrent_writes_across_entities() {
    let (connector, pipeline) = channel_pipeline();
    let writers = 8;
    let per_call = 10;

    let totals: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..writers)
            .map(|i| {
                let pipeline = &pipeline;
                scope.spawn(move || {
                    if i % 2 == 0 {
                        let pages: Vec<_> =
                            (0..per_call).map(|j| Page::new(&format!("{i}/{j}"))).collect();
                        pipeline.process::<Page, _>("Page", Some(pages)).unwrap()
                    } else {
                        let links: Vec<_> = (0..per_call)
                            .map(|j| Link {
                                id: None,
                                target: format!("{i}/{j}"),
                                depth: j,
                            })
                            .collect();
                        pipeline.process::<Link, _>("Link", Some(links)).unwrap()
                    }
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(totals.iter().all(|&n| n == per_call as usize));

    let batches = connector.session().batches();
    assert_eq!(batches.len(), writers);
    assert!(batches.iter().all(|b| b.len() == per_call as usize));

    let prepares = connector
        .session()
        .events()
        .iter()
        .filter(|e| matches!(e, SessionEvent::Prepare(_)))
        .count();
    assert_eq!(prepares, writers);
}

// =============================================================================
// Panicking Driver
// =============================================================================

/// Recording session whose next batch panics when armed
#[derive(Default)]
struct FlakySession {
    inner: RecordingSession,
    panic_next_batch: AtomicBool,
}

impl Session for FlakySession {
    fn create_keyspace_if_not_exists(&self, keyspace: &str) -> cqlpipe::Result<()> {
        self.inner.create_keyspace_if_not_exists(keyspace)
    }

    fn change_keyspace(&self, keyspace: &str) -> cqlpipe::Result<()> {
        self.inner.change_keyspace(keyspace)
    }

    fn execute(&self, cql: &str) -> cqlpipe::Result<()> {
        self.inner.execute(cql)
    }

    fn prepare(&self, cql: &str) -> cqlpipe::Result<PreparedStatement> {
        self.inner.prepare(cql)
    }

    fn execute_batch(&self, batch: &BatchStatement) -> cqlpipe::Result<()> {
        if self.panic_next_batch.swap(false, Ordering::SeqCst) {
            panic!("connection pool poisoned");
        }
        self.inner.execute_batch(batch)
    }
}

struct FlakyConnector {
    session: Arc<FlakySession>,
}

impl Connector for FlakyConnector {
    fn connect(&self, _setting: &ConnectionSetting) -> cqlpipe::Result<Arc<dyn Session>> {
        let session: Arc<dyn Session> = self.session.clone();
        Ok(session)
    }
}

#[test]
fn test_channel_survives_panicking_batch() {
    let session = Arc::new(FlakySession::default());
    let connector = Arc::new(FlakyConnector {
        session: Arc::clone(&session),
    });
    let pipeline =
        EntityPipeline::new(Config::builder().write_channel("db").build(), connector).unwrap();
    pipeline.add_entity(page_define()).unwrap();
    pipeline.init().unwrap();

    session.panic_next_batch.store(true, Ordering::SeqCst);
    let err = pipeline
        .process::<Page, _>("Page", Some(vec![Page::new("a")]))
        .unwrap_err();
    assert!(matches!(err, CqlPipeError::Channel(_)));

    // Session is healthy again: the same channel keeps serving writes
    let written = pipeline
        .process::<Page, _>("Page", Some(vec![Page::new("b"), Page::new("c")]))
        .unwrap();
    assert_eq!(written, 2);
    assert_eq!(session.inner.batches().len(), 1);
    assert_eq!(session.inner.batches()[0].len(), 2);
}
