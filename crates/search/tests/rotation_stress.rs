//! Search under concurrent block rotation
//!
//! A writer thread cycles blocks through head, completing, and complete
//! while several reader threads hammer all four search surfaces. The
//! mock blocks sleep inside each operation so read locks are held across
//! rotation attempts. The test passing at all is the property: with the
//! fixed head-before-blocks acquisition order there is no interleaving
//! that deadlocks.

mod common;

use common::{trace, MockBlock};
use largo_core::{QueryContext, SearchRequest, SearchTagValuesRequest, SearchTagsRequest, StaticLimits};
use largo_query::AttributeScope;
use largo_search::{Searcher, TenantInstance};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const ROTATIONS: usize = 150;
const READERS: usize = 4;

fn busy_block(seq: u8) -> Arc<dyn Searcher> {
    Arc::new(
        MockBlock::new()
            .with_traces(vec![trace(seq, u64::from(seq) * 10)])
            .with_tags(&[(AttributeScope::Span, "http.status_code")])
            .with_tag_values("service.name", &["api", "web"])
            .with_typed_values(".service.name", &[("string", "api")])
            .with_delay(Duration::from_micros(300)),
    )
}

#[test]
fn test_search_survives_concurrent_rotation() {
    let instance = Arc::new(TenantInstance::new(Arc::new(StaticLimits::default())));
    instance.registry().install_head(busy_block(0));

    let stop = Arc::new(AtomicBool::new(false));
    let start = Arc::new(Barrier::new(READERS + 1));

    let writer = {
        let instance = Arc::clone(&instance);
        let stop = Arc::clone(&stop);
        let start = Arc::clone(&start);
        thread::spawn(move || {
            start.wait();
            for seq in 0..ROTATIONS {
                let registry = instance.registry();
                registry.rotate_head(Some(busy_block((seq % 200) as u8)));

                // drain the pipeline behind the head so the lists stay small
                if let Some(oldest) = registry.completing_ids().first().copied() {
                    registry.promote_completing(oldest);
                }
                let complete = registry.complete_ids();
                if complete.len() > 3 {
                    registry.evict_complete(complete[0]);
                }
                thread::sleep(Duration::from_micros(500));
            }
            stop.store(true, Ordering::Release);
        })
    };

    let readers: Vec<_> = (0..READERS)
        .map(|r| {
            let instance = Arc::clone(&instance);
            let stop = Arc::clone(&stop);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                let ctx = QueryContext::for_tenant("stress-tenant");
                let mut iterations = 0usize;
                while !stop.load(Ordering::Acquire) {
                    match r % 4 {
                        0 => {
                            let resp = instance
                                .search(&ctx, &SearchRequest::default())
                                .expect("search should not fail under rotation");
                            assert!(resp.traces.len() <= 20);
                        }
                        1 => {
                            instance
                                .search_tags_v2(&ctx, &SearchTagsRequest::default())
                                .expect("tag search should not fail under rotation");
                        }
                        2 => {
                            instance
                                .search_tag_values(&ctx, "service.name")
                                .expect("value search should not fail under rotation");
                        }
                        _ => {
                            instance
                                .search_tag_values_v2(
                                    &ctx,
                                    &SearchTagValuesRequest {
                                        tag_name: ".service.name".to_owned(),
                                        query: String::new(),
                                    },
                                )
                                .expect("typed value search should not fail under rotation");
                        }
                    }
                    iterations += 1;
                }
                iterations
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        let iterations = reader.join().unwrap();
        assert!(iterations > 0, "reader made no progress");
    }

    // the pipeline drained roughly as fast as it filled
    let (completing, complete) = instance.registry().block_counts();
    assert!(completing <= ROTATIONS);
    assert!(complete <= 4);
}
