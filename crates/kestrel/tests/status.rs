use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use kestrel::status::StatusBlocks;

#[test]
fn readers_never_see_a_torn_snapshot() {
    let status = StatusBlocks::new();
    status.replace(vec!["cpu 0".into(), "mem 0".into(), "net 0".into()]);
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let status = status.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for generation in 1..=2_000 {
                status.replace(vec![
                    format!("cpu {}", generation),
                    format!("mem {}", generation),
                    format!("net {}", generation),
                ]);
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let mut reads = 0;
    while !done.load(Ordering::SeqCst) || reads == 0 {
        let snapshot = status.snapshot();
        assert_eq!(snapshot.len(), 3);
        let generations: Vec<&str> = snapshot
            .iter()
            .map(|block| block.split_once(' ').map_or("", |(_, generation)| generation))
            .collect();
        assert!(
            generations.iter().all(|g| *g == generations[0]),
            "mixed snapshot: {:?}",
            snapshot
        );
        reads += 1;
    }
    writer.join().unwrap();
    assert_eq!(status.snapshot()[0], "cpu 2000");
}
