use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use ecs_log_writer::async_writer::AsyncEcsLogWriter;
use ecs_log_writer::{EcsLogWriter, LogLevel};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let writer = AsyncEcsLogWriter::new(Arc::new(EcsLogWriter::new("async.log")?));

    let n: u64 = 10_000;
    let start = Instant::now();

    for i in 0..n {
        let mut labels = BTreeMap::new();
        labels.insert("iteration", i);
        writer.log(LogLevel::Info, "async load test", &labels).await?;
    }

    let elapsed = start.elapsed();
    println!("wrote {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}
