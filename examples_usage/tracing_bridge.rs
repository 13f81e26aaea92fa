use std::sync::Arc;
use tracing::{debug, error, info};

use ecs_log_writer::init::{init_tracing_with_config, LayerConfig};
use ecs_log_writer::EcsLogWriter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let writer = Arc::new(EcsLogWriter::new("bridge.log")?);
    init_tracing_with_config(
        Arc::clone(&writer),
        LayerConfig { enable_stdout: true },
    )?;

    debug!(cache_hit = false, "cache lookup");
    info!(user = "jdoe", "login succeeded");
    error!(order_id = 42u64, reason = "card declined", "payment failed");

    println!("{}", std::fs::read_to_string(writer.path())?);
    Ok(())
}
