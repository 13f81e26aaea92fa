use ecs_log_writer::{EcsLogWriter, LogLevel};
use serde::Serialize;

/// Labels with ECS-style dotted names, mapped through serde renames.
#[derive(Serialize)]
struct Member {
    #[serde(rename = "member.first_name")]
    first_name: String,
    #[serde(rename = "member.last_name")]
    last_name: String,
    #[serde(rename = "member.address")]
    address: String,
    #[serde(rename = "member.address2")]
    address2: String,
    #[serde(rename = "member.city")]
    city: String,
    #[serde(rename = "member.state")]
    state: String,
    #[serde(rename = "member.zip")]
    zip: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "member.log".to_string());
    let writer = EcsLogWriter::new(&path)?;

    writer.log_message(LogLevel::Info, "service started")?;

    let member = Member {
        first_name: "John".into(),
        last_name: "Doe".into(),
        address: "123 Main St".into(),
        address2: String::new(),
        city: "Anytown".into(),
        state: "CA".into(),
        zip: "12345".into(),
    };
    writer.info("member registered", &member)?;

    println!("{}", std::fs::read_to_string(writer.path())?);
    Ok(())
}
