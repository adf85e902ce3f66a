//! Your first KDL document: parse, query, modify and write it back.
//!
//! Run with: cargo run --example simple

use kdl_doc::{parse, to_string, KdlNode};
use std::error::Error;

const INPUT: &str = r#"
title "Hello, KDL"
owner name="Jane Doe" email="jane@example.com"

database {
    server "192.168.1.1"
    ports 8000 8001 8002
    enabled true
}
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let mut doc = parse(INPUT)?;

    if let Some(title) = doc.get("title").and_then(|n| n.argument(0)) {
        println!("Title: {}", title.as_str().unwrap_or_default());
    }

    if let Some(database) = doc.get("database") {
        let ports: Vec<i64> = database
            .child("ports")
            .map(|n| n.arguments.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default();
        println!("Ports: {:?}", ports);
    }

    if let Some(database) = doc.get_mut("database") {
        database.push_child(KdlNode::new("pool-size").with_argument(16));
    }

    println!("\nWritten back:\n{}", to_string(&doc));

    let json = serde_json::to_string_pretty(&doc)?;
    println!("As JSON:\n{}", json);

    Ok(())
}
