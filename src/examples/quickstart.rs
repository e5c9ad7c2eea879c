//! Quickstart Example
//!
//! Creates a database and a table, inserts a couple of rows and queries them back.
//!
//! Run with: MENOUSDB_URL=http://localhost:5555 MENOUSDB_KEY=... cargo run --example quickstart

use menousdb_rs::{Client, ClientConfig};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env()?.with_database("quickstart");
    let client = Client::from_config(&config)?;
    println!("Using database '{}'\n", client);

    if client.check_db_exists().await?.trim() != "true" {
        println!("📁 {}", client.create_db().await?);
    }
    println!("📋 {}", client.create_table("users", &["name", "age"]).await?);

    for (name, age) in [("alice", 30), ("bob", 25)] {
        let reply = client
            .insert_into_table("users", &json!({"name": name, "age": age}))
            .await?;
        println!("📝 {}", reply);
    }

    let rows = client.select_where("users", &json!({"age": 30})).await?;
    println!("\n🔍 Users aged 30: {}", rows);

    let names = client.select_columns("users", &["name"]).await?;
    println!("🔍 Names: {}", names);

    let updated = client
        .update_where("users", &json!({"name": "bob"}), &json!({"age": 26}))
        .await?;
    println!("✏️  {}", updated);

    println!("\n📚 Databases: {}", client.get_databases().await?);
    Ok(())
}
