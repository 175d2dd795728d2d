// Basic usage example for runsettings
//
// Run with: cargo run --example basic_usage

use runsettings::{DocsConfig, Key, Settings, Source, SystemEnv, generate_docs};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Start from schema defaults plus anything set in WANDB_* variables
    let mut settings = Settings::from_env(&SystemEnv)?;

    println!("📦 runsettings Basic Usage Example\n");
    println!("✅ Mode: {:?}", settings.mode());
    println!("✅ Base URL: {:?} (local: {})", settings.base_url(), settings.is_local());

    // Values from the command line outrank everything but Override
    println!("\n🔧 Applying command line values...");
    settings
        .with_source(Source::Args)
        .apply("project", "demo")?
        .apply("run_id", "1a2b3c")?
        .apply("root_dir", "./demo_runs")?;
    println!("✅ Project: {:?}", settings.project());
    println!("✅ Files dir: {:?}", settings.files_dir_spec());

    // A lower-ranked source is ignored for regular keys...
    settings.update([("project", "from-env")], Source::Env)?;
    println!("✅ Project after Env update: {:?}", settings.project());

    // ...but wins for policy keys
    settings.update([("summary_warnings", 3)], Source::Org)?;
    settings.update([("summary_warnings", 50)], Source::Args)?;
    println!(
        "✅ summary_warnings (policy): {:?}",
        settings.summary_warnings()
    );

    // Derived paths follow the values they depend on
    println!("\n🔄 Switching to offline mode...");
    settings.update([("mode", "offline")], Source::Override)?;
    println!("✅ Run mode: {}", settings.run_mode());
    println!("✅ Files dir: {:?}", settings.files_dir_spec());

    // Rejected values leave the settings untouched
    if let Err(e) = settings.update([("mode", "sideways")], Source::Override) {
        println!("⚠️  {e}");
    }

    settings.freeze();
    if let Err(e) = settings.update_key(Key::Mode, json!("online"), Source::Override) {
        println!("⚠️  {e}");
    }

    let snapshot = settings.make_static_redacted();
    println!("\n📋 Snapshot ({} keys):", snapshot.len());
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    let docs = generate_docs(DocsConfig::new().with_title("Run Settings").hide_private());
    println!("\n📖 Reference docs: {} lines", docs.lines().count());

    Ok(())
}
