//! cqlpipe CLI
//!
//! Dry-runs entity definitions against a recording session and prints the
//! CQL the pipeline would send to the store.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use cqlpipe::loader::{load_records, DefinitionFile, JsonRecord};
use cqlpipe::session::{RecordingConnector, SessionEvent};
use cqlpipe::{Config, EntityPipeline, PipelineMode, Registration};
use tracing_subscriber::{fmt, EnvFilter};

/// cqlpipe CLI
#[derive(Parser, Debug)]
#[command(name = "cqlpipe")]
#[command(about = "Preview the CQL generated for entity definitions")]
#[command(version)]
struct Args {
    /// JSON file with entity definitions
    #[arg(short, long)]
    definitions: PathBuf,

    /// Default pipeline mode for entities without update columns
    #[arg(short, long, value_enum, default_value = "insert")]
    mode: ModeArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print provisioning statements and insert templates
    Schema,

    /// Provision, then write records for one entity
    Load {
        /// Entity name
        #[arg(short, long)]
        entity: String,

        /// JSON array of records
        #[arg(short, long)]
        records: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Insert,
    Update,
    InsertAndUpdate,
}

impl From<ModeArg> for PipelineMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Insert => PipelineMode::Insert,
            ModeArg::Update => PipelineMode::Update,
            ModeArg::InsertAndUpdate => PipelineMode::InsertAndUpdate,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cqlpipe=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> cqlpipe::Result<()> {
    let definitions = DefinitionFile::load(&args.definitions)?;
    tracing::info!(
        "Loaded {} definition(s) from {}",
        definitions.entities.len(),
        args.definitions.display()
    );

    let connector = Arc::new(RecordingConnector::new());
    let config = Config::builder().default_mode(args.mode.into()).build();
    let pipeline = EntityPipeline::new(config, connector.clone())?;

    for definition in &definitions.entities {
        if pipeline.add_entity(definition.to_define())? == Registration::Skipped {
            println!("-- {}: no table descriptor, skipped", definition.name);
        }
    }

    // Print whatever was provisioned, even when some entity failed
    let provisioned = pipeline.init();
    print_events(&connector.session().events());
    provisioned?;

    match args.command {
        Commands::Schema => {
            for name in pipeline.entity_names() {
                if let Some(statements) = pipeline.statements(&name) {
                    println!("-- {name}");
                    println!("{}", statements.insert);
                }
            }
        }
        Commands::Load { entity, records } => {
            let records = load_records(&records)?;
            connector.session().clear_events();

            let submitted = pipeline.process::<JsonRecord, _>(&entity, Some(&records))?;

            print_events(&connector.session().events());
            println!("-- {submitted} record(s) submitted for {entity}");
        }
    }

    pipeline.dispose();
    Ok(())
}

fn print_events(events: &[SessionEvent]) {
    for event in events {
        match event {
            SessionEvent::CreateKeyspace(keyspace) => {
                println!("CREATE KEYSPACE IF NOT EXISTS {keyspace};")
            }
            SessionEvent::ChangeKeyspace(keyspace) => println!("USE {keyspace};"),
            SessionEvent::Execute(cql) if cql.ends_with(';') => println!("{cql}"),
            SessionEvent::Execute(cql) => println!("{cql};"),
            SessionEvent::Prepare(cql) => println!("-- prepare: {cql}"),
            SessionEvent::Batch(batch) => {
                println!("BEGIN BATCH");
                for statement in batch.statements() {
                    let values: Vec<String> =
                        statement.values().iter().map(ToString::to_string).collect();
                    println!("  {}  -- [{}]", statement.cql(), values.join(", "));
                }
                println!("APPLY BATCH;");
            }
        }
    }
}
