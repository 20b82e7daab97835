use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use kuradb::common::types::{DEFAULT_BLOCK_SIZE, DEFAULT_BUFFER_COUNT, DEFAULT_LOG_FILE, DEFAULT_MAX_WAIT};
use kuradb::{BlockId, Database, DatabaseConfig, LogRecord, ReplacementPolicy};

#[derive(Parser)]
#[command(author, version, about = "kura - inspect and edit a Kura database directory")]
struct Cli {
    /// Database directory
    #[arg(short, long, default_value = "kuradb")]
    dir: PathBuf,

    /// Block size in bytes
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Number of buffers in the buffer pool
    #[arg(short, long, default_value_t = DEFAULT_BUFFER_COUNT)]
    buffers: usize,

    /// Log file name inside the database directory
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: String,

    /// Buffer replacement policy (naive or lru)
    #[arg(long, default_value_t = ReplacementPolicy::Naive)]
    policy: ReplacementPolicy,

    /// Milliseconds to wait for a buffer or lock before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_WAIT.as_millis() as u64)]
    max_wait_ms: u64,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show database information
    Info,

    /// Append a zeroed block to a file
    Append {
        file: String,
    },

    /// Print the number of blocks in a file
    Size {
        file: String,
    },

    /// Read an integer
    GetInt {
        file: String,
        block: u64,
        offset: usize,
    },

    /// Write an integer
    SetInt {
        file: String,
        block: u64,
        offset: usize,
        #[arg(allow_hyphen_values = true)]
        value: i32,
    },

    /// Read a string
    GetString {
        file: String,
        block: u64,
        offset: usize,
    },

    /// Write a string
    SetString {
        file: String,
        block: u64,
        offset: usize,
        value: String,
    },

    /// Dump the log, newest record first
    Log {
        /// Print raw record bytes as hex
        #[arg(long)]
        raw: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = DatabaseConfig {
        block_size: cli.block_size,
        buffer_count: cli.buffers,
        log_file: cli.log_file.clone(),
        max_wait: Duration::from_millis(cli.max_wait_ms),
        replacement_policy: cli.policy,
        ..DatabaseConfig::default()
    };
    let db = Database::open_with_config(&cli.dir, config)
        .with_context(|| format!("failed to open database in {}", cli.dir.display()))?;

    run(&db, cli.command)
}

fn run(db: &Database, command: Commands) -> Result<()> {
    match command {
        Commands::Info => {
            println!("Directory:         {}", db.file_manager().db_directory().display());
            println!("Block size:        {}", db.file_manager().block_size());
            println!("Log file:          {}", db.log_manager().log_file());
            println!("Log blocks:        {}", db.log_manager().current_block().number() + 1);
            println!("Buffers:           {}", db.buffer_pool().size());
            println!("Available buffers: {}", db.buffer_pool().available());
            println!("Replacement:       {}", db.config().replacement_policy);
        }
        Commands::Append { file } => {
            let mut txn = db.new_transaction()?;
            let block = txn.append(&file)?;
            txn.commit()?;
            println!("{}", block);
        }
        Commands::Size { file } => {
            let mut txn = db.new_transaction()?;
            let size = txn.size(&file)?;
            txn.commit()?;
            println!("{}", size);
        }
        Commands::GetInt { file, block, offset } => {
            let block = BlockId::new(file, block);
            let mut txn = db.new_transaction()?;
            txn.pin(&block)?;
            let value = txn.get_int(&block, offset)?;
            txn.commit()?;
            println!("{}", value);
        }
        Commands::SetInt { file, block, offset, value } => {
            let block = BlockId::new(file, block);
            let mut txn = db.new_transaction()?;
            txn.pin(&block)?;
            txn.set_int(&block, offset, value, true)?;
            txn.commit()?;
        }
        Commands::GetString { file, block, offset } => {
            let block = BlockId::new(file, block);
            let mut txn = db.new_transaction()?;
            txn.pin(&block)?;
            let value = txn.get_string(&block, offset)?;
            txn.commit()?;
            println!("{}", value);
        }
        Commands::SetString { file, block, offset, value } => {
            let block = BlockId::new(file, block);
            let mut txn = db.new_transaction()?;
            txn.pin(&block)?;
            txn.set_string(&block, offset, &value, true)?;
            txn.commit()?;
        }
        Commands::Log { raw } => {
            for bytes in db.log_manager().iterator()? {
                let bytes = bytes?;
                if raw {
                    println!("{}", hex::encode(&bytes));
                } else {
                    let record = LogRecord::from_bytes(&bytes).context("malformed log record")?;
                    println!("{}", record);
                }
            }
        }
    }
    Ok(())
}
