use clap::{Parser, Subcommand};
#[cfg(not(feature = "storage-rocksdb"))]
use log::warn;
use miette::{IntoDiagnostic, Result};
use paymgr::domain::payment::Payment;
use paymgr::domain::ports::PaymentRepositoryBox;
use paymgr::infrastructure::json_file::{DEFAULT_DATA_FILE, JsonFilePaymentRepository};
#[cfg(feature = "storage-rocksdb")]
use paymgr::infrastructure::rocksdb::RocksDBPaymentRepository;
use paymgr::interfaces::csv::command_reader::CommandReader;
use paymgr::interfaces::csv::payment_writer::PaymentWriter;
use paymgr::PaymentService;
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Manage the lifecycle of payments", long_about = None)]
struct Cli {
    /// JSON file holding every payment
    #[arg(long, global = true, env = "PAYMGR_DATA_FILE", default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all payments as CSV
    List,
    /// Show a single payment as JSON
    Show { id: String },
    /// Register a new payment
    Register {
        id: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        method: String,
    },
    /// Change amount and/or method of a registered payment
    Update {
        id: String,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        method: Option<String>,
    },
    /// Pay a registered payment
    Pay { id: String },
    /// Move a failed payment back to registered
    Revert { id: String },
    /// Cancel a registered payment
    Cancel { id: String },
    /// Apply a CSV batch of commands (`op, id, amount, method`) and list the result
    Apply { input: PathBuf },
}

#[cfg(feature = "storage-rocksdb")]
fn open_repository(cli: &Cli) -> Result<PaymentRepositoryBox> {
    if let Some(db_path) = &cli.db_path {
        let repository = RocksDBPaymentRepository::open(db_path).into_diagnostic()?;
        return Ok(Box::new(repository));
    }
    Ok(Box::new(JsonFilePaymentRepository::new(&cli.data_file)))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_repository(cli: &Cli) -> Result<PaymentRepositoryBox> {
    if cli.db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to JSON file storage."
        );
    }
    Ok(Box::new(JsonFilePaymentRepository::new(&cli.data_file)))
}

fn print_payment(payment: &Payment) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(payment).into_diagnostic()?);
    Ok(())
}

fn print_listing(payments: &[Payment]) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = PaymentWriter::new(stdout.lock());
    writer.write_payments(payments).into_diagnostic()
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let service = PaymentService::new(open_repository(&cli)?);

    match cli.command {
        Command::List => print_listing(&service.list().await.into_diagnostic()?),
        Command::Show { id } => print_payment(&service.get(id).await.into_diagnostic()?),
        Command::Register { id, amount, method } => print_payment(
            &service
                .register(id, amount, &method)
                .await
                .into_diagnostic()?,
        ),
        Command::Update { id, amount, method } => print_payment(
            &service
                .update(id, amount, method.as_deref())
                .await
                .into_diagnostic()?,
        ),
        Command::Pay { id } => print_payment(&service.pay(id).await.into_diagnostic()?),
        Command::Revert { id } => print_payment(&service.revert(id).await.into_diagnostic()?),
        Command::Cancel { id } => print_payment(&service.cancel(id).await.into_diagnostic()?),
        Command::Apply { input } => {
            let file = File::open(input).into_diagnostic()?;
            let reader = CommandReader::new(file);
            for command in reader.commands() {
                match command {
                    Ok(command) => {
                        if let Err(e) = command.apply(&service).await {
                            if !e.is_rejection() {
                                return Err(e).into_diagnostic();
                            }
                            eprintln!("Error applying command: {}", e);
                        }
                    }
                    Err(e) => {
                        eprintln!("Error reading command: {}", e);
                    }
                }
            }
            print_listing(&service.list().await.into_diagnostic()?)
        }
    }
}
