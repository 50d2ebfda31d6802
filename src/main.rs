use clap::Parser;
use market_checkout::application::initiator::PaymentInitiator;
use market_checkout::config::CheckoutSettings;
use market_checkout::domain::money::Currency;
use market_checkout::domain::ports::{SharedNavigator, SharedNotifier};
use market_checkout::domain::request::PaymentRequest;
use market_checkout::domain::reference::ReferenceGenerator;
use market_checkout::error::Result as CheckoutResult;
use market_checkout::infrastructure::in_memory::{ProviderAction, ScriptedOverlay};
use market_checkout::infrastructure::terminal::{LoggingNavigator, TerminalNotifier};
use market_checkout::interfaces::csv::attempt_reader::{AttemptReader, CheckoutAttempt};
use market_checkout::interfaces::csv::report_writer::{ReportRow, ReportWriter};
use market_checkout::logging::setup_logging;
use miette::{IntoDiagnostic, Result, miette};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Stall timeout used when neither the flag nor the environment sets one,
/// so `silent` rows cannot hang a replay.
const DEFAULT_REPLAY_STALL_MS: u64 = 250;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Checkout attempts CSV file
    input: PathBuf,

    /// Merchant public key. Falls back to PAYSTACK_PUBLIC_KEY.
    #[arg(long)]
    public_key: Option<String>,

    /// Currency code charged on every attempt (overrides CHECKOUT_CURRENCY)
    #[arg(long)]
    currency: Option<String>,

    /// Milliseconds to wait for the provider before reporting a stall
    #[arg(long)]
    stall_timeout_ms: Option<u64>,

    /// Seed for the reference generator, for reproducible reports
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();

    let mut settings = CheckoutSettings::from_env().into_diagnostic()?;
    if let Some(code) = cli.currency {
        let currency =
            Currency::new(code, settings.currency.minor_unit_factor()).into_diagnostic()?;
        settings = settings.with_currency(currency);
    }
    let stall_ms = cli
        .stall_timeout_ms
        .or_else(|| {
            settings
                .stall_timeout
                .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX))
        })
        .unwrap_or(DEFAULT_REPLAY_STALL_MS);
    settings = settings.with_stall_timeout(Duration::from_millis(stall_ms));

    let public_key = cli
        .public_key
        .or_else(|| settings.merchant_public_key.clone())
        .ok_or_else(|| {
            miette!("No merchant public key: pass --public-key or set PAYSTACK_PUBLIC_KEY")
        })?;

    let overlay = ScriptedOverlay::new();
    let navigator: SharedNavigator = Arc::new(LoggingNavigator);
    let notifier: SharedNotifier = Arc::new(TerminalNotifier::stderr());
    let references = match cli.seed {
        Some(seed) => ReferenceGenerator::seeded(seed),
        None => ReferenceGenerator::new(),
    };
    let initiator = PaymentInitiator::new(Box::new(overlay.clone()), navigator, notifier, settings)
        .with_reference_generator(references);

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = AttemptReader::new(file);
    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());

    for attempt in reader.attempts() {
        match attempt {
            Ok(attempt) => match replay(&initiator, &overlay, &public_key, attempt).await {
                Ok(row) => writer.write_row(&row).into_diagnostic()?,
                Err(e) => eprintln!("Error processing attempt: {}", e),
            },
            Err(e) => {
                eprintln!("Error reading attempt: {}", e);
            }
        }
    }

    writer.flush().into_diagnostic()?;
    Ok(())
}

async fn replay(
    initiator: &PaymentInitiator,
    overlay: &ScriptedOverlay,
    public_key: &str,
    attempt: CheckoutAttempt,
) -> CheckoutResult<ReportRow> {
    let action: ProviderAction = attempt.provider_action.parse()?;
    let request = PaymentRequest::new(
        public_key,
        attempt.email,
        attempt.amount,
        attempt.item_id.clone(),
        attempt.user_id.clone(),
        attempt.callback_url,
    )?;

    overlay.push(action);
    let session = match initiator.initiate(request).await {
        Ok(session) => session,
        Err(e) => {
            // The scripted action was not consumed by an overlay.
            overlay.discard_script();
            return Err(e);
        }
    };

    let reference = session.reference().to_string();
    let amount = session.amount().value();
    let outcome = session.wait().await?;

    Ok(ReportRow::new(
        reference,
        attempt.item_id,
        attempt.user_id,
        amount,
        &outcome,
    ))
}
