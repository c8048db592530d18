//! Name Sniper - find unclaimed short player names
//!
//! Check single names, or scan every name of a given length and list the
//! ones that are still available.

use anyhow::{anyhow, bail, Context};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Confirm, CustomType, MultiSelect, Select, Text};
use name_sniper::{
    ClientConfig, MojangClient, NameCheck, NameChecker, NameSniper, NameStatus, ResultLog,
    RetryPolicy, ScanConfig, ScanController, ScanEvent, ScanSummary, SniperError,
};
use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

/// Progress bar resolution; totals can exceed u64 so the bar tracks percent
const PROGRESS_SCALE: u64 = 10_000;

const CHECK_CHOICE: &str = "Check a single name";
const SCAN_CHOICE: &str = "Scan for available names";
const LETTERS_CHOICE: &str = "Letters (a-z)";
const NUMBERS_CHOICE: &str = "Numbers (0-9)";
const UNDERSCORE_CHOICE: &str = "Underscore (_)";

enum Command {
    Help,
    Version,
    Interactive,
    Check(Vec<String>),
    Scan(ScanArgs),
}

struct ScanArgs {
    config: ScanConfig,
    output_dir: Option<PathBuf>,
    json: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = name_sniper::init() {
        eprintln!("❌ Failed to initialize: {}", e);
        process::exit(1);
    }
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match parse_args(&args) {
        Ok(command) => run(command).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        match e.downcast_ref::<SniperError>() {
            Some(err) => eprintln!("{}", err.user_message()),
            None => eprintln!("❌ Error: {:#}\n💡 Use --help for usage information", e),
        }
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let Some(first) = args.first() else {
        return Ok(Command::Interactive);
    };

    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-V" | "--version" => Ok(Command::Version),
        "check" => {
            let names = args[1..].to_vec();
            if names.is_empty() {
                bail!("'check' needs at least one name");
            }
            Ok(Command::Check(names))
        }
        "scan" => parse_scan_args(&args[1..]).map(Command::Scan),
        other => bail!("Unknown command '{}'", other),
    }
}

fn parse_scan_args(args: &[String]) -> anyhow::Result<ScanArgs> {
    let mut config = ScanConfig::default();
    let mut charset = None::<(bool, bool, bool)>;
    let mut output_dir = None;
    let mut json = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-l" | "--length" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--length needs a value"))?;
                config.length = value
                    .parse()
                    .with_context(|| format!("Invalid length '{}'", value))?;
            }
            "--letters" => charset.get_or_insert((false, false, false)).0 = true,
            "--numbers" => charset.get_or_insert((false, false, false)).1 = true,
            "--underscore" => charset.get_or_insert((false, false, false)).2 = true,
            "-c" | "--include-claimed" => config.include_claimed = true,
            "-o" | "--output" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--output needs a directory"))?;
                output_dir = Some(PathBuf::from(value));
            }
            "--json" => json = true,
            other => bail!("Unknown option '{}' for 'scan'", other),
        }
    }

    // Without explicit character flags every character class is scanned
    if let Some((letters, numbers, underscore)) = charset {
        config.include_letters = letters;
        config.include_numbers = numbers;
        config.include_underscore = underscore;
    }

    Ok(ScanArgs {
        config,
        output_dir,
        json,
    })
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            println!("name-sniper {}", name_sniper::VERSION);
            Ok(())
        }
        Command::Interactive => run_interactive(ClientConfig::from_env()?).await,
        Command::Check(names) => run_check(&names, ClientConfig::from_env()?).await,
        Command::Scan(args) => {
            let client_config = ClientConfig::from_env()?;
            let log = run_scan(&args, client_config).await?;
            if let Some(dir) = &args.output_dir {
                save_log(&log, dir)?;
            }
            Ok(())
        }
    }
}

fn retry_policy(config: &ClientConfig) -> RetryPolicy {
    let policy = RetryPolicy::fixed(config.retry_delay);
    match config.max_retries {
        Some(max) => policy.with_max_attempts(max),
        None => policy,
    }
}

/// Check names one by one, retrying each until the service answers
async fn run_check(names: &[String], client_config: ClientConfig) -> anyhow::Result<()> {
    let policy = retry_policy(&client_config);
    let checker = NameChecker::with_policy(Arc::new(MojangClient::new(client_config)), policy);

    println!("🔍 Checking {} name(s)...", names.len());
    let results = checker.check_many(names).await;

    let mut failed = 0;
    for (name, result) in &results {
        match result {
            Ok(check) => println!("{}", format_check(check)),
            Err(e) => {
                failed += 1;
                eprintln!("⚠️  {}: {}", name, e.user_message());
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} check(s) failed", failed, results.len());
    }
    Ok(())
}

/// Run a full scan with a progress bar, returning the emitted result lines
async fn run_scan(args: &ScanArgs, client_config: ClientConfig) -> anyhow::Result<ResultLog> {
    let sniper = NameSniper::new(MojangClient::new(client_config));
    let active = sniper.start(&args.config)?;
    let controller = active.controller();

    println!(
        "🔍 Scanning {} names of length {}",
        active.total(),
        args.config.length
    );

    let bar = ProgressBar::new(PROGRESS_SCALE);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("=>-"),
    );
    bar.set_message(format!("0/{} | ETA 0h 0m 0s", active.total()));

    if std::io::stdin().is_terminal() {
        println!("   Controls: p = pause/resume, s = stop (then Enter)");
        spawn_keyboard_controls(controller.clone(), bar.clone());
    }

    let ctrl_c = controller.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_c.stop();
        }
    });

    let summary = active
        .run(|event| match event {
            ScanEvent::Result(check) => bar.println(format_check(check)),
            ScanEvent::Progress(report) => {
                bar.set_position((report.percent / 100.0 * PROGRESS_SCALE as f64) as u64);
                bar.set_message(format!("{} | ETA {}", report.label, report.eta_label));
            }
            ScanEvent::LookupFailed { batch_len, message, .. } => {
                bar.println(format!("⚠️  Skipped a batch of {}: {}", batch_len, message))
            }
            ScanEvent::Completed => bar.finish_with_message("Scan complete."),
            ScanEvent::Cancelled => bar.abandon_with_message("Scan stopped."),
        })
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(controller.result_log())
}

/// Read pause/resume/stop commands from stdin on a plain thread
fn spawn_keyboard_controls(controller: ScanController, bar: ProgressBar) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let result = match line.trim().to_lowercase().as_str() {
                "p" | "pause" => controller
                    .toggle_pause()
                    .map(|status| bar.println(format!("⏯️  Scan {}", status))),
                "r" | "resume" => controller
                    .resume()
                    .map(|_| bar.println("▶️  Scan resumed")),
                "s" | "stop" | "q" => controller
                    .stop()
                    .map(|_| bar.println("⏹️  Stopping after the current batch...")),
                "" => continue,
                other => {
                    bar.println(format!("Unknown control '{}', use p, r or s", other));
                    continue;
                }
            };

            if let Err(e) = result {
                bar.println(e.user_message());
            }
            if controller.status().is_terminal() {
                break;
            }
        }
    });
}

async fn run_interactive(client_config: ClientConfig) -> anyhow::Result<()> {
    println!("🎯 Name Sniper - find unclaimed player names");
    println!("═══════════════════════════════════════════");
    println!();

    let choice = Select::new("What would you like to do?", vec![CHECK_CHOICE, SCAN_CHOICE]).prompt()?;

    if choice == CHECK_CHOICE {
        let name = Text::new("Player name:").prompt()?;
        return run_check(&[name], client_config).await;
    }

    let length = CustomType::<usize>::new("Name length (1-16):")
        .with_default(3)
        .with_error_message("Please type a whole number")
        .prompt()?;
    let charset = MultiSelect::new(
        "Characters to include:",
        vec![LETTERS_CHOICE, NUMBERS_CHOICE, UNDERSCORE_CHOICE],
    )
    .with_default(&[0, 1, 2])
    .prompt()?;
    let include_claimed = Confirm::new("Also list claimed names?")
        .with_default(false)
        .prompt()?;
    // Asked up front: the keyboard controls own stdin while the scan runs
    let save = Confirm::new("Save results to a file when done?")
        .with_default(true)
        .prompt()?;

    let args = ScanArgs {
        config: ScanConfig {
            length,
            include_letters: charset.contains(&LETTERS_CHOICE),
            include_numbers: charset.contains(&NUMBERS_CHOICE),
            include_underscore: charset.contains(&UNDERSCORE_CHOICE),
            include_claimed,
        },
        output_dir: save.then(|| PathBuf::from(".")),
        json: false,
    };

    let log = run_scan(&args, client_config).await?;
    if let Some(dir) = &args.output_dir {
        save_log(&log, dir)?;
    }
    Ok(())
}

fn save_log(log: &ResultLog, dir: &Path) -> anyhow::Result<()> {
    match log.save(dir) {
        Ok(path) => {
            println!("💾 Output saved to {}", path.display());
            Ok(())
        }
        Err(SniperError::Validation { message }) => {
            println!("⚠️  {}", message);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn format_check(check: &NameCheck) -> String {
    match check.status {
        NameStatus::Available => format!("✅ {}", check.line()),
        NameStatus::Claimed => format!("❌ {}", check.line()),
    }
}

fn print_summary(summary: &ScanSummary) {
    println!();
    println!("📈 Summary:");
    println!("   📊 Scanned: {}/{}", summary.scanned, summary.total);
    println!("   ✅ Available: {}", summary.available);
    println!("   ❌ Claimed: {}", summary.claimed);
    if summary.failed_batches > 0 {
        println!("   ⚠️  Failed batches: {}", summary.failed_batches);
    }
    println!("   ⏱️  Active time: {:.1}s", summary.elapsed_secs);
    println!("   🏁 Status: {}", summary.status);
}

/// Print help information
fn print_help() {
    println!("🎯 Name Sniper - find unclaimed player names");
    println!("═══════════════════════════════════════════");
    println!();
    println!("USAGE:");
    println!("    name-sniper                      Interactive mode");
    println!("    name-sniper check <NAME>...      Check one or more names");
    println!("    name-sniper scan [OPTIONS]       Scan every name of a length");
    println!();
    println!("SCAN OPTIONS:");
    println!("    -l, --length <N>         Name length, 1-16 (default: 3)");
    println!("        --letters            Include a-z");
    println!("        --numbers            Include 0-9");
    println!("        --underscore         Include _");
    println!("                             (all three when none is given)");
    println!("    -c, --include-claimed    Also list claimed names");
    println!("    -o, --output <DIR>       Save results to DIR when done");
    println!("        --json               Print the summary as JSON");
    println!();
    println!("SCAN CONTROLS:");
    println!("    p + Enter    pause / resume");
    println!("    s + Enter    stop after the current batch");
    println!("    Ctrl-C       stop");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    NAME_SNIPER_PROXY_URL       Prefix for every request URL");
    println!("    NAME_SNIPER_PROFILE_URL     Single-name endpoint base");
    println!("    NAME_SNIPER_SERVICES_URL    Bulk endpoint base");
    println!("    NAME_SNIPER_TIMEOUT_SECS    HTTP timeout (default: 15)");
    println!("    NAME_SNIPER_RETRY_DELAY_MS  Delay between retries (default: 1000)");
    println!("    NAME_SNIPER_MAX_RETRIES     Attempts per name, 0 = unlimited (default: 0)");
    println!("    RUST_LOG                    Log filter (default: error)");
}
