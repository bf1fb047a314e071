use artfolio::deeplink::{self, Channel};
use artfolio::form::{self, FormSnapshot, PhotoAttachment};
use artfolio::{config, output, simulate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "artfolio")]
#[command(about = "Behavior layer for single-page artist portfolios")]
#[command(long_about = "\
Behavior layer for single-page artist portfolios

Drives the carousel, navigation, gallery, commission form and notifications
of a portfolio page. The library runs in the browser; this tool checks the
site configuration, previews commission deep links, and replays scripted
sessions headlessly.

Site root:

  site/
  ├── config.toml      # Contact targets, timings, gallery catalog (optional)
  └── index.html

Simulation scripts are JSON:

  {
    \"steps\": [
      {\"at\": 100, \"event\": {\"type\": \"category_selected\", \"category\": \"abstract\"}},
      {\"at\": 400, \"event\": {\"type\": \"key\", \"key\": \"escape\"}}
    ],
    \"until\": 6000
  }

Run 'artfolio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site root containing config.toml
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate config.toml and summarize contact targets and gallery
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Validate a commission request and print the link it would open
    Link(LinkArgs),
    /// Replay a timed event script and print the resulting page operations
    Simulate {
        /// Script file (JSON)
        script: PathBuf,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ChannelArg {
    Messaging,
    Email,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Messaging => Channel::Messaging,
            ChannelArg::Email => Channel::Email,
        }
    }
}

#[derive(clap::Args)]
struct LinkArgs {
    #[arg(long, value_enum, default_value = "messaging")]
    channel: ChannelArg,
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    mobile: String,
    #[arg(long, default_value = "")]
    message: String,
    /// Reference photo to mention in the request
    #[arg(long)]
    photo: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Check => {
            println!("==> Checking {}", cli.root.display());
            let site_config = config::load_config(&cli.root)?;
            output::print_check_output(&site_config, &cli.root);
            println!("==> Config is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Link(args) => {
            let site_config = config::load_config(&cli.root)?;
            let snapshot = snapshot_from_args(&args)?;
            let errors = form::validate(&snapshot);
            if !errors.is_empty() {
                for line in output::format_field_errors(&errors) {
                    eprintln!("{}", line);
                }
                return Err("commission request is invalid".into());
            }
            let request = snapshot.request();
            let photo = snapshot.attached_photo().map(|p| p.name.as_str());
            let url = match Channel::from(args.channel) {
                Channel::Messaging => deeplink::messaging_url(&site_config.contact, &request, photo),
                Channel::Email => deeplink::mailto_url(&site_config.contact, &request, photo.is_some()),
            };
            println!("{}", url);
        }
        Command::Simulate { script, json } => {
            let site_config = config::load_config(&cli.root)?;
            let script = simulate::load_script(&script)?;
            let report = simulate::run(site_config, script)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_simulate_output(&report);
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so command output stays pipeable.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn snapshot_from_args(args: &LinkArgs) -> std::io::Result<FormSnapshot> {
    let photo = args.photo.as_deref().map(attachment).transpose()?;
    Ok(FormSnapshot {
        name: args.name.clone(),
        email: args.email.clone(),
        mobile: args.mobile.clone(),
        message: args.message.clone(),
        photo,
    })
}

fn attachment(path: &Path) -> std::io::Result<PhotoAttachment> {
    let size = std::fs::metadata(path)?.len();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(PhotoAttachment { name, size })
}
