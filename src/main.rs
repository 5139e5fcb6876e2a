use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use managed_provisioning::bootstrap::{
    init_tracing_subscriber, load_config, load_device, wire_provisioning,
};
use mp_core::ports::ConsentPort;
use mp_core::{FlowOutcome, ProvisioningParams};
use mp_infra::{LoggingUi, ScriptedConsent, SimulatedDevice, TerminalConsent};

/// Create and provision a managed work profile
#[derive(Parser, Debug)]
#[command(name = "managed-provisioning", version, about)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config/provisioning.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a provisioning attempt against the configured device
    Provision {
        /// Package name of the managing (MDM) app
        #[arg(long)]
        package: String,

        /// Name of the new managed profile
        #[arg(long)]
        profile_name: String,

        /// Consent without prompting
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the configured device's users and installed packages
    Inspect,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_tracing_subscriber(&config.log_directory)?;
    let device = Arc::new(load_device(&cli.config, &config)?);

    match cli.command {
        Command::Provision {
            package,
            profile_name,
            yes,
        } => {
            let consent: Arc<dyn ConsentPort> = if yes {
                Arc::new(ScriptedConsent::granted())
            } else {
                Arc::new(TerminalConsent::default())
            };
            let ui = Arc::new(LoggingUi::new());
            let flow = wire_provisioning(&config, device.clone(), consent, ui);

            let outcome = flow
                .start(ProvisioningParams::new(package, profile_name))
                .await;
            report(&outcome);
            if outcome.is_clean_exit() {
                print_device(&device);
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Inspect => {
            print_device(&device);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn report(outcome: &FlowOutcome) {
    match outcome {
        FlowOutcome::Provisioned(profile) => {
            info!(user = %profile.id, serial = %profile.serial_number, "provisioning complete")
        }
        FlowOutcome::Failed(err) => error!(error = %err, "provisioning failed"),
        FlowOutcome::InvalidRequest(err) => error!(error = %err, "provisioning request rejected"),
        FlowOutcome::AlreadyProvisioned => info!("device already has a managed profile"),
        FlowOutcome::ConsentDeclined => info!("provisioning declined"),
        FlowOutcome::ConsentCancelled => info!("provisioning cancelled"),
    }
}

fn print_device(device: &SimulatedDevice) {
    for user in device.users() {
        let kind = if user.is_managed_profile() {
            "managed profile"
        } else {
            "user"
        };
        println!(
            "{kind} {} (serial {}, flags {}): {}",
            user.id, user.serial_number, user.flags, user.name
        );
        if let Some((owner, _)) = device.profile_owner(user.id) {
            println!("  profile owner: {owner}");
        }
        for package in device.installed_packages(user.id) {
            println!("  {package}");
        }
    }
}
