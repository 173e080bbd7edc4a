//! Mini-Multisig CLI Application
//!
//! A command-line interface for driving multisig engines on a local host.

use clap::{Parser, Subcommand, ValueEnum};
use mini_multisig::cli::{self, AppState};
use mini_multisig::crypto::AccountId;
use mini_multisig::multisig::{EngineConfig, Message, TxId, MAX_OWNERS, MAX_TRANSACTIONS};
use mini_multisig::runtime::StubContract;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "multisig")]
#[command(version = "0.1.0")]
#[command(about = "A multi-owner transaction authorization engine", long_about = None)]
struct Cli {
    /// Data directory for host state
    #[arg(short, long, default_value = ".multisig_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a fresh host state
    Init {
        /// Overwrite existing state
        #[arg(long)]
        force: bool,

        /// Largest owner set a new multisig accepts
        #[arg(long, default_value_t = MAX_OWNERS)]
        max_owners: usize,

        /// Most transactions a multisig keeps pending at once
        #[arg(long, default_value_t = MAX_TRANSACTIONS)]
        max_transactions: usize,
    },

    /// Account operations
    Account {
        #[command(subcommand)]
        action: AccountCommands,
    },

    /// Deploy a stub contract
    Deploy {
        /// Deployer account
        #[arg(short, long)]
        from: String,

        /// Contract behaviour
        #[arg(short, long, value_enum)]
        kind: StubKind,

        /// Message a callback contract sends (name or 0x-prefixed selector)
        #[arg(long, default_value = "get_threshold")]
        callback: String,

        /// JSON arguments for the callback message
        #[arg(long)]
        callback_args: Option<String>,
    },

    /// Multisig engine operations
    Multisig {
        #[command(subcommand)]
        action: MultisigCommands,
    },

    /// Propose an outgoing call
    Propose {
        /// Proposing owner
        #[arg(short, long)]
        from: String,

        /// Multisig address
        #[arg(short, long)]
        multisig: String,

        /// Call target
        #[arg(short, long)]
        target: String,

        /// Message name or 0x-prefixed selector
        #[arg(short, long, default_value = "0x00000000")]
        selector: String,

        /// Call input (sent as raw bytes)
        #[arg(short, long)]
        input: Option<String>,

        /// Value transferred with the call
        #[arg(long, default_value = "0")]
        value: u128,

        /// Gas limit (0 uses the host default)
        #[arg(long, default_value = "0")]
        gas: u64,

        /// Let the callee call back into the multisig
        #[arg(long)]
        allow_reentry: bool,
    },

    /// Propose a governance change
    Governance {
        /// Proposing owner
        #[arg(short, long)]
        from: String,

        /// Multisig address
        #[arg(short, long)]
        multisig: String,

        #[command(subcommand)]
        action: GovernanceCommands,
    },

    /// Approve a pending transaction
    Approve {
        #[arg(short, long)]
        from: String,
        #[arg(short, long)]
        multisig: String,
        #[arg(short, long)]
        tx: TxId,
    },

    /// Reject a pending transaction
    Reject {
        #[arg(short, long)]
        from: String,
        #[arg(short, long)]
        multisig: String,
        #[arg(short, long)]
        tx: TxId,
    },

    /// Execute a transaction whose threshold is now met
    TryExecute {
        #[arg(short, long)]
        from: String,
        #[arg(short, long)]
        multisig: String,
        #[arg(short, long)]
        tx: TxId,
    },

    /// Remove a transaction whose threshold can no longer be met
    TryRemove {
        #[arg(short, long)]
        from: String,
        #[arg(short, long)]
        multisig: String,
        #[arg(short, long)]
        tx: TxId,
    },

    /// Export host state to file
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import host state from file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Saved state backups
    Backup {
        #[command(subcommand)]
        action: BackupCommands,
    },
}

#[derive(Subcommand)]
enum BackupCommands {
    /// List backups
    List,

    /// Restore a backup (0 is the newest)
    Restore {
        #[arg(short, long)]
        index: usize,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Mint funds into an account
    Fund {
        #[arg(short, long)]
        account: String,
        #[arg(short = 'n', long)]
        amount: u128,
    },

    /// Show an account balance
    Balance {
        #[arg(short, long)]
        account: String,
    },

    /// List funded accounts
    List,
}

#[derive(Subcommand)]
enum MultisigCommands {
    /// Create a new multisig
    New {
        /// Deployer account
        #[arg(short, long)]
        from: String,

        /// Required approvals
        #[arg(short, long)]
        threshold: u8,

        /// Owners (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        owners: Vec<String>,

        /// Salt for address derivation (random when omitted)
        #[arg(short, long)]
        salt: Option<String>,
    },

    /// List multisigs
    List,

    /// Show multisig details
    Info {
        #[arg(short, long)]
        address: String,
    },

    /// Show a pending transaction
    Tx {
        #[arg(short, long)]
        address: String,
        #[arg(short, long)]
        tx: TxId,
    },

    /// Show the event log
    Events {
        #[arg(short, long)]
        address: String,

        /// First sequence number to show
        #[arg(long, default_value = "0")]
        since: u64,

        /// Drop the shown events afterwards
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum GovernanceCommands {
    /// Add an owner
    AddOwner {
        #[arg(short, long)]
        owner: String,
    },

    /// Remove an owner
    RemoveOwner {
        #[arg(short, long)]
        owner: String,
    },

    /// Change the threshold
    ChangeThreshold {
        #[arg(short, long)]
        threshold: u8,
    },

    /// Send funds held by the multisig
    Transfer {
        #[arg(short, long)]
        to: String,
        #[arg(short = 'n', long)]
        amount: u128,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StubKind {
    Echo,
    Revert,
    Trap,
    Counter,
    Callback,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle init command separately (doesn't need full state)
    if let Commands::Init {
        force,
        max_owners,
        max_transactions,
    } = &cli.command
    {
        let config = EngineConfig {
            max_owners: *max_owners,
            max_transactions: *max_transactions,
        };
        return cli::cmd_init(&cli.data_dir, *force, config);
    }

    let mut state = AppState::new(cli.data_dir.clone())?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),
        Commands::Account { action } => match action {
            AccountCommands::Fund { account, amount } => {
                cli::cmd_account_fund(&mut state, &account, amount)?;
            }
            AccountCommands::Balance { account } => {
                cli::cmd_account_balance(&state, &account)?;
            }
            AccountCommands::List => {
                cli::cmd_account_list(&state)?;
            }
        },
        Commands::Deploy {
            from,
            kind,
            callback,
            callback_args,
        } => {
            let contract = match kind {
                StubKind::Echo => StubContract::Echo,
                StubKind::Revert => StubContract::Revert,
                StubKind::Trap => StubContract::Trap,
                StubKind::Counter => StubContract::Counter { count: 0 },
                StubKind::Callback => StubContract::CallBack {
                    selector: cli::parse_selector(&callback)?,
                    input: callback_args.map(String::into_bytes).unwrap_or_default(),
                },
            };
            cli::cmd_deploy(&mut state, &from, contract)?;
        }
        Commands::Multisig { action } => match action {
            MultisigCommands::New {
                from,
                threshold,
                owners,
                salt,
            } => {
                cli::cmd_multisig_new(&mut state, &from, threshold, &owners, salt.as_deref())?;
            }
            MultisigCommands::List => {
                cli::cmd_multisig_list(&state)?;
            }
            MultisigCommands::Info { address } => {
                cli::cmd_multisig_info(&state, &address)?;
            }
            MultisigCommands::Tx { address, tx } => {
                cli::cmd_multisig_tx(&state, &address, tx)?;
            }
            MultisigCommands::Events {
                address,
                since,
                clear,
            } => {
                cli::cmd_multisig_events(&mut state, &address, since, clear)?;
            }
        },
        Commands::Propose {
            from,
            multisig,
            target,
            selector,
            input,
            value,
            gas,
            allow_reentry,
        } => {
            cli::cmd_propose(
                &mut state,
                &from,
                &multisig,
                &target,
                &selector,
                input.as_deref(),
                value,
                gas,
                allow_reentry,
            )?;
        }
        Commands::Governance {
            from,
            multisig,
            action,
        } => {
            let message = match action {
                GovernanceCommands::AddOwner { owner } => Message::AddOwner(AccountId::from(owner)),
                GovernanceCommands::RemoveOwner { owner } => {
                    Message::RemoveOwner(AccountId::from(owner))
                }
                GovernanceCommands::ChangeThreshold { threshold } => {
                    Message::ChangeThreshold(threshold)
                }
                GovernanceCommands::Transfer { to, amount } => Message::Transfer {
                    to: AccountId::from(to),
                    value: amount,
                },
            };
            cli::cmd_governance(&mut state, &from, &multisig, message)?;
        }
        Commands::Approve { from, multisig, tx } => {
            cli::cmd_message(&mut state, &from, &multisig, Message::ApproveTx(tx))?;
        }
        Commands::Reject { from, multisig, tx } => {
            cli::cmd_message(&mut state, &from, &multisig, Message::RejectTx(tx))?;
        }
        Commands::TryExecute { from, multisig, tx } => {
            cli::cmd_message(&mut state, &from, &multisig, Message::TryExecuteTx(tx))?;
        }
        Commands::TryRemove { from, multisig, tx } => {
            cli::cmd_message(&mut state, &from, &multisig, Message::TryRemoveTx(tx))?;
        }
        Commands::Export { output } => {
            cli::cmd_export(&state, &output)?;
        }
        Commands::Import { input } => {
            cli::cmd_import(&mut state, &input)?;
        }
        Commands::Backup { action } => match action {
            BackupCommands::List => {
                cli::cmd_backup_list(&state)?;
            }
            BackupCommands::Restore { index } => {
                cli::cmd_backup_restore(&mut state, index)?;
            }
        },
    }

    Ok(())
}
