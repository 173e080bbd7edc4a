//! CLI commands for the multisig host
//!
//! Implements all command handlers for the CLI interface. Every command
//! loads the host state, acts on it and saves it back.

use crate::crypto::AccountId;
use crate::multisig::{
    quorum, selector_for, Balance, EngineConfig, Event, Message, QuorumOutcome, Selector,
    Transaction, TxId, TxResult, Vote,
};
use crate::runtime::{Host, MultisigFactory, StubContract};
use crate::storage::{load_from_file, save_to_file, Storage, StorageConfig};
use std::path::PathBuf;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub host: Host,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize application state
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage_config = StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        };

        let storage = Storage::new(storage_config)?;

        let host = if storage.exists() {
            log::debug!("Loading host state from {:?}", data_dir);
            storage.load()?
        } else {
            println!("🆕 Creating new host state...");
            let host = Host::new();
            storage.save(&host)?;
            host
        };

        Ok(Self {
            host,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.host)?;
        Ok(())
    }
}

/// Parse a selector given as `0x`-prefixed hex or as a message name
pub fn parse_selector(value: &str) -> CliResult<Selector> {
    match value.strip_prefix("0x") {
        Some(digits) => {
            let bytes = hex::decode(digits)?;
            let selector: Selector = bytes
                .try_into()
                .map_err(|_| "selector must be exactly 4 bytes")?;
            Ok(selector)
        }
        None => Ok(selector_for(value)),
    }
}

/// Initialize a fresh host state
///
/// Engines created on this host afterwards get the limits in `config`.
pub fn cmd_init(data_dir: &PathBuf, force: bool, config: EngineConfig) -> CliResult<()> {
    let storage_config = StorageConfig {
        data_dir: data_dir.clone(),
        ..Default::default()
    };

    let storage = Storage::new(storage_config)?;

    if storage.exists() && !force {
        println!("⚠️  State already exists at {:?}", data_dir);
        println!("   Use --force to reinitialize (this will delete existing data)");
        return Ok(());
    }

    storage.delete()?;

    println!(
        "🔧 Engine limits: {} owners, {} pending transactions",
        config.max_owners, config.max_transactions
    );
    let host = Host::with_factory(MultisigFactory::with_config(config));
    storage.save(&host)?;

    println!("✅ Host initialized!");
    println!("   📁 Data directory: {:?}", data_dir);

    Ok(())
}

/// Mint funds into an account
pub fn cmd_account_fund(state: &mut AppState, account: &str, amount: Balance) -> CliResult<()> {
    let account = AccountId::from(account);
    state.host.fund(&account, amount);
    state.save()?;

    println!("💰 Funded {} with {}", account, amount);
    println!("   New balance: {}", state.host.balance_of(&account));

    Ok(())
}

/// Show an account's balance
pub fn cmd_account_balance(state: &AppState, account: &str) -> CliResult<()> {
    let account = AccountId::from(account);
    println!("💰 Balance of {}: {}", account, state.host.balance_of(&account));
    Ok(())
}

/// List funded accounts
pub fn cmd_account_list(state: &AppState) -> CliResult<()> {
    let accounts = state.host.accounts();

    if accounts.is_empty() {
        println!("📭 No funded accounts");
        return Ok(());
    }

    println!("💼 Accounts ({}):", accounts.len());
    for (account, balance) in accounts {
        println!("   {} : {}", account, balance);
    }

    Ok(())
}

/// Deploy a stub contract
pub fn cmd_deploy(state: &mut AppState, deployer: &str, contract: StubContract) -> CliResult<()> {
    let name = contract.name();
    let address = state.host.deploy(&AccountId::from(deployer), contract);
    state.save()?;

    println!("📜 Deployed {} contract", name);
    println!("   📍 Address: {}", address);

    Ok(())
}

/// Create a new engine
///
/// Without a salt a random one is used, so repeated owner sets still get
/// fresh addresses.
pub fn cmd_multisig_new(
    state: &mut AppState,
    deployer: &str,
    threshold: u8,
    owners: &[String],
    salt: Option<&str>,
) -> CliResult<()> {
    let owners: Vec<AccountId> = owners.iter().map(|o| AccountId::from(o.as_str())).collect();
    let salt = match salt {
        Some(salt) => salt.to_string(),
        None => hex::encode(rand::random::<[u8; 8]>()),
    };
    let address = state
        .host
        .instantiate(&AccountId::from(deployer), threshold, owners, salt.as_bytes())?;
    state.save()?;

    if let Some(engine) = state.host.engine(&address) {
        println!("🔐 Multisig created ({})", engine.registry().description());
        println!("   📍 Address: {}", address);
        for owner in engine.get_owners() {
            println!("   👤 {}", owner);
        }
    }

    Ok(())
}

/// List engines
pub fn cmd_multisig_list(state: &AppState) -> CliResult<()> {
    let engines = state.host.engines();

    if engines.is_empty() {
        println!("📭 No multisigs. Create one with: multisig new");
        return Ok(());
    }

    println!("🔐 Multisigs ({}):", engines.len());
    for engine in engines {
        println!(
            "   {} ({}, {} pending)",
            engine.address(),
            engine.registry().description(),
            engine.get_active_txid_list().len()
        );
    }

    Ok(())
}

/// Show an engine's configuration and pending transactions
pub fn cmd_multisig_info(state: &AppState, address: &str) -> CliResult<()> {
    let address = AccountId::from(address);
    let engine = state
        .host
        .engine(&address)
        .ok_or_else(|| format!("No multisig at {}", address))?;

    println!("🔐 Multisig {}", address);
    println!("   ├─ Policy: {}", engine.registry().description());
    println!("   ├─ Balance: {}", state.host.balance_of(&address));
    println!("   ├─ Next tx id: {}", engine.get_next_tx_id());
    println!(
        "   ├─ Created: {}",
        engine.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("   └─ Owners:");
    for owner in engine.get_owners() {
        println!("      👤 {}", owner);
    }

    let pending: Vec<TxId> = engine.get_active_txid_list();
    if pending.is_empty() {
        println!("\n📭 No pending transactions");
    } else {
        println!("\n⏳ Pending transactions:");
        for tx in engine.pending() {
            println!(
                "   #{} -> {} (✔ {} / ✘ {})",
                tx.id,
                tx.tx.address,
                tx.approvals(),
                tx.rejections()
            );
        }
    }

    Ok(())
}

/// Show one pending transaction with its votes
pub fn cmd_multisig_tx(state: &AppState, address: &str, tx_id: TxId) -> CliResult<()> {
    let address = AccountId::from(address);
    let engine = state
        .host
        .engine(&address)
        .ok_or_else(|| format!("No multisig at {}", address))?;
    let tx = engine
        .get_tx(tx_id)
        .ok_or_else(|| format!("No pending transaction #{}", tx_id))?;

    let approvals = engine.get_tx_approvals(tx_id).unwrap_or(0);
    let rejections = engine.get_tx_rejections(tx_id).unwrap_or(0);
    let status = quorum::evaluate(
        approvals,
        rejections,
        engine.get_owners().len(),
        engine.get_threshold(),
    );

    println!("📄 Transaction #{} on {}", tx_id, address);
    println!("   ├─ Target: {}", tx.address);
    println!("   ├─ Selector: 0x{}", hex::encode(tx.selector));
    println!("   ├─ Input: {} bytes", tx.input.len());
    println!("   ├─ Value: {}", tx.transferred_value);
    println!("   ├─ Gas limit: {}", tx.gas_limit);
    println!("   ├─ Re-entry: {}", tx.allow_reentry);
    println!("   ├─ Status: {:?}", status);
    println!("   └─ Votes:");
    for owner in engine.get_owners() {
        let vote = engine
            .get_tx_approval_for_account(tx_id, &owner)
            .unwrap_or(Vote::NotVoted);
        println!("      {} {}", vote_mark(vote), owner);
    }

    // Votes of removed owners still count
    if let Some(pending) = engine.pending().find(|p| p.id == tx_id) {
        for (voter, vote) in pending.voters().filter(|(v, _)| !engine.is_owner(v)) {
            println!("      {} {} (former owner)", vote_mark(vote), voter);
        }
    }

    Ok(())
}

fn vote_mark(vote: Vote) -> &'static str {
    match vote {
        Vote::Approved => "✔",
        Vote::Rejected => "✘",
        Vote::NotVoted => "·",
    }
}

/// Print an engine's event log
pub fn cmd_multisig_events(
    state: &mut AppState,
    address: &str,
    since: u64,
    clear: bool,
) -> CliResult<()> {
    let address = AccountId::from(address);
    let engine = state.host.engine_mut(&address)?;

    let records = engine.events().since(since);
    if records.is_empty() {
        println!("📭 No events");
    } else {
        println!("📜 Events on {}:", address);
        for record in records {
            println!(
                "   #{} [{}] {}",
                record.seq,
                record.timestamp.format("%H:%M:%S"),
                describe_event(&record.event)
            );
        }
    }

    if clear {
        let drained = engine.events_mut().drain();
        state.save()?;
        println!("🧹 Cleared {} event(s)", drained.len());
    }

    Ok(())
}

/// Propose a raw call
#[allow(clippy::too_many_arguments)]
pub fn cmd_propose(
    state: &mut AppState,
    caller: &str,
    engine: &str,
    target: &str,
    selector: &str,
    input: Option<&str>,
    value: Balance,
    gas_limit: u64,
    allow_reentry: bool,
) -> CliResult<()> {
    let input = input.map(|i| i.as_bytes().to_vec()).unwrap_or_default();
    let tx = Transaction::new(AccountId::from(target), parse_selector(selector)?, input)
        .with_value(value)
        .with_gas_limit(gas_limit)
        .with_reentry(allow_reentry);

    cmd_message(state, caller, engine, Message::ProposeTx(tx))
}

/// Propose a governance change as a self-call
pub fn cmd_governance(
    state: &mut AppState,
    caller: &str,
    engine: &str,
    message: Message,
) -> CliResult<()> {
    if !message.is_self_only() {
        return Err(format!("{} is not a governance message", message.name()).into());
    }

    let engine_address = AccountId::from(engine);
    let tx = Transaction::self_call(&engine_address, &message)?;

    println!("🏛️  Proposing {} on {}", message.name(), engine_address);
    cmd_message(state, caller, engine, Message::ProposeTx(tx))
}

/// Send one message to an engine and report what happened
pub fn cmd_message(
    state: &mut AppState,
    caller: &str,
    engine: &str,
    message: Message,
) -> CliResult<()> {
    let caller = AccountId::from(caller);
    let engine = AccountId::from(engine);
    let name = message.name();

    if state.host.engine(&engine).is_none() {
        return Err(format!("No multisig at {}", engine).into());
    }

    let seq = state
        .host
        .engine(&engine)
        .map(|e| e.events().next_seq())
        .unwrap_or(0);

    let output = state.host.submit(&caller, &engine, &message)?;
    state.save()?;

    match message {
        Message::ProposeTx(_) => {
            let tx_id: TxId = serde_json::from_slice(&output)?;
            println!("📝 Proposed transaction #{}", tx_id);
        }
        Message::ApproveTx(_)
        | Message::RejectTx(_)
        | Message::TryExecuteTx(_)
        | Message::TryRemoveTx(_) => {
            let outcome: QuorumOutcome = serde_json::from_slice(&output)?;
            println!("🗳️  {}: {}", name, describe_outcome(&outcome));
        }
        _ => println!("✅ {}: {}", name, String::from_utf8_lossy(&output)),
    }

    if let Some(engine) = state.host.engine(&engine) {
        for record in engine.events().since(seq) {
            println!("   • {}", describe_event(&record.event));
        }
    }

    Ok(())
}

/// Export host state to a file
pub fn cmd_export(state: &AppState, path: &PathBuf) -> CliResult<()> {
    save_to_file(&state.host, path)?;
    println!("✅ State exported to {:?}", path);
    Ok(())
}

/// Import host state from a file
pub fn cmd_import(state: &mut AppState, path: &PathBuf) -> CliResult<()> {
    state.host = load_from_file(path)?;
    state.save()?;
    println!("✅ State imported from {:?}", path);
    println!("   🔐 Multisigs: {}", state.host.engines().len());
    Ok(())
}

fn describe_outcome(outcome: &QuorumOutcome) -> String {
    match outcome {
        QuorumOutcome::Pending => "pending".to_string(),
        QuorumOutcome::Cancelled => "cancelled".to_string(),
        QuorumOutcome::Executed(result) => format!("executed, {}", describe_result(result)),
    }
}

fn describe_result(result: &TxResult) -> String {
    match result {
        TxResult::Success(output) => format!("success ({} bytes)", output.len()),
        TxResult::Failed(err) => format!("failed: {}", err),
    }
}

/// Show saved backups of the host state
pub fn cmd_backup_list(state: &AppState) -> CliResult<()> {
    let stats = state.storage.stats()?;

    println!("💾 Storage at {:?}", stats.data_dir);
    println!("   State file: {} bytes", stats.file_size);

    if stats.backup_count == 0 {
        println!("📭 No backups");
        return Ok(());
    }

    println!("   Backups ({}, newest first):", stats.backup_count);
    for index in state.storage.list_backups() {
        let host = state.storage.restore_backup(index)?;
        println!(
            "   #{}: {} engines, {} funded accounts",
            index,
            host.engines().len(),
            host.accounts().len()
        );
    }

    Ok(())
}

/// Replace the current host state with a backup
///
/// The state being replaced becomes the newest backup.
pub fn cmd_backup_restore(state: &mut AppState, index: usize) -> CliResult<()> {
    state.host = state.storage.restore_backup(index)?;
    state.save()?;

    println!("♻️  Restored backup #{}", index);
    println!("   Engines: {}", state.host.engines().len());

    Ok(())
}

fn describe_event(event: &Event) -> String {
    match event {
        Event::ThresholdChanged { threshold } => format!("ThresholdChanged -> {}", threshold),
        Event::OwnerAdded { owner } => format!("OwnerAdded {}", owner),
        Event::OwnerRemoved { owner } => format!("OwnerRemoved {}", owner),
        Event::TransactionProposed {
            tx_id,
            contract_address,
            ..
        } => format!("TransactionProposed #{} -> {}", tx_id, contract_address),
        Event::Approve { tx_id, owner } => format!("Approve #{} by {}", tx_id, owner),
        Event::Reject { tx_id, owner } => format!("Reject #{} by {}", tx_id, owner),
        Event::TransactionExecuted { tx_id, result } => {
            format!("TransactionExecuted #{} {}", tx_id, describe_result(result))
        }
        Event::TransactionCancelled { tx_id } => format!("TransactionCancelled #{}", tx_id),
        Event::TransactionRemoved { tx_id } => format!("TransactionRemoved #{}", tx_id),
        Event::Transfer { to, value } => format!("Transfer {} to {}", value, to),
    }
}
