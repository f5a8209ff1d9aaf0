use crate::store::{LocalLottery, LotteryStore};
use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use kripto_lottery::{
    commit, Amount, CommitmentHash, CommitmentScheme, EventLog, Identity, Ledger, Lottery,
    LotteryConfig, LotteryError, RevealOutcome, Secret, Sha256Hash,
};

fn parse_identity(s: &str) -> Result<Identity> {
    Ok(s.parse::<Identity>()?)
}

fn parse_secret(s: &str) -> Result<Secret> {
    Ok(s.parse::<Secret>()?)
}

fn format_amount(amount: Amount) -> String {
    format!("{} sats ({:.8} BTC)", amount.to_sat(), amount.to_btc())
}

pub async fn init_lottery(
    store: &LotteryStore,
    owner: Option<&str>,
    max_participants: usize,
    fee_sats: u64,
    scheme: CommitmentScheme,
    force: bool,
) -> Result<()> {
    if store.exists().await && !force {
        bail!(
            "A lottery already exists at {}; pass --force to replace it",
            store.path().display()
        );
    }

    let owner = match owner {
        Some(owner) => parse_identity(owner)?,
        None => Identity::random(),
    };
    let config = LotteryConfig::new(max_participants, Amount::from_sat(fee_sats)).with_scheme(scheme);
    let lottery = Lottery::new(owner, config, Ledger::new(), EventLog::new())?;
    store.save(&lottery).await?;

    println!("Created lottery {}", lottery.id());
    println!("Owner: {}", owner);
    println!("Entry fee: {}", format_amount(lottery.entry_fee()));
    println!("Max participants: {}", lottery.max_participants());
    println!("Commitment scheme: {:?}", lottery.commitment_scheme());
    Ok(())
}

pub fn new_identity() -> Result<()> {
    println!("{}", Identity::random());
    Ok(())
}

pub async fn fund(store: &LotteryStore, identity: &str, sats: u64) -> Result<()> {
    let identity = parse_identity(identity)?;
    let mut lottery = store.load().await?;

    lottery
        .payout_handler_mut()
        .credit(&identity, Amount::from_sat(sats))
        .map_err(anyhow::Error::msg)?;
    store.save(&lottery).await?;

    println!(
        "Balance of {}: {}",
        identity,
        format_amount(lottery.payout_handler().balance(&identity))
    );
    Ok(())
}

pub async fn make_commitment(store: &LotteryStore, identity: &str, secret: &str) -> Result<()> {
    let identity = parse_identity(identity)?;
    let secret = parse_secret(secret)?;
    let lottery = store.load().await?;

    let commitment = commit(lottery.commitment_scheme(), &Sha256Hash, &secret, &identity);
    println!("{}", commitment);
    Ok(())
}

pub async fn join(
    store: &LotteryStore,
    identity: &str,
    commitment: &str,
    value_sats: Option<u64>,
) -> Result<()> {
    let identity = parse_identity(identity)?;
    let commitment: CommitmentHash = commitment.parse()?;
    let mut lottery = store.load().await?;
    let value = value_sats.map_or(lottery.entry_fee(), Amount::from_sat);

    lottery
        .payout_handler_mut()
        .deposit(&identity, value)
        .map_err(anyhow::Error::msg)
        .context("Could not pay the entry fee")?;

    // on failure nothing is saved, so the deposit is dropped with `lottery`
    lottery.join(&identity, commitment, value)?;
    store.save(&lottery).await?;

    println!("{} joined round {}", identity, lottery.round_id());
    println!(
        "Participants: {}/{}",
        lottery.current_count(),
        lottery.max_participants()
    );
    println!("Pool: {}", format_amount(lottery.pool()));
    Ok(())
}

pub async fn reveal(store: &LotteryStore, identity: &str, secret: &str) -> Result<()> {
    let identity = parse_identity(identity)?;
    let secret = parse_secret(secret)?;
    let mut lottery = store.load().await?;

    match lottery.submit_secret(&identity, secret) {
        RevealOutcome::Accepted => {
            store.save(&lottery).await?;
            println!("Secret accepted for {}", identity);
        }
        RevealOutcome::AlreadyRevealed => println!("{} has already revealed", identity),
        RevealOutcome::Ignored => {
            println!("Secret does not match the commitment of {}; ignored", identity)
        }
    }
    println!(
        "Revealed: {}/{}",
        lottery.current_submitted_count(),
        lottery.current_count()
    );
    Ok(())
}

pub async fn set_max_participants(store: &LotteryStore, caller: &str, max: usize) -> Result<()> {
    let caller = parse_identity(caller)?;
    let mut lottery = store.load().await?;

    lottery.configure(&caller, max)?;
    store.save(&lottery).await?;

    println!("Max participants set to {}", lottery.max_participants());
    Ok(())
}

pub async fn draw(store: &LotteryStore, caller: &str) -> Result<()> {
    let caller = parse_identity(caller)?;
    let mut lottery = store.load().await?;

    let result = lottery.run_lottery(&caller)?;
    store.save(&lottery).await?;

    println!("Round {} finished!", result.round_id);
    println!("Winner: {}", result.winner);
    println!("Payout: {}", format_amount(result.payout));
    println!(
        "Revealed {}/{} participants, random value {}",
        result.revealed_count, result.participant_count, result.random
    );
    Ok(())
}

pub async fn show_status(store: &LotteryStore) -> Result<()> {
    let lottery = store.load().await?;
    let info = lottery.info();

    println!("Lottery {}", info.id);
    println!("Owner: {}", info.owner);
    println!("Round: {}", info.round_id);
    println!("Entry fee: {}", format_amount(info.entry_fee));
    println!(
        "Participants: {}/{} ({} revealed)",
        info.participant_count, info.max_participants, info.revealed_count
    );
    println!("Pool: {}", format_amount(info.pool));

    if lottery.participants().is_empty() {
        return Ok(());
    }

    let mut table = participant_table(&lottery);
    table.load_preset(UTF8_FULL);
    println!("{table}");
    Ok(())
}

fn participant_table(lottery: &LocalLottery) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Identity", "Commitment", "Revealed", "Joined"]);
    for (i, participant) in lottery.participants().iter().enumerate() {
        let revealed = lottery.is_wallet_submitted_hash(participant.identity());
        table.add_row(vec![
            (i + 1).to_string(),
            participant.identity().to_string(),
            participant.commitment().to_string(),
            if revealed { "yes" } else { "no" }.to_string(),
            participant.joined_at().format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    table
}

pub async fn show_last(store: &LotteryStore) -> Result<()> {
    let lottery = store.load().await?;

    match lottery.last_lottery() {
        Ok(last) => {
            println!("{}", serde_json::to_string_pretty(last)?);
            Ok(())
        }
        Err(LotteryError::NoCompletedRounds) => {
            println!("No lottery has been drawn yet");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn list_events(store: &LotteryStore) -> Result<()> {
    let lottery = store.load().await?;
    let events: Vec<_> = lottery.event_sink().run_finished().collect();

    if events.is_empty() {
        println!("No LotteryRunFinished events");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Round", "Winner", "Payout (sats)", "Participants", "Time"]);
    for event in events {
        table.add_row(vec![
            event.round_id.to_string(),
            event.winner.to_string(),
            event.payout.to_sat().to_string(),
            event.participant_count.to_string(),
            event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn show_balance(store: &LotteryStore, identity: Option<&str>) -> Result<()> {
    let lottery = store.load().await?;
    let ledger = lottery.payout_handler();

    match identity {
        Some(identity) => {
            let identity = parse_identity(identity)?;
            println!("{}: {}", identity, format_amount(ledger.balance(&identity)));
        }
        None => println!("Lottery escrow: {}", format_amount(ledger.escrow())),
    }
    Ok(())
}
