use anyhow::{Context, Result};
use kripto_lottery::{EventLog, Ledger, Lottery, LotteryState};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub type LocalLottery = Lottery<Ledger, EventLog>;

/// On-disk form of the engine together with its local collaborators
#[derive(Debug, Serialize, Deserialize)]
struct StoredLottery {
    state: LotteryState,
    ledger: Ledger,
    events: EventLog,
}

#[derive(Serialize)]
struct StoredLotteryRef<'a> {
    state: &'a LotteryState,
    ledger: &'a Ledger,
    events: &'a EventLog,
}

pub struct LotteryStore {
    path: PathBuf,
}

impl LotteryStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("kripto_lottery.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    pub async fn load(&self) -> Result<LocalLottery> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| {
                format!(
                    "No lottery at {}; run 'kripto init' first",
                    self.path.display()
                )
            })?;
        let stored: StoredLottery = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt lottery file {}", self.path.display()))?;

        Ok(Lottery::restore(stored.state, stored.ledger, stored.events)?)
    }

    pub async fn save(&self, lottery: &LocalLottery) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let stored = StoredLotteryRef {
            state: lottery.snapshot(),
            ledger: lottery.payout_handler(),
            events: lottery.event_sink(),
        };
        let content = serde_json::to_string_pretty(&stored)?;

        // replaced atomically
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!("Saved lottery to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kripto_lottery::{commit, Amount, Identity, LotteryConfig, Secret, Sha256Hash};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let store = LotteryStore::new(temp_dir.path());
        assert!(!store.exists().await);

        let owner = Identity::random();
        let player = Identity::random();
        let mut lottery =
            Lottery::new(owner, LotteryConfig::default(), Ledger::new(), EventLog::new()).unwrap();
        let fee = lottery.entry_fee();
        let commitment = commit(
            lottery.commitment_scheme(),
            &Sha256Hash,
            &Secret::from(2022u64),
            &player,
        );
        lottery.payout_handler_mut().credit(&player, fee).unwrap();
        lottery.payout_handler_mut().deposit(&player, fee).unwrap();
        lottery.join(&player, commitment, fee).unwrap();
        lottery.submit_secret(&player, Secret::from(2022u64));

        store.save(&lottery).await.unwrap();
        assert!(store.exists().await);

        let mut loaded = store.load().await.unwrap();
        assert_eq!(loaded.id(), lottery.id());
        assert_eq!(loaded.current_count(), 1);
        assert!(loaded.is_wallet_submitted_hash(&player));
        assert_eq!(loaded.payout_handler().escrow(), fee);

        loaded.run_lottery(&owner).unwrap();
        store.save(&loaded).await.unwrap();

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded.event_sink().len(), 1);
        assert_eq!(reloaded.last_lottery().unwrap().winner, player);
        assert_eq!(reloaded.payout_handler().balance(&player), fee);
        assert_eq!(reloaded.payout_handler().escrow(), Amount::ZERO);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = tempdir().unwrap();
        let store = LotteryStore::new(temp_dir.path());
        assert!(store.load().await.is_err());
    }
}
