mod helpers;

use helpers::{fixed_ledger, transfer};
use ledger_core::{
    policy::Signed, AdmissionMode, ChainError, Ledger, LedgerConfig, LedgerError, SharedLedger,
    Signer, Transaction, TxRejected, Wallet,
};
use rust_decimal::Decimal;

#[tokio::test]
async fn test_wallet_driven_round() -> anyhow::Result<()> {
    let miner = Wallet::generate();
    let alice = Wallet::generate();
    let bob = Wallet::generate();

    let mut ledger = Ledger::new(miner.address());
    let payment = Transaction::now(alice.address(), bob.address(), Decimal::new(105, 1))
        .signed_by(&alice);
    assert!(payment.verify_signature(&alice.public_identity()));
    ledger.add_transaction(payment)?;

    let block = ledger.mine_pending_transactions(&miner.address());
    assert!(block.hash.starts_with("00"));
    assert_eq!(block.txs.len(), 2);

    assert_eq!(ledger.balance_of(&miner.address()), Decimal::from(100));
    assert_eq!(ledger.balance_of(&alice.address()), Decimal::new(-105, 1));
    assert_eq!(ledger.balance_of(&bob.address()), Decimal::new(105, 1));
    assert!(ledger.is_valid());
    Ok(())
}

#[tokio::test]
async fn test_chain_length_and_validity_over_many_rounds() -> anyhow::Result<()> {
    let mut ledger = fixed_ledger(2);
    for n in 0..10usize {
        for i in 0..n {
            ledger.add_transaction(transfer(&format!("user{i}"), "sink", 1))?;
        }
        ledger.mine_pending_transactions("miner");
        assert_eq!(ledger.len(), n + 2);
        assert!(ledger.pending_transactions().is_empty());
        ledger.validate()?;
    }
    // 0 + 1 + ... + 9 transfers of 1 each.
    assert_eq!(ledger.balance_of("sink"), Decimal::from(45));
    assert_eq!(ledger.balance_of("miner"), Decimal::from(1_000));
    assert_eq!(ledger.balance_of("user0"), Decimal::from(-9));
    Ok(())
}

#[tokio::test]
async fn test_every_mined_block_meets_difficulty() -> anyhow::Result<()> {
    let mut ledger = fixed_ledger(3);
    for _ in 0..3 {
        ledger.mine_pending_transactions("miner");
    }
    for block in &ledger.blocks()[1..] {
        assert!(block.hash.starts_with("000"));
        assert_eq!(block.hash, block.recompute_hash());
    }
    let genesis = &ledger.blocks()[0];
    assert_eq!(genesis.header.previous_hash, "0");
    assert!(genesis.txs.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_parallel_mining_config() -> anyhow::Result<()> {
    let config = LedgerConfig {
        difficulty: 3,
        parallel_mining: true,
        ..Default::default()
    };
    let mut ledger = Ledger::with_config("g", config)?;
    ledger.add_transaction(transfer("a", "b", 5))?;
    let block = ledger.mine_pending_transactions("miner");
    assert!(block.hash.starts_with("000"));
    assert!(ledger.is_valid());
    Ok(())
}

#[tokio::test]
async fn test_signed_admission_mode() -> anyhow::Result<()> {
    let alice = Wallet::generate();
    let config = LedgerConfig {
        difficulty: 1,
        admission: AdmissionMode::Signed,
        ..Default::default()
    };
    let mut ledger = Ledger::with_config("g", config)?;
    let unsigned = Transaction::now(alice.address(), "bob", Decimal::from(1));
    assert_eq!(
        ledger.add_transaction(unsigned.clone()),
        Err(TxRejected::MissingSignature)
    );
    ledger.add_transaction(unsigned.signed_by(&alice))?;
    assert_eq!(ledger.pending_transactions().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_registered_signer_policy_rejects_forgery() -> anyhow::Result<()> {
    let alice = Wallet::generate();
    let mallory = Wallet::generate();
    let mut ledger = fixed_ledger(1).with_policy(Signed::new().register(&alice));

    let forged = Transaction::now(alice.address(), mallory.address(), Decimal::from(50))
        .signed_by(&mallory);
    assert_eq!(ledger.add_transaction(forged), Err(TxRejected::BadSignature));
    assert!(ledger.pending_transactions().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_shared_ledger_round_trip() -> anyhow::Result<()> {
    let shared = SharedLedger::new(fixed_ledger(2));
    shared.add_transaction(transfer("A", "B", 10)).await?;
    shared.add_transaction(transfer("B", "C", 4)).await?;
    assert_eq!(shared.pending_len().await, 2);

    let block = shared.mine_pending("Miner").await?;
    assert_eq!(block.header.index, 1);
    assert_eq!(block.txs.len(), 3);
    assert_eq!(shared.pending_len().await, 0);
    assert_eq!(shared.len().await, 2);

    assert_eq!(shared.balance_of("A").await, Decimal::from(-10));
    assert_eq!(shared.balance_of("B").await, Decimal::from(6));
    assert_eq!(shared.balance_of("C").await, Decimal::from(4));
    assert_eq!(shared.balance_of("Miner").await, Decimal::from(100));
    assert!(shared.is_valid().await);

    let tip = shared.read(|l| l.latest_block().hash.clone()).await;
    assert_eq!(tip, block.hash);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_miners_both_land() -> anyhow::Result<()> {
    let shared = SharedLedger::new(fixed_ledger(3));
    shared.add_transaction(transfer("A", "B", 1)).await?;

    let (a, b) = tokio::join!(shared.mine_pending("m1"), shared.mine_pending("m2"));
    let (a, b) = (a?, b?);

    let mut indices = [a.header.index, b.header.index];
    indices.sort();
    assert_eq!(indices, [1, 2]);
    assert_eq!(shared.len().await, 3);
    assert_eq!(shared.pending_len().await, 0);
    assert!(shared.is_valid().await);
    assert_eq!(shared.balance_of("m1").await, Decimal::from(100));
    assert_eq!(shared.balance_of("m2").await, Decimal::from(100));

    // The pending transfer lands in exactly one block.
    let blocks = shared.blocks().await;
    let carried = blocks
        .iter()
        .flat_map(|b| b.txs.iter())
        .filter(|tx| **tx == transfer("A", "B", 1))
        .count();
    assert_eq!(carried, 1);
    Ok(())
}

#[tokio::test]
async fn test_shared_rejection_surfaces_as_ledger_error() -> anyhow::Result<()> {
    let config = LedgerConfig {
        difficulty: 1,
        admission: AdmissionMode::WellFormed,
        ..Default::default()
    };
    let shared = SharedLedger::new(Ledger::with_config("g", config)?);
    let err = shared
        .add_transaction(transfer("", "b", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Rejected(TxRejected::EmptySender)));
    Ok(())
}

#[tokio::test]
async fn test_shared_validate_reports_first_bad_block() -> anyhow::Result<()> {
    let shared = SharedLedger::new(fixed_ledger(1));
    shared.mine_pending("m").await?;
    assert_eq!(shared.validate().await, Ok(()));
    assert!(!ChainError::HashMismatch { index: 1 }.to_string().is_empty());
    assert_eq!(ChainError::BrokenLink { index: 4 }.index(), 4);
    Ok(())
}
