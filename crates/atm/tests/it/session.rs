use crate::utils::{ALICE, BOB, CONTRACT, MockChain, MockWallet, connected, session};
use alloy_primitives::U256;
use atm::{
    ActionOutcome, AtmAction, AtmConfig, AtmSession, SessionError, SessionView, SkipReason,
    WalletError,
};
use chrono::Utc;

#[tokio::test]
async fn no_provider_shows_install_prompt() {
    let mut session = AtmSession::<MockWallet>::new(None, CONTRACT);
    assert!(!session.has_provider());
    assert_eq!(session.view(), SessionView::InstallPrompt);

    assert!(matches!(session.connect().await, Err(SessionError::ProviderUnavailable)));
    assert_eq!(session.restore().await, None);
    assert_eq!(session.deposit().await, ActionOutcome::Skipped(SkipReason::NotConnected));
    assert_eq!(session.view(), SessionView::InstallPrompt);
}

#[tokio::test]
async fn disconnected_session_shows_connect_prompt() {
    let chain = MockChain::default();
    let session = session(&chain);
    assert!(session.has_provider());
    assert!(!session.is_connected());
    assert_eq!(session.view(), SessionView::ConnectPrompt);
}

#[tokio::test]
async fn connect_reads_balance() {
    let chain = MockChain::with_balance(7);
    let mut session = session(&chain);

    assert_eq!(session.connect().await.unwrap(), ALICE);
    assert!(session.is_connected());
    assert_eq!(session.account(), Some(ALICE));
    assert_eq!(session.balance(), Some(U256::from(7)));

    let SessionView::Dashboard(dashboard) = session.view() else {
        panic!("expected dashboard, got {:?}", session.view())
    };
    assert_eq!(dashboard.account, ALICE);
    assert_eq!(dashboard.balance, Some(U256::from(7)));
    assert_eq!(dashboard.last_deposit, None);
    assert_eq!(dashboard.last_withdrawal, None);
    assert!(!dashboard.paused);
}

#[tokio::test]
async fn connect_uses_first_account() {
    let chain = MockChain::default();
    let mut wallet = MockWallet::new(&chain);
    wallet.accounts = vec![BOB, ALICE];
    let mut session = AtmSession::new(Some(wallet), CONTRACT);

    assert_eq!(session.connect().await.unwrap(), BOB);
    assert_eq!(session.account(), Some(BOB));
}

#[tokio::test]
async fn connect_without_accounts() {
    let chain = MockChain::default();
    let mut wallet = MockWallet::new(&chain);
    wallet.accounts.clear();
    let mut session = AtmSession::new(Some(wallet), CONTRACT);

    assert!(matches!(session.connect().await, Err(SessionError::NoAccounts)));
    assert!(!session.is_connected());
    assert_eq!(session.view(), SessionView::ConnectPrompt);
}

#[tokio::test]
async fn connect_rejected_by_user() {
    let chain = MockChain::default();
    let mut wallet = MockWallet::new(&chain);
    wallet.reject = true;
    let mut session = AtmSession::new(Some(wallet), CONTRACT);

    let err = session.connect().await.unwrap_err();
    assert!(matches!(err, SessionError::Wallet(WalletError::Rejected(_))), "{err:?}");
    assert_eq!(session.view(), SessionView::ConnectPrompt);
}

#[tokio::test]
async fn deposit_updates_balance_and_timestamp() {
    let chain = MockChain::default();
    let mut session = connected(&chain).await;

    let before = Utc::now();
    let outcome = session.deposit().await;
    let after = Utc::now();

    assert!(outcome.is_confirmed(), "{outcome}");
    assert_eq!(chain.submitted(), vec![AtmAction::Deposit(U256::from(1))]);
    assert_eq!(session.balance(), Some(U256::from(1)));
    assert_eq!(session.balance(), Some(chain.state().balance));

    let last_deposit = session.state().last_deposit.unwrap();
    assert!(before <= last_deposit && last_deposit <= after);
    assert_eq!(session.state().last_withdrawal, None);
}

#[tokio::test]
async fn withdraw_updates_balance_and_timestamp() {
    let chain = MockChain::with_balance(5);
    let mut session = connected(&chain).await.with_amount(U256::from(2));

    let before = Utc::now();
    let outcome = session.withdraw().await;

    assert!(outcome.is_confirmed(), "{outcome}");
    assert_eq!(chain.submitted(), vec![AtmAction::Withdraw(U256::from(2))]);
    assert_eq!(session.balance(), Some(U256::from(3)));
    assert!(session.state().last_withdrawal.unwrap() >= before);
    assert_eq!(session.state().last_deposit, None);
}

#[tokio::test]
async fn amount_from_config() {
    let chain = MockChain::default();
    let config = AtmConfig { amount: 4, ..Default::default() };
    let mut session = AtmSession::from_config(Some(MockWallet::new(&chain)), &config);
    session.connect().await.unwrap();

    assert_eq!(session.amount(), U256::from(4));
    assert!(session.deposit().await.is_confirmed());
    assert_eq!(session.balance(), Some(U256::from(4)));
}

#[tokio::test]
async fn withdraw_more_than_balance_fails() {
    let chain = MockChain::default();
    let mut session = connected(&chain).await;

    let outcome = session.withdraw().await;
    let ActionOutcome::Failed(err) = &outcome else { panic!("expected failure, got {outcome}") };
    assert!(err.contains("insufficient balance"), "{err}");

    assert!(chain.submitted().is_empty());
    assert_eq!(session.balance(), Some(U256::ZERO));
    assert_eq!(session.state().last_withdrawal, None);
}

#[tokio::test]
async fn paused_contract_blocks_transfers() {
    let chain = MockChain::with_balance(3);
    let mut session = connected(&chain).await;

    assert!(session.pause_contract().await.is_confirmed());
    assert!(session.is_paused());
    assert!(chain.state().paused);

    assert_eq!(session.deposit().await, ActionOutcome::Skipped(SkipReason::Paused));
    assert_eq!(session.withdraw().await, ActionOutcome::Skipped(SkipReason::Paused));

    // only the pause reached the contract
    assert_eq!(chain.submitted(), vec![AtmAction::Pause]);
    assert_eq!(session.balance(), Some(U256::from(3)));
    assert_eq!(session.state().last_deposit, None);
    assert_eq!(session.state().last_withdrawal, None);
}

#[tokio::test]
async fn resume_allows_transfers_again() {
    let chain = MockChain::default();
    let mut session = connected(&chain).await;

    assert!(session.pause_contract().await.is_confirmed());
    assert!(session.resume_contract().await.is_confirmed());
    assert!(!session.is_paused());

    assert!(session.deposit().await.is_confirmed());
    assert_eq!(
        chain.submitted(),
        vec![AtmAction::Pause, AtmAction::Resume, AtmAction::Deposit(U256::from(1))]
    );
}

#[tokio::test]
async fn rejected_transaction_leaves_state_untouched() {
    let chain = MockChain::with_balance(2);
    let mut session = connected(&chain).await;
    let before = session.state().clone();

    chain.state().reject_next = true;
    let outcome = session.deposit().await;
    assert!(matches!(outcome, ActionOutcome::Failed(_)), "{outcome}");
    similar_asserts::assert_eq!(session.state(), &before);

    chain.state().reject_next = true;
    assert!(matches!(session.pause_contract().await, ActionOutcome::Failed(_)));
    assert!(!session.is_paused());

    assert!(chain.submitted().is_empty());
}

#[tokio::test]
async fn reverted_transaction_leaves_state_untouched() {
    let chain = MockChain::default();
    let mut session = connected(&chain).await;

    chain.state().revert_next = true;
    let outcome = session.deposit().await;
    let ActionOutcome::Failed(err) = &outcome else { panic!("expected failure, got {outcome}") };
    assert!(err.ends_with("reverted"), "{err}");

    assert_eq!(session.balance(), Some(U256::ZERO));
    assert_eq!(session.state().last_deposit, None);
}

#[tokio::test]
async fn disconnect_resets_session_but_keeps_pause_flag() {
    let chain = MockChain::default();
    let mut session = connected(&chain).await;
    assert!(session.deposit().await.is_confirmed());
    assert!(session.pause_contract().await.is_confirmed());

    assert!(session.disconnect_wallet().await.is_confirmed());
    assert_eq!(chain.state().disconnected, vec![ALICE]);

    assert!(!session.is_connected());
    assert_eq!(session.account(), None);
    assert_eq!(session.balance(), None);
    assert_eq!(session.state().last_deposit, None);
    assert_eq!(session.state().last_withdrawal, None);
    assert!(session.is_paused());
    assert_eq!(session.view(), SessionView::ConnectPrompt);

    // nothing can be sent until reconnected
    assert_eq!(session.pause_contract().await, ActionOutcome::Skipped(SkipReason::NotConnected));
}

#[tokio::test]
async fn failed_disconnect_stays_connected() {
    let chain = MockChain::default();
    let mut session = connected(&chain).await;

    chain.state().reject_next = true;
    assert!(matches!(session.disconnect_wallet().await, ActionOutcome::Failed(_)));
    assert!(session.is_connected());
    assert_eq!(session.account(), Some(ALICE));
}

#[tokio::test]
async fn reconnect_after_disconnect() {
    let chain = MockChain::with_balance(1);
    let mut session = connected(&chain).await;
    assert!(session.disconnect_wallet().await.is_confirmed());

    assert_eq!(session.connect().await.unwrap(), ALICE);
    assert_eq!(session.balance(), Some(U256::from(1)));
}

#[tokio::test]
async fn disconnected_actions_are_skipped() {
    let chain = MockChain::default();
    let mut session = session(&chain);

    for outcome in [
        session.deposit().await,
        session.withdraw().await,
        session.pause_contract().await,
        session.resume_contract().await,
        session.disconnect_wallet().await,
    ] {
        assert_eq!(outcome, ActionOutcome::Skipped(SkipReason::NotConnected));
    }
    assert!(chain.submitted().is_empty());
    assert_eq!(session.refresh_balance().await, None);
}

#[tokio::test]
async fn restore_authorized_account() {
    let chain = MockChain::with_balance(9);
    let mut wallet = MockWallet::new(&chain);
    wallet.authorized = vec![ALICE];
    let mut session = AtmSession::new(Some(wallet), CONTRACT);

    assert_eq!(session.restore().await, Some(ALICE));
    assert!(session.is_connected());
    assert_eq!(session.balance(), Some(U256::from(9)));
}

#[tokio::test]
async fn restore_without_authorization() {
    let chain = MockChain::default();
    let mut session = session(&chain);

    assert_eq!(session.restore().await, None);
    assert!(!session.is_connected());
    assert_eq!(session.view(), SessionView::ConnectPrompt);
}

#[tokio::test]
async fn reconcile_follows_contract() {
    let chain = MockChain::default();
    let mut session = connected(&chain).await;

    // changed by another client
    chain.state().paused = true;
    chain.state().balance = U256::from(11);
    assert!(!session.is_paused());

    session.reconcile().await;
    assert!(session.is_paused());
    assert_eq!(session.balance(), Some(U256::from(11)));
}

#[tokio::test]
async fn failed_reads_keep_mirrored_state() {
    let chain = MockChain::with_balance(2);
    let mut session = connected(&chain).await;
    assert!(session.pause_contract().await.is_confirmed());

    chain.state().fail_reads = true;
    chain.state().balance = U256::from(8);
    session.reconcile().await;

    assert!(session.is_paused());
    assert_eq!(session.balance(), Some(U256::from(2)));
    assert_eq!(session.refresh_balance().await, None);
}
