//! Write actions end to end against the mock contract.


use action::{DispatchError, Outcome};
use alloy_primitives::U256;
use client::{ActionKind, WriteCall};
use session::StaticAccount;
use setup::{mock_contract, new_controller, tokens, ADMIN, ALICE, ALICE_HEX, BOB, BOB_HEX, OWNER};
use std::time::Duration;
use validation::{AmountReason, ValidationError};

#[tokio::test]
async fn test_owner_sets_tax() {
    let mock = mock_contract();
    let controller = new_controller(&mock);
    controller.connect(&StaticAccount(OWNER)).await.unwrap();
    controller.refresh().await;

    let record = controller.set_tax("5").await.unwrap();

    assert_eq!(record.kind, ActionKind::SetTax);
    assert_eq!(
        record.params,
        WriteCall::SetTax {
            value: U256::from(5)
        }
    );
    assert!(matches!(record.outcome, Outcome::Succeeded(_)));
    assert_eq!(controller.last(ActionKind::SetTax), Some(record));

    let snapshot = controller.refresh().await;
    assert_eq!(snapshot.tax(), Some(U256::from(5)));
}

#[tokio::test]
async fn test_revert_is_reported_as_outcome() {
    let mock = mock_contract();
    let controller = new_controller(&mock);
    controller.connect(&StaticAccount(BOB)).await.unwrap();
    mock.fail_submissions("execution reverted: Ownable: caller is not the owner");

    let record = controller.set_rate("2").await.unwrap();

    assert!(matches!(&record.outcome, Outcome::Failed(reason) if reason.contains("not the owner")));
    assert_eq!(
        record.params,
        WriteCall::SetRate {
            rate: tokens(2)
        }
    );
}

#[tokio::test]
async fn test_airdrop_filters_recipients() {
    let mock = mock_contract();
    let controller = new_controller(&mock);
    controller.connect(&StaticAccount(ADMIN)).await.unwrap();

    let recipients = format!("{ALICE_HEX}, 0xnot-an-address, {BOB_HEX}");
    let record = controller.airdrop(&recipients, "1.5").await.unwrap();

    assert_eq!(
        record.params,
        WriteCall::Airdrop {
            recipients: vec![ALICE, BOB],
            amount: U256::from(1_500_000_000_000_000_000u128),
        }
    );
    let state = mock.state();
    assert_eq!(state.token_balances[&BOB], U256::from(1_500_000_000_000_000_000u128));
}

#[tokio::test]
async fn test_airdrop_with_custom_separator() {
    let mock = mock_contract();
    let controller = new_controller(&mock).with_list_separator(";");

    let recipients = format!("{ALICE_HEX};{BOB_HEX}");
    let record = controller.airdrop(&recipients, "1").await.unwrap();
    assert!(record.outcome.is_success());
    assert!(matches!(
        record.params,
        WriteCall::Airdrop { ref recipients, .. } if recipients.len() == 2
    ));
}

#[tokio::test]
async fn test_rejected_input_never_submits() {
    let mock = mock_contract();
    let controller = new_controller(&mock);

    assert!(matches!(
        controller.airdrop("nobody, 0x12", "1").await,
        Err(DispatchError::InvalidParameters {
            kind: ActionKind::Airdrop,
            ..
        })
    ));
    assert!(matches!(
        controller.mint("1.5.0").await,
        Err(DispatchError::Validation(ValidationError::InvalidAmount {
            reason: AmountReason::Malformed,
            ..
        }))
    ));
    assert!(matches!(
        controller.set_tax("101").await,
        Err(DispatchError::Validation(ValidationError::InvalidAmount {
            reason: AmountReason::AboveMax { .. },
            ..
        }))
    ));
    assert!(matches!(
        controller.set_whitelist("0x0000000000000000000000000000000000000000", true).await,
        Err(DispatchError::InvalidParameters { .. })
    ));
    assert!(matches!(
        controller.approve("0x5aAeb6053f3E94C9b9A09f33669435E7Ef1BeAed", "1").await,
        Err(DispatchError::Validation(ValidationError::InvalidAddress { .. }))
    ));

    assert!(mock.submissions().is_empty());
}

#[tokio::test]
async fn test_concurrent_same_kind_is_busy() {
    let mock = mock_contract();
    let controller = new_controller(&mock);
    mock.hold_submissions();

    let second = async {
        tokio::task::yield_now().await;
        let result = controller.mint("2").await;
        mock.release_submissions();
        result
    };
    let (first, second) = tokio::join!(controller.mint("1"), second);

    assert!(first.unwrap().outcome.is_success());
    assert_eq!(second, Err(DispatchError::Busy(ActionKind::Mint)));
    assert_eq!(mock.submissions().len(), 1);
}

#[tokio::test]
async fn test_swaps_move_balances() {
    let mock = mock_contract();
    let controller = new_controller(&mock);
    mock.set_sender(ALICE);
    controller.connect(&StaticAccount(ALICE)).await.unwrap();

    // Default rate is 1:1
    let record = controller.get_token("0.5").await.unwrap();
    assert_eq!(
        record.params,
        WriteCall::GetToken {
            value: U256::from(500_000_000_000_000_000u128)
        }
    );

    let record = controller.get_eth("3").await.unwrap();
    assert!(record.outcome.is_success());

    let snapshot = controller.refresh().await;
    assert_eq!(
        snapshot.token_balance(ALICE),
        Some(tokens(10) + U256::from(500_000_000_000_000_000u128) - tokens(3))
    );
}

#[tokio::test]
async fn test_success_triggers_refresh() {
    let mock = mock_contract();
    let controller = new_controller(&mock);
    controller.connect(&StaticAccount(OWNER)).await.unwrap();
    let mut updates = controller.aggregator().subscribe();

    let scenario = async {
        updates
            .wait_for(|s| s.is_settled() && s.tax() == Some(U256::ZERO))
            .await
            .unwrap();

        controller.set_tax("7").await.unwrap();

        updates
            .wait_for(|s| s.tax() == Some(U256::from(7)))
            .await
            .unwrap();
    };

    tokio::select! {
        _ = controller.run(Duration::from_secs(3600)) => panic!("driver stopped"),
        result = tokio::time::timeout(Duration::from_secs(5), scenario) => result.unwrap(),
    }
}
