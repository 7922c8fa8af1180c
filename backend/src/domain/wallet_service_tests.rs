//! Tests for the wallet ledger service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{
    ChargeSession, ChargeVerification, GatewayChargeStatus, MockBookingRepository,
    MockIdentityStore, MockNotificationDispatcher, MockPaymentGateway, MockWalletRepository,
    PaymentGatewayError, TransferReceipt, WalletRepositoryError, WebhookEvent,
};
use crate::domain::service_test_support::{customer, fixture_clock, fixture_now, stored, user_with};
use crate::domain::{
    BarberId, Booking, BookingDraft, CustomerProfile, ErrorCode, Profile, RuleViolation,
    ServiceLine, ShopId,
};

type Service = WalletService<
    MockWalletRepository,
    MockBookingRepository,
    MockIdentityStore,
    MockPaymentGateway,
    MockNotificationDispatcher,
>;

struct Harness {
    wallets: MockWalletRepository,
    bookings: MockBookingRepository,
    identity: MockIdentityStore,
    gateway: MockPaymentGateway,
    notifier: MockNotificationDispatcher,
    customer: CustomerProfile,
}

impl Harness {
    fn new() -> Self {
        let customer = customer(UserId::random());
        let user = user_with(Profile::Customer(customer.clone()));
        let profile = customer.clone();
        let mut identity = MockIdentityStore::new();
        identity
            .expect_get_user()
            .returning(move |_| Ok(Some(user.clone())));
        identity
            .expect_get_customer_profile()
            .returning(move |_| Ok(Some(profile.clone())));
        Self {
            wallets: MockWalletRepository::new(),
            bookings: MockBookingRepository::new(),
            identity,
            gateway: MockPaymentGateway::new(),
            notifier: MockNotificationDispatcher::new(),
            customer,
        }
    }

    fn actor(&self) -> UserId {
        self.customer.user_id
    }

    fn build(self) -> Service {
        WalletService::new(
            Arc::new(self.wallets),
            Arc::new(self.bookings),
            Arc::new(self.identity),
            Arc::new(self.gateway),
            Arc::new(self.notifier),
            fixture_clock(),
        )
        .with_callback_url(Some("https://barberzon.test/wallet/callback".to_owned()))
    }
}

fn money(amount: i64) -> Money {
    Money::new(amount).expect("valid amount")
}

fn deposit(user_id: UserId, amount: i64) -> Transaction {
    Transaction::pending(
        user_id,
        TransactionType::Deposit,
        money(amount),
        DEPOSIT_DESCRIPTION,
        fixture_now(),
    )
}

fn settled(mut transaction: Transaction, status: TransactionStatus) -> Transaction {
    transaction.settle(status, fixture_now());
    transaction
}

#[tokio::test]
async fn fund_records_pending_deposit_and_converts_to_minor_units() {
    let mut harness = Harness::new();
    let actor = harness.actor();
    harness
        .wallets
        .expect_get_or_create()
        .times(1)
        .returning(move |user, at| Ok(Wallet::empty(*user, at)));
    harness
        .wallets
        .expect_record_pending()
        .withf(|tx| tx.status == TransactionStatus::Pending && tx.amount.amount() == 5000)
        .times(1)
        .return_once(|_| Ok(()));
    harness
        .gateway
        .expect_initialize()
        .withf(|request| {
            request.amount == MinorUnits::new(500_000)
                && request.callback_url.as_deref() == Some("https://barberzon.test/wallet/callback")
        })
        .times(1)
        .returning(|request| {
            Ok(ChargeSession {
                authorization_url: "https://checkout.test/abc".to_owned(),
                access_code: "abc".to_owned(),
                reference: request.reference.clone(),
            })
        });
    harness.wallets.expect_reconcile().never();

    let session = harness
        .build()
        .fund(&actor, money(5000))
        .await
        .expect("funding starts");

    assert_eq!(session.transaction.status, TransactionStatus::Pending);
    assert_eq!(session.checkout.reference, session.transaction.reference);
}

#[tokio::test]
async fn fund_rejects_zero_amount_before_touching_storage() {
    let mut harness = Harness::new();
    let actor = harness.actor();
    harness.wallets.expect_record_pending().never();

    let error = harness
        .build()
        .fund(&actor, Money::ZERO)
        .await
        .expect_err("zero deposit");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.reason(), Some("invalid_amount"));
}

#[tokio::test]
async fn gateway_failure_fails_the_pending_deposit() {
    let mut harness = Harness::new();
    let actor = harness.actor();
    harness
        .wallets
        .expect_get_or_create()
        .returning(move |user, at| Ok(Wallet::empty(*user, at)));
    harness
        .wallets
        .expect_record_pending()
        .return_once(|_| Ok(()));
    harness
        .gateway
        .expect_initialize()
        .return_once(|_| Err(PaymentGatewayError::timeout("15s elapsed")));
    harness
        .wallets
        .expect_reconcile()
        .withf(|_, outcome, _| *outcome == ExternalStatus::Failed)
        .times(1)
        .returning(move |reference, _, _| {
            let mut tx = deposit(actor, 5000);
            tx.reference = reference.clone();
            Ok(Reconciliation {
                transaction: settled(tx, TransactionStatus::Failed),
                applied: true,
            })
        });

    let error = harness
        .build()
        .fund(&actor, money(5000))
        .await
        .expect_err("gateway down");

    assert_eq!(error.code(), ErrorCode::ExternalServiceError);
    assert_eq!(error.reason(), Some("gateway_timeout"));
}

#[tokio::test]
async fn insufficient_balance_is_reported_from_the_atomic_payment() {
    let mut harness = Harness::new();
    let actor = harness.actor();
    let customer_id = harness.customer.id;
    let booking = Booking::schedule(
        BookingDraft {
            customer_id,
            barber_id: BarberId::random(),
            shop_id: ShopId::random(),
            services: vec![ServiceLine {
                name: "Haircut".to_owned(),
                price: money(4500),
                duration_minutes: None,
            }],
            start_time: fixture_now() + chrono::TimeDelta::hours(3),
            notes: None,
        },
        fixture_now(),
    )
    .expect("valid booking");
    let booking_id = booking.id;
    harness
        .bookings
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(booking)));
    harness.wallets.expect_pay_for_booking().times(1).return_once(|_, _, _| {
        Err(WalletRepositoryError::rejected(
            RuleViolation::InsufficientBalance {
                balance: Money::new(1000).expect("valid"),
                required: Money::new(4500).expect("valid"),
            },
        ))
    });
    harness.notifier.expect_notify().never();

    let error = harness
        .build()
        .pay_for_booking(&actor, &booking_id)
        .await
        .expect_err("balance too low");

    assert_eq!(error.code(), ErrorCode::InsufficientBalance);
    let details = error.details().expect("details");
    assert_eq!(details["balance"], 1000);
    assert_eq!(details["required"], 4500);
}

#[tokio::test]
async fn applied_deposit_reconciliation_notifies_the_payer() {
    let mut harness = Harness::new();
    let actor = harness.actor();
    let tx = deposit(actor, 5000);
    let reference = tx.reference.clone();
    harness.wallets.expect_reconcile().times(1).return_once(move |_, _, _| {
        Ok(Reconciliation {
            transaction: settled(tx, TransactionStatus::Successful),
            applied: true,
        })
    });
    harness
        .notifier
        .expect_notify()
        .withf(move |note| note.recipient == actor)
        .times(1)
        .returning(stored);

    let result = harness
        .build()
        .reconcile(&reference, ExternalStatus::Success)
        .await
        .expect("reconciled");

    assert!(result.applied);
}

#[tokio::test]
async fn repeated_reconciliation_stays_quiet() {
    let mut harness = Harness::new();
    let tx = settled(deposit(harness.actor(), 5000), TransactionStatus::Successful);
    let reference = tx.reference.clone();
    harness.wallets.expect_reconcile().return_once(move |_, _, _| {
        Ok(Reconciliation {
            transaction: tx,
            applied: false,
        })
    });
    harness.notifier.expect_notify().never();

    let result = harness
        .build()
        .reconcile(&reference, ExternalStatus::Success)
        .await
        .expect("reconciled");

    assert!(!result.applied);
}

#[tokio::test]
async fn webhook_with_bad_signature_fails_closed() {
    let mut harness = Harness::new();
    harness
        .gateway
        .expect_verify_webhook_signature()
        .return_const(false);
    harness.gateway.expect_decode_webhook_event().never();
    harness.wallets.expect_reconcile().never();

    let error = harness
        .build()
        .handle_webhook("forged", b"{}")
        .await
        .expect_err("forged webhook");

    assert_eq!(error.code(), ErrorCode::ExternalServiceError);
    assert_eq!(error.reason(), Some("invalid_signature"));
}

#[tokio::test]
async fn unknown_webhook_events_are_ignored() {
    let mut harness = Harness::new();
    harness
        .gateway
        .expect_verify_webhook_signature()
        .return_const(true);
    harness.gateway.expect_decode_webhook_event().return_once(|_| {
        Ok(WebhookEvent {
            kind: WebhookEventKind::Other("subscription.create".to_owned()),
            reference: None,
            amount: None,
        })
    });
    harness.wallets.expect_reconcile().never();

    let outcome = harness
        .build()
        .handle_webhook("sig", b"{}")
        .await
        .expect("ignored");

    assert_eq!(
        outcome,
        WebhookOutcome::Ignored {
            event: "subscription.create".to_owned()
        }
    );
}

#[rstest]
#[case::matching(500_000, ExternalStatus::Success)]
#[case::short_paid(100_000, ExternalStatus::Failed)]
#[tokio::test]
async fn charge_success_checks_the_settled_amount(
    #[case] reported_minor: i64,
    #[case] expected: ExternalStatus,
) {
    let mut harness = Harness::new();
    let tx = deposit(harness.actor(), 5000);
    let reference = tx.reference.clone();
    let event_reference = reference.clone();
    let stored_tx = tx.clone();
    harness
        .gateway
        .expect_verify_webhook_signature()
        .return_const(true);
    harness.gateway.expect_decode_webhook_event().return_once(move |_| {
        Ok(WebhookEvent {
            kind: WebhookEventKind::ChargeSuccess,
            reference: Some(event_reference),
            amount: Some(MinorUnits::new(reported_minor)),
        })
    });
    harness
        .wallets
        .expect_find_by_reference()
        .return_once(move |_| Ok(Some(stored_tx)));
    harness
        .wallets
        .expect_reconcile()
        .withf(move |_, outcome, _| *outcome == expected)
        .times(1)
        .return_once(move |_, outcome, _| {
            let status = match outcome {
                ExternalStatus::Success => TransactionStatus::Successful,
                ExternalStatus::Failed => TransactionStatus::Failed,
            };
            Ok(Reconciliation {
                transaction: settled(tx, status),
                applied: true,
            })
        });
    harness.notifier.expect_notify().returning(stored);

    let outcome = harness
        .build()
        .handle_webhook("sig", b"{}")
        .await
        .expect("reconciled");

    let WebhookOutcome::Reconciled(reconciliation) = outcome else {
        panic!("expected a reconciliation");
    };
    assert_eq!(reconciliation.transaction.reference, reference);
}

#[tokio::test]
async fn verifying_a_still_pending_charge_changes_nothing() {
    let mut harness = Harness::new();
    let actor = harness.actor();
    let tx = deposit(actor, 5000);
    let reference = tx.reference.clone();
    let returned = tx.clone();
    harness
        .wallets
        .expect_find_by_reference()
        .return_once(move |_| Ok(Some(returned)));
    harness.gateway.expect_verify().return_once(|reference| {
        Ok(ChargeVerification {
            reference: reference.clone(),
            status: GatewayChargeStatus::Pending,
            amount: MinorUnits::new(500_000),
        })
    });
    harness.wallets.expect_reconcile().never();

    let result = harness
        .build()
        .verify_payment(&actor, &reference)
        .await
        .expect("verified");

    assert_eq!(result, tx);
}

#[tokio::test]
async fn only_the_payer_may_verify() {
    let mut harness = Harness::new();
    let tx = deposit(UserId::random(), 5000);
    let reference = tx.reference.clone();
    harness
        .wallets
        .expect_find_by_reference()
        .return_once(move |_| Ok(Some(tx)));
    harness.gateway.expect_verify().never();
    let actor = harness.actor();

    let error = harness
        .build()
        .verify_payment(&actor, &reference)
        .await
        .expect_err("stranger");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn failed_transfer_returns_the_reserved_funds() {
    let mut harness = Harness::new();
    let actor = harness.actor();
    harness
        .wallets
        .expect_begin_withdrawal()
        .times(1)
        .returning(|tx| Ok(Wallet::empty(tx.user_id, tx.created_at)));
    harness
        .gateway
        .expect_initiate_transfer()
        .return_once(|_| Err(PaymentGatewayError::declined("recipient inactive")));
    harness
        .wallets
        .expect_reconcile()
        .withf(|_, outcome, _| *outcome == ExternalStatus::Failed)
        .times(1)
        .returning(move |reference, _, _| {
            let mut tx = Transaction::pending(
                actor,
                TransactionType::Withdrawal,
                money(2000),
                WITHDRAWAL_DESCRIPTION,
                fixture_now(),
            );
            tx.reference = reference.clone();
            Ok(Reconciliation {
                transaction: settled(tx, TransactionStatus::Failed),
                applied: true,
            })
        });

    let error = harness
        .build()
        .withdraw(&actor, money(2000), "RCP_123".to_owned())
        .await
        .expect_err("transfer declined");

    assert_eq!(error.reason(), Some("gateway_declined"));
}

#[tokio::test]
async fn successful_withdrawal_stays_pending_until_the_transfer_settles() {
    let mut harness = Harness::new();
    let actor = harness.actor();
    harness
        .wallets
        .expect_begin_withdrawal()
        .returning(|tx| Ok(Wallet::empty(tx.user_id, tx.created_at)));
    harness.gateway.expect_initiate_transfer().return_once(|_| {
        Ok(TransferReceipt {
            transfer_code: "TRF_1".to_owned(),
            status: "pending".to_owned(),
        })
    });
    harness.wallets.expect_reconcile().never();

    let outcome = harness
        .build()
        .withdraw(&actor, money(2000), "RCP_123".to_owned())
        .await
        .expect("transfer started");

    assert_eq!(outcome.transaction.kind, TransactionType::Withdrawal);
    assert_eq!(outcome.transaction.status, TransactionStatus::Pending);
}

#[tokio::test]
async fn blank_recipient_is_rejected() {
    let mut harness = Harness::new();
    let actor = harness.actor();
    harness.wallets.expect_begin_withdrawal().never();

    let error = harness
        .build()
        .withdraw(&actor, money(2000), "   ".to_owned())
        .await
        .expect_err("blank recipient");

    assert_eq!(error.reason(), Some("invalid_recipient"));
}
