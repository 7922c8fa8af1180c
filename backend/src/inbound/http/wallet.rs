//! Wallet HTTP handlers.
//!
//! ```text
//! GET  /api/v1/wallet
//! GET  /api/v1/wallet/transactions
//! POST /api/v1/wallet/fund
//! POST /api/v1/wallet/withdraw
//! POST /api/v1/wallet/verify/{reference}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{FundingSession, WithdrawalOutcome};
use crate::domain::{Error, PaymentReference, Transaction, Wallet};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_amount};

const AMOUNT: FieldName = FieldName::new("amount");

/// Request payload for topping up a wallet.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FundBody {
    /// Whole currency units; must be positive.
    pub amount: i64,
}

/// Request payload for withdrawing to a bank account.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WithdrawBody {
    pub amount: i64,
    /// Gateway transfer recipient for the customer's bank account.
    pub recipient_code: String,
}

fn parse_reference(raw: String) -> Result<PaymentReference, Error> {
    PaymentReference::new(raw.clone()).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "reference",
            "value": raw,
            "code": "invalid_reference",
        }))
    })
}

/// Fetch the acting customer's wallet, creating it empty on first access.
#[utoipa::path(
    get,
    path = "/api/v1/wallet",
    responses(
        (status = 200, description = "Wallet", body = Wallet),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Only customers hold wallets", body = Error)
    ),
    tags = ["wallet"],
    operation_id = "getWallet"
)]
#[get("/wallet")]
pub async fn get_wallet(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Wallet>> {
    let actor = session.require_user_id()?;
    Ok(web::Json(state.wallet.get_wallet(&actor).await?))
}

/// List ledger entries, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/wallet/transactions",
    responses(
        (status = 200, description = "Transactions", body = [Transaction]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["wallet"],
    operation_id = "listTransactions"
)]
#[get("/wallet/transactions")]
pub async fn list_transactions(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Transaction>>> {
    let actor = session.require_user_id()?;
    Ok(web::Json(state.wallet.list_transactions(&actor).await?))
}

/// Start a gateway checkout that credits the wallet once settled.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/fund",
    request_body = FundBody,
    responses(
        (status = 201, description = "Pending deposit and checkout link", body = FundingSession),
        (status = 400, description = "Invalid amount", body = Error),
        (status = 502, description = "Payment gateway failure", body = Error)
    ),
    tags = ["wallet"],
    operation_id = "fundWallet"
)]
#[post("/wallet/fund")]
pub async fn fund_wallet(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<FundBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let amount = parse_amount(payload.amount, AMOUNT)?;
    let session = state.wallet.fund(&actor, amount).await?;
    Ok(HttpResponse::Created().json(session))
}

/// Debit the wallet and start a bank transfer.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/withdraw",
    request_body = WithdrawBody,
    responses(
        (status = 202, description = "Withdrawal pending", body = WithdrawalOutcome),
        (status = 400, description = "Invalid amount", body = Error),
        (status = 402, description = "Insufficient balance", body = Error),
        (status = 502, description = "Payment gateway failure", body = Error)
    ),
    tags = ["wallet"],
    operation_id = "withdraw"
)]
#[post("/wallet/withdraw")]
pub async fn withdraw(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<WithdrawBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let WithdrawBody {
        amount,
        recipient_code,
    } = payload.into_inner();
    let amount = parse_amount(amount, AMOUNT)?;
    let outcome = state.wallet.withdraw(&actor, amount, recipient_code).await?;
    Ok(HttpResponse::Accepted().json(outcome))
}

/// Ask the gateway for a reference's outcome and reconcile it.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/verify/{reference}",
    params(("reference" = String, Path, description = "Transaction reference")),
    responses(
        (status = 200, description = "Transaction after reconciliation", body = Transaction),
        (status = 403, description = "Reference belongs to another user", body = Error),
        (status = 404, description = "Unknown reference", body = Error),
        (status = 502, description = "Payment gateway failure", body = Error)
    ),
    tags = ["wallet"],
    operation_id = "verifyPayment"
)]
#[post("/wallet/verify/{reference}")]
pub async fn verify_payment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Transaction>> {
    let actor = session.require_user_id()?;
    let reference = parse_reference(path.into_inner())?;
    let transaction = state.wallet.verify_payment(&actor, &reference).await?;
    Ok(web::Json(transaction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;

    use crate::domain::ports::ChargeSession;
    use crate::domain::{Money, TransactionStatus, TransactionType, UserId};
    use crate::inbound::http::test_utils::{
        MockPorts, fixture_time, login_cookie, test_routes, test_session_middleware,
    };

    macro_rules! app {
        ($ports:expr) => {
            test::init_service(
                App::new()
                    .wrap(test_session_middleware())
                    .app_data(web::Data::new($ports.into_state()))
                    .configure(test_routes),
            )
            .await
        };
    }

    fn deposit(user_id: UserId, amount: i64) -> Transaction {
        Transaction::pending(
            user_id,
            TransactionType::Deposit,
            Money::new(amount).expect("amount"),
            "Wallet funding",
            fixture_time(),
        )
    }

    #[actix_web::test]
    async fn funding_returns_the_checkout_link() {
        let customer = UserId::random();
        let transaction = deposit(customer, 5000);
        let reference = transaction.reference.clone();
        let mut ports = MockPorts::default();
        ports
            .wallet
            .expect_fund()
            .withf(move |actor, amount| *actor == customer && amount.amount() == 5000)
            .times(1)
            .return_once(move |_, _| {
                Ok(FundingSession {
                    checkout: ChargeSession {
                        authorization_url: "https://checkout.example/abc".to_owned(),
                        access_code: "abc".to_owned(),
                        reference: transaction.reference.clone(),
                    },
                    transaction,
                })
            });
        let app = app!(ports);
        let cookie = login_cookie(&app, &customer).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/wallet/fund")
                .cookie(cookie)
                .set_json(json!({"amount": 5000}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["checkout"]["authorizationUrl"], "https://checkout.example/abc");
        assert_eq!(body["transaction"]["reference"], reference.as_str());
        assert_eq!(body["transaction"]["status"], "pending");
    }

    #[actix_web::test]
    async fn negative_amounts_never_reach_the_ledger() {
        let app = app!(MockPorts::default());
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/wallet/withdraw")
                .cookie(cookie)
                .set_json(json!({"amount": -10, "recipientCode": "RCP_1"}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], "invalid_amount");
    }

    #[actix_web::test]
    async fn verify_returns_the_reconciled_transaction() {
        let customer = UserId::random();
        let mut transaction = deposit(customer, 2500);
        transaction.settle(TransactionStatus::Successful, fixture_time());
        let reference = transaction.reference.clone();
        let expected = reference.clone();
        let mut ports = MockPorts::default();
        ports
            .wallet
            .expect_verify_payment()
            .withf(move |_, candidate| *candidate == expected)
            .return_once(move |_, _| Ok(transaction));
        let app = app!(ports);
        let cookie = login_cookie(&app, &customer).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/wallet/verify/{reference}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "successful");
        assert_eq!(body["type"], "deposit");
    }

    #[actix_web::test]
    async fn wallet_reads_use_the_session_user() {
        let customer = UserId::random();
        let mut ports = MockPorts::default();
        ports
            .wallet
            .expect_get_wallet()
            .withf(move |actor| *actor == customer)
            .return_once(move |actor| Ok(Wallet::empty(*actor, fixture_time())));
        ports
            .wallet
            .expect_list_transactions()
            .return_once(|_| Ok(Vec::new()));
        let app = app!(ports);
        let cookie = login_cookie(&app, &customer).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/wallet")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["balance"], 0);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/wallet/transactions")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!([]));
    }
}
