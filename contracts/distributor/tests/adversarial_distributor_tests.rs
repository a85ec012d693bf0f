/// Adversarial tests for the distributor contract
///
/// These tests simulate attempts to misuse the distributor:
/// - Outsiders triggering payouts or registering tokens
/// - Overdrawing the native balance with oversized or overflowing batches
/// - Smuggling transfers through unregistered or reserved token ids
/// - Partial execution of a batch with one bad invoice
/// - Registry exhaustion

use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env, MockApi};
use cosmwasm_std::{coins, from_json, Addr, Uint128};

use batch_distributor_contract::contract::{execute, instantiate, query};
use batch_distributor_contract::msg::{
    ExecuteMsg, InstantiateMsg, QueryMsg, TokenAddressResponse, TokenIdResponse,
};
use batch_distributor_contract::ContractError;
use batch_distributor_types::{NativeInvoice, TokenInvoice};

const DENOM: &str = "uatom";

struct TestAddrs {
    owner: Addr,
    attacker: Addr,
    victim: Addr,
    receiver: Addr,
    token: Addr,
    fake_token: Addr,
}

fn test_addrs(api: &MockApi) -> TestAddrs {
    TestAddrs {
        owner: api.addr_make("owner"),
        attacker: api.addr_make("attacker"),
        victim: api.addr_make("victim"),
        receiver: api.addr_make("receiver"),
        token: api.addr_make("token"),
        fake_token: api.addr_make("fake_token"),
    }
}

type TestDeps = cosmwasm_std::OwnedDeps<
    cosmwasm_std::MemoryStorage,
    cosmwasm_std::testing::MockApi,
    cosmwasm_std::testing::MockQuerier,
>;

fn setup_contract() -> (TestDeps, cosmwasm_std::Env, TestAddrs) {
    let mut deps = mock_dependencies();
    let env = mock_env();
    let addrs = test_addrs(&deps.api);

    let msg = InstantiateMsg {
        owner: addrs.owner.to_string(),
        native_denom: DENOM.to_string(),
    };
    let info = message_info(&addrs.owner, &[]);

    instantiate(deps.as_mut(), env.clone(), info, msg).unwrap();

    (deps, env, addrs)
}

fn fund_contract(deps: &mut TestDeps, env: &cosmwasm_std::Env, amount: u128) {
    deps.querier
        .bank
        .update_balance(env.contract.address.as_str(), coins(amount, DENOM));
}

fn register_token(deps: &mut TestDeps, env: &cosmwasm_std::Env, addrs: &TestAddrs) {
    execute(
        deps.as_mut(),
        env.clone(),
        message_info(&addrs.owner, &[]),
        ExecuteMsg::RegisterToken {
            address: addrs.token.to_string(),
        },
    )
    .unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════
// UNAUTHORIZED CALLER TESTS
// ═══════════════════════════════════════════════════════════════════════════

/// An outsider cannot drain the native balance
#[test]
fn test_attacker_cannot_distribute_native() {
    let (mut deps, env, addrs) = setup_contract();
    fund_contract(&mut deps, &env, 1_000_000);

    let result = execute(
        deps.as_mut(),
        env,
        message_info(&addrs.attacker, &[]),
        ExecuteMsg::DistributeNative {
            invoices: vec![NativeInvoice::new(addrs.attacker.as_str(), 1_000_000)],
        },
    );

    assert!(matches!(result, Err(ContractError::Unauthorized {})));
}

/// An outsider cannot spend allowances granted to the distributor
#[test]
fn test_attacker_cannot_pull_victim_tokens() {
    let (mut deps, env, addrs) = setup_contract();
    register_token(&mut deps, &env, &addrs);

    let result = execute(
        deps.as_mut(),
        env,
        message_info(&addrs.attacker, &[]),
        ExecuteMsg::DistributeTokens {
            invoices: vec![TokenInvoice {
                token: 1,
                sender: addrs.victim.to_string(),
                receiver: addrs.attacker.to_string(),
                amount: Uint128::new(1_000_000),
            }],
        },
    );

    assert!(matches!(result, Err(ContractError::Unauthorized {})));
}

/// An outsider cannot insert a token into the registry
#[test]
fn test_attacker_cannot_register_token() {
    let (mut deps, env, addrs) = setup_contract();

    let result = execute(
        deps.as_mut(),
        env.clone(),
        message_info(&addrs.attacker, &[]),
        ExecuteMsg::RegisterToken {
            address: addrs.fake_token.to_string(),
        },
    );
    assert!(matches!(result, Err(ContractError::Unauthorized {})));

    let res: TokenIdResponse = from_json(
        query(
            deps.as_ref(),
            env,
            QueryMsg::TokenId {
                address: addrs.fake_token.to_string(),
            },
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(res.id, 0);
}

/// Depositing funds does not grant any distribution rights
#[test]
fn test_deposit_does_not_grant_ownership() {
    let (mut deps, env, addrs) = setup_contract();

    execute(
        deps.as_mut(),
        env.clone(),
        message_info(&addrs.attacker, &coins(10, DENOM)),
        ExecuteMsg::Deposit {},
    )
    .unwrap();
    fund_contract(&mut deps, &env, 10);

    let result = execute(
        deps.as_mut(),
        env,
        message_info(&addrs.attacker, &[]),
        ExecuteMsg::DistributeNative {
            invoices: vec![NativeInvoice::new(addrs.attacker.as_str(), 10)],
        },
    );
    assert!(matches!(result, Err(ContractError::Unauthorized {})));
}

// ═══════════════════════════════════════════════════════════════════════════
// BALANCE OVERDRAW TESTS
// ═══════════════════════════════════════════════════════════════════════════

/// A batch whose sum overflows is rejected instead of wrapping to a small total
#[test]
fn test_overflowing_batch_is_rejected() {
    let (mut deps, env, addrs) = setup_contract();
    fund_contract(&mut deps, &env, 100);

    let result = execute(
        deps.as_mut(),
        env,
        message_info(&addrs.owner, &[]),
        ExecuteMsg::DistributeNative {
            invoices: vec![
                NativeInvoice {
                    receiver: addrs.receiver.to_string(),
                    amount: Uint128::MAX,
                },
                NativeInvoice::new(addrs.receiver.as_str(), 2),
            ],
        },
    );

    assert!(matches!(result, Err(ContractError::Overflow(_))));
}

/// One unit over the held balance fails the whole batch
#[test]
fn test_one_over_balance_fails_whole_batch() {
    let (mut deps, env, addrs) = setup_contract();
    fund_contract(&mut deps, &env, 100);

    let invoices = (0..10)
        .map(|i| NativeInvoice::new(addrs.receiver.as_str(), if i == 9 { 11 } else { 10 }))
        .collect();

    let result = execute(
        deps.as_mut(),
        env,
        message_info(&addrs.owner, &[]),
        ExecuteMsg::DistributeNative { invoices },
    );

    assert!(matches!(
        result,
        Err(ContractError::InsufficientFunds { .. })
    ));
}

/// Balance in another denom does not cover a native batch
#[test]
fn test_foreign_denom_balance_does_not_count() {
    let (mut deps, env, addrs) = setup_contract();
    deps.querier
        .bank
        .update_balance(env.contract.address.as_str(), coins(1_000, "ufake"));

    let result = execute(
        deps.as_mut(),
        env,
        message_info(&addrs.owner, &[]),
        ExecuteMsg::DistributeNative {
            invoices: vec![NativeInvoice::new(addrs.receiver.as_str(), 1)],
        },
    );

    assert!(matches!(
        result,
        Err(ContractError::InsufficientFunds { .. })
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// REGISTRY ABUSE TESTS
// ═══════════════════════════════════════════════════════════════════════════

/// The reserved id 0 never resolves to a token
#[test]
fn test_reserved_token_id_cannot_be_used() {
    let (mut deps, env, addrs) = setup_contract();
    register_token(&mut deps, &env, &addrs);

    let result = execute(
        deps.as_mut(),
        env.clone(),
        message_info(&addrs.owner, &[]),
        ExecuteMsg::DistributeTokens {
            invoices: vec![TokenInvoice {
                token: 0,
                sender: addrs.victim.to_string(),
                receiver: addrs.receiver.to_string(),
                amount: Uint128::new(1),
            }],
        },
    );
    assert!(matches!(
        result,
        Err(ContractError::TokenNotRegistered { id: 0 })
    ));

    assert!(query(deps.as_ref(), env, QueryMsg::TokenAddress { id: 0 }).is_err());
}

/// An unregistered id later in the batch rejects the whole batch
#[test]
fn test_unregistered_token_mid_batch_rejects_all() {
    let (mut deps, env, addrs) = setup_contract();
    register_token(&mut deps, &env, &addrs);

    let valid = TokenInvoice {
        token: 1,
        sender: addrs.victim.to_string(),
        receiver: addrs.receiver.to_string(),
        amount: Uint128::new(5),
    };
    let unknown = TokenInvoice {
        token: 42,
        ..valid.clone()
    };

    let result = execute(
        deps.as_mut(),
        env,
        message_info(&addrs.owner, &[]),
        ExecuteMsg::DistributeTokens {
            invoices: vec![valid.clone(), valid, unknown],
        },
    );

    assert!(matches!(
        result,
        Err(ContractError::TokenNotRegistered { id: 42 })
    ));
}

/// A malformed receiver anywhere in the batch rejects the whole batch
#[test]
fn test_malformed_receiver_rejects_all() {
    let (mut deps, env, addrs) = setup_contract();
    fund_contract(&mut deps, &env, 100);

    let result = execute(
        deps.as_mut(),
        env,
        message_info(&addrs.owner, &[]),
        ExecuteMsg::DistributeNative {
            invoices: vec![
                NativeInvoice::new(addrs.receiver.as_str(), 10),
                NativeInvoice::new("not a bech32 address", 10),
            ],
        },
    );

    assert!(matches!(
        result,
        Err(ContractError::InvalidInvoice { index: 1, .. })
    ));
}

/// Re-registering an address does not hijack its existing id
#[test]
fn test_reregistration_keeps_original_mapping() {
    let (mut deps, env, addrs) = setup_contract();
    register_token(&mut deps, &env, &addrs);
    register_token(&mut deps, &env, &addrs);

    let by_id: TokenAddressResponse = from_json(
        query(deps.as_ref(), env.clone(), QueryMsg::TokenAddress { id: 1 }).unwrap(),
    )
    .unwrap();
    assert_eq!(by_id.address, Some(addrs.token.to_string()));

    let by_addr: TokenIdResponse = from_json(
        query(
            deps.as_ref(),
            env,
            QueryMsg::TokenId {
                address: addrs.token.to_string(),
            },
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(by_addr.id, 1);
}
