use batch_distributor_types::{
    checked_total, Cw20ExecuteMsg, NativeInvoice, TokenInvoice, UNREGISTERED_TOKEN_ID,
};
use cosmwasm_std::{
    coins, entry_point, to_json_binary, Addr, BankMsg, Binary, CosmosMsg, Deps, DepsMut, Env,
    Event, MessageInfo, Order, Response, StdError, StdResult, Uint128, WasmMsg,
};
use cw_storage_plus::Bound;

use crate::error::ContractError;
use crate::msg::{
    ConfigResponse, ExecuteMsg, InstantiateMsg, QueryMsg, TokenAddressResponse, TokenEntry,
    TokenIdResponse, TokensResponse,
};
use crate::state::{Config, CONFIG, TOKENS, TOKEN_COUNT, TOKEN_IDS};

const DEFAULT_LIMIT: u32 = 30;
const MAX_LIMIT: u32 = 100;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    if msg.native_denom.is_empty() {
        return Err(StdError::generic_err("native_denom must not be empty").into());
    }

    let config = Config {
        owner: deps.api.addr_validate(&msg.owner)?,
        native_denom: msg.native_denom,
    };
    CONFIG.save(deps.storage, &config)?;
    TOKEN_COUNT.save(deps.storage, &0)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("owner", config.owner))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::RegisterToken { address } => execute_register_token(deps, info, address),
        ExecuteMsg::DistributeNative { invoices } => {
            execute_distribute_native(deps, env, info, invoices)
        }
        ExecuteMsg::DistributeTokens { invoices } => {
            execute_distribute_tokens(deps, info, invoices)
        }
        ExecuteMsg::Deposit {} => execute_deposit(deps, info),
    }
}

fn ensure_owner(deps: Deps, sender: &Addr) -> Result<Config, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if *sender != config.owner {
        return Err(ContractError::Unauthorized {});
    }
    Ok(config)
}

fn execute_register_token(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    ensure_owner(deps.as_ref(), &info.sender)?;

    let token = deps.api.addr_validate(&address)?;

    let id = TOKEN_COUNT
        .load(deps.storage)?
        .checked_add(1)
        .ok_or(ContractError::RegistryFull {})?;

    // Unreachable while the counter is the only writer of TOKENS
    if TOKENS.has(deps.storage, id) {
        return Err(ContractError::TokenIdTaken { id });
    }

    TOKENS.save(deps.storage, id, &token)?;
    TOKEN_COUNT.save(deps.storage, &id)?;

    // Keep the first id for an address so lookups match an ascending scan
    if !TOKEN_IDS.has(deps.storage, &token) {
        TOKEN_IDS.save(deps.storage, &token, &id)?;
    }

    let event = Event::new("token_registered")
        .add_attribute("token_id", id.to_string())
        .add_attribute("address", token.as_str());

    Ok(Response::new()
        .add_event(event)
        .add_attribute("action", "register_token")
        .add_attribute("token_id", id.to_string())
        .add_attribute("address", token))
}

fn execute_distribute_native(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    invoices: Vec<NativeInvoice>,
) -> Result<Response, ContractError> {
    let config = ensure_owner(deps.as_ref(), &info.sender)?;

    let total = checked_total(invoices.iter().map(|invoice| invoice.amount))?;

    // Attached funds are already part of the contract balance here
    let held = deps
        .querier
        .query_balance(env.contract.address.as_str(), config.native_denom.as_str())?
        .amount;

    if total > held {
        return Err(ContractError::InsufficientFunds {
            required: total.to_string(),
            available: held.to_string(),
        });
    }

    let mut messages: Vec<CosmosMsg> = Vec::with_capacity(invoices.len());
    for (index, invoice) in invoices.iter().enumerate() {
        ensure_nonzero(index, invoice.amount)?;
        let receiver = validate_invoice_addr(deps.as_ref(), index, &invoice.receiver)?;

        messages.push(
            BankMsg::Send {
                to_address: receiver.to_string(),
                amount: coins(invoice.amount.u128(), config.native_denom.as_str()),
            }
            .into(),
        );
    }

    Ok(Response::new()
        .add_messages(messages)
        .add_attribute("action", "distribute_native")
        .add_attribute("invoice_count", invoices.len().to_string())
        .add_attribute("total", total)
        .add_attribute("denom", config.native_denom))
}

fn execute_distribute_tokens(
    deps: DepsMut,
    info: MessageInfo,
    invoices: Vec<TokenInvoice>,
) -> Result<Response, ContractError> {
    ensure_owner(deps.as_ref(), &info.sender)?;

    let mut messages: Vec<CosmosMsg> = Vec::with_capacity(invoices.len());
    for (index, invoice) in invoices.iter().enumerate() {
        ensure_nonzero(index, invoice.amount)?;

        let token = if invoice.token == UNREGISTERED_TOKEN_ID {
            None
        } else {
            TOKENS.may_load(deps.storage, invoice.token)?
        }
        .ok_or(ContractError::TokenNotRegistered { id: invoice.token })?;

        let sender = validate_invoice_addr(deps.as_ref(), index, &invoice.sender)?;
        let receiver = validate_invoice_addr(deps.as_ref(), index, &invoice.receiver)?;

        let transfer = Cw20ExecuteMsg::TransferFrom {
            owner: sender.to_string(),
            recipient: receiver.to_string(),
            amount: invoice.amount,
        };

        messages.push(
            WasmMsg::Execute {
                contract_addr: token.to_string(),
                msg: to_json_binary(&transfer)?,
                funds: vec![],
            }
            .into(),
        );
    }

    Ok(Response::new()
        .add_messages(messages)
        .add_attribute("action", "distribute_tokens")
        .add_attribute("invoice_count", invoices.len().to_string()))
}

fn execute_deposit(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    let amount: Uint128 = info
        .funds
        .iter()
        .filter(|c| c.denom == config.native_denom)
        .map(|c| c.amount)
        .sum();

    Ok(Response::new()
        .add_attribute("action", "deposit")
        .add_attribute("sender", info.sender)
        .add_attribute("amount", amount)
        .add_attribute("denom", config.native_denom))
}

fn ensure_nonzero(index: usize, amount: Uint128) -> Result<(), ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidInvoice {
            index,
            reason: "amount must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn validate_invoice_addr(deps: Deps, index: usize, addr: &str) -> Result<Addr, ContractError> {
    deps.api
        .addr_validate(addr)
        .map_err(|e| ContractError::InvalidInvoice {
            index,
            reason: format!("invalid address {addr}: {e}"),
        })
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::TokenAddress { id } => to_json_binary(&query_token_address(deps, id)?),
        QueryMsg::TokenId { address } => to_json_binary(&query_token_id(deps, address)?),
        QueryMsg::Tokens { start_after, limit } => {
            to_json_binary(&query_tokens(deps, start_after, limit)?)
        }
    }
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        owner: config.owner.to_string(),
        native_denom: config.native_denom,
        token_count: TOKEN_COUNT.load(deps.storage)?,
    })
}

fn query_token_address(deps: Deps, id: u16) -> StdResult<TokenAddressResponse> {
    if id == UNREGISTERED_TOKEN_ID {
        return Err(StdError::generic_err(
            "invalid argument: token id 0 is reserved",
        ));
    }

    let address = TOKENS.may_load(deps.storage, id)?.map(|addr| addr.to_string());
    Ok(TokenAddressResponse { id, address })
}

fn query_token_id(deps: Deps, address: String) -> StdResult<TokenIdResponse> {
    // An address that does not validate can never have been registered
    let id = match deps.api.addr_validate(&address) {
        Ok(addr) => TOKEN_IDS
            .may_load(deps.storage, &addr)?
            .unwrap_or(UNREGISTERED_TOKEN_ID),
        Err(_) => UNREGISTERED_TOKEN_ID,
    };
    Ok(TokenIdResponse { id })
}

fn query_tokens(
    deps: Deps,
    start_after: Option<u16>,
    limit: Option<u32>,
) -> StdResult<TokensResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let tokens = TOKENS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| {
            item.map(|(id, address)| TokenEntry {
                id,
                address: address.to_string(),
            })
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(TokensResponse { tokens })
}
