//! Per-action call compilation.
//!
//! Each [`Action`] variant maps to one arm of [`compile_action`], a pure
//! function `(builder, action, context) -> result` that only appends to the
//! shared builder. The match is exhaustive, so adding an action kind without
//! a compilation rule refuses to compile this crate. A failing arm appends
//! nothing: every required field is validated before the first command goes
//! in.
//!
//! Call sequences target the lending market contract interface:
//! `create_obligation`, `deposit_liquidity_and_mint_ctokens`,
//! `deposit_ctokens_into_obligation`, `rebalance_staker`,
//! `refresh_reserve_price`, `withdraw_ctokens`,
//! `redeem_ctokens_and_withdraw_liquidity_request`,
//! `unstake_sui_from_staker`, and `fulfill_liquidity_request`.

use tracing::debug;

use crate::config::EnvConfig;
use crate::domain::reserve::reserve_index_for;
use crate::domain::{Action, Address, ObjectId, ObjectRef, ReserveInfo};
use crate::error::CompileError;

use super::builder::{Argument, TransactionBuilder};

const LENDING_MODULE: &str = "lending_market";

/// Everything an action needs besides its own fields.
pub struct CompileContext<'a> {
    pub env: &'a EnvConfig,
    /// Address the capability and withdrawn coins are transferred to.
    pub owner: Address,
    /// Exact reference of the funding coin, when the run selected one.
    pub funding: Option<ObjectRef>,
    /// Ordered reserve list; position is the on-chain reserve identifier.
    pub reserves: &'a [ReserveInfo],
}

/// What an action contributed to the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledAction {
    /// The in-transaction argument for the freshly created obligation
    /// capability. Its on-chain id only exists once effects come back.
    Supply { obligation_cap: Argument },
    Withdraw,
    RefreshPrice,
}

/// Validate an action list before any network work starts.
///
/// Catches unsupported kinds and withdraw actions missing cross-references,
/// so a run that cannot compile never issues a single ledger call.
pub fn validate_actions(actions: &[Action]) -> Result<(), CompileError> {
    for action in actions {
        match action {
            Action::Supply { .. } | Action::RefreshPrice { .. } => {}
            Action::Withdraw {
                obligation_cap_id,
                reserve_index,
                price_info_id,
                ..
            } => {
                if obligation_cap_id.is_none() {
                    return Err(CompileError::MissingField {
                        action: "withdraw",
                        field: "obligation_cap_id",
                    });
                }
                if reserve_index.is_none() {
                    return Err(CompileError::MissingField {
                        action: "withdraw",
                        field: "reserve_index",
                    });
                }
                if price_info_id.is_none() {
                    return Err(CompileError::MissingField {
                        action: "withdraw",
                        field: "price_info_id",
                    });
                }
            }
            Action::Swap { .. } => {
                return Err(CompileError::UnsupportedAction { kind: "swap" });
            }
            Action::Borrow { .. } => {
                return Err(CompileError::UnsupportedAction { kind: "borrow" });
            }
        }
    }
    Ok(())
}

/// Compile one action into builder commands, in action-list order.
pub fn compile_action(
    builder: &mut TransactionBuilder,
    action: &Action,
    ctx: &CompileContext<'_>,
) -> Result<CompiledAction, CompileError> {
    match action {
        Action::Supply {
            coin_type, amount, ..
        } => {
            let funding = ctx.funding.clone().ok_or(CompileError::MissingField {
                action: "supply",
                field: "funding coin",
            })?;
            let reserve_index = reserve_index_for(ctx.reserves, coin_type).ok_or_else(|| {
                CompileError::ReserveNotFound {
                    coin_type: coin_type.clone(),
                }
            })?;
            debug!(
                coin_type = %coin_type,
                amount,
                reserve_index,
                "compiling supply"
            );

            let market = builder.object_shared(ctx.env.lending_market_id.clone(), true);
            let reserve_arg = builder.pure_u64(reserve_index);
            let market_type = ctx.env.lending_market_type.clone();

            let obligation_cap = builder.move_call(
                ctx.env.package_id.clone(),
                LENDING_MODULE,
                "create_obligation",
                vec![market_type.clone()],
                vec![market],
            );

            let funding_arg = builder.object_owned(funding);
            let amount_arg = builder.pure_u64(*amount);
            let deposit_coin = builder.split_coin(funding_arg, amount_arg);

            let clock = builder.clock();
            let ctokens = builder.move_call(
                ctx.env.package_id.clone(),
                LENDING_MODULE,
                "deposit_liquidity_and_mint_ctokens",
                vec![market_type.clone(), coin_type.0.clone()],
                vec![market, reserve_arg, clock, deposit_coin],
            );

            builder.move_call(
                ctx.env.package_id.clone(),
                LENDING_MODULE,
                "deposit_ctokens_into_obligation",
                vec![market_type.clone(), coin_type.0.clone()],
                vec![market, reserve_arg, obligation_cap, clock, ctokens],
            );

            let system_state = builder.system_state();
            builder.move_call(
                ctx.env.package_id.clone(),
                LENDING_MODULE,
                "rebalance_staker",
                vec![market_type],
                vec![market, reserve_arg, system_state],
            );

            builder.transfer_objects(vec![obligation_cap], ctx.owner.clone());

            Ok(CompiledAction::Supply { obligation_cap })
        }

        Action::Withdraw {
            coin_type,
            amount,
            obligation_cap_id,
            reserve_index,
            price_info_id,
            ..
        } => {
            let cap_id: &ObjectId = obligation_cap_id
                .as_ref()
                .ok_or(CompileError::MissingField {
                    action: "withdraw",
                    field: "obligation_cap_id",
                })?;
            let reserve_index = reserve_index.ok_or(CompileError::MissingField {
                action: "withdraw",
                field: "reserve_index",
            })?;
            let price_info_id = price_info_id
                .as_ref()
                .ok_or(CompileError::MissingField {
                    action: "withdraw",
                    field: "price_info_id",
                })?;
            debug!(
                coin_type = %coin_type,
                amount,
                reserve_index,
                "compiling withdraw"
            );

            let market = builder.object_shared(ctx.env.lending_market_id.clone(), true);
            let reserve_arg = builder.pure_u64(reserve_index);
            let clock = builder.clock();
            let price_info = builder.object_shared(price_info_id.clone(), true);
            let cap = builder.object_owned_by_id(cap_id.clone());
            let market_type = ctx.env.lending_market_type.clone();

            builder.move_call(
                ctx.env.package_id.clone(),
                LENDING_MODULE,
                "refresh_reserve_price",
                vec![market_type.clone()],
                vec![market, reserve_arg, clock, price_info],
            );

            let amount_arg = builder.pure_u64(*amount);
            builder.move_call(
                ctx.env.package_id.clone(),
                LENDING_MODULE,
                "withdraw_ctokens",
                vec![market_type.clone(), coin_type.0.clone()],
                vec![market, reserve_arg, cap, clock, amount_arg],
            );

            let none = builder.move_call(
                ObjectId::from("0x1"),
                "option",
                "none",
                vec![coin_type.0.clone()],
                vec![],
            );

            let liquidity_request = builder.move_call(
                ctx.env.package_id.clone(),
                LENDING_MODULE,
                "redeem_ctokens_and_withdraw_liquidity_request",
                vec![market_type.clone(), coin_type.0.clone()],
                vec![market, reserve_arg, cap, clock, none],
            );

            // Staked native deposits must be unstaked before the request can
            // be fulfilled; other coin types skip this step.
            if coin_type.is_native() {
                let system_state = builder.system_state();
                builder.move_call(
                    ctx.env.package_id.clone(),
                    LENDING_MODULE,
                    "unstake_sui_from_staker",
                    vec![market_type.clone()],
                    vec![market, reserve_arg, liquidity_request, system_state],
                );
            }

            let returned = builder.move_call(
                ctx.env.package_id.clone(),
                LENDING_MODULE,
                "fulfill_liquidity_request",
                vec![market_type, coin_type.0.clone()],
                vec![market, reserve_arg, liquidity_request],
            );

            builder.transfer_objects(vec![returned], ctx.owner.clone());

            Ok(CompiledAction::Withdraw)
        }

        Action::RefreshPrice {
            reserve_index,
            price_info_id,
            ..
        } => {
            let market = builder.object_shared(ctx.env.lending_market_id.clone(), true);
            let reserve_arg = builder.pure_u64(*reserve_index);
            let clock = builder.clock();
            let price_info = builder.object_shared(price_info_id.clone(), true);

            builder.move_call(
                ctx.env.package_id.clone(),
                LENDING_MODULE,
                "refresh_reserve_price",
                vec![ctx.env.lending_market_type.clone()],
                vec![market, reserve_arg, clock, price_info],
            );

            Ok(CompiledAction::RefreshPrice)
        }

        Action::Swap { .. } => Err(CompileError::UnsupportedAction { kind: "swap" }),
        Action::Borrow { .. } => Err(CompileError::UnsupportedAction { kind: "borrow" }),
    }
}
