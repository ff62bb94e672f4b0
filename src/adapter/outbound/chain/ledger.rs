//! Vault and pool state over JSON-RPC.

use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::DynProvider;
use async_trait::async_trait;
use tracing::{debug, info};

use super::contracts::{DepositInfo, DepositVault, StateView};
use super::{block_number, to_i24, to_i32, to_u64};
use crate::domain::{
    AgentId, Deposit, DepositId, DepositStatus, PoolKey, PoolSnapshot, Position, PositionId,
    Strategy,
};
use crate::error::{ChainError, Result};
use crate::port::outbound::ledger::{
    AgentAssigned, CloseRequest, DepositCreated, Ledger, MintReceipt, MintRequest,
};

/// [`Ledger`] backed by the deposit vault and the pool state view.
pub struct EvmLedger {
    provider: DynProvider,
    vault: DepositVault::DepositVaultInstance<DynProvider>,
    state_view: StateView::StateViewInstance<DynProvider>,
}

impl EvmLedger {
    /// Create a ledger over `provider`.
    #[must_use]
    pub fn new(provider: DynProvider, vault: Address, state_view: Address) -> Self {
        Self {
            vault: DepositVault::new(vault, provider.clone()),
            state_view: StateView::new(state_view, provider.clone()),
            provider,
        }
    }
}

fn decode_deposit(id: DepositId, info: DepositInfo) -> Result<Deposit> {
    let strategy = Strategy::from_index(info.strategy).ok_or_else(|| {
        ChainError::decode("strategy", format!("unknown index {}", info.strategy))
    })?;
    let status = DepositStatus::from_index(info.status)
        .ok_or_else(|| ChainError::decode("status", format!("unknown index {}", info.status)))?;
    let assigned = to_u64("assignedAgentId", info.assignedAgentId)?;
    let open_position_ids = info
        .positionIds
        .into_iter()
        .map(|p| to_u64("positionId", p).map(PositionId::new))
        .collect::<Result<Vec<_>>>()?;

    Ok(Deposit {
        id,
        owner: info.owner,
        remaining_amount0: info.remainingAmount0,
        remaining_amount1: info.remainingAmount1,
        lock_until: info.lockUntil,
        strategy,
        assigned_agent: (assigned != 0).then(|| AgentId::new(assigned)),
        status,
        open_position_ids,
    })
}

#[async_trait]
impl Ledger for EvmLedger {
    fn name(&self) -> &'static str {
        "evm"
    }

    async fn block_number(&self) -> Result<u64> {
        block_number(&self.provider).await
    }

    async fn pool_state(&self, key: &PoolKey) -> Result<PoolSnapshot> {
        let pool_id = key.id();
        let slot0 = self
            .state_view
            .getSlot0(pool_id)
            .call()
            .await
            .map_err(|e| ChainError::read("getSlot0", e))?;
        let liquidity = self
            .state_view
            .getLiquidity(pool_id)
            .call()
            .await
            .map_err(|e| ChainError::read("getLiquidity", e))?;
        let fees = self
            .state_view
            .getFeeGrowthGlobals(pool_id)
            .call()
            .await
            .map_err(|e| ChainError::read("getFeeGrowthGlobals", e))?;

        Ok(PoolSnapshot {
            sqrt_price_x96: U256::from(slot0.sqrtPriceX96),
            tick: to_i32("tick", slot0.tick)?,
            liquidity,
            fee_growth_global0: fees.feeGrowthGlobal0,
            fee_growth_global1: fees.feeGrowthGlobal1,
        })
    }

    async fn deposit(&self, id: DepositId) -> Result<Deposit> {
        let info = self
            .vault
            .getDeposit(U256::from(id.value()))
            .call()
            .await
            .map_err(|e| ChainError::read("getDeposit", e))?;
        decode_deposit(id, info)
    }

    async fn position(&self, id: PositionId) -> Result<Position> {
        let position = self
            .vault
            .getPosition(U256::from(id.value()))
            .call()
            .await
            .map_err(|e| ChainError::read("getPosition", e))?;

        Ok(Position {
            id,
            liquidity: position.liquidity,
            tick_lower: to_i32("tickLower", position.tickLower)?,
            tick_upper: to_i32("tickUpper", position.tickUpper)?,
            current_tick: to_i32("currentTick", position.currentTick)?,
        })
    }

    async fn user_deposits(&self, owner: Address) -> Result<Vec<DepositId>> {
        let ids = self
            .vault
            .getUserDeposits(owner)
            .call()
            .await
            .map_err(|e| ChainError::read("getUserDeposits", e))?;
        ids.into_iter()
            .map(|id| to_u64("depositId", id).map(DepositId::new))
            .collect()
    }

    async fn next_deposit_id(&self) -> Result<u64> {
        let next = self
            .vault
            .nextDepositId()
            .call()
            .await
            .map_err(|e| ChainError::read("nextDepositId", e))?;
        to_u64("nextDepositId", next)
    }

    async fn mint_position(&self, request: &MintRequest) -> Result<MintReceipt> {
        let pending = self
            .vault
            .mintPosition(
                U256::from(request.deposit_id.value()),
                to_i24("tickLower", request.range.lower())?,
                to_i24("tickUpper", request.range.upper())?,
                request.liquidity,
                request.amount0_max,
                request.amount1_max,
                U256::from(request.deadline),
            )
            .send()
            .await
            .map_err(|e| ChainError::submit("mintPosition", e))?;
        debug!(tx_hash = %pending.tx_hash(), "Mint submitted");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainError::confirm("mintPosition", e))?;
        let tx_hash = receipt.transaction_hash;
        if !receipt.status() {
            return Err(ChainError::Reverted {
                operation: "mintPosition",
                tx_hash: tx_hash.to_string(),
            }
            .into());
        }

        let minted = receipt
            .inner
            .logs()
            .iter()
            .find_map(|log| log.log_decode::<DepositVault::PositionMinted>().ok())
            .ok_or_else(|| ChainError::MissingEvent {
                event: "PositionMinted",
                tx_hash: tx_hash.to_string(),
            })?;
        let position_id = PositionId::new(to_u64("positionId", minted.inner.data.positionId)?);

        info!(tx_hash = %tx_hash, position_id = %position_id, "Mint confirmed");
        Ok(MintReceipt {
            tx_hash,
            position_id,
        })
    }

    async fn close_position(&self, request: &CloseRequest) -> Result<TxHash> {
        let pending = self
            .vault
            .closePosition(
                U256::from(request.deposit_id.value()),
                U256::from(request.position_id.value()),
                request.amount0_min,
                request.amount1_min,
                U256::from(request.deadline),
            )
            .send()
            .await
            .map_err(|e| ChainError::submit("closePosition", e))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainError::confirm("closePosition", e))?;
        let tx_hash = receipt.transaction_hash;
        if !receipt.status() {
            return Err(ChainError::Reverted {
                operation: "closePosition",
                tx_hash: tx_hash.to_string(),
            }
            .into());
        }

        info!(tx_hash = %tx_hash, position_id = %request.position_id, "Close confirmed");
        Ok(tx_hash)
    }

    async fn deposit_created_events(&self, from: u64, to: u64) -> Result<Vec<DepositCreated>> {
        let logs = self
            .vault
            .DepositCreated_filter()
            .from_block(from)
            .to_block(to)
            .query()
            .await
            .map_err(|e| ChainError::read("DepositCreated", e))?;

        logs.into_iter()
            .map(|(event, log)| {
                Ok(DepositCreated {
                    deposit_id: DepositId::new(to_u64("depositId", event.depositId)?),
                    owner: event.owner,
                    amount0: event.amount0,
                    amount1: event.amount1,
                    strategy: Strategy::from_index(event.strategy),
                    block_number: log.block_number,
                })
            })
            .collect()
    }

    async fn agent_assigned_events(&self, from: u64, to: u64) -> Result<Vec<AgentAssigned>> {
        let logs = self
            .vault
            .AgentAssigned_filter()
            .from_block(from)
            .to_block(to)
            .query()
            .await
            .map_err(|e| ChainError::read("AgentAssigned", e))?;

        logs.into_iter()
            .map(|(event, log)| {
                Ok(AgentAssigned {
                    deposit_id: DepositId::new(to_u64("depositId", event.depositId)?),
                    agent_id: AgentId::new(to_u64("agentId", event.agentId)?),
                    block_number: log.block_number,
                })
            })
            .collect()
    }
}
