//! ABI bindings for the vault, pool state view and agent registries.

#![allow(clippy::too_many_arguments)]

use alloy_sol_types::sol;

sol! {
    #[derive(Debug)]
    struct DepositInfo {
        address owner;
        uint256 remainingAmount0;
        uint256 remainingAmount1;
        uint64 lockUntil;
        uint8 strategy;
        uint256 assignedAgentId;
        uint8 status;
        uint256[] positionIds;
    }

    #[sol(rpc)]
    contract DepositVault {
        event DepositCreated(uint256 indexed depositId, address indexed owner, uint256 amount0, uint256 amount1, uint8 strategy);
        event AgentAssigned(uint256 indexed depositId, uint256 indexed agentId);
        event PositionMinted(uint256 indexed depositId, uint256 indexed positionId, int24 tickLower, int24 tickUpper, uint128 liquidity);
        event PositionClosed(uint256 indexed depositId, uint256 indexed positionId, uint256 amount0, uint256 amount1);

        function getDeposit(uint256 depositId) external view returns (DepositInfo memory);
        function getPosition(uint256 positionId) external view returns (uint128 liquidity, int24 tickLower, int24 tickUpper, int24 currentTick);
        function getUserDeposits(address user) external view returns (uint256[] memory);
        function nextDepositId() external view returns (uint256);

        function mintPosition(uint256 depositId, int24 tickLower, int24 tickUpper, uint128 liquidity, uint256 amount0Max, uint256 amount1Max, uint256 deadline) external returns (uint256 positionId);
        function closePosition(uint256 depositId, uint256 positionId, uint256 amount0Min, uint256 amount1Min, uint256 deadline) external;
    }

    #[sol(rpc)]
    contract StateView {
        function getSlot0(bytes32 poolId) external view returns (uint160 sqrtPriceX96, int24 tick, uint24 protocolFee, uint24 lpFee);
        function getLiquidity(bytes32 poolId) external view returns (uint128 liquidity);
        function getFeeGrowthGlobals(bytes32 poolId) external view returns (uint256 feeGrowthGlobal0, uint256 feeGrowthGlobal1);
    }

    #[derive(Debug)]
    struct AgentInfo {
        uint256 agentId;
        string agentDomain;
        address agentAddress;
    }

    #[sol(rpc)]
    contract IdentityRegistry {
        function getAgent(uint256 agentId) external view returns (AgentInfo memory);
        function resolveByAddress(address agentAddress) external view returns (AgentInfo memory);
        function getAgentCount() external view returns (uint256);
    }

    #[sol(rpc)]
    contract ValidationRegistry {
        event ValidationRequestEvent(uint256 indexed agentValidatorId, uint256 indexed agentServerId, bytes32 indexed dataHash);
        event ValidationResponseEvent(uint256 indexed agentValidatorId, uint256 indexed agentServerId, bytes32 indexed dataHash, uint8 response);

        function validationRequest(uint256 agentValidatorId, uint256 agentServerId, bytes32 dataHash) external;
        function validationResponse(bytes32 dataHash, uint8 response) external;
        function isValidationPending(bytes32 dataHash) external view returns (bool exists, bool pending);
        function getValidationResponse(bytes32 dataHash) external view returns (bool hasResponse, uint8 response);
    }

    #[sol(rpc)]
    contract ReputationRegistry {
        function isFeedbackAuthorized(uint256 agentClientId, uint256 agentServerId) external view returns (bool isAuthorized, bytes32 feedbackAuthId);
    }
}
