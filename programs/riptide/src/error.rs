use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    // General
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Math underflow")]
    MathUnderflow,
    #[msg("Division by zero")]
    DivisionByZero,
    #[msg("Invalid amount: must be greater than zero")]
    InvalidAmount,
    #[msg("Invalid parameter")]
    InvalidParameter,

    // Authorization
    #[msg("Unauthorized: signer is not the governance authority")]
    Unauthorized,
    #[msg("Manager mode is active and signer is not a manager")]
    ManagerRequired,
    #[msg("Private liquidation mode is active and signer is not a liquidator")]
    LiquidatorRequired,
    #[msg("Signer is neither the position owner nor an approved router")]
    RouterNotApproved,

    // Configuration
    #[msg("Fee exceeds maximum allowed")]
    FeeExceedsMaximum,
    #[msg("Liquidation fee exceeds maximum allowed")]
    LiquidationFeeTooHigh,
    #[msg("Funding interval below minimum")]
    FundingIntervalTooShort,
    #[msg("Funding rate factor exceeds maximum")]
    FundingRateFactorTooHigh,
    #[msg("Max leverage must exceed 1x")]
    MaxLeverageTooLow,
    #[msg("Token is not whitelisted")]
    TokenNotWhitelisted,
    #[msg("Input and output tokens must differ")]
    TokensMustDiffer,
    #[msg("Missing token config account")]
    TokenConfigMissing,

    // Oracle
    #[msg("Oracle price is stale")]
    OraclePriceStale,
    #[msg("Oracle price is invalid")]
    OraclePriceInvalid,
    #[msg("Oracle account mismatch")]
    OracleAccountMismatch,

    // Pool ledger
    #[msg("Pool amount exceeds custodial balance")]
    PoolExceedsBalance,
    #[msg("Reserved amount exceeds pool amount")]
    ReservedExceedsPool,
    #[msg("Pool amount below buffer amount")]
    PoolBelowBuffer,
    #[msg("RUSD debt ceiling exceeded for token")]
    RusdCapExceeded,
    #[msg("Insufficient pool amount")]
    InsufficientPoolAmount,
    #[msg("Insufficient reserved amount")]
    InsufficientReserve,
    #[msg("Insufficient guaranteed USD")]
    InsufficientGuaranteedUsd,
    #[msg("Global short size exceeds maximum")]
    MaxGlobalShortsExceeded,

    // Swap and mint/redeem
    #[msg("Swaps are disabled")]
    SwapsDisabled,
    #[msg("Redemption amount is zero")]
    ZeroRedemption,

    // Positions
    #[msg("Leverage trading is disabled")]
    LeverageDisabled,
    #[msg("Collateral token must match index token for longs")]
    LongMustMatchIndex,
    #[msg("Index token must not be a stable token for longs")]
    LongIndexMustNotBeStable,
    #[msg("Collateral token must be a stable token for shorts")]
    ShortCollateralMustBeStable,
    #[msg("Index token must not be a stable token for shorts")]
    ShortIndexMustNotBeStable,
    #[msg("Index token is not shortable")]
    IndexNotShortable,
    #[msg("Position has no size")]
    EmptyPosition,
    #[msg("Position size below collateral")]
    SizeBelowCollateral,
    #[msg("Size delta exceeds position size")]
    SizeDeltaExceedsPosition,
    #[msg("Collateral delta exceeds position collateral")]
    CollateralDeltaExceedsPosition,
    #[msg("Position collateral cannot cover fees")]
    InsufficientCollateralForFees,
    #[msg("Position average price is zero")]
    InvalidAveragePrice,

    // Liquidation
    #[msg("Position is not liquidatable")]
    PositionNotLiquidatable,
    #[msg("Losses exceed collateral")]
    LossesExceedCollateral,
    #[msg("Fees exceed collateral")]
    FeesExceedCollateral,
    #[msg("Liquidation fees exceed collateral")]
    LiquidationFeesExceedCollateral,
    #[msg("Leverage exceeds maximum allowed")]
    MaxLeverageExceeded,
}
