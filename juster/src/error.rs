use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum JusterError {
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,
    /// No event with the given id
    NotFound = 3,
    /// Event is not in the state this call requires
    InvalidState = 4,
    /// Measurement was already started for this event
    AlreadyStarted = 5,
    /// Manager paused event creation
    CreationPaused = 6,
    /// Measure period or time to bets close outside configured bounds
    InvalidPeriod = 7,
    /// Initial or provided liquidity too small
    InsufficientLiquidity = 8,
    /// Betting window is over
    BetsClosed = 9,
    /// Amount must be positive
    ZeroAmount = 10,
    /// Oracle reading too far from now or outside the measurement window
    StaleOracleData = 11,
    /// Pool cannot cover the keeper fee
    FeeUnfunded = 12,
    /// Nothing left to pay out for this participant
    NothingToWithdraw = 13,
    /// Liquidity already withdrawn by this provider
    AlreadyWithdrawn = 14,
    /// Liquidity can only be withdrawn after the event is closed
    EventNotClosed = 15,
    /// Caller is not allowed to perform this action
    Unauthorized = 16,
    /// No manager proposal to accept
    NoProposal = 17,
    /// Config bounds are inconsistent
    InvalidConfig = 18,
    /// Target dynamics must be positive
    InvalidTargetDynamics = 19,
    /// Liquidity percent outside configured bounds
    InvalidLiquidityPercent = 20,
    /// Time condition for this call is not reached yet
    TooEarly = 21,
    /// Oracle call failed or returned a non-positive rate
    OracleUnavailable = 22,
    /// Arithmetic overflow
    Overflow = 23,
    /// Critical storage data missing (contract state corrupted)
    StorageCorrupted = 24,
    /// Projected payout or share price moved past the caller's limit
    SlippageExceeded = 25,
}
