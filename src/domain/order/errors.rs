// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(u32),

    #[error("Order {0} not found")]
    NotFound(String),

    #[error("Order is archived and can no longer be transitioned")]
    Archived,

    #[error("Order is not awaiting customer confirmation")]
    NotAwaitingConfirmation,
}
