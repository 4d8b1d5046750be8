use thiserror::Error;

/// Every failure the dashboard shows. The message is fixed per kind; the
/// underlying cause only goes to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("Product name and price are required.")]
    RequiredFields,
    #[error("Select a product to edit first.")]
    NoEditTarget,
    #[error("Failed to load products.")]
    LoadFailed,
    #[error("Failed to add product.")]
    AddFailed,
    #[error("Failed to update product.")]
    UpdateFailed,
    #[error("Failed to delete product.")]
    DeleteFailed,
}

impl DashboardError {
    /// Validation errors are raised before any request is sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::RequiredFields | Self::NoEditTarget)
    }
}
