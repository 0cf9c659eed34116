// Application layer - Use case interactors

pub mod operation_interactor;

// Re-export interactors
pub use operation_interactor::{OperationInteractor, OperationRequest};
