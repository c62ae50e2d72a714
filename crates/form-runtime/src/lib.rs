//! Host-side orchestration on top of `form-spec`: async validators with
//! debounce and supersession, autocomplete sources, and a [`FormSession`]
//! that applies the dependency graph after each change.

pub mod coordinator;
pub mod error;
pub mod registry;
pub mod session;

pub use coordinator::{
    AsyncCoordinator, AsyncValidationState, CoordinatorConfig, Dispatch, VALIDATION_FAILED,
};
pub use error::RuntimeError;
pub use registry::{
    AsyncValidator, AsyncValidatorRegistry, AsyncVerdict, AutocompleteOption,
    AutocompleteRegistry, AutocompleteSource,
};
pub use session::FormSession;
