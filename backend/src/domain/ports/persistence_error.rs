//! Persistence failures shared by the repository ports.

use super::define_port_error;

define_port_error! {
    /// Errors raised by repository adapters.
    pub enum PersistenceError {
        /// A connection could not be obtained or was lost.
        Connection { message: String } => "repository connection failed: {message}"
            as ServiceUnavailable,
        /// A query or mutation failed during execution.
        Query { message: String } => "repository query failed: {message}" as InternalError,
        /// The addressed row does not exist.
        NotFound { entity: String } => "{entity} not found" as NotFound,
        /// The operation exceeded its time budget.
        Timeout { operation: String } => "{operation} timed out" as ServiceUnavailable,
        /// The write clashes with rows already stored.
        Conflict { message: String } => "{message}" as InvalidRequest,
    }
}
