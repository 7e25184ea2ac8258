use crate::status::Status;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The native constructor reported a non-success status. The handle was
    /// already released internally; there is nothing for the caller to clean
    /// up.
    #[error("Construction failed: {0}")]
    Construction(Status),

    /// A drawing-capable operation was issued after `finish()`.
    #[error("Resource is finished")]
    Finished,

    #[error("Write failed: {0}")]
    Write(Status),

    #[error("User data attachment failed: {0}")]
    UserData(Status),

    #[error("Mime data attachment failed: {0}")]
    MimeData(Status),

    /// A string argument carries an interior NUL byte and cannot cross the
    /// C boundary.
    #[error("String contains an interior NUL byte")]
    Nul(#[from] std::ffi::NulError),
}
