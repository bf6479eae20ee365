use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
/// Memoization service error.
pub enum Error<E> {
    /// Failed to receive the result from the channel, the executing task went away
    Recv,
    /// The underlying call failed; failures are memoized exactly like successes
    Failed(E),
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Recv => write!(f, "Unable to receive data from the channel"),
            Error::Failed(err) => write!(f, "{err}"),
        }
    }
}

impl<E: fmt::Display + fmt::Debug> std::error::Error for Error<E> {}
