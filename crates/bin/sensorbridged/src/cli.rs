//! Command-line flags.
//!
//! ```text
//! sensorbridged [--recreate] [--test [SECONDS]]
//! ```

use std::time::Duration;

/// Lifetime of a `--test` run when no duration is given.
pub const DEFAULT_TEST_RUN: Duration = Duration::from_secs(10);

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Flags {
    /// Wipe the pairing file before serving.
    pub recreate: bool,
    /// Stop on our own after this long.
    pub run_for: Option<Duration>,
}

impl Flags {
    /// Parse the process arguments, program name excluded.
    ///
    /// # Errors
    ///
    /// Returns a [`FlagError`] on an unknown flag.
    pub fn parse<I>(args: I) -> Result<Self, FlagError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = Self::default();
        let mut args = args.into_iter().peekable();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--recreate" => flags.recreate = true,
                "--test" => {
                    let secs = args.next_if(|next| next.parse::<u64>().is_ok());
                    flags.run_for = Some(
                        secs.and_then(|s| s.parse().ok())
                            .map_or(DEFAULT_TEST_RUN, Duration::from_secs),
                    );
                }
                _ => return Err(FlagError::Unknown(arg)),
            }
        }
        Ok(flags)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FlagError {
    #[error("unknown argument {0:?}, usage: sensorbridged [--recreate] [--test [SECONDS]]")]
    Unknown(String),
}
