pub mod filesystem;
pub mod user_input;
pub mod output;

pub use filesystem::{FileSystem, RealFileSystem};
pub use user_input::{UserInput, InquireUserInput};
pub use output::{Output, TerminalOutput};

#[cfg(test)]
pub use filesystem::MockFileSystem;
#[cfg(test)]
pub use user_input::{MockResponse, MockUserInput};
#[cfg(test)]
pub use output::{MockOutput, OutputMessage};
