mod batch;
mod resize;
mod split;

pub use batch::*;
pub use resize::*;
pub use split::*;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a spritesheet into individual frame images.
    Split {
        // args
        #[clap(flatten)]
        args: SplitArgs,
    },

    /// Split multiple spritesheets described by a JSON manifest.
    ///
    /// Sheets are processed in order. A failing sheet is reported and the
    /// remaining entries are still processed.
    Batch {
        // args
        #[clap(flatten)]
        args: BatchArgs,
    },

    /// Resize one or more images with a chosen resampling filter.
    Resize {
        // args
        #[clap(flatten)]
        args: ResizeArgs,
    },
}

impl Command {
    pub fn execute(&self) -> Result<(), CommandError> {
        match self {
            Self::Split { args } => split(args),
            Self::Batch { args } => batch(args),
            Self::Resize { args } => resize(args),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    SplitError(#[from] crate::split::SplitError),

    #[error("{0}")]
    NameTableError(#[from] crate::naming::NameTableError),

    #[error("{0}")]
    ResizeError(#[from] ResizeError),

    #[error("invalid manifest: {0}")]
    ManifestError(#[from] serde_json::Error),
}
