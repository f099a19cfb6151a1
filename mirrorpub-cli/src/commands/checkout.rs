//! Checkout command - resume a document by its key

use clap::Args;
use mirrorpub_core::workflow::{checkout, CheckoutOutcome};
use mirrorpub_core::{DestinationKind, Session};

/// Resume a document by its key
#[derive(Args, Debug)]
pub struct CheckoutArgs {
    /// Document key, `{now}_{name}`
    pub key: String,

    /// Repository whose workspace is switched
    #[arg(short, long, default_value = "base")]
    pub dest: DestinationKind,
}

impl CheckoutArgs {
    pub fn execute(&self, session: &Session) -> anyhow::Result<()> {
        match checkout(session, self.dest, &self.key)? {
            CheckoutOutcome::Unchanged { on_target } => {
                println!("{} is already the current document.", self.key);
                if !on_target {
                    anyhow::bail!(
                        "{} workspace is not on branch {}, fix it before writing",
                        self.dest,
                        self.key
                    );
                }
            }
            CheckoutOutcome::DryRun { pointer } => {
                println!("Would switch to:");
                print!("{}", pointer);
            }
            CheckoutOutcome::Switched { pointer, on_target } => {
                print!("{}", pointer);
                if !on_target {
                    anyhow::bail!(
                        "{} workspace is not on branch {}, fix it before writing",
                        self.dest,
                        pointer.key
                    );
                }
            }
        }
        Ok(())
    }
}
