//! Keygen command - print random share keys

use crate::cli::args::KeygenArgs;
use crate::error::TempCacheResult;
use crate::keys::random_key;

/// Execute the keygen command
pub fn execute(args: KeygenArgs) -> TempCacheResult<()> {
    for _ in 0..args.count {
        println!("{}", random_key());
    }
    Ok(())
}
