//! `dockerup check`: can the workflow reach Docker?

use crate::container::{connect_hint, daemon_info};

/// Print the daemon version, or why it cannot be reached.
///
/// Fails when Docker is not reachable so scripts can gate on the exit code.
pub async fn run_check_command() -> anyhow::Result<()> {
    match daemon_info().await {
        Ok(info) => {
            println!("{}", info);
            Ok(())
        }
        Err(e) => {
            println!("Docker: not reachable");
            println!("  {}", connect_hint(&e));
            Err(e.into())
        }
    }
}
