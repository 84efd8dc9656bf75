//! Runs the task set with the reference configuration, printing records to
//! stdout until the process is killed.

use periodici::{Config, System};

fn main() -> periodici::Result<()> {
    periodici::init_tracing();

    let handle = System::new(Config::default())?.spawn(std::io::stdout())?;
    handle.join()
}
